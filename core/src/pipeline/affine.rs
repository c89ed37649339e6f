//! Geometric warps of single 2-D slices
//!
//! Every warp maps output pixel coordinates back to input coordinates about
//! the slice center and samples bilinearly. Coordinates falling outside the
//! slice take the nearest edge value.

use ndarray::{s, Array2, ArrayView2};

/// Inverse mapping `(row, col) -> (row', col')` about the slice center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    m: [[f32; 2]; 2],
    offset: [f32; 2],
}

impl Affine {
    /// The identity mapping
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0], [0.0, 1.0]],
            offset: [0.0, 0.0],
        }
    }

    /// Rotation by `degrees`
    pub fn rotation(degrees: f32) -> Self {
        let theta = degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        Self {
            m: [[cos, -sin], [sin, cos]],
            offset: [0.0, 0.0],
        }
    }

    /// Shear by `degrees`
    pub fn shear(degrees: f32) -> Self {
        let shear = degrees.to_radians();
        Self {
            m: [[1.0, -shear.sin()], [0.0, shear.cos()]],
            offset: [0.0, 0.0],
        }
    }

    /// Translation by `rows` and `cols` pixels
    pub fn shift(rows: f32, cols: f32) -> Self {
        Self {
            m: [[1.0, 0.0], [0.0, 1.0]],
            offset: [rows, cols],
        }
    }

    /// Maps an output coordinate relative to the center onto the input
    fn apply(&self, row: f32, col: f32) -> (f32, f32) {
        (
            self.m[0][0] * row + self.m[0][1] * col + self.offset[0],
            self.m[1][0] * row + self.m[1][1] * col + self.offset[1],
        )
    }
}

/// Resamples `src` through `transform`, keeping its shape
pub fn warp(src: ArrayView2<'_, f32>, transform: &Affine) -> Array2<f32> {
    let (rows, cols) = src.dim();
    let center_row = rows as f32 / 2.0 - 0.5;
    let center_col = cols as f32 / 2.0 - 0.5;

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let (sr, sc) = transform.apply(r as f32 - center_row, c as f32 - center_col);
        sample_bilinear(&src, sr + center_row, sc + center_col)
    })
}

/// Mirrors a slice left to right
pub fn mirror(src: ArrayView2<'_, f32>) -> Array2<f32> {
    src.slice(s![.., ..;-1]).to_owned()
}

fn sample_bilinear(src: &ArrayView2<'_, f32>, row: f32, col: f32) -> f32 {
    let (rows, cols) = src.dim();
    let row = row.clamp(0.0, (rows - 1) as f32);
    let col = col.clamp(0.0, (cols - 1) as f32);

    let r0 = row.floor() as usize;
    let c0 = col.floor() as usize;
    let r1 = (r0 + 1).min(rows - 1);
    let c1 = (c0 + 1).min(cols - 1);
    let fr = row - r0 as f32;
    let fc = col - c0 as f32;

    let top = src[[r0, c0]] * (1.0 - fc) + src[[r0, c1]] * fc;
    let bottom = src[[r1, c0]] * (1.0 - fc) + src[[r1, c1]] * fc;
    top * (1.0 - fr) + bottom * fr
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ramp() -> Array2<f32> {
        Array2::from_shape_fn((5, 5), |(r, c)| (r * 5 + c) as f32)
    }

    fn assert_close(a: &Array2<f32>, b: &Array2<f32>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4, "{} != {}", x, y);
        }
    }

    #[test]
    fn test_identity_warp() {
        let src = ramp();
        assert_close(&warp(src.view(), &Affine::identity()), &src);
    }

    #[test]
    fn test_zero_rotation_and_shift() {
        let src = ramp();
        assert_close(&warp(src.view(), &Affine::rotation(0.0)), &src);
        assert_close(&warp(src.view(), &Affine::shift(0.0, 0.0)), &src);
        assert_close(&warp(src.view(), &Affine::shear(0.0)), &src);
    }

    #[test]
    fn test_rotation_180() {
        let src = ramp();
        let rotated = warp(src.view(), &Affine::rotation(180.0));
        let expected = src.slice(s![..;-1, ..;-1]).to_owned();
        assert_close(&rotated, &expected);
    }

    #[test]
    fn test_rotation_90_moves_corners() {
        let src = array![[1.0f32, 2.0], [3.0, 4.0]];
        let rotated = warp(src.view(), &Affine::rotation(90.0));
        // every value survives a quarter turn of a 2x2 grid
        let mut values: Vec<f32> = rotated.iter().map(|v| v.round()).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        assert_ne!(rotated.mapv(f32::round), src);
    }

    #[test]
    fn test_integer_shift_with_nearest_fill() {
        let src = ramp();
        // output(r, c) = input(r + 1, c), last row repeats the edge
        let shifted = warp(src.view(), &Affine::shift(1.0, 0.0));
        assert_eq!(shifted[[0, 0]], src[[1, 0]]);
        assert_eq!(shifted[[3, 2]], src[[4, 2]]);
        assert_eq!(shifted[[4, 2]], src[[4, 2]]);
    }

    #[test]
    fn test_fractional_shift_interpolates() {
        let src = array![[0.0f32, 10.0, 20.0]];
        let shifted = warp(src.view(), &Affine::shift(0.0, 0.5));
        assert!((shifted[[0, 0]] - 5.0).abs() < 1e-5);
        assert!((shifted[[0, 1]] - 15.0).abs() < 1e-5);
        assert!((shifted[[0, 2]] - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_mirror() {
        let src = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(mirror(src.view()), array![[3.0f32, 2.0, 1.0], [6.0, 5.0, 4.0]]);
    }
}
