use crate::error::{MrnetError, Result};
use crate::store::RawExam;
use crate::types::{DegeneratePolicy, GeneratorConfig, PixelStats};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::{stack, Array2, Array3, Array4, ArrayView2, ArrayView3, Axis};

/// Preprocessed exam shaped `(slices, height, width, 1)`
pub type ProcessedExam = Array4<f32>;

/// Resizes, standardizes and normalizes raw slices
///
/// Each slice goes through three fixed steps:
/// 1. bilinear resample to `scale_to` (width, height)
/// 2. per-slice min-max rescale to `[0, max_pixel_value]`
/// 3. `(s - mean) / stddev` with the configured [`PixelStats`]
#[derive(Debug, Clone)]
pub struct SliceProcessor {
    width: u32,
    height: u32,
    stats: PixelStats,
    policy: DegeneratePolicy,
}

impl SliceProcessor {
    /// Creates a processor for slices resized to `(width, height)`
    pub fn new(scale_to: (u32, u32), stats: PixelStats, policy: DegeneratePolicy) -> Self {
        Self {
            width: scale_to.0,
            height: scale_to.1,
            stats,
            policy,
        }
    }

    /// Creates a processor from generator options
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.scale_to, config.pixel_stats, config.degenerate_policy)
    }

    /// Output slice shape as (rows, cols)
    pub fn target_shape(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }

    /// Pixel statistics applied by the normalize step
    pub fn stats(&self) -> &PixelStats {
        &self.stats
    }

    /// Runs all three steps on one slice; `index` is only used in errors
    ///
    /// Returns a `(height, width, 1)` array.
    pub fn process(&self, raw: ArrayView2<'_, f32>, index: usize) -> Result<Array3<f32>> {
        let resized = self.resample(raw, index)?;
        let standardized = self.standardize(resized, index)?;
        Ok(self.normalize(standardized).insert_axis(Axis(2)))
    }

    /// Processes every slice of an exam, keeping order
    pub fn process_exam(&self, exam: &RawExam) -> Result<ProcessedExam> {
        if exam.len_of(Axis(0)) == 0 {
            return Err(MrnetError::ShapeError("exam has no slices".to_string()));
        }
        let slices = exam
            .outer_iter()
            .enumerate()
            .map(|(index, raw)| self.process(raw, index))
            .collect::<Result<Vec<_>>>()?;
        let views: Vec<ArrayView3<'_, f32>> = slices.iter().map(|s| s.view()).collect();
        Ok(stack(Axis(0), &views)?)
    }

    /// Resamples a slice to the target shape, keeping its intensity units
    pub fn resample(&self, raw: ArrayView2<'_, f32>, index: usize) -> Result<Array2<f32>> {
        let target = self.target_shape();
        let (min, max) = value_range(raw.iter().copied(), index)?;

        if max == min {
            return Ok(Array2::from_elem(target, min));
        }
        if raw.dim() == target {
            return Ok(raw.to_owned());
        }

        // image clamps float samples to [0, 1], so resample a unit-range copy.
        // The filter is a convex combination, so mapping back is exact.
        let (rows, cols) = raw.dim();
        let span = max - min;
        let unit: Vec<f32> = raw.iter().map(|v| (v - min) / span).collect();
        let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_raw(cols as u32, rows as u32, unit).ok_or_else(|| {
                MrnetError::ShapeError(format!("cannot wrap {}x{} slice as image", rows, cols))
            })?;
        let resized = imageops::resize(&buffer, self.width, self.height, FilterType::Triangle);

        let values: Vec<f32> = resized.into_raw().into_iter().map(|v| v * span + min).collect();
        Ok(Array2::from_shape_vec(target, values)?)
    }

    /// Rescales a slice to `[0, max_pixel_value]` using its own min and max
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::DegenerateSlice`] for non-finite values, and for
    /// constant slices under [`DegeneratePolicy::Fail`]
    pub fn standardize(&self, slice: Array2<f32>, index: usize) -> Result<Array2<f32>> {
        let (min, max) = value_range(slice.iter().copied(), index)?;
        if max == min {
            return match self.policy {
                DegeneratePolicy::Fail => Err(MrnetError::DegenerateSlice {
                    index,
                    reason: format!("constant value {}", min),
                }),
                DegeneratePolicy::Zero => Ok(Array2::zeros(slice.dim())),
            };
        }
        let scale = self.stats.max_pixel_value / (max - min);
        Ok(slice.mapv_into(|v| (v - min) * scale))
    }

    /// Applies the global mean and standard deviation
    pub fn normalize(&self, slice: Array2<f32>) -> Array2<f32> {
        let PixelStats { mean, stddev, .. } = self.stats;
        slice.mapv_into(|v| (v - mean) / stddev)
    }
}

fn value_range(values: impl Iterator<Item = f32>, index: usize) -> Result<(f32, f32)> {
    let mut range: Option<(f32, f32)> = None;
    for v in values {
        if !v.is_finite() {
            return Err(MrnetError::DegenerateSlice {
                index,
                reason: format!("non-finite value {}", v),
            });
        }
        range = Some(match range {
            None => (v, v),
            Some((min, max)) => (min.min(v), max.max(v)),
        });
    }
    range.ok_or_else(|| MrnetError::ShapeError(format!("slice {} is empty", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn processor(width: u32, height: u32) -> SliceProcessor {
        SliceProcessor::new((width, height), PixelStats::default(), DegeneratePolicy::Fail)
    }

    #[test]
    fn test_standardize_range_and_extrema() {
        let slice = array![[3.0f32, 10.0, -2.0], [7.0, 4.0, 1.0]];
        let out = processor(3, 2).standardize(slice, 0).unwrap();

        // minimum pixel at (0, 2), maximum at (0, 1)
        assert_eq!(out[[0, 2]], 0.0);
        assert_eq!(out[[0, 1]], 255.0);
        assert!(out.iter().all(|&v| (0.0..=255.0).contains(&v)));
        assert!((out[[1, 0]] - 9.0 / 12.0 * 255.0).abs() < 1e-4);
    }

    #[test]
    fn test_standardize_constant_fails() {
        let err = processor(2, 2)
            .standardize(Array2::from_elem((2, 2), 7.0), 4)
            .unwrap_err();
        assert!(matches!(err, MrnetError::DegenerateSlice { index: 4, .. }));
    }

    #[test]
    fn test_standardize_constant_zero_policy() {
        let processor =
            SliceProcessor::new((2, 2), PixelStats::default(), DegeneratePolicy::Zero);
        let out = processor
            .standardize(Array2::from_elem((2, 2), 7.0), 0)
            .unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_non_finite_fails_under_any_policy() {
        let processor =
            SliceProcessor::new((2, 1), PixelStats::default(), DegeneratePolicy::Zero);
        let slice = array![[1.0f32, f32::NAN]];
        assert!(matches!(
            processor.process(slice.view(), 0),
            Err(MrnetError::DegenerateSlice { .. })
        ));
    }

    #[test]
    fn test_normalize_uses_configured_stats() {
        let processor =
            SliceProcessor::new((1, 1), PixelStats::new(1.0, 10.0, 2.0), DegeneratePolicy::Fail);
        let out = processor.normalize(array![[14.0f32, 10.0]]);
        assert_eq!(out, array![[2.0f32, 0.0]]);
    }

    #[test]
    fn test_process_same_size() {
        let slice = array![[0.0f32, 255.0], [255.0, 0.0]];
        let stats = PixelStats::default();
        let out = processor(2, 2).process(slice.view(), 0).unwrap();

        assert_eq!(out.dim(), (2, 2, 1));
        let low = (0.0 - stats.mean) / stats.stddev;
        let high = (255.0 - stats.mean) / stats.stddev;
        assert!((out[[0, 0, 0]] - low).abs() < 1e-5);
        assert!((out[[0, 1, 0]] - high).abs() < 1e-5);
    }

    #[test]
    fn test_resample_shape_and_bounds() {
        let raw = Array2::from_shape_fn((8, 6), |(r, c)| (r * 6 + c) as f32 * 10.0);
        let resized = processor(4, 3).resample(raw.view(), 0).unwrap();

        // target is (width 4, height 3) -> 3 rows, 4 cols
        assert_eq!(resized.dim(), (3, 4));
        assert!(resized.iter().all(|&v| (0.0..=470.0 + 1e-3).contains(&v)));
    }

    #[test]
    fn test_resample_keeps_constant_slices() {
        let raw = Array2::from_elem((5, 5), 42.0f32);
        let resized = processor(3, 3).resample(raw.view(), 0).unwrap();
        assert!(resized.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_process_exam_keeps_order() {
        let mut exam = Array3::zeros((3, 4, 4));
        for s in 0..3 {
            // distinct bright pixel per slice
            exam[[s, s, s]] = 100.0;
        }
        let processed = processor(4, 4).process_exam(&exam).unwrap();

        assert_eq!(processed.dim(), (3, 4, 4, 1));
        for s in 0..3 {
            let slice = processed.index_axis(Axis(0), s);
            let max = slice.iter().cloned().fold(f32::MIN, f32::max);
            assert_eq!(slice[[s, s, 0]], max);
        }
    }

    #[test]
    fn test_process_exam_propagates_degenerate_slice() {
        let mut exam = Array3::zeros((2, 3, 3));
        exam[[0, 1, 1]] = 5.0;
        let err = processor(3, 3).process_exam(&exam).unwrap_err();
        assert!(matches!(err, MrnetError::DegenerateSlice { index: 1, .. }));
    }
}
