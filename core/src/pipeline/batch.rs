use crate::types::Label;
use ndarray::{Array1, Array5, ArrayView4, Axis};

/// Expanded training batch built from one exam
///
/// `x` is shaped `(entries, slices, height, width, 3)` and `y` holds one
/// label per entry. Entry 0 is the unaugmented original.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Identifier of the source exam
    pub id: String,
    /// Channel-replicated slices for every entry
    pub x: Array5<f32>,
    /// Label per entry
    pub y: Vec<Label>,
}

impl Batch {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Returns whether the batch has no entries
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// One entry shaped `(slices, height, width, 3)`
    pub fn entry(&self, index: usize) -> ArrayView4<'_, f32> {
        self.x.index_axis(Axis(0), index)
    }

    /// Shape of `x`
    pub fn shape(&self) -> &[usize] {
        self.x.shape()
    }

    /// Labels as integer class values
    pub fn labels(&self) -> Array1<u8> {
        self.y.iter().map(|label| label.value()).collect()
    }

    /// Splits the batch into `(x, y)`
    pub fn into_arrays(self) -> (Array5<f32>, Array1<u8>) {
        let y = self.labels();
        (self.x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_accessors() {
        let batch = Batch {
            id: "0000".to_string(),
            x: Array5::zeros((2, 3, 4, 4, 3)),
            y: vec![Label::Positive, Label::Positive],
        };
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert_eq!(batch.entry(1).dim(), (3, 4, 4, 3));
        assert_eq!(batch.shape(), &[2, 3, 4, 4, 3]);

        let (x, y) = batch.into_arrays();
        assert_eq!(x.len_of(Axis(0)), 2);
        assert_eq!(y.to_vec(), vec![1, 1]);
    }
}
