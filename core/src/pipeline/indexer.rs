use crate::error::{MrnetError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Maps batch numbers to exam identifiers for one epoch
///
/// Identifiers past `len() * batch_size` are never returned; the
/// remainder of an uneven split is dropped every epoch.
#[derive(Debug, Clone)]
pub struct BatchIndexer {
    ids: Vec<String>,
    batch_size: usize,
    order: Vec<usize>,
}

impl BatchIndexer {
    /// Creates an indexer in identity order
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::InvalidConfig`] if `batch_size` is zero
    pub fn new(ids: Vec<String>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(MrnetError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        let order = (0..ids.len()).collect();
        Ok(Self {
            ids,
            batch_size,
            order,
        })
    }

    /// Number of batches per epoch
    pub fn len(&self) -> usize {
        self.ids.len() / self.batch_size
    }

    /// Returns whether not even one full batch is available
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exams per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// All identifiers, in catalog order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Current epoch permutation of positions into `ids`
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Regenerates the epoch order: identity, or a uniform shuffle
    pub fn reset<R: Rng + ?Sized>(&mut self, shuffle: bool, rng: &mut R) {
        self.order = (0..self.ids.len()).collect();
        if shuffle {
            self.order.shuffle(rng);
        }
    }

    /// Identifiers of batch `batch`
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::IndexOutOfRange`] if `batch >= len()`
    pub fn index_for(&self, batch: usize) -> Result<Vec<&str>> {
        let len = self.len();
        if batch >= len {
            return Err(MrnetError::IndexOutOfRange { index: batch, len });
        }
        let start = batch * self.batch_size;
        Ok(self.order[start..start + self.batch_size]
            .iter()
            .map(|&position| self.ids[position].as_str())
            .collect())
    }
}
