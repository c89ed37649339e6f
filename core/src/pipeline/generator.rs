use super::augment::AugmentationEngine;
use super::batch::Batch;
use super::indexer::BatchIndexer;
use super::slice::{ProcessedExam, SliceProcessor};
use crate::error::{MrnetError, Result};
use crate::store::{ExamCatalog, ExamStore};
use crate::types::{GeneratorConfig, Label};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One exam loaded and preprocessed for a batch
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedExam {
    pub id: String,
    pub exam: ProcessedExam,
    pub label: Label,
}

/// Position of a sequential consumer within an epoch
///
/// Returned with every batch from [`BatchGenerator::next_batch`]; wraps to
/// the start after the last batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    /// Cursor at batch 0
    pub fn start() -> Self {
        Self::default()
    }

    /// Batch number the next fetch returns (before wrapping)
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns whether the cursor sits at the start of an epoch
    pub fn is_epoch_start(&self) -> bool {
        self.position == 0
    }
}

/// Produces class-weighted augmented batches from stored exams
///
/// Owns the epoch order and the random source, so it must not be shared
/// between concurrent consumers; give each worker its own generator.
pub struct BatchGenerator<S, R = StdRng> {
    store: S,
    config: GeneratorConfig,
    indexer: BatchIndexer,
    processor: SliceProcessor,
    engine: AugmentationEngine,
    rng: R,
}

impl<S: ExamStore> BatchGenerator<S, StdRng> {
    /// Creates a generator seeded from `config.seed`, or from entropy
    pub fn new(store: S, catalog: &ExamCatalog, config: GeneratorConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(store, catalog, config, rng)
    }
}

impl<S: ExamStore, R: Rng> BatchGenerator<S, R> {
    /// Creates a generator drawing shuffles and augmentations from `rng`
    pub fn with_rng(
        store: S,
        catalog: &ExamCatalog,
        config: GeneratorConfig,
        mut rng: R,
    ) -> Result<Self> {
        config.validate()?;

        let ids = catalog.ids(&config.data_type, &config.exam_type)?.to_vec();
        let mut indexer = BatchIndexer::new(ids, config.batch_size)?;

        info!("Initializing data generator");
        info!("Model: {}", config.model);
        info!("Data type: {}", config.data_type);
        info!(
            "Combination: {} and {}",
            config.label_type, config.exam_type
        );
        info!("Number of batches: {}", indexer.len());
        info!("Input size: {:?}", config.scale_to);

        indexer.reset(config.shuffle, &mut rng);

        Ok(Self {
            store,
            processor: SliceProcessor::from_config(&config),
            engine: AugmentationEngine::new(config.augment.clone()),
            config,
            indexer,
            rng,
        })
    }

    /// Number of batches per epoch
    pub fn len(&self) -> usize {
        self.indexer.len()
    }

    /// Returns whether there is no complete batch
    pub fn is_empty(&self) -> bool {
        self.indexer.is_empty()
    }

    /// Configuration the generator was built with
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Epoch indexer
    pub fn indexer(&self) -> &BatchIndexer {
        &self.indexer
    }

    /// Underlying exam store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads and preprocesses every exam of batch `index`
    ///
    /// Fails as a whole if any exam or label is missing or any slice is
    /// degenerate.
    pub fn load(&self, index: usize) -> Result<Vec<LoadedExam>> {
        let ids = self.indexer.index_for(index)?;
        debug!("Batch {}: loading {:?}", index, ids);

        ids.into_iter()
            .map(|id| -> Result<LoadedExam> {
                let raw = self
                    .store
                    .load(&self.config.data_type, &self.config.exam_type, id)?;
                let label = self.store.label_of(id, &self.config.label_type)?;
                let exam = self.processor.process_exam(&raw)?;
                Ok(LoadedExam {
                    id: id.to_string(),
                    exam,
                    label,
                })
            })
            .collect()
    }

    /// Produces batch `index`
    ///
    /// All `batch_size` exams of the batch are loaded, but only the first
    /// one is expanded; use [`Self::get_each`] to expand all of them.
    pub fn get(&mut self, index: usize) -> Result<Batch> {
        let loaded = self.load(index)?;
        let first = loaded
            .into_iter()
            .next()
            .ok_or(MrnetError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        self.expand(&first)
    }

    /// Produces one expanded batch per exam of batch `index`
    pub fn get_each(&mut self, index: usize) -> Result<Vec<Batch>> {
        let loaded = self.load(index)?;
        loaded.iter().map(|exam| self.expand(exam)).collect()
    }

    /// Regenerates the epoch order
    pub fn on_epoch_end(&mut self) {
        self.indexer.reset(self.config.shuffle, &mut self.rng);
    }

    /// Fetches the batch at `cursor` and returns the advanced cursor
    ///
    /// The cursor wraps to 0 after the last batch. Wrapping does not call
    /// [`Self::on_epoch_end`]; callers reshuffle explicitly.
    pub fn next_batch(&mut self, cursor: Cursor) -> Result<(Batch, Cursor)> {
        let len = self.len();
        if len == 0 {
            return Err(MrnetError::IndexOutOfRange { index: 0, len });
        }
        let position = if cursor.position >= len {
            0
        } else {
            cursor.position
        };
        let batch = self.get(position)?;
        let next = Cursor {
            position: (position + 1) % len,
        };
        Ok((batch, next))
    }

    /// Lazily yields batches `0..len()` of the current epoch order
    pub fn epoch(&mut self) -> Epoch<'_, S, R> {
        Epoch {
            generator: self,
            next: 0,
        }
    }

    fn expand(&mut self, loaded: &LoadedExam) -> Result<Batch> {
        self.engine.expand(
            &loaded.id,
            &loaded.exam,
            loaded.label,
            self.config.aug_size,
            &self.config.class_weight,
            &mut self.rng,
        )
    }
}

/// Iterator over one epoch of batches
///
/// Stops after the last batch; call [`BatchGenerator::on_epoch_end`] and
/// [`BatchGenerator::epoch`] again for the next pass.
pub struct Epoch<'a, S, R> {
    generator: &'a mut BatchGenerator<S, R>,
    next: usize,
}

impl<S: ExamStore, R: Rng> Iterator for Epoch<'_, S, R> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.generator.len() {
            return None;
        }
        let batch = self.generator.get(self.next);
        self.next += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.generator.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
