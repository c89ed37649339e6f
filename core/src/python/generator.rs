//! Python wrapper for BatchGenerator

use pyo3::exceptions::{PyStopIteration, PyValueError};
use pyo3::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use super::errors::convert_error;
use crate::pipeline::{BatchGenerator, Cursor};
use crate::store::{DicomExamStore, ExamCatalog, ExamStore, LabelTable, NpyExamStore};
use crate::types::{ClassWeights, GeneratorConfig, Label};

type SendStore = Box<dyn ExamStore + Send>;

/// Flattened batch: `(shape, values, labels)`
///
/// `values` is row-major over `shape`, which is
/// `(entries, slices, height, width, 3)`.
type PyBatch = (Vec<usize>, Vec<f32>, Vec<u8>);

/// Keras-style sequence of augmented MRNet batches
///
/// Example:
///     >>> from mrnet import DataGenerator
///     >>> gen = DataGenerator("MRNet-v1.0", ids, labels, aug_size=2,
///     ...                     class_weight={0: 1.0, 1: 4.0})
///     >>> shape, values, y = gen[0]
#[pyclass(name = "DataGenerator", module = "mrnet")]
pub struct PyDataGenerator {
    inner: BatchGenerator<SendStore>,
    cursor: Cursor,
}

#[pymethods]
impl PyDataGenerator {
    /// Creates a generator
    ///
    /// Args:
    ///     datapath: Dataset root (str or pathlib.Path)
    ///     ids: Mapping split -> exam type -> list of exam identifiers
    ///     labels: Mapping identifier -> label type -> 0 or 1
    ///     store: "npy" or "dicom"
    ///     seed: Optional seed for shuffling and augmentation
    ///
    /// Raises:
    ///     ConfigError: If an option or class weight is invalid
    #[new]
    #[pyo3(signature = (
        datapath,
        ids,
        labels,
        batch_size = 1,
        shuffle = true,
        scale_to = (256, 256),
        label_type = "abnormal".to_string(),
        exam_type = "axial".to_string(),
        data_type = "train".to_string(),
        model = "vgg".to_string(),
        aug_size = 1,
        class_weight = None,
        store = "npy",
        seed = None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        datapath: PathBuf,
        ids: HashMap<String, HashMap<String, Vec<String>>>,
        labels: HashMap<String, HashMap<String, i64>>,
        batch_size: usize,
        shuffle: bool,
        scale_to: (u32, u32),
        label_type: String,
        exam_type: String,
        data_type: String,
        model: String,
        aug_size: usize,
        class_weight: Option<BTreeMap<u8, f64>>,
        store: &str,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let mut catalog = ExamCatalog::new();
        for (split, by_type) in ids {
            for (kind, list) in by_type {
                catalog.insert(split.clone(), kind, list);
            }
        }

        let mut table = LabelTable::new();
        for (id, by_type) in labels {
            for (kind, value) in by_type {
                let label = Label::from_value(value).map_err(convert_error)?;
                table.insert(id.clone(), kind, label);
            }
        }

        let class_weight = match class_weight {
            Some(map) => ClassWeights::from_map(&map).map_err(convert_error)?,
            None => ClassWeights::default(),
        };

        let mut config = GeneratorConfig::default()
            .with_scale_to(scale_to.0, scale_to.1)
            .with_label_type(label_type)
            .with_exam_type(exam_type)
            .with_data_type(data_type)
            .with_model(model)
            .with_batch_size(batch_size)
            .with_shuffle(shuffle)
            .with_aug_size(aug_size)
            .with_class_weight(class_weight);
        if let Some(seed) = seed {
            config = config.with_seed(seed);
        }

        let store: SendStore = match store {
            "npy" => Box::new(NpyExamStore::new(datapath, table)),
            "dicom" => Box::new(DicomExamStore::new(datapath, table)),
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown store '{}', expected 'npy' or 'dicom'",
                    other
                )))
            }
        };

        let inner = BatchGenerator::new(store, &catalog, config).map_err(convert_error)?;
        Ok(Self {
            inner,
            cursor: Cursor::start(),
        })
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Returns batch `index` as `(shape, values, labels)`
    ///
    /// Raises:
    ///     IndexError: If `index` is past the last batch
    ///     MissingExamError: If an exam or its label is missing
    ///     DegenerateSliceError: If a slice is constant-valued
    fn __getitem__(&mut self, index: usize) -> PyResult<PyBatch> {
        let batch = self.inner.get(index).map_err(convert_error)?;
        Ok(flatten(batch))
    }

    /// Reshuffles the identifier order when shuffling is enabled
    fn on_epoch_end(&mut self) {
        self.inner.on_epoch_end();
    }

    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    /// Next batch, wrapping to the first one after the last
    fn __next__(&mut self) -> PyResult<PyBatch> {
        if self.inner.is_empty() {
            return Err(PyStopIteration::new_err("no complete batch"));
        }
        let (batch, cursor) = self.inner.next_batch(self.cursor).map_err(convert_error)?;
        self.cursor = cursor;
        Ok(flatten(batch))
    }

    fn __repr__(&self) -> String {
        let config = self.inner.config();
        format!(
            "DataGenerator(data_type={:?}, exam_type={:?}, label_type={:?}, batches={})",
            config.data_type,
            config.exam_type,
            config.label_type,
            self.inner.len()
        )
    }
}

fn flatten(batch: crate::pipeline::Batch) -> PyBatch {
    let shape = batch.shape().to_vec();
    let (x, y) = batch.into_arrays();
    (shape, x.iter().copied().collect(), y.to_vec())
}
