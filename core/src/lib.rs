//! Batch supply for MRNet knee MRI classifiers
//!
//! Stored exam volumes are resampled, standardized and expanded into
//! class-weighted augmented batches. See [`BatchGenerator`].

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use cli::report::TextReport;
pub use error::{MrnetError, Result};
pub use pipeline::{
    AugmentationEngine, Batch, BatchGenerator, BatchIndexer, Cursor, Epoch, LoadedExam,
    ProcessedExam, SliceProcessor,
};
pub use store::{
    DicomExamStore, ExamCatalog, ExamStore, InMemoryExamStore, LabelTable, NpyExamStore, RawExam,
};
pub use types::*;
