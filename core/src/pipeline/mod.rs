//! Batch indexing, preprocessing and augmentation
//!
//! Data flows from [`BatchIndexer`] (which identifiers) through an
//! [`ExamStore`](crate::store::ExamStore) (raw volumes) and
//! [`SliceProcessor`] (normalized slices) into [`AugmentationEngine`]
//! (expanded batch). [`BatchGenerator`] ties the steps together.

pub mod affine;
mod augment;
mod batch;
mod generator;
mod indexer;
mod slice;

pub use augment::AugmentationEngine;
pub use batch::Batch;
pub use generator::{BatchGenerator, Cursor, Epoch, LoadedExam};
pub use indexer::BatchIndexer;
pub use slice::{ProcessedExam, SliceProcessor};
