//! Core type definitions for the MRNet batch pipeline
//!
//! This module provides the value types shared across the library:
//! - [`Label`]: Binary exam label
//! - [`ClassWeights`]: Per-class oversampling weights
//! - [`PixelStats`]: Normalization statistics
//! - [`DegeneratePolicy`]: Handling of constant-valued slices
//! - [`AugmentConfig`]: Geometric augmentation settings
//! - [`GeneratorConfig`]: Batch generator construction options

mod augment;
mod config;
mod label;
mod pixel_stats;

pub use augment::AugmentConfig;
pub use config::GeneratorConfig;
pub use label::{ClassWeights, Label};
pub use pixel_stats::{DegeneratePolicy, PixelStats};
