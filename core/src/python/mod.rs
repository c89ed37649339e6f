//! Python bindings for mrnet
//!
//! This module provides PyO3 bindings enabling Keras training loops to pull
//! augmented MRNet batches from Rust.

// Suppress false positive warnings from PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod errors;
mod generator;

pub use errors::*;
pub use generator::*;

/// Python module definition
#[pymodule]
fn _mrnet(py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Register exception classes
    m.add("MrnetError", py.get_type_bound::<errors::PyMrnetError>())?;
    m.add(
        "MissingExamError",
        py.get_type_bound::<errors::PyMissingExamError>(),
    )?;
    m.add(
        "DegenerateSliceError",
        py.get_type_bound::<errors::PyDegenerateSliceError>(),
    )?;
    m.add("ConfigError", py.get_type_bound::<errors::PyConfigError>())?;
    m.add("ReadError", py.get_type_bound::<errors::PyReadError>())?;

    m.add_class::<PyDataGenerator>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
