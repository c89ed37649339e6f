//! Python exception types for mrnet
//!
//! This module defines Python exception classes that map to Rust error types.

// Suppress warnings from PyO3's create_exception! macro about gil-refs feature
#![allow(unexpected_cfgs)]

use crate::error::MrnetError;
use pyo3::{
    create_exception,
    exceptions::{PyException, PyIndexError},
    prelude::*,
};

// Base exception
create_exception!(
    mrnet,
    PyMrnetError,
    PyException,
    "Base exception for all mrnet errors"
);

create_exception!(
    mrnet,
    PyMissingExamError,
    PyMrnetError,
    "Exam volume or label not found"
);

create_exception!(
    mrnet,
    PyDegenerateSliceError,
    PyMrnetError,
    "Slice cannot be standardized"
);

create_exception!(
    mrnet,
    PyConfigError,
    PyMrnetError,
    "Invalid generator configuration or class weights"
);

create_exception!(
    mrnet,
    PyReadError,
    PyMrnetError,
    "Exam or label file could not be read"
);

/// Convert Rust MrnetError to appropriate Python exception
pub fn convert_error(err: MrnetError) -> PyErr {
    let msg = err.to_string();
    match err {
        MrnetError::IndexOutOfRange { .. } => PyIndexError::new_err(msg),
        MrnetError::MissingExam { .. } | MrnetError::MissingLabel { .. } => {
            PyMissingExamError::new_err(msg)
        }
        MrnetError::DegenerateSlice { .. } => PyDegenerateSliceError::new_err(msg),
        MrnetError::InvalidClassWeight(_)
        | MrnetError::InvalidConfig(_)
        | MrnetError::InvalidLabel(_) => PyConfigError::new_err(msg),
        MrnetError::ShapeError(_)
        | MrnetError::NpyError(_)
        | MrnetError::DicomError(_)
        | MrnetError::CsvError(_)
        | MrnetError::IoError(_) => PyReadError::new_err(msg),
    }
}
