use std::path::PathBuf;
use thiserror::Error;

/// Result type for mrnet operations
pub type Result<T> = std::result::Result<T, MrnetError>;

/// Error types for mrnet operations
#[derive(Error, Debug)]
pub enum MrnetError {
    /// Identifier has no stored volume
    #[error("Missing exam '{id}' at {}", path.display())]
    MissingExam { id: String, path: PathBuf },

    /// Constant-valued (or non-finite) slice cannot be standardized
    #[error("Degenerate slice {index}: {reason}")]
    DegenerateSlice { index: usize, reason: String },

    /// Batch number past the end of the epoch
    #[error("Batch index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Zero, negative, non-finite or missing class weight
    #[error("Invalid class weight: {0}")]
    InvalidClassWeight(String),

    /// No label recorded for an identifier/label key pair
    #[error("No '{label_type}' label for exam '{id}'")]
    MissingLabel { id: String, label_type: String },

    /// Label value outside the binary class set
    #[error("Invalid label value: {0}")]
    InvalidLabel(String),

    /// Rejected generator configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Array shape mismatch
    #[error("Shape error: {0}")]
    ShapeError(String),

    /// NumPy array reading error
    #[error("NPY error: {0}")]
    NpyError(String),

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Label table parsing error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<ndarray::ShapeError> for MrnetError {
    fn from(e: ndarray::ShapeError) -> Self {
        MrnetError::ShapeError(format!("{}", e))
    }
}

impl From<ndarray_npy::ReadNpyError> for MrnetError {
    fn from(e: ndarray_npy::ReadNpyError) -> Self {
        MrnetError::NpyError(format!("{}", e))
    }
}

impl From<csv::Error> for MrnetError {
    fn from(e: csv::Error) -> Self {
        MrnetError::CsvError(format!("{}", e))
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for MrnetError {
    fn from(e: dicom_object::ReadError) -> Self {
        MrnetError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for MrnetError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        MrnetError::DicomError(format!("{}", e))
    }
}
