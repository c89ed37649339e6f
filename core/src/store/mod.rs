//! Read-only access to stored exam volumes and their labels
//!
//! Exams live under `root/<split>/<exam_type>/<id>.<ext>`; labels come from a
//! preloaded [`LabelTable`]. Nothing here caches loaded volumes.

mod catalog;
mod dicom;
mod labels;
mod memory;
mod npy;

pub use catalog::ExamCatalog;
pub use dicom::DicomExamStore;
pub use labels::LabelTable;
pub use memory::InMemoryExamStore;
pub use npy::NpyExamStore;

use crate::error::{MrnetError, Result};
use crate::types::Label;
use ndarray::Array3;
use std::path::{Path, PathBuf};

/// Raw exam volume shaped `(slices, rows, cols)`
pub type RawExam = Array3<f32>;

/// Lookup interface for exam volumes and labels
pub trait ExamStore {
    /// Loads the raw volume for one exam
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::MissingExam`] if no volume is stored for `id`
    fn load(&self, split: &str, exam_type: &str, id: &str) -> Result<RawExam>;

    /// Looks up the label of `id` for the given label key
    fn label_of(&self, id: &str, label_type: &str) -> Result<Label>;
}

impl<S: ExamStore + ?Sized> ExamStore for &S {
    fn load(&self, split: &str, exam_type: &str, id: &str) -> Result<RawExam> {
        (**self).load(split, exam_type, id)
    }

    fn label_of(&self, id: &str, label_type: &str) -> Result<Label> {
        (**self).label_of(id, label_type)
    }
}

impl<S: ExamStore + ?Sized> ExamStore for Box<S> {
    fn load(&self, split: &str, exam_type: &str, id: &str) -> Result<RawExam> {
        (**self).load(split, exam_type, id)
    }

    fn label_of(&self, id: &str, label_type: &str) -> Result<Label> {
        (**self).label_of(id, label_type)
    }
}

/// Conventional location of an exam file
pub fn exam_path(root: &Path, split: &str, exam_type: &str, id: &str, extension: &str) -> PathBuf {
    root.join(split)
        .join(exam_type)
        .join(format!("{}.{}", id, extension))
}

/// Fails with `MissingExam` unless `path` is an existing file
fn require_exam_file(id: &str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MrnetError::MissingExam {
            id: id.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Rejects volumes with an empty axis
fn check_volume_shape(id: &str, exam: &RawExam) -> Result<()> {
    let (slices, rows, cols) = exam.dim();
    if slices == 0 || rows == 0 || cols == 0 {
        return Err(MrnetError::ShapeError(format!(
            "exam '{}' has empty shape {:?}",
            id,
            exam.dim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_path_layout() {
        let path = exam_path(Path::new("/data"), "train", "axial", "0001", "npy");
        assert_eq!(path, PathBuf::from("/data/train/axial/0001.npy"));
    }

    #[test]
    fn test_require_exam_file_missing() {
        let err = require_exam_file("0001", Path::new("/nonexistent/0001.npy")).unwrap_err();
        assert!(matches!(err, MrnetError::MissingExam { ref id, .. } if id == "0001"));
    }

    #[test]
    fn test_check_volume_shape() {
        assert!(check_volume_shape("a", &RawExam::zeros((2, 3, 3))).is_ok());
        assert!(check_volume_shape("a", &RawExam::zeros((0, 3, 3))).is_err());
    }
}
