use super::{check_volume_shape, exam_path, require_exam_file, ExamStore, LabelTable, RawExam};
use crate::error::Result;
use crate::types::Label;
use log::debug;
use ndarray::Array3;
use ndarray_npy::{read_npy, ReadNpyError, ReadableElement};
use std::path::{Path, PathBuf};

/// Exam store backed by one `.npy` array per exam
///
/// Each file holds a `(slices, rows, cols)` array of `u8`, `i16`, `u16`,
/// `f32` or `f64` intensities; values are widened to `f32`.
#[derive(Debug, Clone)]
pub struct NpyExamStore {
    root: PathBuf,
    labels: LabelTable,
}

impl NpyExamStore {
    pub const EXTENSION: &'static str = "npy";

    /// Creates a store rooted at `root` with preloaded labels
    pub fn new(root: impl Into<PathBuf>, labels: LabelTable) -> Self {
        Self {
            root: root.into(),
            labels,
        }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Labels known to the store
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
}

impl ExamStore for NpyExamStore {
    fn load(&self, split: &str, exam_type: &str, id: &str) -> Result<RawExam> {
        let path = exam_path(&self.root, split, exam_type, id, Self::EXTENSION);
        require_exam_file(id, &path)?;

        let exam = read_volume(&path)?;
        check_volume_shape(id, &exam)?;
        debug!("Loaded {} with shape {:?}", path.display(), exam.dim());
        Ok(exam)
    }

    fn label_of(&self, id: &str, label_type: &str) -> Result<Label> {
        self.labels.get(id, label_type)
    }
}

/// Reads a 3-D array of any supported dtype as `f32`
pub fn read_volume(path: &Path) -> Result<RawExam> {
    if let Some(exam) = try_read::<u8>(path, f32::from)? {
        return Ok(exam);
    }
    if let Some(exam) = try_read::<i16>(path, f32::from)? {
        return Ok(exam);
    }
    if let Some(exam) = try_read::<u16>(path, f32::from)? {
        return Ok(exam);
    }
    if let Some(exam) = try_read::<f32>(path, |v| v)? {
        return Ok(exam);
    }
    // Last candidate: a dtype mismatch here is a real error
    let exam: Array3<f64> = read_npy(path)?;
    Ok(exam.mapv(|v| v as f32))
}

/// Returns `None` when the stored dtype is not `T`
fn try_read<T>(path: &Path, widen: fn(T) -> f32) -> Result<Option<RawExam>>
where
    T: ReadableElement + Clone,
{
    match read_npy::<_, Array3<T>>(path) {
        Ok(exam) => Ok(Some(exam.mapv(widen))),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
