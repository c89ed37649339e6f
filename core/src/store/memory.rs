use super::{check_volume_shape, ExamStore, LabelTable, RawExam};
use crate::error::{MrnetError, Result};
use crate::types::Label;
use std::collections::HashMap;
use std::path::PathBuf;

/// Exam store holding volumes in memory
///
/// Useful for tests and for callers that already decoded their exams.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExamStore {
    exams: HashMap<(String, String, String), RawExam>,
    labels: LabelTable,
}

impl InMemoryExamStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with preloaded labels
    pub fn with_labels(labels: LabelTable) -> Self {
        Self {
            exams: HashMap::new(),
            labels,
        }
    }

    /// Adds an exam volume
    ///
    /// # Errors
    ///
    /// Rejects volumes with an empty axis
    pub fn insert(&mut self, split: &str, exam_type: &str, id: &str, exam: RawExam) -> Result<()> {
        check_volume_shape(id, &exam)?;
        self.exams
            .insert((split.to_string(), exam_type.to_string(), id.to_string()), exam);
        Ok(())
    }

    /// Mutable access to the label table
    pub fn labels_mut(&mut self) -> &mut LabelTable {
        &mut self.labels
    }

    /// Number of stored exams
    pub fn len(&self) -> usize {
        self.exams.len()
    }

    /// Returns whether no exams are stored
    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }
}

impl ExamStore for InMemoryExamStore {
    fn load(&self, split: &str, exam_type: &str, id: &str) -> Result<RawExam> {
        self.exams
            .get(&(split.to_string(), exam_type.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| MrnetError::MissingExam {
                id: id.to_string(),
                path: PathBuf::from(split).join(exam_type).join(id),
            })
    }

    fn label_of(&self, id: &str, label_type: &str) -> Result<Label> {
        self.labels.get(id, label_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_load() {
        let mut store = InMemoryExamStore::new();
        store
            .insert("train", "axial", "0000", RawExam::ones((3, 4, 4)))
            .unwrap();
        store
            .labels_mut()
            .insert("0000", "abnormal", Label::Negative);

        assert_eq!(store.len(), 1);
        assert_eq!(store.load("train", "axial", "0000").unwrap().dim(), (3, 4, 4));
        assert_eq!(store.label_of("0000", "abnormal").unwrap(), Label::Negative);
    }

    #[test]
    fn test_missing_exam() {
        let store = InMemoryExamStore::new();
        let err = store.load("train", "axial", "0009").unwrap_err();
        assert!(matches!(err, MrnetError::MissingExam { ref id, .. } if id == "0009"));
    }

    #[test]
    fn test_reject_empty_volume() {
        let mut store = InMemoryExamStore::new();
        assert!(store
            .insert("train", "axial", "0000", RawExam::zeros((1, 0, 4)))
            .is_err());
        assert!(store.is_empty());
    }
}
