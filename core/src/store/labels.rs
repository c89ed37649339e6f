use crate::error::{MrnetError, Result};
use crate::types::Label;
use log::debug;
use std::collections::HashMap;
use std::path::Path;

/// Preloaded labels keyed by exam identifier, then by label key
///
/// # Example
///
/// ```
/// use mrnet_core::{Label, LabelTable};
///
/// let mut labels = LabelTable::new();
/// labels.insert("0000", "abnormal", Label::Positive);
/// labels.insert("0000", "acl", Label::Negative);
///
/// assert_eq!(labels.get("0000", "abnormal").unwrap(), Label::Positive);
/// assert!(labels.get("0000", "meniscus").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    labels: HashMap<String, HashMap<String, Label>>,
}

impl LabelTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the label of `id` for `label_type`, replacing any previous value
    pub fn insert(&mut self, id: impl Into<String>, label_type: impl Into<String>, label: Label) {
        self.labels
            .entry(id.into())
            .or_default()
            .insert(label_type.into(), label);
    }

    /// Looks up the label of `id` for `label_type`
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::MissingLabel`] if no such label was loaded
    pub fn get(&self, id: &str, label_type: &str) -> Result<Label> {
        self.labels
            .get(id)
            .and_then(|by_type| by_type.get(label_type))
            .copied()
            .ok_or_else(|| MrnetError::MissingLabel {
                id: id.to_string(),
                label_type: label_type.to_string(),
            })
    }

    /// Looks up `label_type` for every identifier in order
    pub fn labels_for<S: AsRef<str>>(&self, ids: &[S], label_type: &str) -> Result<Vec<Label>> {
        ids.iter().map(|id| self.get(id.as_ref(), label_type)).collect()
    }

    /// Number of identifiers with at least one label
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns whether the table holds no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Reads one label CSV (`id,label` rows, no header) into the table
    ///
    /// Purely numeric identifiers shorter than four digits are zero-padded,
    /// so `7` and `0007` name the same exam.
    pub fn read_csv(&mut self, path: &Path, label_type: &str) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut count = 0;
        for record in reader.records() {
            let record = record?;
            let (id, value) = match (record.get(0), record.get(1)) {
                (Some(id), Some(value)) if !id.is_empty() => (id, value),
                _ => {
                    return Err(MrnetError::CsvError(format!(
                        "{}: malformed row {:?}",
                        path.display(),
                        record
                    )))
                }
            };
            let value: i64 = value.parse().map_err(|_| {
                MrnetError::InvalidLabel(format!("'{}' for exam '{}'", value, id))
            })?;
            self.insert(normalize_id(id), label_type, Label::from_value(value)?);
            count += 1;
        }

        debug!(
            "Loaded {} '{}' labels from {}",
            count,
            label_type,
            path.display()
        );
        Ok(count)
    }

    /// Loads `<dir>/<split>-<label_type>.csv` for each label type
    pub fn from_csv_dir<S: AsRef<str>>(dir: &Path, split: &str, label_types: &[S]) -> Result<Self> {
        let mut table = Self::new();
        for label_type in label_types {
            let label_type = label_type.as_ref();
            let path = dir.join(format!("{}-{}.csv", split, label_type));
            table.read_csv(&path, label_type)?;
        }
        Ok(table)
    }
}

fn normalize_id(id: &str) -> String {
    if id.len() < 4 && id.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>4}", id)
    } else {
        id.to_string()
    }
}
