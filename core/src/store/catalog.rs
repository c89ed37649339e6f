use crate::error::{MrnetError, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::Path;

/// Identifier lists per (split, exam type)
///
/// # Example
///
/// ```
/// use mrnet_core::ExamCatalog;
///
/// let mut catalog = ExamCatalog::new();
/// catalog.insert("train", "axial", vec!["0000".to_string(), "0001".to_string()]);
///
/// assert_eq!(catalog.ids("train", "axial").unwrap().len(), 2);
/// assert!(catalog.ids("valid", "axial").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamCatalog {
    ids: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ExamCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identifier list for a split and exam type
    pub fn insert(&mut self, split: impl Into<String>, exam_type: impl Into<String>, ids: Vec<String>) {
        self.ids
            .entry(split.into())
            .or_default()
            .insert(exam_type.into(), ids);
    }

    /// Returns the identifiers of a split and exam type
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::InvalidConfig`] if the combination is unknown
    pub fn ids(&self, split: &str, exam_type: &str) -> Result<&[String]> {
        self.ids
            .get(split)
            .and_then(|by_type| by_type.get(exam_type))
            .map(|ids| ids.as_slice())
            .ok_or_else(|| {
                MrnetError::InvalidConfig(format!(
                    "no exams cataloged for split '{}' and exam type '{}'",
                    split, exam_type
                ))
            })
    }

    /// Known splits
    pub fn splits(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(|s| s.as_str())
    }

    /// Known exam types of a split
    pub fn exam_types<'a>(&'a self, split: &str) -> impl Iterator<Item = &'a str> {
        self.ids
            .get(split)
            .into_iter()
            .flat_map(|by_type| by_type.keys().map(|s| s.as_str()))
    }

    /// Builds a catalog from `root/<split>/<exam_type>/<id>.<extension>`
    ///
    /// Identifiers are file stems, sorted. Files at the root (label CSVs)
    /// and files whose extension differs from `extension`, including by case,
    /// are ignored.
    pub fn scan(root: &Path, extension: &str) -> Result<Self> {
        let mut catalog = Self::new();

        for split_entry in std::fs::read_dir(root)? {
            let split_path = split_entry?.path();
            if !split_path.is_dir() {
                continue;
            }
            let Some(split) = dir_name(&split_path) else {
                continue;
            };

            for type_entry in std::fs::read_dir(&split_path)? {
                let type_path = type_entry?.path();
                if !type_path.is_dir() {
                    continue;
                }
                let Some(exam_type) = dir_name(&type_path) else {
                    continue;
                };

                let ids = collect_ids(&type_path, extension)?;
                debug!(
                    "Cataloged {} {} exams in {}",
                    ids.len(),
                    extension,
                    type_path.display()
                );
                catalog.insert(split.clone(), exam_type, ids);
            }
        }

        Ok(catalog)
    }
}

fn dir_name(path: &Path) -> Option<String> {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => Some(name.to_string()),
        None => {
            warn!("Skipping non UTF-8 directory: {}", path.display());
            None
        }
    }
}

fn collect_ids(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        // Stores open `<id>.<extension>` verbatim, so the match is exact
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => ids.push(stem.to_string()),
            None => warn!("Skipping non UTF-8 exam file: {}", path.display()),
        }
    }

    ids.sort();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn test_scan_layout() {
        let temp_dir = TempDir::new().unwrap();
        let axial = temp_dir.path().join("train").join("axial");
        let coronal = temp_dir.path().join("valid").join("coronal");
        fs::create_dir_all(&axial).unwrap();
        fs::create_dir_all(&coronal).unwrap();

        File::create(axial.join("0002.npy")).unwrap();
        File::create(axial.join("0000.npy")).unwrap();
        File::create(axial.join("0001.NPY")).unwrap();
        File::create(axial.join("notes.txt")).unwrap();
        File::create(coronal.join("1130.npy")).unwrap();
        File::create(temp_dir.path().join("train-abnormal.csv")).unwrap();

        let catalog = ExamCatalog::scan(temp_dir.path(), "npy").unwrap();

        assert_eq!(
            catalog.ids("train", "axial").unwrap(),
            &["0000".to_string(), "0002".to_string()]
        );
        assert_eq!(catalog.ids("valid", "coronal").unwrap(), &["1130".to_string()]);
        assert_eq!(catalog.splits().collect::<Vec<_>>(), vec!["train", "valid"]);
        assert_eq!(catalog.exam_types("train").collect::<Vec<_>>(), vec!["axial"]);
    }

    #[test]
    fn test_scanned_ids_load_from_store() {
        use crate::store::{ExamStore, LabelTable, NpyExamStore};
        use ndarray::Array3;
        use ndarray_npy::write_npy;

        let temp_dir = TempDir::new().unwrap();
        let axial = temp_dir.path().join("train").join("axial");
        fs::create_dir_all(&axial).unwrap();
        let exam = Array3::<u8>::ones((1, 2, 2));
        write_npy(axial.join("0000.npy"), &exam).unwrap();
        write_npy(axial.join("0001.NPY"), &exam).unwrap();

        let catalog = ExamCatalog::scan(temp_dir.path(), "npy").unwrap();
        let store = NpyExamStore::new(temp_dir.path(), LabelTable::new());

        let ids = catalog.ids("train", "axial").unwrap();
        assert_eq!(ids, &["0000".to_string()]);
        for id in ids {
            assert!(store.load("train", "axial", id).is_ok());
        }
    }

    #[test]
    fn test_scan_missing_root() {
        assert!(ExamCatalog::scan(Path::new("/nonexistent/mrnet"), "npy").is_err());
    }

    #[test]
    fn test_unknown_combination() {
        let catalog = ExamCatalog::new();
        assert!(matches!(
            catalog.ids("train", "sagittal"),
            Err(MrnetError::InvalidConfig(_))
        ));
        assert_eq!(catalog.exam_types("train").count(), 0);
    }
}
