use crate::error::Result;
use crate::pipeline::{Batch, BatchGenerator};
use crate::store::ExamStore;
use crate::types::{ClassWeights, Label};
use rand::Rng;
use std::fmt;
use std::path::PathBuf;

/// Dataset-level facts about a generator
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct DatasetSummary {
    pub root: PathBuf,
    pub split: String,
    pub exam_type: String,
    pub label_type: String,
    pub model: String,
    pub exams: usize,
    pub batches: usize,
    pub batch_size: usize,
    pub aug_size: usize,
    pub positives: usize,
    pub negatives: usize,
    pub class_weight: ClassWeights,
    pub scale_to: (u32, u32),
}

impl DatasetSummary {
    /// Collects the summary, looking up the label of every cataloged exam
    pub fn from_generator<S, R>(root: PathBuf, generator: &BatchGenerator<S, R>) -> Result<Self>
    where
        S: ExamStore,
        R: Rng,
    {
        let config = generator.config();
        let ids = generator.indexer().ids();

        let mut positives = 0;
        for id in ids {
            if generator.store().label_of(id, &config.label_type)? == Label::Positive {
                positives += 1;
            }
        }

        Ok(Self {
            root,
            split: config.data_type.clone(),
            exam_type: config.exam_type.clone(),
            label_type: config.label_type.clone(),
            model: config.model.clone(),
            exams: ids.len(),
            batches: generator.len(),
            batch_size: config.batch_size,
            aug_size: config.aug_size,
            positives,
            negatives: ids.len() - positives,
            class_weight: config.class_weight,
            scale_to: config.scale_to,
        })
    }
}

/// Shape and value statistics of one generated batch
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BatchSummary {
    pub index: usize,
    pub id: String,
    pub shape: Vec<usize>,
    pub labels: Vec<u8>,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl BatchSummary {
    /// Summarizes batch number `index`
    pub fn new(index: usize, batch: &Batch) -> Self {
        let (min, max) = batch
            .x
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            index,
            id: batch.id.clone(),
            shape: batch.shape().to_vec(),
            labels: batch.labels().to_vec(),
            min,
            max,
            mean: batch.x.mean().unwrap_or(0.0),
        }
    }
}

/// Text report formatter for a dataset and an optional batch
pub struct TextReport<'a> {
    summary: &'a DatasetSummary,
    batch: Option<&'a BatchSummary>,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(summary: &'a DatasetSummary, batch: Option<&'a BatchSummary>) -> Self {
        Self { summary, batch }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        writeln!(f, "MRNet Data Generator")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        writeln!(f, "Data Path:      {}", s.root.join(&s.split).display())?;
        writeln!(f, "Model:          {}", s.model)?;
        writeln!(f, "Combination:    {} and {}", s.label_type, s.exam_type)?;
        writeln!(
            f,
            "Exams:          {} ({} positive, {} negative)",
            s.exams, s.positives, s.negatives
        )?;
        writeln!(f, "Batch Size:     {}", s.batch_size)?;
        writeln!(f, "Batches:        {}", s.batches)?;
        writeln!(f, "Aug Size:       {}", s.aug_size)?;
        writeln!(f, "Class Weight:   {}", s.class_weight)?;
        writeln!(f, "Input Size:     {}x{}", s.scale_to.0, s.scale_to.1)?;

        if let Some(batch) = self.batch {
            writeln!(f)?;
            writeln!(f, "Batch {}", batch.index)?;
            writeln!(f, "--------")?;
            writeln!(f, "Exam:           {}", batch.id)?;
            writeln!(f, "Shape:          {:?}", batch.shape)?;
            writeln!(f, "Labels:         {:?}", batch.labels)?;
            writeln!(
                f,
                "Values:         min {:.3}, max {:.3}, mean {:.3}",
                batch.min, batch.max, batch.mean
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array5;

    fn summary() -> DatasetSummary {
        DatasetSummary {
            root: PathBuf::from("/data"),
            split: "train".to_string(),
            exam_type: "axial".to_string(),
            label_type: "abnormal".to_string(),
            model: "vgg".to_string(),
            exams: 10,
            batches: 10,
            batch_size: 1,
            aug_size: 2,
            positives: 8,
            negatives: 2,
            class_weight: ClassWeights::default(),
            scale_to: (256, 256),
        }
    }

    #[test]
    fn test_text_report_format() {
        let summary = summary();
        let output = format!("{}", TextReport::new(&summary, None));

        assert!(output.contains("MRNet Data Generator"));
        assert!(output.contains("Combination:    abnormal and axial"));
        assert!(output.contains("Exams:          10 (8 positive, 2 negative)"));
        assert!(output.contains("Input Size:     256x256"));
        assert!(!output.contains("Batch 0"));
    }

    #[test]
    fn test_batch_summary() {
        let mut x = Array5::zeros((3, 1, 2, 2, 3));
        x[[0, 0, 0, 0, 0]] = -1.0;
        x[[2, 0, 1, 1, 2]] = 5.0;
        let batch = Batch {
            id: "0007".to_string(),
            x,
            y: vec![Label::Negative; 3],
        };

        let batch_summary = BatchSummary::new(4, &batch);
        assert_eq!(batch_summary.shape, vec![3, 1, 2, 2, 3]);
        assert_eq!(batch_summary.labels, vec![0, 0, 0]);
        assert_eq!(batch_summary.min, -1.0);
        assert_eq!(batch_summary.max, 5.0);

        let summary = summary();
        let output = format!("{}", TextReport::new(&summary, Some(&batch_summary)));
        assert!(output.contains("Batch 4"));
        assert!(output.contains("Exam:           0007"));
        assert!(output.contains("Shape:          [3, 1, 2, 2, 3]"));
    }
}
