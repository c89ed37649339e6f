pub mod report;

use crate::types::GeneratorConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for mrnet
#[derive(Parser, Debug)]
#[command(name = "mrnet")]
#[command(about = "Inspect MRNet exams and generated training batches")]
#[command(version)]
pub struct Cli {
    /// Dataset root holding <split>/<exam type>/ directories and label CSVs
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Data split [default: train]
    #[arg(long)]
    pub split: Option<String>,

    /// Exam plane [default: axial]
    #[arg(short, long)]
    pub exam_type: Option<String>,

    /// Label key [default: abnormal]
    #[arg(short, long)]
    pub label_type: Option<String>,

    /// Exams loaded per batch [default: 1]
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Base number of augmented variants per exam [default: 1]
    #[arg(short, long)]
    pub aug_size: Option<usize>,

    /// Target slice width and height [default: 256]
    #[arg(long)]
    pub size: Option<u32>,

    /// Generate and describe this batch number
    #[arg(short = 'n', long)]
    pub batch: Option<usize>,

    /// Keep catalog order instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,

    /// Derive class weights from the split's label frequencies
    #[arg(long)]
    pub balanced: bool,

    /// Seed for shuffling and augmentation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Storage format of the exams
    #[arg(long, default_value = "npy")]
    pub store: StoreFormat,

    /// JSON generator config; command-line selectors override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Applies the options given on the command line on top of `base`
    ///
    /// Options left out keep the value from `base`.
    pub fn apply(&self, base: GeneratorConfig) -> GeneratorConfig {
        let mut config = base;
        if let Some(split) = &self.split {
            config = config.with_data_type(split.as_str());
        }
        if let Some(exam_type) = &self.exam_type {
            config = config.with_exam_type(exam_type.as_str());
        }
        if let Some(label_type) = &self.label_type {
            config = config.with_label_type(label_type.as_str());
        }
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        if let Some(aug_size) = self.aug_size {
            config = config.with_aug_size(aug_size);
        }
        if let Some(size) = self.size {
            config = config.with_scale_to(size, size);
        }
        if self.no_shuffle {
            config = config.with_shuffle(false);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

/// Exam storage formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreFormat {
    /// One .npy array per exam
    Npy,
    /// One multi-frame .dcm file per exam
    Dicom,
}

impl StoreFormat {
    /// File extension of stored exams
    pub fn extension(&self) -> &'static str {
        match self {
            StoreFormat::Npy => "npy",
            StoreFormat::Dicom => "dcm",
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["mrnet", "/data/MRNet-v1.0"]).unwrap();
        assert!(cli.split.is_none());
        assert!(cli.exam_type.is_none());
        assert_eq!(cli.store, StoreFormat::Npy);
        assert!(cli.batch.is_none());

        let config = cli.apply(GeneratorConfig::default());
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.data_type, "train");
        assert_eq!(config.exam_type, "axial");
        assert_eq!(config.scale_to, (256, 256));
        assert!(config.shuffle);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_unset_options_keep_base_config() {
        let cli = Cli::try_parse_from(["mrnet", "/data"]).unwrap();
        let base = GeneratorConfig::default()
            .with_exam_type("coronal")
            .with_data_type("valid")
            .with_label_type("meniscus")
            .with_aug_size(5)
            .with_batch_size(3)
            .with_scale_to(128, 128);

        let config = cli.apply(base.clone());
        assert_eq!(config.exam_type, "coronal");
        assert_eq!(config.data_type, "valid");
        assert_eq!(config.aug_size, 5);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.scale_to, (128, 128));
        assert_eq!(config, base);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_config_file_survives_default_options() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("generator.json");
        std::fs::write(
            &path,
            r#"{"exam_type": "coronal", "data_type": "valid", "aug_size": 5, "batch_size": 3, "scale_to": [128, 128]}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from(["mrnet", "/data", "--config", path.to_str().unwrap()])
            .unwrap();
        let config = cli.apply(GeneratorConfig::from_json_file(&path).unwrap());

        assert_eq!(config.exam_type, "coronal");
        assert_eq!(config.data_type, "valid");
        assert_eq!(config.aug_size, 5);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.scale_to, (128, 128));
    }

    #[test]
    fn test_given_options_override_base_config() {
        let cli = Cli::try_parse_from(["mrnet", "/data", "-e", "sagittal", "-a", "2"]).unwrap();
        let base = GeneratorConfig::default()
            .with_exam_type("coronal")
            .with_batch_size(3);

        let config = cli.apply(base);
        assert_eq!(config.exam_type, "sagittal");
        assert_eq!(config.aug_size, 2);
        assert_eq!(config.batch_size, 3);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "mrnet",
            "/data",
            "--split",
            "valid",
            "-e",
            "coronal",
            "-l",
            "acl",
            "-n",
            "3",
            "--no-shuffle",
            "--seed",
            "5",
            "--size",
            "128",
            "--store",
            "dicom",
        ])
        .unwrap();

        assert_eq!(cli.batch, Some(3));
        assert_eq!(cli.store.extension(), "dcm");

        let config = cli.apply(GeneratorConfig::default().with_model("resnet"));
        assert_eq!(config.data_type, "valid");
        assert_eq!(config.exam_type, "coronal");
        assert_eq!(config.label_type, "acl");
        assert_eq!(config.scale_to, (128, 128));
        assert_eq!(config.model, "resnet");
        assert!(!config.shuffle);
        assert_eq!(config.seed, Some(5));
    }
}
