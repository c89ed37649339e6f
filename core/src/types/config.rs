use crate::error::{MrnetError, Result};
use crate::types::{AugmentConfig, ClassWeights, DegeneratePolicy, PixelStats};

/// Construction options for a batch generator
///
/// `batch_size` is the number of exams loaded per batch index; `aug_size` and
/// `class_weight` decide how many augmented variants each expanded exam
/// produces. The two are independent knobs.
///
/// # Example
///
/// ```
/// use mrnet_core::GeneratorConfig;
///
/// let config = GeneratorConfig::default()
///     .with_exam_type("sagittal")
///     .with_label_type("acl")
///     .with_aug_size(3)
///     .with_shuffle(false);
///
/// assert_eq!(config.exam_type, "sagittal");
/// assert_eq!(config.scale_to, (256, 256));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct GeneratorConfig {
    /// Target slice size as (width, height)
    pub scale_to: (u32, u32),

    /// Label key looked up per exam (e.g. "abnormal", "acl", "meniscus")
    pub label_type: String,

    /// Exam plane (e.g. "axial", "coronal", "sagittal")
    pub exam_type: String,

    /// Data split (e.g. "train", "valid")
    pub data_type: String,

    /// Name of the consuming model, informational only
    pub model: String,

    /// Exams loaded per batch index
    pub batch_size: usize,

    /// Reshuffle identifiers at each epoch boundary
    pub shuffle: bool,

    /// Base number of augmented variants per expanded exam
    pub aug_size: usize,

    /// Oversampling weights per label
    pub class_weight: ClassWeights,

    /// Normalization statistics
    pub pixel_stats: PixelStats,

    /// Handling of constant-valued slices
    pub degenerate_policy: DegeneratePolicy,

    /// Geometric augmentation settings
    pub augment: AugmentConfig,

    /// Seed for shuffling and augmentation; entropy-seeded when `None`
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            scale_to: (256, 256),
            label_type: "abnormal".to_string(),
            exam_type: "axial".to_string(),
            data_type: "train".to_string(),
            model: "vgg".to_string(),
            batch_size: 1,
            shuffle: true,
            aug_size: 1,
            class_weight: ClassWeights::default(),
            pixel_stats: PixelStats::default(),
            degenerate_policy: DegeneratePolicy::default(),
            augment: AugmentConfig::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Loads a config from a JSON file; missing fields take their defaults
    #[cfg(feature = "json")]
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| MrnetError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: Set target slice size (width, height)
    pub fn with_scale_to(mut self, width: u32, height: u32) -> Self {
        self.scale_to = (width, height);
        self
    }

    /// Builder: Set label key
    pub fn with_label_type(mut self, label_type: impl Into<String>) -> Self {
        self.label_type = label_type.into();
        self
    }

    /// Builder: Set exam plane
    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = exam_type.into();
        self
    }

    /// Builder: Set data split
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Builder: Set model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: Set exams loaded per batch
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder: Enable or disable epoch shuffling
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Builder: Set base augmentation count
    pub fn with_aug_size(mut self, aug_size: usize) -> Self {
        self.aug_size = aug_size;
        self
    }

    /// Builder: Set class weights
    pub fn with_class_weight(mut self, class_weight: ClassWeights) -> Self {
        self.class_weight = class_weight;
        self
    }

    /// Builder: Set normalization statistics
    pub fn with_pixel_stats(mut self, pixel_stats: PixelStats) -> Self {
        self.pixel_stats = pixel_stats;
        self
    }

    /// Builder: Set degenerate slice handling
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Builder: Set augmentation settings
    pub fn with_augment(mut self, augment: AugmentConfig) -> Self {
        self.augment = augment;
        self
    }

    /// Builder: Set RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the config before a generator is built from it
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(MrnetError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.scale_to.0 == 0 || self.scale_to.1 == 0 {
            return Err(MrnetError::InvalidConfig(format!(
                "scale_to must be non-zero, got {:?}",
                self.scale_to
            )));
        }
        for (name, value) in [
            ("label_type", &self.label_type),
            ("exam_type", &self.exam_type),
            ("data_type", &self.data_type),
        ] {
            if value.trim().is_empty() {
                return Err(MrnetError::InvalidConfig(format!("{} is empty", name)));
            }
        }
        self.pixel_stats.validate()?;
        self.augment.validate()
    }
}
