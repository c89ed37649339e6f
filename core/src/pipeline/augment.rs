use super::affine::{mirror, warp, Affine};
use super::batch::Batch;
use super::slice::ProcessedExam;
use crate::error::{MrnetError, Result};
use crate::types::{AugmentConfig, ClassWeights, Label};
use log::debug;
use ndarray::{s, Array2, Array3, Array5, ArrayView2, Axis};
use rand::Rng;

/// Expands one processed exam into a class-weighted augmented batch
#[derive(Debug, Clone, Default)]
pub struct AugmentationEngine {
    config: AugmentConfig,
}

impl AugmentationEngine {
    /// Upper bound on augmented variants per exam
    pub const MAX_ADJUSTED_COUNT: usize = 4096;

    /// Creates an engine with the given transform settings
    pub fn new(config: AugmentConfig) -> Self {
        Self { config }
    }

    /// Transform settings in use
    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    /// Number of augmented variants for an exam with `label`
    ///
    /// The class with the larger weight is boosted to
    /// `floor(w_label / w_other * (base + 1))`; the other class keeps `base`.
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::InvalidClassWeight`] if the boosted count exceeds
    /// [`Self::MAX_ADJUSTED_COUNT`]
    ///
    /// # Example
    ///
    /// ```
    /// use mrnet_core::{AugmentationEngine, ClassWeights, Label};
    ///
    /// let weights = ClassWeights::new(1.0, 4.0).unwrap();
    /// assert_eq!(AugmentationEngine::adjusted_count(Label::Negative, 2, &weights).unwrap(), 2);
    /// assert_eq!(AugmentationEngine::adjusted_count(Label::Positive, 2, &weights).unwrap(), 12);
    /// ```
    pub fn adjusted_count(label: Label, base: usize, weights: &ClassWeights) -> Result<usize> {
        let own = weights.weight(label);
        let other = match label {
            Label::Negative => weights.weight(Label::Positive),
            Label::Positive => weights.weight(Label::Negative),
        };
        let count = if own > other {
            ((own / other) * (base as f64 + 1.0)).floor()
        } else {
            base as f64
        };
        if !count.is_finite() || count > Self::MAX_ADJUSTED_COUNT as f64 {
            return Err(MrnetError::InvalidClassWeight(format!(
                "{} with base {} asks for {} variants of a label {} exam, limit is {}",
                weights,
                base,
                count,
                label,
                Self::MAX_ADJUSTED_COUNT
            )));
        }
        Ok(count as usize)
    }

    /// Stacks a single-channel slice three times along a trailing axis
    pub fn replicate_channels(slice: ArrayView2<'_, f32>) -> Array3<f32> {
        let (rows, cols) = slice.dim();
        let mut out = Array3::zeros((rows, cols, 3));
        out.assign(&slice.insert_axis(Axis(2)));
        out
    }

    /// Applies rotation, shear, shift and mirror to one slice
    ///
    /// Each enabled transform draws its own parameters from `rng`.
    pub fn augment_slice<R: Rng + ?Sized>(
        &self,
        slice: ArrayView2<'_, f32>,
        rng: &mut R,
    ) -> Array2<f32> {
        let config = &self.config;
        let (rows, cols) = slice.dim();
        let mut out = slice.to_owned();

        if config.rotation {
            let degrees = symmetric(rng, config.rotation_degrees);
            out = warp(out.view(), &Affine::rotation(degrees));
        }
        if config.shear {
            let degrees = symmetric(rng, config.shear_degrees);
            out = warp(out.view(), &Affine::shear(degrees));
        }
        if config.shift {
            let dr = symmetric(rng, config.shift_fraction) * rows as f32;
            let dc = symmetric(rng, config.shift_fraction) * cols as f32;
            out = warp(out.view(), &Affine::shift(dr, dc));
        }
        if config.flip && rng.gen::<bool>() {
            out = mirror(out.view());
        }
        out
    }

    /// Builds a batch of `1 + adjusted_count` entries from one exam
    ///
    /// Entry 0 is the channel-replicated original; every further entry
    /// augments each slice independently. All entries carry `label`.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        id: &str,
        exam: &ProcessedExam,
        label: Label,
        base_count: usize,
        weights: &ClassWeights,
        rng: &mut R,
    ) -> Result<Batch> {
        let (slices, rows, cols, channels) = exam.dim();
        if channels != 1 {
            return Err(MrnetError::ShapeError(format!(
                "expected single-channel exam, got {} channels",
                channels
            )));
        }

        let count = Self::adjusted_count(label, base_count, weights)?;
        debug!(
            "Expanding exam {} (label {}): {} augmented variants from base {}",
            id, label, count, base_count
        );

        let mut x = Array5::zeros((count + 1, slices, rows, cols, 3));
        for entry in 0..=count {
            for index in 0..slices {
                let slice = exam.slice(s![index, .., .., 0]);
                let replicated = if entry == 0 {
                    Self::replicate_channels(slice)
                } else {
                    Self::replicate_channels(self.augment_slice(slice, rng).view())
                };
                x.slice_mut(s![entry, index, .., .., ..]).assign(&replicated);
            }
        }

        Ok(Batch {
            id: id.to_string(),
            x,
            y: vec![label; count + 1],
        })
    }
}

/// Uniform draw from `[-range, range]`
fn symmetric<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    if range > 0.0 {
        rng.gen_range(-range..=range)
    } else {
        0.0
    }
}
