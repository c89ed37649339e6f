use crate::error::{MrnetError, Result};
use std::fmt;

/// Dataset-level intensity statistics used by the normalize step
///
/// Defaults are the MRNet training-set statistics: slices are first
/// standardized to `[0, 255]`, then shifted by `mean` and scaled by `stddev`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct PixelStats {
    /// Upper bound of the standardized range
    pub max_pixel_value: f32,
    /// Global mean subtracted after standardization
    pub mean: f32,
    /// Global standard deviation divided out after standardization
    pub stddev: f32,
}

impl Default for PixelStats {
    fn default() -> Self {
        Self {
            max_pixel_value: 255.0,
            mean: 58.09,
            stddev: 49.73,
        }
    }
}

impl PixelStats {
    /// Creates a new PixelStats
    pub fn new(max_pixel_value: f32, mean: f32, stddev: f32) -> Self {
        Self {
            max_pixel_value,
            mean,
            stddev,
        }
    }

    /// Checks that the statistics can be applied
    pub fn validate(&self) -> Result<()> {
        if !(self.max_pixel_value.is_finite() && self.max_pixel_value > 0.0) {
            return Err(MrnetError::InvalidConfig(format!(
                "max_pixel_value must be > 0, got {}",
                self.max_pixel_value
            )));
        }
        if !self.mean.is_finite() {
            return Err(MrnetError::InvalidConfig(format!(
                "mean must be finite, got {}",
                self.mean
            )));
        }
        if !(self.stddev.is_finite() && self.stddev > 0.0) {
            return Err(MrnetError::InvalidConfig(format!(
                "stddev must be > 0, got {}",
                self.stddev
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PixelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[0, {}] -> mean {} / std {}",
            self.max_pixel_value, self.mean, self.stddev
        )
    }
}

/// What to do with a slice whose resized pixels are all equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum DegeneratePolicy {
    /// Fail the batch with `DegenerateSlice`
    #[default]
    Fail,
    /// Treat the standardized slice as all zeros
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stats() {
        let stats = PixelStats::default();
        assert_eq!(stats.max_pixel_value, 255.0);
        assert_eq!(stats.mean, 58.09);
        assert_eq!(stats.stddev, 49.73);
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn test_invalid_stats() {
        assert!(PixelStats::new(255.0, 0.0, 0.0).validate().is_err());
        assert!(PixelStats::new(0.0, 0.0, 1.0).validate().is_err());
        assert!(PixelStats::new(255.0, f32::NAN, 1.0).validate().is_err());
    }

    #[test]
    fn test_default_policy_fails() {
        assert_eq!(DegeneratePolicy::default(), DegeneratePolicy::Fail);
    }
}
