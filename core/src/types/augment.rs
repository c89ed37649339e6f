use crate::error::{MrnetError, Result};

/// Settings for the four randomized geometric transforms
///
/// Transforms are applied per slice in a fixed order: rotation, shear,
/// shift, mirror. Each one can be switched off independently.
///
/// # Example
///
/// ```
/// use mrnet_core::AugmentConfig;
///
/// let config = AugmentConfig::default().with_shear(true).with_rotation_degrees(10.0);
/// assert!(config.shear);
/// assert_eq!(config.rotation_degrees, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct AugmentConfig {
    /// Apply a random rotation
    pub rotation: bool,
    /// Rotation angle drawn uniformly from `[-rotation_degrees, rotation_degrees]`
    pub rotation_degrees: f32,

    /// Apply a random shear
    pub shear: bool,
    /// Shear angle drawn uniformly from `[-shear_degrees, shear_degrees]`
    pub shear_degrees: f32,

    /// Apply a random shift
    pub shift: bool,
    /// Maximum shift as a fraction of the slice height (rows) and width (cols)
    pub shift_fraction: f32,

    /// Mirror left/right on a coin flip
    pub flip: bool,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            rotation: true,
            rotation_degrees: 25.0,
            shear: false,
            shear_degrees: 0.2,
            shift: true,
            // 25 pixels on a 256-wide slice
            shift_fraction: 25.0 / 256.0,
            flip: true,
        }
    }
}

impl AugmentConfig {
    /// Creates a config with every transform disabled
    pub fn identity() -> Self {
        Self {
            rotation: false,
            shear: false,
            shift: false,
            flip: false,
            ..Self::default()
        }
    }

    /// Builder: Enable or disable rotation
    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotation = enabled;
        self
    }

    /// Builder: Set the maximum rotation angle
    pub fn with_rotation_degrees(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Builder: Enable or disable shear
    pub fn with_shear(mut self, enabled: bool) -> Self {
        self.shear = enabled;
        self
    }

    /// Builder: Set the maximum shear angle
    pub fn with_shear_degrees(mut self, degrees: f32) -> Self {
        self.shear_degrees = degrees;
        self
    }

    /// Builder: Enable or disable shift
    pub fn with_shift(mut self, enabled: bool) -> Self {
        self.shift = enabled;
        self
    }

    /// Builder: Set the maximum shift fraction
    pub fn with_shift_fraction(mut self, fraction: f32) -> Self {
        self.shift_fraction = fraction;
        self
    }

    /// Builder: Enable or disable the random mirror
    pub fn with_flip(mut self, enabled: bool) -> Self {
        self.flip = enabled;
        self
    }

    /// Checks that every range is finite and non-negative
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("rotation_degrees", self.rotation_degrees),
            ("shear_degrees", self.shear_degrees),
            ("shift_fraction", self.shift_fraction),
        ];
        for (name, value) in ranges {
            if !value.is_finite() || value < 0.0 {
                return Err(MrnetError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.shift_fraction > 1.0 {
            return Err(MrnetError::InvalidConfig(format!(
                "shift_fraction must be <= 1, got {}",
                self.shift_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AugmentConfig::default();
        assert!(config.rotation);
        assert!(!config.shear);
        assert!(config.shift);
        assert!(config.flip);
        assert_eq!(config.rotation_degrees, 25.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_identity_config() {
        let config = AugmentConfig::identity();
        assert!(!config.rotation && !config.shear && !config.shift && !config.flip);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        assert!(AugmentConfig::default()
            .with_rotation_degrees(-1.0)
            .validate()
            .is_err());
        assert!(AugmentConfig::default()
            .with_shift_fraction(1.5)
            .validate()
            .is_err());
        assert!(AugmentConfig::default()
            .with_shear_degrees(f32::NAN)
            .validate()
            .is_err());
    }
}
