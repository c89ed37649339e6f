use crate::error::{MrnetError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Binary exam label (0 = negative, 1 = positive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(into = "u8", try_from = "u8"))]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Parses a label from its integer class value
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::InvalidLabel`] for anything other than 0 or 1
    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(MrnetError::InvalidLabel(other.to_string())),
        }
    }

    /// Returns the integer class value
    pub fn value(&self) -> u8 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Label::Negative => "negative",
            Label::Positive => "positive",
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.value()
    }
}

impl TryFrom<u8> for Label {
    type Error = MrnetError;

    fn try_from(value: u8) -> Result<Self> {
        Label::from_value(value as i64)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Per-class weights driving minority-class oversampling
///
/// Both entries are always present and strictly positive; construction
/// rejects anything else.
///
/// # Example
///
/// ```
/// use mrnet_core::{ClassWeights, Label};
///
/// let weights = ClassWeights::new(1.0, 4.0).unwrap();
/// assert_eq!(weights.weight(Label::Positive), 4.0);
/// assert!(ClassWeights::new(0.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "json",
    serde(into = "BTreeMap<u8, f64>", try_from = "BTreeMap<u8, f64>")
)]
pub struct ClassWeights {
    negative: f64,
    positive: f64,
}

impl Default for ClassWeights {
    fn default() -> Self {
        Self {
            negative: 1.0,
            positive: 1.0,
        }
    }
}

impl ClassWeights {
    /// Creates weights for label 0 and label 1
    ///
    /// # Errors
    ///
    /// Returns [`MrnetError::InvalidClassWeight`] if either weight is zero,
    /// negative or not finite
    pub fn new(negative: f64, positive: f64) -> Result<Self> {
        for (label, w) in [(0, negative), (1, positive)] {
            if !w.is_finite() || w <= 0.0 {
                return Err(MrnetError::InvalidClassWeight(format!(
                    "weight for label {} must be > 0, got {}",
                    label, w
                )));
            }
        }
        if !(negative / positive).is_finite() || !(positive / negative).is_finite() {
            return Err(MrnetError::InvalidClassWeight(format!(
                "ratio of {} to {} is not representable",
                negative, positive
            )));
        }
        Ok(Self { negative, positive })
    }

    /// Builds weights from a `{0: w0, 1: w1}` mapping
    ///
    /// # Errors
    ///
    /// Fails if an entry is missing, an unknown label is present, or a
    /// weight is not strictly positive
    pub fn from_map(map: &BTreeMap<u8, f64>) -> Result<Self> {
        if let Some(extra) = map.keys().find(|k| **k > 1) {
            return Err(MrnetError::InvalidClassWeight(format!(
                "unexpected label {} in class weights",
                extra
            )));
        }
        let get = |label: u8| {
            map.get(&label).copied().ok_or_else(|| {
                MrnetError::InvalidClassWeight(format!("missing weight for label {}", label))
            })
        };
        Self::new(get(0)?, get(1)?)
    }

    /// Computes inverse-frequency weights, `n / (2 * count_c)`, for a label set
    ///
    /// # Errors
    ///
    /// Fails if either class is absent from `labels`
    pub fn balanced<I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = Label>,
    {
        let (mut negatives, mut positives) = (0usize, 0usize);
        for label in labels {
            match label {
                Label::Negative => negatives += 1,
                Label::Positive => positives += 1,
            }
        }
        if negatives == 0 || positives == 0 {
            return Err(MrnetError::InvalidClassWeight(format!(
                "cannot balance {} negative / {} positive labels",
                negatives, positives
            )));
        }
        let total = (negatives + positives) as f64;
        Self::new(
            total / (2.0 * negatives as f64),
            total / (2.0 * positives as f64),
        )
    }

    /// Returns the weight for a label
    pub fn weight(&self, label: Label) -> f64 {
        match label {
            Label::Negative => self.negative,
            Label::Positive => self.positive,
        }
    }

    /// Returns the mapping form `{0: w0, 1: w1}`
    pub fn to_map(&self) -> BTreeMap<u8, f64> {
        BTreeMap::from([(0, self.negative), (1, self.positive)])
    }
}

impl From<ClassWeights> for BTreeMap<u8, f64> {
    fn from(weights: ClassWeights) -> Self {
        weights.to_map()
    }
}

impl TryFrom<BTreeMap<u8, f64>> for ClassWeights {
    type Error = MrnetError;

    fn try_from(map: BTreeMap<u8, f64>) -> Result<Self> {
        ClassWeights::from_map(&map)
    }
}

impl fmt::Display for ClassWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{0: {}, 1: {}}}", self.negative, self.positive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_value() {
        assert_eq!(Label::from_value(0).unwrap(), Label::Negative);
        assert_eq!(Label::from_value(1).unwrap(), Label::Positive);
        assert!(matches!(
            Label::from_value(2),
            Err(MrnetError::InvalidLabel(_))
        ));
        assert!(Label::from_value(-1).is_err());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Positive.to_string(), "1");
        assert_eq!(Label::Negative.simple_name(), "negative");
    }

    #[test]
    fn test_weights_reject_non_positive() {
        assert!(matches!(
            ClassWeights::new(0.0, 1.0),
            Err(MrnetError::InvalidClassWeight(_))
        ));
        assert!(ClassWeights::new(1.0, -2.0).is_err());
        assert!(ClassWeights::new(f64::NAN, 1.0).is_err());
        assert!(ClassWeights::new(1.0, f64::INFINITY).is_err());
        assert!(matches!(
            ClassWeights::new(1e-300, 1e300),
            Err(MrnetError::InvalidClassWeight(_))
        ));
    }

    #[test]
    fn test_weights_from_map() {
        let map = BTreeMap::from([(0, 1.0), (1, 4.0)]);
        let weights = ClassWeights::from_map(&map).unwrap();
        assert_eq!(weights.weight(Label::Negative), 1.0);
        assert_eq!(weights.weight(Label::Positive), 4.0);
        assert_eq!(weights.to_map(), map);
    }

    #[test]
    fn test_weights_from_map_missing_entry() {
        let map = BTreeMap::from([(0, 1.0)]);
        assert!(matches!(
            ClassWeights::from_map(&map),
            Err(MrnetError::InvalidClassWeight(_))
        ));
    }

    #[test]
    fn test_weights_from_map_unknown_label() {
        let map = BTreeMap::from([(0, 1.0), (1, 1.0), (2, 1.0)]);
        assert!(ClassWeights::from_map(&map).is_err());
    }

    #[test]
    fn test_balanced_weights() {
        // 3 negatives, 1 positive
        let labels = [
            Label::Negative,
            Label::Negative,
            Label::Negative,
            Label::Positive,
        ];
        let weights = ClassWeights::balanced(labels).unwrap();
        assert!((weights.weight(Label::Negative) - 4.0 / 6.0).abs() < 1e-12);
        assert!((weights.weight(Label::Positive) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_requires_both_classes() {
        assert!(ClassWeights::balanced([Label::Positive, Label::Positive]).is_err());
    }

    #[test]
    fn test_default_weights() {
        let weights = ClassWeights::default();
        assert_eq!(weights.to_string(), "{0: 1, 1: 1}");
    }
}
