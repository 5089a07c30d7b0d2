//! DecisionFactor value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

pub const FACTOR_VALUE_MIN: i8 = -10;
pub const FACTOR_VALUE_MAX: i8 = 10;
pub const FACTOR_WEIGHT_MIN: u8 = 1;
pub const FACTOR_WEIGHT_MAX: u8 = 10;

/// One weighted argument for or against a proposal.
///
/// `value > 0` is a pro, `value < 0` is a con. Zero is never valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FactorRecord", into = "FactorRecord")]
pub struct DecisionFactor {
    name: String,
    value: i8,
    weight: u8,
    explanation: String,
}

/// Wire shape of a factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FactorRecord {
    name: String,
    value: i8,
    weight: u8,
    explanation: String,
}

impl DecisionFactor {
    /// Creates a factor, validating every field.
    pub fn new(
        name: impl Into<String>,
        value: i8,
        weight: u8,
        explanation: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        let explanation = explanation.into().trim().to_string();

        if name.is_empty() {
            return Err(ValidationError::empty_field("factor.name"));
        }
        if explanation.is_empty() {
            return Err(ValidationError::empty_field("factor.explanation"));
        }
        if value == 0 || !(FACTOR_VALUE_MIN..=FACTOR_VALUE_MAX).contains(&value) {
            return Err(ValidationError::out_of_range(
                "factor.value",
                i64::from(FACTOR_VALUE_MIN),
                i64::from(FACTOR_VALUE_MAX),
                i64::from(value),
            ));
        }
        if !(FACTOR_WEIGHT_MIN..=FACTOR_WEIGHT_MAX).contains(&weight) {
            return Err(ValidationError::out_of_range(
                "factor.weight",
                i64::from(FACTOR_WEIGHT_MIN),
                i64::from(FACTOR_WEIGHT_MAX),
                i64::from(weight),
            ));
        }

        Ok(Self {
            name,
            value,
            weight,
            explanation,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i8 {
        self.value
    }

    pub fn weight(&self) -> u8 {
        self.weight
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// True for arguments in favour.
    pub fn is_pro(&self) -> bool {
        self.value > 0
    }

    /// True for arguments against.
    pub fn is_con(&self) -> bool {
        self.value < 0
    }

    /// value × weight, used to rank factors.
    pub fn impact(&self) -> i32 {
        i32::from(self.value) * i32::from(self.weight)
    }
}

impl TryFrom<FactorRecord> for DecisionFactor {
    type Error = ValidationError;

    fn try_from(r: FactorRecord) -> Result<Self, Self::Error> {
        DecisionFactor::new(r.name, r.value, r.weight, r.explanation)
    }
}

impl From<DecisionFactor> for FactorRecord {
    fn from(f: DecisionFactor) -> Self {
        FactorRecord {
            name: f.name,
            value: f.value,
            weight: f.weight,
            explanation: f.explanation,
        }
    }
}

/// True when the list holds at least one pro and at least one con.
pub fn is_balanced(factors: &[DecisionFactor]) -> bool {
    factors.iter().any(DecisionFactor::is_pro) && factors.iter().any(DecisionFactor::is_con)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_valid_factor() {
        let f = DecisionFactor::new("Security", -4, 7, "Unaudited contracts").unwrap();
        assert!(f.is_con());
        assert!(!f.is_pro());
        assert_eq!(f.impact(), -28);
    }

    #[test]
    fn new_rejects_zero_value() {
        let err = DecisionFactor::new("Neutral", 0, 5, "No effect").unwrap_err();
        assert_eq!(err.field(), "factor.value");
    }

    #[test]
    fn new_rejects_out_of_range_value_and_weight() {
        assert!(DecisionFactor::new("x", 11, 5, "e").is_err());
        assert!(DecisionFactor::new("x", -11, 5, "e").is_err());
        assert!(DecisionFactor::new("x", 3, 0, "e").is_err());
        assert!(DecisionFactor::new("x", 3, 11, "e").is_err());
    }

    #[test]
    fn new_rejects_blank_text() {
        assert!(DecisionFactor::new("  ", 3, 5, "e").is_err());
        assert!(DecisionFactor::new("x", 3, 5, "").is_err());
    }

    #[test]
    fn is_balanced_requires_both_polarities() {
        let pro = DecisionFactor::new("a", 3, 5, "e").unwrap();
        let con = DecisionFactor::new("b", -3, 5, "e").unwrap();
        assert!(!is_balanced(&[pro.clone()]));
        assert!(!is_balanced(&[con.clone()]));
        assert!(is_balanced(&[pro, con]));
    }

    #[test]
    fn deserialization_validates() {
        let bad = r#"{"name":"a","value":0,"weight":5,"explanation":"e"}"#;
        assert!(serde_json::from_str::<DecisionFactor>(bad).is_err());
        let good = r#"{"name":"a","value":2,"weight":5,"explanation":"e"}"#;
        assert_eq!(serde_json::from_str::<DecisionFactor>(good).unwrap().value(), 2);
    }
}
