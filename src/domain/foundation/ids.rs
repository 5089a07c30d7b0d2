//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Identifier of a governance proposal, as issued by the upstream feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposalId(String);

impl ProposalId {
    /// Creates a new ProposalId, returning error if blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("proposal_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProposalId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProposalId> for String {
    fn from(id: ProposalId) -> Self {
        id.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_id_rejects_blank() {
        assert!(ProposalId::new("").is_err());
        assert!(ProposalId::new("   ").is_err());
    }

    #[test]
    fn proposal_id_keeps_raw_value() {
        let id = ProposalId::new("0xabc-87").unwrap();
        assert_eq!(id.as_str(), "0xabc-87");
        assert_eq!(id.to_string(), "0xabc-87");
    }

    #[test]
    fn proposal_id_serializes_transparently() {
        let id = ProposalId::new("87").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"87\"");
        assert!(serde_json::from_str::<ProposalId>("\"\"").is_err());
    }
}
