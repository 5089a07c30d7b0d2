//! Decision Store Port - persistence sink for finished decisions.
//!
//! The pipeline writes every decision it returns. Failures here are logged
//! by the caller and never change the decision handed back.

use async_trait::async_trait;

use crate::domain::decision::Decision;
use crate::domain::foundation::ProposalId;

/// Errors that can occur during decision storage
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize decision: {0}")]
    SerializationFailed(String),

    #[error("Decision for proposal {proposal_id} rejected: {reason}")]
    Rejected {
        proposal_id: ProposalId,
        reason: String,
    },
}

/// Port for persisting decisions
#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Save a decision together with its factors
    ///
    /// # Errors
    /// Returns `StoreError` if the write fails
    async fn save(&self, decision: &Decision) -> Result<(), StoreError>;

    /// Latest decision saved for a proposal
    async fn find(&self, proposal_id: &ProposalId) -> Result<Option<Decision>, StoreError>;
}
