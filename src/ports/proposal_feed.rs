//! Proposal Feed Port - read-only source of governance proposals.

use async_trait::async_trait;

use crate::domain::foundation::ProposalId;
use crate::domain::proposal::ProposalContext;

/// Errors that can occur while reading the feed
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("Proposal not found: {0}")]
    NotFound(ProposalId),

    #[error("Feed unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid proposal record: {0}")]
    InvalidRecord(String),
}

/// Port for fetching proposals
#[async_trait]
pub trait ProposalFeed: Send + Sync {
    /// Fetch one proposal by id
    async fn fetch(&self, proposal_id: &ProposalId) -> Result<ProposalContext, FeedError>;

    /// Most recent proposals, newest first, at most `limit`
    async fn recent(&self, limit: usize) -> Result<Vec<ProposalContext>, FeedError>;
}
