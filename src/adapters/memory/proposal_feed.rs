//! In-memory proposal feed, optionally loaded from a JSON file.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;

use crate::domain::foundation::ProposalId;
use crate::domain::proposal::ProposalContext;
use crate::ports::{FeedError, ProposalFeed};

/// Proposal feed over a fixed list.
///
/// `recent` orders by voting start, newest first; proposals without a start
/// come last in insertion order.
pub struct InMemoryProposalFeed {
    proposals: RwLock<Vec<ProposalContext>>,
}

impl InMemoryProposalFeed {
    pub fn new(proposals: Vec<ProposalContext>) -> Self {
        Self {
            proposals: RwLock::new(proposals),
        }
    }

    /// Loads a JSON array of proposal records.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FeedError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, FeedError> {
        let proposals: Vec<ProposalContext> =
            serde_json::from_str(raw).map_err(|e| FeedError::InvalidRecord(e.to_string()))?;
        Ok(Self::new(proposals))
    }

    /// Adds or replaces a proposal.
    pub async fn upsert(&self, proposal: ProposalContext) {
        let mut proposals = self.proposals.write().await;
        match proposals.iter_mut().find(|p| p.id == proposal.id) {
            Some(existing) => *existing = proposal,
            None => proposals.push(proposal),
        }
    }

    pub async fn all(&self) -> Vec<ProposalContext> {
        self.proposals.read().await.clone()
    }
}

#[async_trait]
impl ProposalFeed for InMemoryProposalFeed {
    async fn fetch(&self, proposal_id: &ProposalId) -> Result<ProposalContext, FeedError> {
        self.proposals
            .read()
            .await
            .iter()
            .find(|p| &p.id == proposal_id)
            .cloned()
            .ok_or_else(|| FeedError::NotFound(proposal_id.clone()))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ProposalContext>, FeedError> {
        let mut proposals = self.proposals.read().await.clone();
        // Stable sort keeps insertion order among equal starts.
        proposals.sort_by(|a, b| b.start.cmp(&a.start));
        proposals.truncate(limit);
        Ok(proposals)
    }
}
