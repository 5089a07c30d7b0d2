//! Decision Cache Port - stored decisions keyed by proposal and persona.
//!
//! At most one decision is stored per key. Entries are replaced wholesale
//! and never expire; they live until invalidated.

use async_trait::async_trait;
use std::fmt;

use crate::domain::decision::Decision;
use crate::domain::foundation::{ProposalId, Timestamp};
use crate::domain::persona::Persona;

/// Cache key: a proposal id, optionally scoped to a persona fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    proposal_id: ProposalId,
    fingerprint: Option<String>,
}

impl CacheKey {
    /// Key shared by every persona.
    pub fn proposal(proposal_id: ProposalId) -> Self {
        Self {
            proposal_id,
            fingerprint: None,
        }
    }

    /// Key scoped to one persona.
    pub fn with_persona(proposal_id: ProposalId, persona: &Persona) -> Self {
        Self {
            proposal_id,
            fingerprint: Some(persona.fingerprint()),
        }
    }

    pub fn proposal_id(&self) -> &ProposalId {
        &self.proposal_id
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fingerprint {
            Some(fp) => write!(f, "{}:{}", self.proposal_id.as_str(), fp),
            None => write!(f, "{}", self.proposal_id.as_str()),
        }
    }
}

/// A stored decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub decision: Decision,
    pub created_at: Timestamp,
}

/// Port for the decision cache.
#[async_trait]
pub trait DecisionCache: Send + Sync {
    /// Looks up a stored decision.
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Stores a decision, replacing any previous entry for the key.
    async fn put(&self, key: CacheKey, decision: Decision);

    /// Drops every entry for a proposal, across all persona fingerprints.
    ///
    /// Returns the number of entries removed.
    async fn invalidate(&self, proposal_id: &ProposalId) -> usize;

    /// Number of stored entries.
    async fn len(&self) -> usize;
}
