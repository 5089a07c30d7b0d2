//! In-memory decision store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::decision::Decision;
use crate::domain::foundation::ProposalId;
use crate::ports::{DecisionStore, StoreError};

/// Keeps the latest decision per proposal plus a log of every save.
pub struct InMemoryDecisionStore {
    latest: RwLock<HashMap<ProposalId, Decision>>,
    saves: RwLock<Vec<Decision>>,
    failure: Option<StoreError>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(HashMap::new()),
            saves: RwLock::new(Vec::new()),
            failure: None,
        }
    }

    /// A store whose every operation fails with `error`.
    pub fn failing(error: StoreError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    /// Every decision saved, in order.
    pub async fn saved(&self) -> Vec<Decision> {
        self.saves.read().await.clone()
    }

    pub async fn save_count(&self) -> usize {
        self.saves.read().await.len()
    }
}

impl Default for InMemoryDecisionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionStore for InMemoryDecisionStore {
    async fn save(&self, decision: &Decision) -> Result<(), StoreError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.latest
            .write()
            .await
            .insert(decision.proposal_id().clone(), decision.clone());
        self.saves.write().await.push(decision.clone());
        Ok(())
    }

    async fn find(&self, proposal_id: &ProposalId) -> Result<Option<Decision>, StoreError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.latest.read().await.get(proposal_id).cloned())
    }
}
