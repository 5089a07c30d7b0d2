//! In-memory decision cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adapters::clock::SystemClock;
use crate::domain::decision::Decision;
use crate::domain::foundation::ProposalId;
use crate::ports::{CacheEntry, CacheKey, Clock, DecisionCache};

/// Decision cache backed by a `HashMap`.
///
/// Entries never expire. `invalidate` is the only way to drop them.
pub struct InMemoryDecisionCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDecisionCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for InMemoryDecisionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionCache for InMemoryDecisionCache {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: CacheKey, decision: Decision) {
        let entry = CacheEntry {
            key: key.clone(),
            decision,
            created_at: self.clock.now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    async fn invalidate(&self, proposal_id: &ProposalId) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.proposal_id() != proposal_id);
        before - entries.len()
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
