//! InvalidateDecisionHandler - drops stored decisions for a proposal.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::ProposalId;
use crate::ports::DecisionCache;

/// Command to invalidate every cached decision for a proposal.
#[derive(Debug, Clone)]
pub struct InvalidateDecisionCommand {
    pub proposal_id: ProposalId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidateDecisionResult {
    /// Entries removed across all persona fingerprints.
    pub removed: usize,
}

pub struct InvalidateDecisionHandler {
    cache: Arc<dyn DecisionCache>,
}

impl InvalidateDecisionHandler {
    pub fn new(cache: Arc<dyn DecisionCache>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, cmd: InvalidateDecisionCommand) -> InvalidateDecisionResult {
        let removed = self.cache.invalidate(&cmd.proposal_id).await;
        info!(proposal_id = %cmd.proposal_id, removed, "Decision cache invalidated");
        InvalidateDecisionResult { removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryDecisionCache;
    use crate::domain::persona::Persona;
    use crate::domain::proposal::ProposalContext;
    use crate::domain::synthesis::FallbackSynthesizer;
    use crate::ports::CacheKey;

    #[tokio::test]
    async fn removes_entries_for_proposal_only() {
        let cache = Arc::new(InMemoryDecisionCache::new());
        for id in ["7", "8"] {
            let proposal = ProposalContext::new(ProposalId::new(id).unwrap(), "Title", "Body");
            let decision = FallbackSynthesizer::synthesize(&proposal, &Persona::neutral());
            cache
                .put(CacheKey::with_persona(proposal.id.clone(), &Persona::neutral()), decision)
                .await;
        }
        let handler = InvalidateDecisionHandler::new(cache.clone());

        let result = handler
            .handle(InvalidateDecisionCommand {
                proposal_id: ProposalId::new("7").unwrap(),
            })
            .await;

        assert_eq!(result.removed, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_proposal_removes_nothing() {
        let handler = InvalidateDecisionHandler::new(Arc::new(InMemoryDecisionCache::new()));
        let result = handler
            .handle(InvalidateDecisionCommand {
                proposal_id: ProposalId::new("missing").unwrap(),
            })
            .await;
        assert_eq!(result, InvalidateDecisionResult { removed: 0 });
    }
}
