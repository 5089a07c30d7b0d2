//! In-memory adapters for the decision cache, decision store and proposal feed.
//!
//! Used by the CLI and by tests. Nothing here survives a restart.

mod decision_cache;
mod decision_store;
mod proposal_feed;

pub use decision_cache::InMemoryDecisionCache;
pub use decision_store::InMemoryDecisionStore;
pub use proposal_feed::InMemoryProposalFeed;
