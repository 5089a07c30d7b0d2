//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Completion Ports
//!
//! - `AIProvider` - Chat completion service
//! - `RateLimiter` - Advisory call budget
//!
//! ## Decision Ports
//!
//! - `DecisionCache` - One stored decision per proposal/persona key
//! - `DecisionStore` - Persistence sink for finished decisions
//! - `ProposalFeed` - Upstream proposal source
//!
//! ## Infrastructure
//!
//! - `Clock` - Injectable time source

mod ai_provider;
mod clock;
mod decision_cache;
mod decision_store;
mod proposal_feed;
mod rate_limiter;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use clock::Clock;
pub use decision_cache::{CacheEntry, CacheKey, DecisionCache};
pub use decision_store::{DecisionStore, StoreError};
pub use proposal_feed::{FeedError, ProposalFeed};
pub use rate_limiter::{
    RateLimitKey, RateLimitResult, RateLimitScope, RateLimitStatus, RateLimiter,
};
