//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Completion providers and the completion gateway
//! - `clock` - System and manually driven clocks
//! - `memory` - In-memory decision cache, decision store and proposal feed
//! - `rate_limiter` - Advisory sliding-window call budget

pub mod ai;
pub mod clock;
pub mod memory;
pub mod rate_limiter;

pub use ai::{CompletionGateway, CompletionOutcome, GatewayConfig, MockAIProvider, OpenAIProvider};
pub use clock::{ManualClock, SystemClock};
pub use memory::{InMemoryDecisionCache, InMemoryDecisionStore, InMemoryProposalFeed};
pub use rate_limiter::InMemoryRateLimiter;
