//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port plus the gateway that every
//! completion goes through.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI-compatible chat completions endpoint
//! - `CompletionGateway` - Cache, call budget and retries around a provider

mod completion_cache;
mod completion_gateway;
mod mock_provider;
mod openai_provider;
mod retry_policy;

pub use completion_cache::{CompletionCache, DEFAULT_KEY_MESSAGES, DEFAULT_TTL};
pub use completion_gateway::{
    CompletionGateway, CompletionOutcome, GatewayConfig, GatewayStats, COMPLETIONS_RESOURCE,
};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
pub use retry_policy::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
