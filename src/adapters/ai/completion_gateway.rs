//! Completion Gateway - the only path from the pipeline to the completion service.
//!
//! Wraps an `AIProvider` with:
//! - a response cache keyed on the last messages of the conversation
//! - an advisory per-minute call budget
//! - bounded retries with linear backoff
//! - markup stripping on the returned text
//!
//! Failures never escape as errors: an exhausted or terminal failure becomes
//! `CompletionOutcome::Unavailable` and the caller falls back.
//!
//! # Example
//!
//! ```ignore
//! let gateway = CompletionGateway::new(provider, limiter, clock, GatewayConfig::default());
//! match gateway.complete(request).await {
//!     CompletionOutcome::Completed { content, .. } => parse(content),
//!     CompletionOutcome::Unavailable { reason } => fallback(reason),
//! }
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::synthesis::strip_markup;
use crate::ports::{AIProvider, Clock, CompletionRequest, RateLimitKey, RateLimiter};

use super::completion_cache::{CompletionCache, DEFAULT_KEY_MESSAGES, DEFAULT_TTL};
use super::retry_policy::RetryPolicy;

/// Budget resource name for completion calls.
pub const COMPLETIONS_RESOURCE: &str = "completions";

/// Gateway settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub cache_ttl: Duration,
    /// Trailing messages that feed the cache key.
    pub key_messages: usize,
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            key_messages: DEFAULT_KEY_MESSAGES,
            retry: RetryPolicy::default(),
        }
    }
}

/// Result of asking the gateway for a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Completion text with markup stripped.
    Completed { content: String, from_cache: bool },
    /// The service could not produce a completion.
    Unavailable { reason: String },
}

impl CompletionOutcome {
    pub fn content(&self) -> Option<&str> {
        match self {
            CompletionOutcome::Completed { content, .. } => Some(content),
            CompletionOutcome::Unavailable { .. } => None,
        }
    }
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStats {
    /// Requests sent to the provider, retries included.
    pub network_calls: u64,
    pub cache_hits: u64,
    /// Calls made while over the per-minute budget.
    pub budget_overruns: u64,
    pub retries: u64,
    /// Completions that ended `Unavailable`.
    pub failures: u64,
}

pub struct CompletionGateway {
    provider: Arc<dyn AIProvider>,
    limiter: Arc<dyn RateLimiter>,
    cache: CompletionCache,
    retry: RetryPolicy,
    stats: Mutex<GatewayStats>,
}

impl CompletionGateway {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        limiter: Arc<dyn RateLimiter>,
        clock: Arc<dyn Clock>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            provider,
            limiter,
            cache: CompletionCache::new(clock, config.cache_ttl, config.key_messages),
            retry: config.retry,
            stats: Mutex::new(GatewayStats::default()),
        }
    }

    /// Requests a completion.
    ///
    /// # Algorithm
    /// 1. Return the cached text if the conversation tail was seen within the TTL
    /// 2. Record the call against the budget, warning when over
    /// 3. Call the provider, retrying retryable errors per the policy
    /// 4. Strip markup, cache non-empty text, return it
    pub async fn complete(&self, request: CompletionRequest) -> CompletionOutcome {
        let trace_id = request.metadata.trace_id.clone();
        let key = self.cache.key_for(&request.conversation());

        if let Some(content) = self.cache.get(&key).await {
            self.stats.lock().await.cache_hits += 1;
            debug!(trace_id = %trace_id, "Completion cache hit");
            return CompletionOutcome::Completed {
                content,
                from_cache: true,
            };
        }

        let mut attempt = 1;
        loop {
            self.record_call(&trace_id).await;

            match self.provider.complete(request.clone()).await {
                Ok(response) => {
                    let content = strip_markup(&response.content);
                    if !content.trim().is_empty() {
                        self.cache.put(key, content.clone()).await;
                    }
                    debug!(
                        trace_id = %trace_id,
                        attempt,
                        completion_tokens = response.usage.completion_tokens,
                        "Completion received"
                    );
                    return CompletionOutcome::Completed {
                        content,
                        from_cache: false,
                    };
                }
                Err(err) if self.retry.should_retry(attempt, &err) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        trace_id = %trace_id,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Completion failed, retrying"
                    );
                    self.stats.lock().await.retries += 1;
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    self.stats.lock().await.failures += 1;
                    warn!(
                        trace_id = %trace_id,
                        attempts = attempt,
                        error = %err,
                        "Completion service unavailable"
                    );
                    return CompletionOutcome::Unavailable {
                        reason: err.to_string(),
                    };
                }
            }
        }
    }

    async fn record_call(&self, trace_id: &str) {
        let budget = self
            .limiter
            .record(RateLimitKey::resource(COMPLETIONS_RESOURCE))
            .await;

        let mut stats = self.stats.lock().await;
        stats.network_calls += 1;
        if budget.is_exceeded() {
            stats.budget_overruns += 1;
            let status = budget.status();
            warn!(
                trace_id = %trace_id,
                used = status.used,
                limit = status.limit,
                window_secs = status.window_secs,
                "Completion call budget exceeded, proceeding"
            );
        }
    }

    pub async fn stats(&self) -> GatewayStats {
        *self.stats.lock().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }
}
