//! Rate limiting port for keeping completion spend under control.
//!
//! The budget is advisory: recording a call never blocks or refuses it. An
//! exceeded budget is reported so the caller can log it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port for call budgeting.
///
/// Implementations should be thread-safe and support concurrent access.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records one call against `key` and reports whether the budget held.
    async fn record(&self, key: RateLimitKey) -> RateLimitResult;

    /// Current status without recording a call.
    async fn status(&self, key: RateLimitKey) -> RateLimitStatus;

    /// Forget all recorded calls for a key.
    async fn reset(&self, key: RateLimitKey);
}

/// Key identifying what to budget.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    /// The scope of this budget.
    pub scope: RateLimitScope,
    /// Identifier within the scope (e.g. "completions").
    pub identifier: String,
}

/// The scope at which a budget applies.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// One budget for the whole process.
    Global,
    /// Per-resource budget (e.g. one upstream service).
    Resource,
}

impl RateLimitKey {
    /// Creates a global key.
    pub fn global() -> Self {
        Self {
            scope: RateLimitScope::Global,
            identifier: "global".to_string(),
        }
    }

    /// Creates a key for a named resource.
    pub fn resource(name: &str) -> Self {
        Self {
            scope: RateLimitScope::Resource,
            identifier: name.to_string(),
        }
    }

    /// Stable string form used as a map key.
    pub fn as_key_string(&self) -> String {
        format!("ratelimit:{}:{}", self.scope.as_str(), self.identifier)
    }
}

impl RateLimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::Global => "global",
            RateLimitScope::Resource => "resource",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of recording a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// The call fit in the budget.
    Within(RateLimitStatus),
    /// The call went over budget. It still proceeds.
    Exceeded(RateLimitStatus),
}

impl RateLimitResult {
    pub fn is_exceeded(&self) -> bool {
        matches!(self, RateLimitResult::Exceeded(_))
    }

    pub fn status(&self) -> &RateLimitStatus {
        match self {
            RateLimitResult::Within(s) | RateLimitResult::Exceeded(s) => s,
        }
    }
}

/// Current budget status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Calls allowed per window.
    pub limit: u32,
    /// Calls recorded in the current rolling window.
    pub used: u32,
    /// Window duration in seconds.
    pub window_secs: u32,
}

impl RateLimitStatus {
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}
