//! In-memory call budget using a sliding window.
//!
//! Each key keeps the timestamps of its recent calls; entries older than the
//! window are pruned on every access. Single-process only.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adapters::clock::SystemClock;
use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter};

use super::config::{RateLimitConfig, WindowLimits};

/// Sliding-window call budget.
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    /// Recent call times per key, oldest first.
    windows: RwLock<HashMap<String, VecDeque<Timestamp>>>,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    fn limits_for(&self, key: &RateLimitKey) -> WindowLimits {
        self.config.limits_for(&key.identifier)
    }

    /// Drops calls that fell out of the window ending at `now`.
    fn prune(calls: &mut VecDeque<Timestamp>, now: &Timestamp, window_secs: u32) {
        let window = chrono::Duration::seconds(i64::from(window_secs));
        while let Some(oldest) = calls.front() {
            if now.duration_since(oldest) >= window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn record(&self, key: RateLimitKey) -> RateLimitResult {
        let limits = self.limits_for(&key);
        let now = self.clock.now();

        let mut windows = self.windows.write().await;
        let calls = windows.entry(key.as_key_string()).or_default();
        Self::prune(calls, &now, limits.window_secs);
        calls.push_back(now);

        let status = RateLimitStatus {
            limit: limits.calls_per_window,
            used: calls.len() as u32,
            window_secs: limits.window_secs,
        };

        if status.used > status.limit {
            RateLimitResult::Exceeded(status)
        } else {
            RateLimitResult::Within(status)
        }
    }

    async fn status(&self, key: RateLimitKey) -> RateLimitStatus {
        let limits = self.limits_for(&key);
        let now = self.clock.now();
        let window = chrono::Duration::seconds(i64::from(limits.window_secs));

        let windows = self.windows.read().await;
        let used = windows
            .get(&key.as_key_string())
            .map(|calls| {
                calls
                    .iter()
                    .filter(|t| now.duration_since(t) < window)
                    .count()
            })
            .unwrap_or(0);

        RateLimitStatus {
            limit: limits.calls_per_window,
            used: used as u32,
            window_secs: limits.window_secs,
        }
    }

    async fn reset(&self, key: RateLimitKey) {
        self.windows.write().await.remove(&key.as_key_string());
    }
}
