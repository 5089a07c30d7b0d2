//! Call budget configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Completion calls allowed per minute unless configured otherwise.
pub const DEFAULT_CALLS_PER_MINUTE: u32 = 20;

/// Call budget configuration.
///
/// Holds a default budget and optional per-resource overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Budget applied to keys without an override.
    pub default: WindowLimits,
    /// Per-resource overrides, keyed by resource name.
    #[serde(default)]
    pub resources: HashMap<String, WindowLimits>,
}

/// Calls allowed in a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimits {
    /// Maximum calls per window.
    pub calls_per_window: u32,
    /// Window duration in seconds.
    pub window_secs: u32,
}

impl WindowLimits {
    pub fn per_minute(calls: u32) -> Self {
        Self {
            calls_per_window: calls,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    /// A single per-minute budget for every key.
    pub fn per_minute(calls: u32) -> Self {
        Self {
            default: WindowLimits::per_minute(calls),
            resources: HashMap::new(),
        }
    }

    /// Adds an override for one resource.
    pub fn with_resource(mut self, name: impl Into<String>, limits: WindowLimits) -> Self {
        self.resources.insert(name.into(), limits);
        self
    }

    /// Limits for a resource, falling back to the default.
    pub fn limits_for(&self, resource: &str) -> WindowLimits {
        self.resources.get(resource).copied().unwrap_or(self.default)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(DEFAULT_CALLS_PER_MINUTE)
    }
}
