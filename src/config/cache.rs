//! Completion cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// How long a completion stays reusable
    #[serde(default = "default_ttl_hours")]
    pub completion_ttl_hours: u64,

    /// Trailing conversation messages hashed into the cache key
    #[serde(default = "default_key_messages")]
    pub key_messages: usize,
}

impl CacheConfig {
    pub fn completion_ttl(&self) -> Duration {
        Duration::from_secs(self.completion_ttl_hours * 60 * 60)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.completion_ttl_hours == 0 {
            return Err(ConfigValidationError::MustBePositive("completion_ttl_hours"));
        }
        if self.key_messages == 0 {
            return Err(ConfigValidationError::MustBePositive("key_messages"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            completion_ttl_hours: default_ttl_hours(),
            key_messages: default_key_messages(),
        }
    }
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_key_messages() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.completion_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.key_messages, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = CacheConfig {
            completion_ttl_hours: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
