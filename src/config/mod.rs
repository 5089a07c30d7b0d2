//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `GOVERNANCE_ADVISOR` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use governance_advisor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Using model {}", config.ai.model);
//! ```

mod ai;
mod batch;
mod cache;
mod error;
mod log;

pub use ai::AiConfig;
pub use batch::BatchConfig;
pub use cache::CacheConfig;
pub use error::{ConfigError, ConfigValidationError};
pub use log::LogConfig;

use serde::Deserialize;

use crate::adapters::ai::GatewayConfig;

/// Root application configuration
///
/// Every section has defaults; only `ai.api_key` must be supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Completion service (endpoint, model, retries, call budget)
    #[serde(default)]
    pub ai: AiConfig,

    /// Completion cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Batch pacing
    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GOVERNANCE_ADVISOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GOVERNANCE_ADVISOR__AI__API_KEY=sk-...` -> `ai.api_key = sk-...`
    /// - `GOVERNANCE_ADVISOR__BATCH__MAX_BATCH_SIZE=10` -> `batch.max_batch_size = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GOVERNANCE_ADVISOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.ai.validate()?;
        self.cache.validate()?;
        self.batch.validate()?;
        self.log.validate()?;
        Ok(())
    }

    /// Gateway settings drawn from the `ai` and `cache` sections.
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            cache_ttl: self.cache.completion_ttl(),
            key_messages: self.cache.key_messages,
            retry: self.ai.retry_policy(),
        }
    }
}
