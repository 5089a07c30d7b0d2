//! Completion service configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::ai::{OpenAIConfig, RetryPolicy};
use crate::application::CompletionSettings;

/// Completion service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Bearer key for the completion service
    pub api_key: Option<Secret<String>>,

    /// OpenAI-compatible API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts per completion, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step between attempts
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Advisory call budget; overruns are logged, never refused
    #[serde(default = "default_calls_per_minute")]
    pub calls_per_minute: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_base_ms))
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    /// Provider configuration, or `None` without an API key.
    pub fn openai_config(&self) -> Option<OpenAIConfig> {
        let key = self.api_key.as_ref().filter(|_| self.has_api_key())?;
        Some(
            OpenAIConfig::from_secret(key.clone())
                .with_model(self.model.clone())
                .with_base_url(self.base_url.clone())
                .with_timeout(self.timeout()),
        )
    }

    /// Validate completion service configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.has_api_key() {
            return Err(ConfigValidationError::MissingRequired(
                "GOVERNANCE_ADVISOR__AI__API_KEY",
            ));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigValidationError::InvalidTemperature);
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigValidationError::MustBePositive("max_output_tokens"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigValidationError::MustBePositive("max_attempts"));
        }
        if self.calls_per_minute == 0 {
            return Err(ConfigValidationError::MustBePositive("calls_per_minute"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            calls_per_minute: default_calls_per_minute(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    1200
}

fn default_timeout() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_calls_per_minute() -> u32 {
    20
}
