//! Batch pacing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::application::BatchSettings;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_stagger_min_ms")]
    pub stagger_min_ms: u64,

    #[serde(default = "default_stagger_max_ms")]
    pub stagger_max_ms: u64,

    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl BatchConfig {
    pub fn settings(&self) -> BatchSettings {
        BatchSettings {
            stagger: Duration::from_millis(self.stagger_min_ms)
                ..=Duration::from_millis(self.stagger_max_ms),
            max_batch_size: self.max_batch_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.stagger_min_ms > self.stagger_max_ms {
            return Err(ConfigValidationError::InvalidStagger);
        }
        if self.max_batch_size == 0 {
            return Err(ConfigValidationError::MustBePositive("max_batch_size"));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            stagger_min_ms: default_stagger_min_ms(),
            stagger_max_ms: default_stagger_max_ms(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

fn default_stagger_min_ms() -> u64 {
    1000
}

fn default_stagger_max_ms() -> u64 {
    3000
}

fn default_max_batch_size() -> usize {
    25
}
