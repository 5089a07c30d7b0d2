//! Classification of what went wrong on the way to a decision.
//!
//! None of these reach the caller: every path still ends in a valid
//! decision. They exist for logging and diagnostics.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisFailure {
    /// The completion service could not be reached after retries.
    #[error("completion service unavailable: {0}")]
    TransportFailure(String),

    /// The completion did not contain a usable JSON object.
    #[error("completion output malformed: {0}")]
    MalformedOutput(String),

    /// A field was absent or invalid and a local default was used.
    #[error("field '{field}' missing or invalid, default applied")]
    FieldMissing { field: String },

    /// The factor list lacked one polarity and a factor was synthesized.
    #[error("factor list had no {missing} factor, one was synthesized")]
    FactorImbalance { missing: String },

    /// The vote itself could not be recovered.
    #[error("decision unrepairable: {0}")]
    DecisionUnrepairable(String),
}

impl SynthesisFailure {
    /// True when this failure sends the pipeline to the fallback synthesizer.
    pub fn forces_fallback(&self) -> bool {
        matches!(
            self,
            SynthesisFailure::TransportFailure(_)
                | SynthesisFailure::MalformedOutput(_)
                | SynthesisFailure::DecisionUnrepairable(_)
        )
    }
}
