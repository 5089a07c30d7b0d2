//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    AnalyzeBatchCommand, AnalyzeBatchError, AnalyzeBatchHandler, AnalyzeBatchResult,
    BatchSettings, CompletionSettings, InvalidateDecisionCommand, InvalidateDecisionHandler,
    QuickMatchCommand, QuickMatchHandler, SynthesizeDecisionCommand, SynthesizeDecisionHandler,
    SynthesizeDecisionResult,
};
