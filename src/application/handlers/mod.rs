//! Application handlers.
//!
//! Command handlers that wire the synthesis pipeline to its ports.

mod analyze_batch;
mod invalidate_decision;
mod quick_match;
mod synthesize_decision;

pub use analyze_batch::{
    AnalyzeBatchCommand, AnalyzeBatchError, AnalyzeBatchHandler, AnalyzeBatchResult, BatchItem,
    BatchSettings, BatchSource, BatchSummary, DEFAULT_MAX_BATCH_SIZE, DEFAULT_STAGGER_MAX,
    DEFAULT_STAGGER_MIN,
};
pub use invalidate_decision::{
    InvalidateDecisionCommand, InvalidateDecisionHandler, InvalidateDecisionResult,
};
pub use quick_match::{QuickMatchCommand, QuickMatchHandler, QuickMatchResult};
pub use synthesize_decision::{
    CompletionSettings, SynthesizeDecisionCommand, SynthesizeDecisionHandler,
    SynthesizeDecisionResult,
};
