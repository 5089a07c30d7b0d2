//! Decision module - the validated output of the synthesis pipeline.

#[allow(clippy::module_inception)]
mod decision;
mod factor;

pub use decision::{Decision, DecisionDraft, Provenance, VoteChoice};
pub use factor::{
    is_balanced, DecisionFactor, FACTOR_VALUE_MAX, FACTOR_VALUE_MIN, FACTOR_WEIGHT_MAX,
    FACTOR_WEIGHT_MIN,
};
