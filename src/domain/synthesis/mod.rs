//! Synthesis module - turning completions (or their absence) into decisions.
//!
//! # Pipeline pieces
//!
//! - `prompt_builder` - system and user messages for a decision request
//! - `extractor` - pulls a JSON object out of free-form completion text
//! - `alias_table` - tolerated field names and how to resolve them
//! - `normalizer` - repairs extracted JSON into a valid decision
//! - `fallback` - deterministic decision when the completion path fails
//! - `failure` - classification of what went wrong, for diagnostics

pub mod alias_table;
mod extractor;
mod failure;
mod fallback;
mod narrative;
mod normalizer;
mod prompt_builder;
mod seed;
mod templates;

pub use alias_table::{AliasResolver, FieldAliases, MatchStrategy, Resolved};
pub use extractor::{
    strip_markup, ExtractionError, ResponseExtractor, ResponseSanitizer, SanitizationError,
    MAX_FIELD_LENGTH, MAX_RESPONSE_LENGTH,
};
pub use failure::SynthesisFailure;
pub use fallback::{
    Adjustment, FallbackSynthesizer, ADJUSTMENTS, AGAINST_THRESHOLD, BASE_CONFIDENCE,
    BASE_PERSONA_MATCH, FOR_THRESHOLD,
};
pub use narrative::{first_sentence, recommendation_text};
pub use normalizer::{
    parse_score, parse_vote, NormalizationOutcome, NormalizedDecision, Repair, RepairAction,
    ResponseNormalizer, ScoreReading, DEFAULT_CONFIDENCE, DEFAULT_PERSONA_MATCH, MAX_FACTORS,
};
pub use prompt_builder::{truncate_excerpt, PromptBuilder, PromptPair, MAX_EXCERPT_CHARS};
pub use seed::proposal_seed;
pub use templates::{templates_for, CategoryTemplates, FactorTemplate};
