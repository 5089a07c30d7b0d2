//! Analysis module - fast, network-free persona matching.

mod heuristic_matcher;
mod keywords;

pub use heuristic_matcher::{AxisMatch, HeuristicMatcher, MatchResult, NEUTRAL_POSITION};
pub use keywords::{keywords_for, AxisKeywords, MATCHED_AXES};
