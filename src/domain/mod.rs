//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, scores, timestamps, errors)
//! - `persona` - Voter preference sliders and their descriptions
//! - `proposal` - Read-only proposal context and category classification
//! - `decision` - The validated voting recommendation and its factors
//! - `analysis` - Keyword heuristic persona matching
//! - `synthesis` - Prompting, completion repair and deterministic fallback

pub mod analysis;
pub mod decision;
pub mod foundation;
pub mod persona;
pub mod proposal;
pub mod synthesis;
