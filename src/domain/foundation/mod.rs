//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the governance advisor domain.

mod errors;
mod ids;
mod score;
mod timestamp;

pub use errors::ValidationError;
pub use ids::ProposalId;
pub use score::Score;
pub use timestamp::Timestamp;
