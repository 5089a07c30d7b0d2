//! Proposal module - the read-only proposal shape consumed from the feed.

mod category;
mod context;

pub use category::ProposalCategory;
pub use context::{ProposalContext, DEFAULT_CHOICES};
