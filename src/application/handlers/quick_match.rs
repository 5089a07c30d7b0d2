//! QuickMatchHandler - heuristic persona fit without a completion call.

use serde::Serialize;

use crate::domain::analysis::{HeuristicMatcher, MatchResult};
use crate::domain::persona::{Persona, PersonaDescriptor, PersonaProfile};
use crate::domain::proposal::ProposalContext;

#[derive(Debug, Clone)]
pub struct QuickMatchCommand {
    pub proposal: ProposalContext,
    pub persona: Persona,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickMatchResult {
    #[serde(rename = "match")]
    pub match_result: MatchResult,
    pub profile: PersonaProfile,
}

/// Stateless; exists so callers wire the fast path like the other handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickMatchHandler;

impl QuickMatchHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, cmd: QuickMatchCommand) -> QuickMatchResult {
        QuickMatchResult {
            match_result: HeuristicMatcher::match_proposal(&cmd.proposal, &cmd.persona),
            profile: PersonaDescriptor::describe(&cmd.persona),
        }
    }
}
