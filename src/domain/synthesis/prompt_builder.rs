//! Prompt construction for decision completions.

use serde::{Deserialize, Serialize};

use crate::domain::analysis::MatchResult;
use crate::domain::persona::{Persona, PersonaDescriptor};
use crate::domain::proposal::ProposalContext;

/// Longest proposal excerpt embedded in a prompt, in characters.
pub const MAX_EXCERPT_CHARS: usize = 1000;

/// System and user message for one decision request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds decision prompts.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Builds the prompt pair for a proposal and persona.
    ///
    /// The heuristic match, when given, is included as a hint only.
    pub fn build(
        proposal: &ProposalContext,
        persona: &Persona,
        heuristic: Option<&MatchResult>,
    ) -> PromptPair {
        PromptPair {
            system: SYSTEM_PROMPT.to_string(),
            user: Self::user_message(proposal, persona, heuristic),
        }
    }

    fn user_message(
        proposal: &ProposalContext,
        persona: &Persona,
        heuristic: Option<&MatchResult>,
    ) -> String {
        let profile = PersonaDescriptor::describe(persona);
        let mut text = String::new();

        text.push_str("VOTER PERSONA\n");
        text.push_str(&profile.description);
        text.push_str(&format!(
            "\nSliders (0-100): risk {}, esg focus {}, treasury conservatism {}, time horizon {}, participation frequency {}.\n\n",
            persona.risk(),
            persona.esg_focus(),
            persona.treasury_conservatism(),
            persona.time_horizon(),
            persona.participation_frequency()
        ));

        text.push_str("PROPOSAL\n");
        text.push_str(&format!("Title: {}\n", proposal.title.trim()));
        text.push_str(&format!("Organization: {}\n", proposal.organization_name()));
        if !proposal.status.trim().is_empty() {
            text.push_str(&format!("Status: {}\n", proposal.status.trim()));
        }
        text.push_str(&format!("Choices: {}\n", proposal.vote_choices().join(", ")));
        if let Some(summary) = proposal.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            text.push_str(&format!("Summary: {}\n", summary.trim()));
        }
        text.push_str("Body:\n");
        text.push_str(&truncate_excerpt(&proposal.body, MAX_EXCERPT_CHARS));
        text.push_str("\n\n");

        if let Some(hint) = heuristic {
            text.push_str(&format!(
                "HEURISTIC HINT\nA keyword-based pre-screen scored persona fit at {}/100. Treat this as a rough hint, not a conclusion.\n\n",
                hint.score
            ));
        }

        text.push_str("Respond with the JSON object described in the instructions.");
        text
    }
}

/// Truncates to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &trimmed[..byte_idx]),
        None => trimmed.to_string(),
    }
}

const SYSTEM_PROMPT: &str = r#"You are a governance analyst advising a DAO member on how to vote.

Return ONLY a single JSON object. Do not use markdown, headings, bold text or code fences.

The object MUST use exactly these field names:
- "decision": one of "for", "against", "abstain"
- "confidence": integer 1-100
- "persona_match": integer 1-100, how well the proposal fits the voter persona
- "reasoning": 2-4 sentences explaining the decision
- "summary": one sentence summarizing the proposal
- "recommendation": one sentence telling the voter what to do
- "factors": array of objects, each with:
    - "name": short label
    - "value": integer from -10 to 10, never 0 (positive supports the proposal, negative opposes it)
    - "weight": integer 1-10
    - "explanation": one sentence
  Include at least one positive and at least one negative factor.
- "chain_of_thought": short step-by-step reasoning

Field naming mistakes to avoid:
WRONG: "personamatch" or "personaMatch"    RIGHT: "persona_match"
WRONG: "proposalsummary"                   RIGHT: "summary"
WRONG: "factorname"                        RIGHT: "name"
WRONG: "factorvalue"                       RIGHT: "value"
WRONG: "chainofthought"                    RIGHT: "chain_of_thought"

Do not flatten factors into the top-level object; always use the "factors" array."#;
