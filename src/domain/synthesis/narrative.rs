//! Text helpers shared by the normalizer and the fallback synthesizer.

use crate::domain::decision::{DecisionFactor, VoteChoice};

/// One-line voting recommendation for a decision and confidence.
pub fn recommendation_text(decision: VoteChoice, confidence: u8) -> String {
    match decision {
        VoteChoice::For => format!("Vote for this proposal ({}% confidence).", confidence),
        VoteChoice::Against => {
            format!("Vote against this proposal ({}% confidence).", confidence)
        }
        VoteChoice::Abstain => format!(
            "Abstain from voting on this proposal ({}% confidence).",
            confidence
        ),
    }
}

/// First sentence of a text, including its terminator.
///
/// Returns the whole trimmed text when no terminator is followed by
/// whitespace or the end of input.
pub fn first_sentence(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                return trimmed[..i + c.len_utf8()].to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Reasoning built from the strongest pro and con.
pub fn reasoning_from_factors(decision: VoteChoice, factors: &[DecisionFactor]) -> String {
    let top_pro = factors
        .iter()
        .filter(|f| f.is_pro())
        .max_by_key(|f| f.impact());
    let top_con = factors
        .iter()
        .filter(|f| f.is_con())
        .min_by_key(|f| f.impact());

    match (top_pro, top_con) {
        (Some(pro), Some(con)) => format!(
            "The recommendation to {} weighs {} ({}) against {} ({}).",
            vote_phrase(decision),
            pro.name(),
            pro.explanation(),
            con.name(),
            con.explanation()
        ),
        _ => format!(
            "The recommendation to {} follows from the factors identified.",
            vote_phrase(decision)
        ),
    }
}

/// "vote for", "vote against" or "abstain".
pub fn vote_phrase(decision: VoteChoice) -> &'static str {
    match decision {
        VoteChoice::For => "vote for",
        VoteChoice::Against => "vote against",
        VoteChoice::Abstain => "abstain",
    }
}

/// Compact signed listing of factors: `Name (+7), Other (-4)`.
pub fn factor_listing<'a>(factors: impl Iterator<Item = &'a DecisionFactor>) -> String {
    let parts: Vec<String> = factors
        .map(|f| format!("{} ({:+})", f.name(), f.value()))
        .collect();
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}
