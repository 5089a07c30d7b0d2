//! Heuristic Matcher - network-free persona/proposal alignment score.

use serde::{Deserialize, Serialize};

use super::keywords::{keywords_for, AxisKeywords, MATCHED_AXES};
use crate::domain::persona::{AxisLevel, Persona, PersonaAxis, PersonaDescriptor};
use crate::domain::proposal::ProposalContext;

/// Neutral proposal position used when no keyword is found.
pub const NEUTRAL_POSITION: u8 = 50;

/// Alignment on a single persona axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMatch {
    pub axis: PersonaAxis,
    /// Where the proposal sits on the axis, 0-100.
    pub position: u8,
    /// The persona's slider value.
    pub preference: u8,
    /// 0-100 alignment between position and preference.
    pub score: u8,
    pub matched_keywords: Vec<String>,
    pub explanation: String,
}

/// Result of a heuristic match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Weighted overall alignment, 0-100.
    pub score: u8,
    /// One entry per matched axis (risk, esg, treasury, horizon).
    pub factors: Vec<AxisMatch>,
    pub reasoning: String,
}

impl MatchResult {
    /// The axis entry for `axis`, if it was scored.
    pub fn axis(&self, axis: PersonaAxis) -> Option<&AxisMatch> {
        self.factors.iter().find(|f| f.axis == axis)
    }
}

/// Keyword-based persona matching.
pub struct HeuristicMatcher;

impl HeuristicMatcher {
    /// Scores how well a proposal fits a persona.
    pub fn match_proposal(proposal: &ProposalContext, persona: &Persona) -> MatchResult {
        Self::match_text(&proposal.searchable_text(), persona)
    }

    /// Scores already lower-cased proposal text against a persona.
    ///
    /// # Algorithm
    /// Per axis, count low/mid/high keyword hits, derive a proposal position,
    /// then score = max(0, 100 - 2·|position - preference|). Overall score is
    /// the weighted mean of the axis scores.
    ///
    /// # Edge Cases
    /// - Empty text: every position is 50
    /// - Only mid hits: position stays at 50
    pub fn match_text(text: &str, persona: &Persona) -> MatchResult {
        let factors: Vec<AxisMatch> = MATCHED_AXES
            .iter()
            .filter_map(|(axis, _)| {
                keywords_for(*axis).map(|kw| Self::match_axis(*axis, kw, text, persona))
            })
            .collect();

        let weighted: u32 = factors
            .iter()
            .zip(MATCHED_AXES.iter())
            .map(|(f, (_, weight))| u32::from(f.score) * weight)
            .sum();
        let total_weight: u32 = MATCHED_AXES.iter().map(|(_, w)| w).sum();
        let score = if total_weight == 0 {
            NEUTRAL_POSITION
        } else {
            (f64::from(weighted) / f64::from(total_weight)).round().clamp(0.0, 100.0) as u8
        };

        let reasoning = Self::reasoning(score, &factors);

        MatchResult {
            score,
            factors,
            reasoning,
        }
    }

    /// Position on the axis from hit counts.
    ///
    /// # Algorithm
    /// base = 50 + 50·(H - L)/(H + L), or 50 with no directional hits.
    /// position = base + (50 - base)·M/(L + M + H).
    pub fn position(low: usize, mid: usize, high: usize) -> u8 {
        let total = low + mid + high;
        if total == 0 {
            return NEUTRAL_POSITION;
        }

        let (l, m, h) = (low as f64, mid as f64, high as f64);
        let base = if low + high > 0 {
            50.0 + 50.0 * (h - l) / (h + l)
        } else {
            50.0
        };
        let position = base + (50.0 - base) * m / (l + m + h);

        position.round().clamp(0.0, 100.0) as u8
    }

    /// max(0, 100 - 2·|position - preference|)
    pub fn axis_score(position: u8, preference: u8) -> u8 {
        let distance = (i32::from(position) - i32::from(preference)).abs();
        (100 - 2 * distance).max(0) as u8
    }

    fn match_axis(
        axis: PersonaAxis,
        keywords: &AxisKeywords,
        text: &str,
        persona: &Persona,
    ) -> AxisMatch {
        let mut matched = Vec::new();
        let low = count_hits(text, keywords.low, &mut matched);
        let mid = count_hits(text, keywords.mid, &mut matched);
        let high = count_hits(text, keywords.high, &mut matched);

        let position = Self::position(low, mid, high);
        let preference = persona.value(axis);
        let score = Self::axis_score(position, preference);

        let explanation = format!(
            "{}: proposal reads as {} ({}) against a {} preference ({}), {}% aligned.",
            axis.title(),
            PersonaDescriptor::label_for(axis, AxisLevel::from_value(position)),
            position,
            PersonaDescriptor::label_for(axis, AxisLevel::from_value(preference)),
            preference,
            score
        );

        AxisMatch {
            axis,
            position,
            preference,
            score,
            matched_keywords: matched,
            explanation,
        }
    }

    fn reasoning(score: u8, factors: &[AxisMatch]) -> String {
        let mut strongest: Option<&AxisMatch> = None;
        let mut weakest: Option<&AxisMatch> = None;
        for f in factors {
            if strongest.map_or(true, |s| f.score > s.score) {
                strongest = Some(f);
            }
            if weakest.map_or(true, |w| f.score < w.score) {
                weakest = Some(f);
            }
        }

        match (strongest, weakest) {
            (Some(s), Some(w)) => format!(
                "Overall persona match {}%. Strongest alignment on {} ({}%), weakest on {} ({}%).",
                score,
                s.axis.title().to_lowercase(),
                s.score,
                w.axis.title().to_lowercase(),
                w.score
            ),
            _ => format!("Overall persona match {}%.", score),
        }
    }
}

/// Occurrences of each keyword at the start of a word, summed over the set.
///
/// Keywords match as word prefixes, so stems like `sustainab` still hit
/// while `audit` does not fire inside `unaudited`.
fn count_hits(text: &str, keywords: &[&str], matched: &mut Vec<String>) -> usize {
    keywords
        .iter()
        .map(|k| {
            let n = text
                .match_indices(k)
                .filter(|(idx, _)| starts_word(text, *idx))
                .count();
            if n > 0 {
                matched.push((*k).to_string());
            }
            n
        })
        .sum()
}

fn starts_word(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}
