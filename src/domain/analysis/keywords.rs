//! Keyword tables for the heuristic matcher.
//!
//! Each matched axis has three keyword sets on the same 0-100 orientation as
//! the persona slider: `low` pulls the proposal position toward 0, `high`
//! toward 100 and `mid` toward 50.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::persona::PersonaAxis;

/// Keyword sets for one axis.
#[derive(Debug, Clone)]
pub struct AxisKeywords {
    pub low: &'static [&'static str],
    pub mid: &'static [&'static str],
    pub high: &'static [&'static str],
}

/// Axes scored by the matcher, with their weight in the overall score.
///
/// Weights sum to 100.
pub const MATCHED_AXES: [(PersonaAxis, u32); 4] = [
    (PersonaAxis::Risk, 30),
    (PersonaAxis::EsgFocus, 25),
    (PersonaAxis::TreasuryConservatism, 25),
    (PersonaAxis::TimeHorizon, 20),
];

static KEYWORD_TABLE: Lazy<HashMap<PersonaAxis, AxisKeywords>> = Lazy::new(|| {
    let mut table = HashMap::new();

    table.insert(
        PersonaAxis::Risk,
        AxisKeywords {
            low: &[
                "audit",
                "security",
                "safe",
                "stable",
                "conservative",
                "insurance",
                "timelock",
                "battle-tested",
            ],
            mid: &["pilot", "phased", "trial", "moderate", "incremental"],
            high: &[
                "experimental",
                "novel",
                "leverage",
                "aggressive",
                "unaudited",
                "cutting-edge",
                "innovative",
                "high risk",
            ],
        },
    );

    table.insert(
        PersonaAxis::EsgFocus,
        AxisKeywords {
            low: &["revenue", "profit", "fee", "return", "apy", "token price"],
            mid: &["community", "ecosystem", "balanced"],
            high: &[
                "carbon",
                "climate",
                "public good",
                "social",
                "environment",
                "diversity",
                "impact",
                "charity",
            ],
        },
    );

    table.insert(
        PersonaAxis::TreasuryConservatism,
        AxisKeywords {
            low: &["grant", "spend", "fund", "invest", "incentive", "budget", "allocate"],
            mid: &["rebalanc", "diversif", "runway"],
            high: &["reserve", "preserve", "buyback", "savings", "reduce spending", "stablecoin"],
        },
    );

    table.insert(
        PersonaAxis::TimeHorizon,
        AxisKeywords {
            low: &["immediate", "short-term", "quick", "one-time", "emergency", "urgent"],
            mid: &["milestone", "quarterly", "12 months", "next year"],
            high: &["long-term", "roadmap", "multi-year", "sustainab", "future", "vision", "decade"],
        },
    );

    table
});

/// Keyword sets for an axis, if the matcher scores it.
pub fn keywords_for(axis: PersonaAxis) -> Option<&'static AxisKeywords> {
    KEYWORD_TABLE.get(&axis)
}
