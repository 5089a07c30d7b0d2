//! Declarative field-alias table and the resolver that interprets it.
//!
//! Completions name fields inconsistently (`personaMatch`, `personamatch`,
//! `proposalsummary`, `factorname`...). Each canonical field lists the keys
//! it may appear under; [`AliasResolver`] walks those candidates in a fixed
//! order of strategies and returns the first value with an acceptable shape.

use serde_json::{Map, Value};

/// A canonical field and the alternative keys it may appear under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldAliases {
    pub const fn new(canonical: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { canonical, aliases }
    }

    /// Canonical name followed by every alias.
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.canonical).chain(self.aliases.iter().copied())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tables
// ════════════════════════════════════════════════════════════════════════════

pub const DECISION: FieldAliases = FieldAliases::new(
    "decision",
    &["vote", "recommended_vote", "vote_choice", "choice", "verdict", "final_decision", "stance"],
);

pub const CONFIDENCE: FieldAliases = FieldAliases::new(
    "confidence",
    &["confidence_score", "confidence_level", "certainty", "conf"],
);

pub const PERSONA_MATCH: FieldAliases = FieldAliases::new(
    "persona_match",
    &[
        "persona_alignment",
        "persona_score",
        "persona_fit",
        "match_score",
        "alignment",
        "match",
    ],
);

pub const REASONING: FieldAliases = FieldAliases::new(
    "reasoning",
    &["rationale", "reason", "reasons", "justification", "analysis", "explanation"],
);

pub const SUMMARY: FieldAliases = FieldAliases::new(
    "summary",
    &["proposal_summary", "overview", "synopsis", "tldr", "tl_dr", "description"],
);

pub const RECOMMENDATION: FieldAliases = FieldAliases::new(
    "recommendation",
    &["recommended_action", "advice", "suggestion", "action"],
);

pub const CHAIN_OF_THOUGHT: FieldAliases = FieldAliases::new(
    "chain_of_thought",
    &["thought_process", "thinking", "reasoning_steps", "thoughts", "cot"],
);

pub const FACTORS: FieldAliases = FieldAliases::new(
    "factors",
    &["key_factors", "factor_list", "considerations", "decision_factors", "analysis_factors"],
);

pub const PROS: FieldAliases = FieldAliases::new(
    "pros",
    &["advantages", "benefits", "positives", "strengths", "arguments_for", "pro"],
);

pub const CONS: FieldAliases = FieldAliases::new(
    "cons",
    &[
        "disadvantages",
        "drawbacks",
        "negatives",
        "weaknesses",
        "risks",
        "concerns",
        "arguments_against",
        "con",
    ],
);

/// Field names inside a factor entry.
pub const FACTOR_NAME: FieldAliases = FieldAliases::new(
    "name",
    &["factor_name", "factor", "title", "label", "aspect", "criterion"],
);

pub const FACTOR_VALUE: FieldAliases = FieldAliases::new(
    "value",
    &["factor_value", "score", "impact", "rating", "valence"],
);

pub const FACTOR_WEIGHT: FieldAliases = FieldAliases::new(
    "weight",
    &["factor_weight", "importance", "priority", "significance"],
);

pub const FACTOR_EXPLANATION: FieldAliases = FieldAliases::new(
    "explanation",
    &["factor_explanation", "description", "reason", "rationale", "details", "detail"],
);

/// Polarity hint inside a factor entry (`"pro"`, `"negative"`...).
pub const FACTOR_POLARITY: FieldAliases =
    FieldAliases::new("polarity", &["type", "kind", "sentiment", "direction"]);

/// A factor flattened into the top-level object (`factorname`, `factorvalue`).
///
/// Only `factor`-prefixed keys count here so plain `reasoning` or `summary`
/// keys are never mistaken for factor fields.
pub const FLAT_FACTOR_NAME: FieldAliases = FieldAliases::new("factor_name", &["factor"]);
pub const FLAT_FACTOR_VALUE: FieldAliases =
    FieldAliases::new("factor_value", &["factor_score", "factor_impact"]);
pub const FLAT_FACTOR_WEIGHT: FieldAliases =
    FieldAliases::new("factor_weight", &["factor_importance"]);
pub const FLAT_FACTOR_EXPLANATION: FieldAliases = FieldAliases::new(
    "factor_explanation",
    &["factor_reason", "factor_description", "factor_detail"],
);

/// The six required top-level fields.
pub const TOP_LEVEL_FIELDS: [FieldAliases; 6] = [
    DECISION,
    CONFIDENCE,
    PERSONA_MATCH,
    REASONING,
    SUMMARY,
    RECOMMENDATION,
];

// ════════════════════════════════════════════════════════════════════════════
// Resolver
// ════════════════════════════════════════════════════════════════════════════

/// How a field was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// The canonical key itself.
    Direct,
    /// A listed alias.
    Alias,
    /// A run-together, camelCase or kebab-case variant of a candidate.
    Variant,
    /// A key containing a candidate after normalisation.
    Fuzzy,
}

/// A resolved field value and the key it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub key: String,
    pub strategy: MatchStrategy,
}

impl<T> Resolved<T> {
    /// True when the canonical key was used as-is.
    pub fn is_direct(&self) -> bool {
        self.strategy == MatchStrategy::Direct
    }
}

/// Shortest candidate considered for fuzzy matching.
const FUZZY_MIN_LEN: usize = 4;

/// Interprets [`FieldAliases`] against a JSON object.
pub struct AliasResolver;

impl AliasResolver {
    /// Resolves a field through the alias table.
    ///
    /// # Algorithm
    /// Strategies are tried in order, and within a strategy candidates are
    /// tried canonical first, then aliases in table order:
    /// 1. Direct: the canonical key
    /// 2. Alias: each listed alias
    /// 3. Variant: run-together, camelCase and kebab-case spellings
    /// 4. Fuzzy: an object key whose normalised form contains a candidate
    ///
    /// Key comparison is case-insensitive. A key whose value `accept`
    /// rejects does not stop the search.
    pub fn resolve<'a, T>(
        obj: &'a Map<String, Value>,
        field: &FieldAliases,
        accept: impl Fn(&'a Value) -> Option<T>,
    ) -> Option<Resolved<T>> {
        let attempt = |key: &'a String, value: &'a Value, strategy: MatchStrategy| {
            accept(value).map(|v| Resolved {
                value: v,
                key: key.clone(),
                strategy,
            })
        };

        // 1. Direct
        for (key, value) in obj {
            if key.eq_ignore_ascii_case(field.canonical) {
                if let Some(hit) = attempt(key, value, MatchStrategy::Direct) {
                    return Some(hit);
                }
            }
        }

        // 2. Aliases
        for alias in field.aliases {
            for (key, value) in obj {
                if key.eq_ignore_ascii_case(alias) {
                    if let Some(hit) = attempt(key, value, MatchStrategy::Alias) {
                        return Some(hit);
                    }
                }
            }
        }

        // 3. Variants
        for candidate in field.candidates() {
            let variants = spelling_variants(candidate);
            for (key, value) in obj {
                if variants.iter().any(|v| key.eq_ignore_ascii_case(v)) {
                    if let Some(hit) = attempt(key, value, MatchStrategy::Variant) {
                        return Some(hit);
                    }
                }
            }
        }

        // 4. Fuzzy
        for candidate in field.candidates() {
            let needle = normalize_key(candidate);
            if needle.len() < FUZZY_MIN_LEN {
                continue;
            }
            for (key, value) in obj {
                if normalize_key(key).contains(&needle) {
                    if let Some(hit) = attempt(key, value, MatchStrategy::Fuzzy) {
                        return Some(hit);
                    }
                }
            }
        }

        None
    }
}

/// Lower-cases and drops every non-alphanumeric character.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Alternate spellings of a snake_case name.
///
/// `persona_match` yields `personamatch`, `personaMatch` and `persona-match`.
pub fn spelling_variants(snake: &str) -> Vec<String> {
    let run_together = snake.replace('_', "");
    let kebab = snake.replace('_', "-");
    let camel = to_camel_case(snake);

    let mut variants = vec![run_together, camel, kebab];
    variants.dedup();
    variants
}

fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
