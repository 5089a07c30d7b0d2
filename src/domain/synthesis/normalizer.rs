//! Response Normalizer - repairs raw completion JSON into a valid Decision.
//!
//! Completions are parsed leniently: field names are reconciled through the
//! alias table, factor lists are rebuilt from whatever shape is present, and
//! missing values get local defaults. Only a missing or unparseable vote makes
//! a completion unrepairable.

use serde_json::{Map, Value};
use std::fmt;

use super::alias_table::{self as aliases, AliasResolver, FieldAliases, Resolved};
use super::failure::SynthesisFailure;
use super::narrative::{
    factor_listing, first_sentence, reasoning_from_factors, recommendation_text,
};
use crate::domain::decision::{
    Decision, DecisionDraft, DecisionFactor, Provenance, VoteChoice, FACTOR_VALUE_MAX,
    FACTOR_VALUE_MIN, FACTOR_WEIGHT_MAX, FACTOR_WEIGHT_MIN,
};
use crate::domain::proposal::ProposalContext;

/// Confidence used when the completion's value is missing or out of range.
pub const DEFAULT_CONFIDENCE: i64 = 75;
/// Persona match used when the completion's value is missing or out of range.
pub const DEFAULT_PERSONA_MATCH: i64 = 65;
pub const DEFAULT_FACTOR_WEIGHT: u8 = 5;
/// Magnitude given to factors whose value is missing.
pub const DEFAULT_FACTOR_MAGNITUDE: i8 = 5;
/// Factors beyond this many are ignored.
pub const MAX_FACTORS: usize = 12;

/// Longer strings are prose, not a vote.
const MAX_DECISION_WORDS: usize = 6;
const MAX_DERIVED_NAME_WORDS: usize = 4;
const MAX_LABEL_CHARS: usize = 60;

// ════════════════════════════════════════════════════════════════════════════
// Repair trace
// ════════════════════════════════════════════════════════════════════════════

/// What was done to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    /// The decision object was nested under `key`.
    Unwrapped { key: String },
    /// Read from a non-canonical key.
    Renamed { from: String },
    /// Missing or invalid, replaced with a default.
    Defaulted { value: String },
    /// A fraction was read as a percentage.
    Rescaled,
    /// Built from another field.
    Derived { from: &'static str },
    /// Clamped into range.
    Clamped { from: i64, to: i64 },
    /// A zero factor value moved off zero.
    Nudged { to: i64 },
    /// Factor sign corrected to match its stated polarity.
    SignFlipped,
    /// Entry could not be read and was skipped.
    Dropped,
    /// Factor list built from an alternative source.
    Rebuilt { source: &'static str },
    /// A factor of the missing polarity was appended.
    Balanced { polarity: &'static str },
}

impl fmt::Display for RepairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairAction::Unwrapped { key } => write!(f, "unwrapped from '{}'", key),
            RepairAction::Renamed { from } => write!(f, "read from '{}'", from),
            RepairAction::Defaulted { value } => write!(f, "defaulted to {}", value),
            RepairAction::Rescaled => write!(f, "fraction rescaled to percent"),
            RepairAction::Derived { from } => write!(f, "derived from {}", from),
            RepairAction::Clamped { from, to } => write!(f, "clamped {} to {}", from, to),
            RepairAction::Nudged { to } => write!(f, "zero nudged to {}", to),
            RepairAction::SignFlipped => write!(f, "sign flipped to match polarity"),
            RepairAction::Dropped => write!(f, "unreadable entry dropped"),
            RepairAction::Rebuilt { source } => write!(f, "rebuilt from {}", source),
            RepairAction::Balanced { polarity } => write!(f, "added a {} factor", polarity),
        }
    }
}

/// One repair applied during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    pub field: String,
    pub action: RepairAction,
}

impl Repair {
    fn new(field: impl Into<String>, action: RepairAction) -> Self {
        Self {
            field: field.into(),
            action,
        }
    }

    /// The failure class this repair papered over, if any.
    pub fn failure(&self) -> Option<SynthesisFailure> {
        match &self.action {
            RepairAction::Defaulted { .. } | RepairAction::Derived { .. } => {
                Some(SynthesisFailure::FieldMissing {
                    field: self.field.clone(),
                })
            }
            RepairAction::Balanced { polarity } => Some(SynthesisFailure::FactorImbalance {
                missing: (*polarity).to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.action)
    }
}

/// A decision recovered from a completion, with the repairs it needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDecision {
    pub decision: Decision,
    pub repairs: Vec<Repair>,
}

impl NormalizedDecision {
    pub fn was_repaired(&self) -> bool {
        !self.repairs.is_empty()
    }

    /// Failure classes recorded during normalization.
    pub fn failures(&self) -> Vec<SynthesisFailure> {
        self.repairs.iter().filter_map(Repair::failure).collect()
    }
}

/// Result of normalizing a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizationOutcome {
    Repaired(NormalizedDecision),
    /// The vote could not be recovered. Carries the reason.
    Unrepairable(String),
}

impl NormalizationOutcome {
    pub fn is_repaired(&self) -> bool {
        matches!(self, NormalizationOutcome::Repaired(_))
    }

    pub fn into_decision(self) -> Option<Decision> {
        match self {
            NormalizationOutcome::Repaired(n) => Some(n.decision),
            NormalizationOutcome::Unrepairable(_) => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Normalizer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    fn sign(self) -> i8 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }

    /// Default polarity for factors of unknown sign.
    fn of_vote(vote: VoteChoice) -> Self {
        match vote {
            VoteChoice::Against => Polarity::Negative,
            VoteChoice::For | VoteChoice::Abstain => Polarity::Positive,
        }
    }

    fn of_value(value: i64) -> Self {
        if value < 0 {
            Polarity::Negative
        } else {
            Polarity::Positive
        }
    }
}

/// Factor fields as read from a completion, before validation.
#[derive(Debug, Default)]
struct RawFactor {
    name: Option<String>,
    explanation: Option<String>,
    value: Option<f64>,
    weight: Option<f64>,
    polarity: Option<Polarity>,
}

/// Completion repair functions.
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    /// Normalizes raw completion JSON into a decision.
    ///
    /// # Algorithm
    /// 1. Locate the decision object (unwrapping a single-key envelope or array)
    /// 2. Resolve the vote; without one the completion is unrepairable
    /// 3. Resolve scores, defaulting confidence to 75 and persona match to 65
    /// 4. Rebuild factors: list, then pros/cons, then flattened fields, then generic
    /// 5. Balance factors so both polarities are present
    /// 6. Derive missing text fields
    pub fn normalize(raw: &Value, proposal: &ProposalContext) -> NormalizationOutcome {
        let mut repairs = Vec::new();

        let obj = match Self::root_object(raw, &mut repairs) {
            Some(obj) => obj,
            None => {
                return NormalizationOutcome::Unrepairable(
                    "completion is not a JSON object".to_string(),
                )
            }
        };

        let decision = match AliasResolver::resolve(obj, &aliases::DECISION, parse_vote) {
            Some(hit) => {
                note_rename(&mut repairs, aliases::DECISION.canonical, &hit);
                hit.value
            }
            None => {
                return NormalizationOutcome::Unrepairable(
                    "decision missing or unparseable".to_string(),
                )
            }
        };

        let confidence =
            Self::score_field(obj, &aliases::CONFIDENCE, DEFAULT_CONFIDENCE, &mut repairs);
        let persona_match =
            Self::score_field(obj, &aliases::PERSONA_MATCH, DEFAULT_PERSONA_MATCH, &mut repairs);

        let reasoning = Self::text_field(obj, &aliases::REASONING, &mut repairs);
        let summary = Self::text_field(obj, &aliases::SUMMARY, &mut repairs);
        let recommendation = Self::text_field(obj, &aliases::RECOMMENDATION, &mut repairs);
        let chain_of_thought = Self::text_field(obj, &aliases::CHAIN_OF_THOUGHT, &mut repairs);

        let mut factors = Self::factors(obj, decision, proposal, &mut repairs);
        Self::balance(&mut factors, &mut repairs);

        let reasoning = match reasoning {
            Some(text) => text,
            None => {
                repairs.push(Repair::new("reasoning", RepairAction::Derived { from: "factors" }));
                reasoning_from_factors(decision, &factors)
            }
        };
        let summary = match summary {
            Some(text) => text,
            None => {
                repairs.push(Repair::new("summary", RepairAction::Derived { from: "reasoning" }));
                first_sentence(&reasoning)
            }
        };
        let recommendation = match recommendation {
            Some(text) => text,
            None => {
                repairs.push(Repair::new(
                    "recommendation",
                    RepairAction::Derived {
                        from: "decision and confidence",
                    },
                ));
                recommendation_text(decision, confidence as u8)
            }
        };
        let chain_of_thought = match chain_of_thought {
            Some(text) => text,
            None => {
                let trace = repair_trace(decision, confidence, persona_match, &factors, &repairs);
                repairs.push(Repair::new(
                    "chain_of_thought",
                    RepairAction::Derived {
                        from: "repair trace",
                    },
                ));
                trace
            }
        };

        let draft = DecisionDraft {
            proposal_id: proposal.id.clone(),
            decision,
            confidence,
            persona_match,
            reasoning,
            summary,
            recommendation,
            factors,
            chain_of_thought,
            provenance: Provenance::Llm,
        };

        match Decision::from_draft(draft) {
            Ok(decision) => NormalizationOutcome::Repaired(NormalizedDecision { decision, repairs }),
            Err(err) => NormalizationOutcome::Unrepairable(err.to_string()),
        }
    }

    fn root_object<'a>(raw: &'a Value, repairs: &mut Vec<Repair>) -> Option<&'a Map<String, Value>> {
        match raw {
            Value::Object(map) => {
                let has_vote = AliasResolver::resolve(map, &aliases::DECISION, parse_vote).is_some();
                if !has_vote && map.len() == 1 {
                    if let Some((key, Value::Object(inner))) = map.iter().next() {
                        repairs.push(Repair::new(
                            "root",
                            RepairAction::Unwrapped { key: key.clone() },
                        ));
                        return Some(inner);
                    }
                }
                Some(map)
            }
            Value::Array(items) => {
                let first = items.iter().find_map(Value::as_object)?;
                repairs.push(Repair::new(
                    "root",
                    RepairAction::Unwrapped {
                        key: "[0]".to_string(),
                    },
                ));
                Some(first)
            }
            _ => None,
        }
    }

    fn score_field(
        obj: &Map<String, Value>,
        field: &FieldAliases,
        default: i64,
        repairs: &mut Vec<Repair>,
    ) -> i64 {
        let defaulted = Repair::new(
            field.canonical,
            RepairAction::Defaulted {
                value: default.to_string(),
            },
        );

        let hit = match AliasResolver::resolve(obj, field, parse_score) {
            Some(hit) => hit,
            None => {
                repairs.push(defaulted);
                return default;
            }
        };

        note_rename(repairs, field.canonical, &hit);
        if hit.value.rescaled {
            repairs.push(Repair::new(field.canonical, RepairAction::Rescaled));
        }

        let rounded = hit.value.value.round();
        if (1.0..=100.0).contains(&rounded) {
            rounded as i64
        } else {
            repairs.push(defaulted);
            default
        }
    }

    fn text_field(
        obj: &Map<String, Value>,
        field: &FieldAliases,
        repairs: &mut Vec<Repair>,
    ) -> Option<String> {
        let hit = AliasResolver::resolve(obj, field, parse_text)?;
        note_rename(repairs, field.canonical, &hit);
        Some(hit.value)
    }

    fn factors(
        obj: &Map<String, Value>,
        decision: VoteChoice,
        proposal: &ProposalContext,
        repairs: &mut Vec<Repair>,
    ) -> Vec<DecisionFactor> {
        let default_polarity = Polarity::of_vote(decision);

        // 1. An explicit factor list
        if let Some(hit) = AliasResolver::resolve(obj, &aliases::FACTORS, factor_entries) {
            note_rename(repairs, "factors", &hit);
            let parsed = Self::parse_entries(&hit.value, None, default_polarity, "factors", repairs);
            if !parsed.is_empty() {
                return parsed;
            }
        }

        // 2. Separate pros / cons lists
        let pros = AliasResolver::resolve(obj, &aliases::PROS, factor_entries);
        let cons = AliasResolver::resolve(obj, &aliases::CONS, factor_entries);
        let mut parsed = Vec::new();
        if let Some(hit) = &pros {
            parsed.extend(Self::parse_entries(
                &hit.value,
                Some(Polarity::Positive),
                default_polarity,
                "pros",
                repairs,
            ));
        }
        if let Some(hit) = &cons {
            parsed.extend(Self::parse_entries(
                &hit.value,
                Some(Polarity::Negative),
                default_polarity,
                "cons",
                repairs,
            ));
        }
        if !parsed.is_empty() {
            parsed.truncate(MAX_FACTORS);
            repairs.push(Repair::new(
                "factors",
                RepairAction::Rebuilt {
                    source: "pros and cons",
                },
            ));
            return parsed;
        }

        // 3. A single factor flattened into the top level
        if let Some(factor) = Self::flattened_factor(obj, default_polarity, repairs) {
            repairs.push(Repair::new(
                "factors",
                RepairAction::Rebuilt {
                    source: "flattened fields",
                },
            ));
            return vec![factor];
        }

        // 4. Nothing usable
        repairs.push(Repair::new(
            "factors",
            RepairAction::Rebuilt {
                source: "generic factors",
            },
        ));
        generic_factors(decision, proposal)
    }

    fn parse_entries(
        entries: &[(Option<&str>, &Value)],
        list_polarity: Option<Polarity>,
        default_polarity: Polarity,
        list_name: &str,
        repairs: &mut Vec<Repair>,
    ) -> Vec<DecisionFactor> {
        let mut factors = Vec::new();
        for (i, (key, entry)) in entries.iter().take(MAX_FACTORS).enumerate() {
            let field = format!("{}[{}]", list_name, i);
            let parsed = raw_factor(*key, entry).and_then(|raw| {
                finish_factor(raw, list_polarity, default_polarity, &field, repairs)
            });
            match parsed {
                Some(factor) => factors.push(factor),
                None => repairs.push(Repair::new(field, RepairAction::Dropped)),
            }
        }
        factors
    }

    fn flattened_factor(
        obj: &Map<String, Value>,
        default_polarity: Polarity,
        repairs: &mut Vec<Repair>,
    ) -> Option<DecisionFactor> {
        let name = AliasResolver::resolve(obj, &aliases::FLAT_FACTOR_NAME, parse_text)?;
        let raw = RawFactor {
            name: Some(name.value),
            explanation: AliasResolver::resolve(obj, &aliases::FLAT_FACTOR_EXPLANATION, parse_text)
                .map(|h| h.value),
            value: AliasResolver::resolve(obj, &aliases::FLAT_FACTOR_VALUE, parse_number)
                .map(|h| h.value),
            weight: AliasResolver::resolve(obj, &aliases::FLAT_FACTOR_WEIGHT, parse_number)
                .map(|h| h.value),
            polarity: None,
        };
        finish_factor(raw, None, default_polarity, "factors[0]", repairs)
    }

    fn balance(factors: &mut Vec<DecisionFactor>, repairs: &mut Vec<Repair>) {
        if !factors.iter().any(DecisionFactor::is_pro) {
            if let Ok(f) = DecisionFactor::new(
                "Offsetting benefit",
                2,
                3,
                "The proposal offers some benefit even though none was listed.",
            ) {
                factors.push(f);
                repairs.push(Repair::new(
                    "factors",
                    RepairAction::Balanced {
                        polarity: "positive",
                    },
                ));
            }
        }
        if !factors.iter().any(DecisionFactor::is_con) {
            if let Ok(f) = DecisionFactor::new(
                "Unstated risk",
                -2,
                3,
                "Every change carries execution risk even when none is listed.",
            ) {
                factors.push(f);
                repairs.push(Repair::new(
                    "factors",
                    RepairAction::Balanced {
                        polarity: "negative",
                    },
                ));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Factor assembly
// ════════════════════════════════════════════════════════════════════════════

/// Reads one factor entry in any supported shape.
fn raw_factor(key: Option<&str>, entry: &Value) -> Option<RawFactor> {
    match entry {
        Value::String(s) => {
            let (name, explanation) = split_label(s)?;
            Some(RawFactor {
                name: Some(key.map(str::to_string).unwrap_or(name)),
                explanation: Some(explanation),
                ..RawFactor::default()
            })
        }
        Value::Number(n) => Some(RawFactor {
            name: key.map(str::to_string),
            value: n.as_f64(),
            ..RawFactor::default()
        }),
        Value::Object(map) => Some(RawFactor {
            name: AliasResolver::resolve(map, &aliases::FACTOR_NAME, parse_text)
                .map(|h| h.value)
                .or_else(|| key.map(str::to_string)),
            explanation: AliasResolver::resolve(map, &aliases::FACTOR_EXPLANATION, parse_text)
                .map(|h| h.value),
            value: AliasResolver::resolve(map, &aliases::FACTOR_VALUE, parse_number)
                .map(|h| h.value),
            weight: AliasResolver::resolve(map, &aliases::FACTOR_WEIGHT, parse_number)
                .map(|h| h.value),
            polarity: AliasResolver::resolve(map, &aliases::FACTOR_POLARITY, parse_polarity)
                .map(|h| h.value),
        }),
        _ => None,
    }
}

/// Validates and repairs a raw factor.
fn finish_factor(
    raw: RawFactor,
    list_polarity: Option<Polarity>,
    default_polarity: Polarity,
    field: &str,
    repairs: &mut Vec<Repair>,
) -> Option<DecisionFactor> {
    if raw.name.is_none() && raw.explanation.is_none() {
        return None;
    }
    let stated = raw.polarity.or(list_polarity);
    let fallback_sign = i64::from(stated.unwrap_or(default_polarity).sign());
    let min = i64::from(FACTOR_VALUE_MIN);
    let max = i64::from(FACTOR_VALUE_MAX);

    let value = match raw.value.filter(|v| v.is_finite()) {
        Some(v) => {
            let rounded = v.round() as i64;
            let mut value = rounded.clamp(min, max);
            if value != rounded {
                repairs.push(Repair::new(
                    format!("{}.value", field),
                    RepairAction::Clamped {
                        from: rounded,
                        to: value,
                    },
                ));
            }
            if let Some(p) = stated {
                if value != 0 && value.signum() != i64::from(p.sign()) {
                    value = -value;
                    repairs.push(Repair::new(format!("{}.value", field), RepairAction::SignFlipped));
                }
            }
            if value == 0 {
                value = fallback_sign;
                repairs.push(Repair::new(
                    format!("{}.value", field),
                    RepairAction::Nudged { to: value },
                ));
            }
            value
        }
        None => {
            let value = fallback_sign * i64::from(DEFAULT_FACTOR_MAGNITUDE);
            repairs.push(Repair::new(
                format!("{}.value", field),
                RepairAction::Defaulted {
                    value: value.to_string(),
                },
            ));
            value
        }
    };

    let weight = match raw.weight.filter(|w| w.is_finite()) {
        Some(w) => {
            let rounded = w.round() as i64;
            let clamped =
                rounded.clamp(i64::from(FACTOR_WEIGHT_MIN), i64::from(FACTOR_WEIGHT_MAX));
            if clamped != rounded {
                repairs.push(Repair::new(
                    format!("{}.weight", field),
                    RepairAction::Clamped {
                        from: rounded,
                        to: clamped,
                    },
                ));
            }
            clamped as u8
        }
        None => DEFAULT_FACTOR_WEIGHT,
    };

    let (name, explanation) = match (raw.name, raw.explanation) {
        (Some(name), Some(explanation)) => (name, explanation),
        (Some(name), None) => {
            repairs.push(Repair::new(
                format!("{}.explanation", field),
                RepairAction::Derived { from: "name" },
            ));
            let explanation = generated_explanation(&name, Polarity::of_value(value));
            (name, explanation)
        }
        (None, explanation) => {
            let explanation = explanation.unwrap_or_default();
            repairs.push(Repair::new(
                format!("{}.name", field),
                RepairAction::Derived {
                    from: "explanation",
                },
            ));
            (derive_name(&explanation), explanation)
        }
    };

    DecisionFactor::new(name, value as i8, weight, explanation).ok()
}

fn generated_explanation(name: &str, polarity: Polarity) -> String {
    let stance = match polarity {
        Polarity::Positive => "supporting",
        Polarity::Negative => "opposing",
    };
    format!("{} was cited as a {} consideration.", name, stance)
}

/// Short label from the first words of a sentence.
fn derive_name(text: &str) -> String {
    let sentence = first_sentence(text);
    let words: Vec<&str> = sentence.split_whitespace().take(MAX_DERIVED_NAME_WORDS).collect();
    let name = words
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string();
    if name.is_empty() {
        "Factor".to_string()
    } else {
        name
    }
}

/// Splits `"Label: explanation"`, or derives a label from the text.
fn split_label(text: &str) -> Option<(String, String)> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some((label, rest)) = trimmed.split_once(':') {
        let (label, rest) = (label.trim(), rest.trim());
        if !label.is_empty() && !rest.is_empty() && label.chars().count() <= MAX_LABEL_CHARS {
            return Some((label.to_string(), rest.to_string()));
        }
    }
    Some((derive_name(trimmed), trimmed.to_string()))
}

/// Three placeholder factors whose balance follows the vote.
fn generic_factors(decision: VoteChoice, proposal: &ProposalContext) -> Vec<DecisionFactor> {
    let (merit, risk, fit) = match decision {
        VoteChoice::For => (6, -3, 3),
        VoteChoice::Against => (3, -6, -3),
        VoteChoice::Abstain => (4, -4, -2),
    };
    let fit_explanation = match decision {
        VoteChoice::For => "The proposal fits the voter's stated preferences.",
        VoteChoice::Against => "The proposal conflicts with the voter's stated preferences.",
        VoteChoice::Abstain => "The fit with the voter's stated preferences is unclear.",
    };

    [
        DecisionFactor::new(
            "Proposal merits",
            merit,
            7,
            format!(
                "The proposal's stated goals offer a concrete benefit to {}.",
                proposal.organization_name()
            ),
        ),
        DecisionFactor::new(
            "Implementation risk",
            risk,
            6,
            "Execution could fall short of what the proposal promises.",
        ),
        DecisionFactor::new("Persona alignment", fit, 4, fit_explanation),
    ]
    .into_iter()
    .filter_map(Result::ok)
    .collect()
}

fn repair_trace(
    decision: VoteChoice,
    confidence: i64,
    persona_match: i64,
    factors: &[DecisionFactor],
    repairs: &[Repair],
) -> String {
    let repaired = if repairs.is_empty() {
        "no repairs were needed".to_string()
    } else {
        let notes: Vec<String> = repairs.iter().map(Repair::to_string).collect();
        format!("repaired {}", notes.join("; "))
    };
    format!(
        "Decision {} at {}% confidence with {}% persona match. Pros: {}. Cons: {}. Normalization {}.",
        decision,
        confidence,
        persona_match,
        factor_listing(factors.iter().filter(|f| f.is_pro())),
        factor_listing(factors.iter().filter(|f| f.is_con())),
        repaired
    )
}

fn note_rename<T>(repairs: &mut Vec<Repair>, field: &str, hit: &Resolved<T>) {
    if !hit.is_direct() {
        repairs.push(Repair::new(
            field,
            RepairAction::Renamed {
                from: hit.key.clone(),
            },
        ));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Value parsers
// ════════════════════════════════════════════════════════════════════════════

/// Reads a vote from a short string.
pub fn parse_vote(value: &Value) -> Option<VoteChoice> {
    let text = value.as_str()?.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() || words.len() > MAX_DECISION_WORDS {
        return None;
    }

    words.iter().find_map(|word| match *word {
        "for" | "yes" | "yea" | "yay" | "aye" | "approve" | "approved" | "support" | "accept"
        | "favor" | "favour" => Some(VoteChoice::For),
        "against" | "no" | "nay" | "reject" | "rejected" | "oppose" | "deny" | "decline" => {
            Some(VoteChoice::Against)
        }
        "abstain" | "abstention" | "neutral" | "undecided" | "pass" | "skip" => {
            Some(VoteChoice::Abstain)
        }
        _ => None,
    })
}

/// A 1-100 score as read from a completion, before range checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreReading {
    pub value: f64,
    /// True when a fraction in (0, 1) was scaled to a percentage.
    pub rescaled: bool,
}

/// Reads a score from a number, `"80"`, `"80%"`, `"8/10"` or a word like `"high"`.
pub fn parse_score(value: &Value) -> Option<ScoreReading> {
    let (raw, explicit_percent) = match value {
        Value::Number(n) => (n.as_f64()?, false),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            if let Some(word_score) = qualitative_score(&s) {
                return Some(ScoreReading {
                    value: word_score,
                    rescaled: false,
                });
            }
            if let Some((num, den)) = s.split_once('/') {
                let num: f64 = num.trim().parse().ok()?;
                let den: f64 = den.trim().parse().ok()?;
                if den <= 0.0 {
                    return None;
                }
                (num / den * 100.0, true)
            } else if let Some(stripped) = s.strip_suffix('%') {
                (stripped.trim().parse().ok()?, true)
            } else {
                (s.parse().ok()?, false)
            }
        }
        _ => return None,
    };

    if !raw.is_finite() {
        return None;
    }
    if !explicit_percent && raw > 0.0 && raw < 1.0 {
        return Some(ScoreReading {
            value: raw * 100.0,
            rescaled: true,
        });
    }
    Some(ScoreReading {
        value: raw,
        rescaled: false,
    })
}

fn qualitative_score(text: &str) -> Option<f64> {
    match text {
        "very high" => Some(90.0),
        "high" => Some(80.0),
        "medium" | "moderate" => Some(60.0),
        "low" => Some(40.0),
        "very low" => Some(20.0),
        _ => None,
    }
}

/// Reads a signed number from a number or numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('+')
            .trim_end_matches('%')
            .trim()
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite()),
        _ => None,
    }
}

/// Reads non-empty text; arrays of strings are joined.
pub fn parse_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_polarity(value: &Value) -> Option<Polarity> {
    let text = value.as_str()?.trim().to_lowercase();
    match text.as_str() {
        "pro" | "positive" | "for" | "benefit" | "support" | "upside" | "strength" => {
            Some(Polarity::Positive)
        }
        "con" | "negative" | "against" | "risk" | "drawback" | "downside" | "weakness"
        | "concern" => Some(Polarity::Negative),
        _ => None,
    }
}

/// Factor entries from a list, or from a map of name to entry.
fn factor_entries(value: &Value) -> Option<Vec<(Option<&str>, &Value)>> {
    let entries: Vec<(Option<&str>, &Value)> = match value {
        Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
        Value::Object(map) if looks_like_factor(map) => vec![(None, value)],
        Value::Object(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
        _ => return None,
    };
    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

fn looks_like_factor(map: &Map<String, Value>) -> bool {
    AliasResolver::resolve(map, &aliases::FACTOR_NAME, parse_text).is_some()
        || AliasResolver::resolve(map, &aliases::FACTOR_EXPLANATION, parse_text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ProposalId;
    use serde_json::json;

    fn proposal() -> ProposalContext {
        ProposalContext::new(ProposalId::new("7").unwrap(), "Grant for Dev Tooling", "body")
    }

    fn repaired(raw: Value) -> NormalizedDecision {
        match ResponseNormalizer::normalize(&raw, &proposal()) {
            NormalizationOutcome::Repaired(n) => n,
            NormalizationOutcome::Unrepairable(reason) => panic!("unrepairable: {}", reason),
        }
    }

    fn complete() -> Value {
        json!({
            "decision": "for",
            "confidence": 82,
            "persona_match": 71,
            "reasoning": "Solid plan. Modest cost.",
            "summary": "Funds developer tooling.",
            "recommendation": "Vote for.",
            "factors": [
                {"name": "Ecosystem", "value": 6, "weight": 8, "explanation": "Better tools."},
                {"name": "Cost", "value": -3, "weight": 5, "explanation": "Spends treasury."}
            ],
            "chain_of_thought": "Weighed tools against cost."
        })
    }

    mod outcomes {
        use super::*;

        #[test]
        fn complete_response_needs_no_repairs() {
            let n = repaired(complete());
            assert!(!n.was_repaired(), "unexpected repairs: {:?}", n.repairs);
            assert_eq!(n.decision.decision(), VoteChoice::For);
            assert_eq!(n.decision.confidence().value(), 82);
            assert_eq!(n.decision.provenance(), Provenance::Llm);
            assert_eq!(n.decision.factors().len(), 2);
        }

        #[test]
        fn missing_confidence_defaults_to_75() {
            let mut raw = complete();
            raw.as_object_mut().unwrap().remove("confidence");
            let n = repaired(raw);
            assert_eq!(n.decision.confidence().value(), 75);
            assert!(n.failures().contains(&SynthesisFailure::FieldMissing {
                field: "confidence".into()
            }));
        }

        #[test]
        fn out_of_range_scores_use_defaults() {
            let mut raw = complete();
            raw["confidence"] = json!(150);
            raw["persona_match"] = json!(0);
            let n = repaired(raw);
            assert_eq!(n.decision.confidence().value(), 75);
            assert_eq!(n.decision.persona_match().value(), 65);
        }

        #[test]
        fn missing_decision_is_unrepairable() {
            let mut raw = complete();
            raw.as_object_mut().unwrap().remove("decision");
            let outcome = ResponseNormalizer::normalize(&raw, &proposal());
            assert!(matches!(outcome, NormalizationOutcome::Unrepairable(_)));
        }

        #[test]
        fn unparseable_decision_is_unrepairable() {
            let mut raw = complete();
            raw["decision"] = json!("it depends on many things we cannot know yet");
            assert!(!ResponseNormalizer::normalize(&raw, &proposal()).is_repaired());
        }

        #[test]
        fn non_object_is_unrepairable() {
            assert!(!ResponseNormalizer::normalize(&json!("for"), &proposal()).is_repaired());
            assert!(!ResponseNormalizer::normalize(&json!(42), &proposal()).is_repaired());
        }

        #[test]
        fn envelope_and_array_roots_are_unwrapped() {
            let n = repaired(json!({"result": complete()}));
            assert_eq!(n.decision.confidence().value(), 82);
            let n = repaired(json!([complete()]));
            assert_eq!(n.decision.persona_match().value(), 71);
        }
    }

    mod field_names {
        use super::*;

        #[test]
        fn run_together_keys_and_flattened_factor() {
            let n = repaired(json!({
                "proposalsummary": "x",
                "personamatch": 70,
                "decision": "for",
                "confidence": 80,
                "factorname": "A",
                "factorvalue": 5
            }));
            let d = &n.decision;
            assert_eq!(d.summary(), "x");
            assert_eq!(d.persona_match().value(), 70);
            let a = d.factors().iter().find(|f| f.name() == "A").unwrap();
            assert_eq!(a.value(), 5);
            assert!(!a.explanation().is_empty());
            assert!(d.cons().count() >= 1);
        }

        #[test]
        fn camel_case_keys_resolve() {
            let n = repaired(json!({
                "decision": "against",
                "personaMatch": 33,
                "chainOfThought": "steps",
                "factors": [{"factorName": "Risk", "factorValue": -4, "importance": 9, "description": "Unaudited."}]
            }));
            assert_eq!(n.decision.persona_match().value(), 33);
            assert_eq!(n.decision.chain_of_thought(), "steps");
            let risk = &n.decision.factors()[0];
            assert_eq!((risk.name(), risk.value(), risk.weight()), ("Risk", -4, 9));
        }

        #[test]
        fn loose_vote_strings_parse() {
            assert_eq!(parse_vote(&json!("Vote FOR")), Some(VoteChoice::For));
            assert_eq!(parse_vote(&json!("I'd reject this")), Some(VoteChoice::Against));
            assert_eq!(parse_vote(&json!("Abstain.")), Some(VoteChoice::Abstain));
            assert_eq!(parse_vote(&json!("maybe")), None);
            assert_eq!(parse_vote(&json!(1)), None);
        }
    }

    mod scores {
        use super::*;

        #[test]
        fn fractions_and_percent_strings() {
            assert_eq!(parse_score(&json!(0.8)).unwrap().value.round(), 80.0);
            assert!(parse_score(&json!(0.8)).unwrap().rescaled);
            assert_eq!(parse_score(&json!("80%")).unwrap().value, 80.0);
            assert_eq!(parse_score(&json!("8/10")).unwrap().value, 80.0);
            assert_eq!(parse_score(&json!("high")).unwrap().value, 80.0);
            assert_eq!(parse_score(&json!(1)).unwrap().value, 1.0);
            assert!(parse_score(&json!("lots")).is_none());
        }

        #[test]
        fn fractional_confidence_is_rescaled_in_decision() {
            let mut raw = complete();
            raw["confidence"] = json!(0.64);
            let n = repaired(raw);
            assert_eq!(n.decision.confidence().value(), 64);
            assert!(n.repairs.iter().any(|r| r.action == RepairAction::Rescaled));
        }
    }

    mod factors {
        use super::*;

        #[test]
        fn pros_and_cons_arrays_are_used() {
            let n = repaired(json!({
                "decision": "for",
                "pros": ["Growth: more builders", "Cheap"],
                "cons": [{"name": "Dilution", "value": 4}]
            }));
            let d = &n.decision;
            assert_eq!(d.pros().count(), 2);
            let dilution = d.factors().iter().find(|f| f.name() == "Dilution").unwrap();
            assert_eq!(dilution.value(), -4);
            let growth = d.factors().iter().find(|f| f.name() == "Growth").unwrap();
            assert_eq!(growth.explanation(), "more builders");
        }

        #[test]
        fn values_are_clamped_and_zero_nudged() {
            let n = repaired(json!({
                "decision": "for",
                "factors": [
                    {"name": "Huge", "value": 40, "weight": 50, "explanation": "x"},
                    {"name": "Flat", "value": 0, "weight": 0, "explanation": "y"},
                    {"name": "Bad", "value": -12, "explanation": "z"}
                ]
            }));
            let f = n.decision.factors();
            assert_eq!((f[0].value(), f[0].weight()), (10, 10));
            assert_eq!((f[1].value(), f[1].weight()), (1, 1));
            assert_eq!((f[2].value(), f[2].weight()), (-10, 5));
        }

        #[test]
        fn zero_nudges_toward_stated_polarity() {
            let n = repaired(json!({
                "decision": "for",
                "factors": [
                    {"name": "Up", "value": 5, "explanation": "x"},
                    {"name": "Meh", "value": 0, "type": "con", "explanation": "y"}
                ]
            }));
            assert_eq!(n.decision.factors()[1].value(), -1);
        }

        #[test]
        fn map_form_factor_list() {
            let n = repaired(json!({
                "decision": "against",
                "factors": {"Security": -7, "Reach": 3}
            }));
            let names: Vec<&str> = n.decision.factors().iter().map(|f| f.name()).collect();
            assert!(names.contains(&"Security"));
            assert!(names.contains(&"Reach"));
        }

        #[test]
        fn generic_factors_follow_decision() {
            let n = repaired(json!({"decision": "against"}));
            let f = n.decision.factors();
            assert_eq!(f.len(), 3);
            assert!(f[0].is_pro());
            assert!(f[1].is_con());
            assert!(f[2].is_con());

            let n = repaired(json!({"decision": "for"}));
            assert!(n.decision.factors()[2].is_pro());
        }

        #[test]
        fn one_sided_list_is_balanced() {
            let n = repaired(json!({
                "decision": "for",
                "factors": [{"name": "Good", "value": 5, "explanation": "x"}]
            }));
            assert_eq!(n.decision.cons().count(), 1);
            assert!(n.failures().contains(&SynthesisFailure::FactorImbalance {
                missing: "negative".into()
            }));
        }

        #[test]
        fn unreadable_entries_are_dropped() {
            let n = repaired(json!({
                "decision": "for",
                "factors": [null, {"weight": 3}, {"name": "Kept", "value": 2, "explanation": "x"}]
            }));
            assert!(n.decision.factors().iter().any(|f| f.name() == "Kept"));
            assert_eq!(
                n.repairs.iter().filter(|r| r.action == RepairAction::Dropped).count(),
                2
            );
        }
    }

    mod derived_text {
        use super::*;

        #[test]
        fn summary_comes_from_first_sentence_of_reasoning() {
            let mut raw = complete();
            raw.as_object_mut().unwrap().remove("summary");
            let n = repaired(raw);
            assert_eq!(n.decision.summary(), "Solid plan.");
        }

        #[test]
        fn recommendation_is_built_from_decision_and_confidence() {
            let mut raw = complete();
            raw.as_object_mut().unwrap().remove("recommendation");
            let n = repaired(raw);
            assert_eq!(n.decision.recommendation(), "Vote for this proposal (82% confidence).");
        }

        #[test]
        fn minimal_response_gets_every_text_field() {
            let n = repaired(json!({"decision": "abstain"}));
            let d = &n.decision;
            assert!(!d.reasoning().is_empty());
            assert!(!d.summary().is_empty());
            assert!(d.recommendation().starts_with("Abstain"));
            assert!(d.chain_of_thought().contains("Normalization repaired"));
        }
    }
}
