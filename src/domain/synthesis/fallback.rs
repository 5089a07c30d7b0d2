//! Fallback Synthesizer - deterministic decisions without a completion.
//!
//! Used whenever the completion path cannot produce a decision. Output is a
//! pure function of (proposal id, title, persona), so repeated calls for the
//! same inputs are identical.

use crate::domain::decision::{Decision, DecisionDraft, DecisionFactor, Provenance, VoteChoice};
use crate::domain::foundation::Score;
use crate::domain::persona::{AxisLevel, Persona, PersonaAxis, PersonaDescriptor};
use crate::domain::proposal::{ProposalCategory, ProposalContext};

use super::narrative::{factor_listing, recommendation_text, vote_phrase};
use super::seed::{confidence_jitter, match_jitter, pick, proposal_seed};
use super::templates::{templates_for, FactorTemplate};

use AxisLevel::{High, Low};
use PersonaAxis::{EsgFocus, ParticipationFrequency, Risk, TimeHorizon, TreasuryConservatism};
use ProposalCategory::{Chain, Funding, Governance, Integration, Treasury, Upgrade};

pub const BASE_CONFIDENCE: i64 = 72;
pub const BASE_PERSONA_MATCH: i64 = 68;
pub const CONFIDENCE_RANGE: (i64, i64) = (30, 98);
pub const PERSONA_MATCH_RANGE: (i64, i64) = (25, 97);

/// Persona match at or above this votes for.
pub const FOR_THRESHOLD: i64 = 55;
/// Persona match at or below this votes against.
pub const AGAINST_THRESHOLD: i64 = 40;

/// A signed score adjustment applied when a persona axis is at `level`
/// for a proposal of `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub category: ProposalCategory,
    pub axis: PersonaAxis,
    pub level: AxisLevel,
    pub confidence: i64,
    pub persona_match: i64,
}

const fn adj(
    category: ProposalCategory,
    axis: PersonaAxis,
    level: AxisLevel,
    confidence: i64,
    persona_match: i64,
) -> Adjustment {
    Adjustment {
        category,
        axis,
        level,
        confidence,
        persona_match,
    }
}

/// Persona/category adjustment table.
pub const ADJUSTMENTS: &[Adjustment] = &[
    adj(Funding, Risk, Low, -7, -8),
    adj(Funding, TreasuryConservatism, High, -4, -10),
    adj(Funding, Risk, High, 0, 5),
    adj(Upgrade, Risk, High, 9, 8),
    adj(Upgrade, Risk, Low, 0, -5),
    adj(Upgrade, TimeHorizon, High, 0, 6),
    adj(Integration, Risk, High, 0, 6),
    adj(Integration, TimeHorizon, High, 4, 0),
    adj(Integration, Risk, Low, -3, 0),
    adj(Treasury, TreasuryConservatism, High, 5, 4),
    adj(Treasury, Risk, High, 0, -4),
    adj(Treasury, TimeHorizon, High, 0, 3),
    adj(Chain, Risk, Low, -6, -7),
    adj(Chain, Risk, High, 0, 7),
    adj(Chain, EsgFocus, High, 0, -3),
    adj(Governance, ParticipationFrequency, High, 3, 8),
    adj(Governance, ParticipationFrequency, Low, 0, -4),
];

/// Deterministic decision synthesis.
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    /// Synthesizes a decision for a proposal and persona.
    ///
    /// # Algorithm
    /// 1. seed = rolling hash of the proposal id
    /// 2. category from title keywords
    /// 3. confidence = 72 + adjustments + jitter, clamped to [30, 98]
    /// 4. persona match = 68 + adjustments + jitter, clamped to [25, 97]
    /// 5. match >= 55 votes for, <= 40 against, otherwise abstain
    /// 6. three factors picked from the category templates by seed
    pub fn synthesize(proposal: &ProposalContext, persona: &Persona) -> Decision {
        let seed = proposal_seed(proposal.id.as_str());
        let category = ProposalCategory::classify(&proposal.title);
        let (confidence_delta, match_delta) = Self::adjustment(category, persona);

        let confidence = (BASE_CONFIDENCE + confidence_delta + confidence_jitter(seed))
            .clamp(CONFIDENCE_RANGE.0, CONFIDENCE_RANGE.1);
        let persona_match = (BASE_PERSONA_MATCH + match_delta + match_jitter(seed))
            .clamp(PERSONA_MATCH_RANGE.0, PERSONA_MATCH_RANGE.1);
        let decision = Self::decide(persona_match);

        let factors = Self::factors(category, seed);
        let draft = Self::draft(
            proposal,
            persona,
            category,
            decision,
            Score::clamped(confidence),
            Score::clamped(persona_match),
            factors,
        );

        Decision::from_draft(draft)
            .expect("fallback templates always yield a balanced, in-range decision")
    }

    /// Summed (confidence, persona match) adjustments for a persona.
    pub fn adjustment(category: ProposalCategory, persona: &Persona) -> (i64, i64) {
        ADJUSTMENTS
            .iter()
            .filter(|a| a.category == category && persona.level(a.axis) == a.level)
            .fold((0, 0), |(c, m), a| (c + a.confidence, m + a.persona_match))
    }

    /// Vote from a persona match score.
    pub fn decide(persona_match: i64) -> VoteChoice {
        if persona_match >= FOR_THRESHOLD {
            VoteChoice::For
        } else if persona_match <= AGAINST_THRESHOLD {
            VoteChoice::Against
        } else {
            VoteChoice::Abstain
        }
    }

    /// Strong positive, negative and weak positive factor, in that order.
    pub fn factors(category: ProposalCategory, seed: u64) -> Vec<DecisionFactor> {
        let pools = templates_for(category);
        let strong = pools.strong[pick(seed, 1, pools.strong.len())];
        let negative = pools.negative[pick(seed, 3, pools.negative.len())];
        let weak = pools.weak[pick(seed, 5, pools.weak.len())];

        let strong_value = 7 + (seed % 2) as i8;
        let negative_value = -(4 + ((seed / 11) % 3) as i8);
        let weak_value = 2 + ((seed / 13) % 2) as i8;

        [
            (strong, strong_value, 8u8),
            (negative, negative_value, 6u8),
            (weak, weak_value, 4u8),
        ]
        .into_iter()
        .filter_map(|(tpl, value, weight)| Self::factor(tpl, value, weight))
        .collect()
    }

    fn factor(tpl: FactorTemplate, value: i8, weight: u8) -> Option<DecisionFactor> {
        DecisionFactor::new(tpl.name, value, weight, tpl.explanation).ok()
    }

    fn draft(
        proposal: &ProposalContext,
        persona: &Persona,
        category: ProposalCategory,
        decision: VoteChoice,
        confidence: Score,
        persona_match: Score,
        factors: Vec<DecisionFactor>,
    ) -> DecisionDraft {
        let title = if proposal.title.trim().is_empty() {
            "This proposal"
        } else {
            proposal.title.trim()
        };
        let summary = format!(
            "{} is a {} for {}.",
            title,
            category.display_name(),
            proposal.organization_name()
        );

        let strongest = factors.iter().find(|f| f.is_pro());
        let concern = factors.iter().find(|f| f.is_con());
        let risk_label = PersonaDescriptor::label_for(Risk, persona.level(Risk));
        let treasury_label =
            PersonaDescriptor::label_for(TreasuryConservatism, persona.level(TreasuryConservatism));
        let reasoning = format!(
            "As a {}, this proposal is weighed on {} against {}. For a {} voter with {} treasury preferences the persona match is {}, so the recommendation is to {}.",
            category.display_name(),
            strongest.map_or("its benefits", |f| f.name()),
            concern.map_or("its risks", |f| f.name()),
            risk_label,
            treasury_label,
            persona_match,
            vote_phrase(decision)
        );

        let chain_of_thought = format!(
            "Category: {}. Pros: {}. Cons: {}. Decision: {} (confidence {}, persona match {}).",
            category.display_name(),
            factor_listing(factors.iter().filter(|f| f.is_pro())),
            factor_listing(factors.iter().filter(|f| f.is_con())),
            decision,
            confidence,
            persona_match
        );

        DecisionDraft {
            proposal_id: proposal.id.clone(),
            decision,
            confidence: i64::from(confidence.value()),
            persona_match: i64::from(persona_match.value()),
            reasoning,
            summary,
            recommendation: recommendation_text(decision, confidence.value()),
            factors,
            chain_of_thought,
            provenance: Provenance::Fallback,
        }
    }
}
