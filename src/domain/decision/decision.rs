//! Decision aggregate: the validated voting recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::factor::{is_balanced, DecisionFactor};
use crate::domain::foundation::{ProposalId, Score, ValidationError};

/// The vote being recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::For => "for",
            VoteChoice::Against => "against",
            VoteChoice::Abstain => "abstain",
        }
    }

    /// +1 for `for`, -1 for `against`, 0 for `abstain`.
    pub fn polarity(&self) -> i8 {
        match self {
            VoteChoice::For => 1,
            VoteChoice::Against => -1,
            VoteChoice::Abstain => 0,
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "for" => Ok(VoteChoice::For),
            "against" => Ok(VoteChoice::Against),
            "abstain" => Ok(VoteChoice::Abstain),
            other => Err(ValidationError::invalid_format(
                "decision",
                format!("unknown vote choice '{}'", other),
            )),
        }
    }
}

/// How a decision was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Parsed (and possibly repaired) from a completion.
    Llm,
    /// Synthesized deterministically without a completion.
    Fallback,
    /// Served from the decision cache.
    Cache,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::Llm => "llm",
            Provenance::Fallback => "fallback",
            Provenance::Cache => "cache",
        };
        write!(f, "{}", s)
    }
}

/// Unvalidated decision fields. Converted with [`Decision::from_draft`].
#[derive(Debug, Clone)]
pub struct DecisionDraft {
    pub proposal_id: ProposalId,
    pub decision: VoteChoice,
    pub confidence: i64,
    pub persona_match: i64,
    pub reasoning: String,
    pub summary: String,
    pub recommendation: String,
    pub factors: Vec<DecisionFactor>,
    pub chain_of_thought: String,
    pub provenance: Provenance,
}

/// A complete voting recommendation.
///
/// A value of this type always satisfies every field invariant: scores in
/// 1-100, non-empty text fields, and a factor list with at least one pro and
/// one con.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    proposal_id: ProposalId,
    decision: VoteChoice,
    confidence: Score,
    persona_match: Score,
    reasoning: String,
    summary: String,
    recommendation: String,
    factors: Vec<DecisionFactor>,
    chain_of_thought: String,
    provenance: Provenance,
}

impl Decision {
    /// Validates a draft into a decision.
    pub fn from_draft(draft: DecisionDraft) -> Result<Self, ValidationError> {
        let confidence = Score::checked("confidence", draft.confidence)?;
        let persona_match = Score::checked("persona_match", draft.persona_match)?;
        let reasoning = non_empty("reasoning", draft.reasoning)?;
        let summary = non_empty("summary", draft.summary)?;
        let recommendation = non_empty("recommendation", draft.recommendation)?;

        if draft.factors.is_empty() {
            return Err(ValidationError::empty_field("factors"));
        }
        if !is_balanced(&draft.factors) {
            return Err(ValidationError::invalid_format(
                "factors",
                "requires at least one positive and one negative factor",
            ));
        }

        Ok(Self {
            proposal_id: draft.proposal_id,
            decision: draft.decision,
            confidence,
            persona_match,
            reasoning,
            summary,
            recommendation,
            factors: draft.factors,
            chain_of_thought: draft.chain_of_thought.trim().to_string(),
            provenance: draft.provenance,
        })
    }

    /// Copy of this decision with a different provenance.
    pub fn with_provenance(&self, provenance: Provenance) -> Self {
        Self {
            provenance,
            ..self.clone()
        }
    }

    pub fn proposal_id(&self) -> &ProposalId {
        &self.proposal_id
    }

    pub fn decision(&self) -> VoteChoice {
        self.decision
    }

    pub fn confidence(&self) -> Score {
        self.confidence
    }

    pub fn persona_match(&self) -> Score {
        self.persona_match
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }

    pub fn factors(&self) -> &[DecisionFactor] {
        &self.factors
    }

    pub fn chain_of_thought(&self) -> &str {
        &self.chain_of_thought
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Factors with positive value.
    pub fn pros(&self) -> impl Iterator<Item = &DecisionFactor> {
        self.factors.iter().filter(|f| f.is_pro())
    }

    /// Factors with negative value.
    pub fn cons(&self) -> impl Iterator<Item = &DecisionFactor> {
        self.factors.iter().filter(|f| f.is_con())
    }
}

fn non_empty(field: &str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors() -> Vec<DecisionFactor> {
        vec![
            DecisionFactor::new("Upside", 6, 8, "Grows the ecosystem").unwrap(),
            DecisionFactor::new("Cost", -3, 5, "Spends treasury").unwrap(),
        ]
    }

    fn draft() -> DecisionDraft {
        DecisionDraft {
            proposal_id: ProposalId::new("1").unwrap(),
            decision: VoteChoice::For,
            confidence: 80,
            persona_match: 70,
            reasoning: "Solid plan.".into(),
            summary: "Funds grants.".into(),
            recommendation: "Vote for.".into(),
            factors: factors(),
            chain_of_thought: "trace".into(),
            provenance: Provenance::Llm,
        }
    }

    #[test]
    fn from_draft_accepts_complete_draft() {
        let decision = Decision::from_draft(draft()).unwrap();
        assert_eq!(decision.decision(), VoteChoice::For);
        assert_eq!(decision.confidence().value(), 80);
        assert_eq!(decision.pros().count(), 1);
        assert_eq!(decision.cons().count(), 1);
    }

    #[test]
    fn from_draft_rejects_out_of_range_scores() {
        let mut d = draft();
        d.confidence = 0;
        assert_eq!(Decision::from_draft(d).unwrap_err().field(), "confidence");

        let mut d = draft();
        d.persona_match = 101;
        assert_eq!(Decision::from_draft(d).unwrap_err().field(), "persona_match");
    }

    #[test]
    fn from_draft_rejects_blank_text() {
        let mut d = draft();
        d.summary = "   ".into();
        assert_eq!(Decision::from_draft(d).unwrap_err().field(), "summary");
    }

    #[test]
    fn from_draft_rejects_unbalanced_factors() {
        let mut d = draft();
        d.factors.retain(|f| f.is_pro());
        assert_eq!(Decision::from_draft(d).unwrap_err().field(), "factors");

        let mut d = draft();
        d.factors.clear();
        assert_eq!(Decision::from_draft(d).unwrap_err().field(), "factors");
    }

    #[test]
    fn with_provenance_changes_only_provenance() {
        let decision = Decision::from_draft(draft()).unwrap();
        let cached = decision.with_provenance(Provenance::Cache);
        assert_eq!(cached.provenance(), Provenance::Cache);
        assert_eq!(cached.reasoning(), decision.reasoning());
    }

    #[test]
    fn vote_choice_parses_strictly() {
        assert_eq!("FOR".parse::<VoteChoice>().unwrap(), VoteChoice::For);
        assert_eq!(" abstain ".parse::<VoteChoice>().unwrap(), VoteChoice::Abstain);
        assert!("maybe".parse::<VoteChoice>().is_err());
    }

    #[test]
    fn decision_serializes_camel_case() {
        let json = serde_json::to_value(Decision::from_draft(draft()).unwrap()).unwrap();
        assert_eq!(json["proposalId"], "1");
        assert_eq!(json["personaMatch"], 70);
        assert_eq!(json["decision"], "for");
        assert_eq!(json["provenance"], "llm");
        assert_eq!(json["factors"][1]["value"], -3);
        assert!(json.get("chainOfThought").is_some());
    }
}
