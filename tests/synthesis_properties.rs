//! Property tests for the network-free parts of the pipeline.

use governance_advisor::domain::analysis::HeuristicMatcher;
use governance_advisor::domain::decision::{Decision, Provenance};
use governance_advisor::domain::foundation::ProposalId;
use governance_advisor::domain::persona::{Persona, PersonaSliders};
use governance_advisor::domain::proposal::ProposalContext;
use governance_advisor::domain::synthesis::{
    parse_score, FallbackSynthesizer, NormalizationOutcome, ResponseExtractor, ResponseNormalizer,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn persona_strategy() -> impl Strategy<Value = Persona> {
    (0u8..=100, 0u8..=100, 0u8..=100, 0u8..=100, 0u8..=100).prop_map(
        |(risk, esg_focus, treasury_conservatism, time_horizon, participation_frequency)| {
            Persona::clamped(PersonaSliders {
                risk,
                esg_focus,
                treasury_conservatism,
                time_horizon,
                participation_frequency,
            })
        },
    )
}

fn proposal(id: &str, title: &str, body: &str) -> ProposalContext {
    ProposalContext::new(ProposalId::new(id).unwrap(), title, body)
}

fn assert_well_formed(decision: &Decision) -> Result<(), TestCaseError> {
    prop_assert!((1..=100).contains(&decision.confidence().value()));
    prop_assert!((1..=100).contains(&decision.persona_match().value()));
    prop_assert!(!decision.reasoning().trim().is_empty());
    prop_assert!(!decision.summary().trim().is_empty());
    prop_assert!(!decision.recommendation().trim().is_empty());
    prop_assert!(!decision.factors().is_empty());
    prop_assert!(decision.factors().iter().all(|f| f.value() != 0));
    prop_assert!(decision.factors().iter().all(|f| (1..=10).contains(&f.weight())));
    prop_assert!(decision.pros().count() >= 1);
    prop_assert!(decision.cons().count() >= 1);
    Ok(())
}

fn vote_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("for"),
        Just("Against"),
        Just("ABSTAIN"),
        Just("yes"),
        Just("vote against"),
    ]
}

fn loose_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        (-2.0f64..200.0).prop_map(|n| json!(n)),
        "[a-z %0-9/]{0,12}".prop_map(|s| json!(s)),
        Just(Value::Null),
        Just(json!(true)),
    ]
}

fn factor_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("[A-Za-z ]{0,16}"),
        proptest::option::of(-30i64..30),
        proptest::option::of(-5i64..20),
        proptest::option::of("[A-Za-z .]{0,40}"),
    )
        .prop_map(|(name, value, weight, explanation)| {
            let mut obj = serde_json::Map::new();
            if let Some(name) = name {
                obj.insert("name".into(), json!(name));
            }
            if let Some(value) = value {
                obj.insert("value".into(), json!(value));
            }
            if let Some(weight) = weight {
                obj.insert("weight".into(), json!(weight));
            }
            if let Some(explanation) = explanation {
                obj.insert("explanation".into(), json!(explanation));
            }
            Value::Object(obj)
        })
}

proptest! {
    /// Heuristic score stays within 0-100 for any persona and text.
    #[test]
    fn prop_heuristic_score_in_range(persona in persona_strategy(), text in ".{0,400}") {
        let result = HeuristicMatcher::match_proposal(&proposal("1", "Proposal", &text), &persona);
        prop_assert!(result.score <= 100);
        for axis in &result.factors {
            prop_assert!(axis.score <= 100);
            prop_assert!(axis.position <= 100);
        }
    }

    /// Fallback output depends only on its inputs and is always well formed.
    #[test]
    fn prop_fallback_deterministic_and_valid(
        id in "[A-Za-z0-9x]{1,66}",
        title in "[A-Za-z ]{0,60}",
        persona in persona_strategy(),
    ) {
        let p = proposal(&id, &title, "");
        let first = FallbackSynthesizer::synthesize(&p, &persona);
        let second = FallbackSynthesizer::synthesize(&p, &persona);

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        prop_assert_eq!(first.provenance(), Provenance::Fallback);
        assert_well_formed(&first)?;
    }

    /// A completion with a readable vote is always repaired into a valid decision.
    #[test]
    fn prop_normalizer_repairs_any_object_with_vote(
        vote in vote_strategy(),
        confidence in proptest::option::of(loose_value()),
        persona_match in proptest::option::of(loose_value()),
        factors in proptest::option::of(proptest::collection::vec(factor_strategy(), 0..6)),
        reasoning in proptest::option::of(loose_value()),
    ) {
        let mut raw = json!({ "decision": vote });
        if let Some(v) = confidence {
            raw["confidence"] = v;
        }
        if let Some(v) = persona_match {
            raw["persona_match"] = v;
        }
        if let Some(list) = factors {
            raw["factors"] = Value::Array(list);
        }
        if let Some(v) = reasoning {
            raw["reasoning"] = v;
        }

        match ResponseNormalizer::normalize(&raw, &proposal("7", "Fund tooling", "Body")) {
            NormalizationOutcome::Repaired(normalized) => {
                prop_assert_eq!(normalized.decision.provenance(), Provenance::Llm);
                assert_well_formed(&normalized.decision)?;
            }
            NormalizationOutcome::Unrepairable(reason) => {
                prop_assert!(false, "unexpected unrepairable: {}", reason);
            }
        }
    }

    /// A completion without any vote field is never repaired.
    #[test]
    fn prop_normalizer_rejects_missing_vote(confidence in 1i64..100) {
        let raw = json!({ "confidence": confidence, "reasoning": "No verdict given." });
        let outcome = ResponseNormalizer::normalize(&raw, &proposal("7", "Fund tooling", "Body"));
        prop_assert!(!outcome.is_repaired());
    }

    /// Extraction and score parsing never panic on arbitrary text.
    #[test]
    fn prop_extraction_total(text in ".{0,300}") {
        let _ = ResponseExtractor::new().extract(&text);
        let _ = parse_score(&json!(text));
    }
}
