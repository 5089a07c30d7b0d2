//! End-to-end tests for the decision pipeline.
//!
//! Drives the public handlers with a scripted completion provider, a manual
//! clock and the in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use governance_advisor::adapters::ai::{
    CompletionGateway, GatewayConfig, MockAIProvider, MockError, MockResponse, RetryPolicy,
};
use governance_advisor::adapters::clock::ManualClock;
use governance_advisor::adapters::memory::{
    InMemoryDecisionCache, InMemoryDecisionStore, InMemoryProposalFeed,
};
use governance_advisor::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
use governance_advisor::application::handlers::{
    AnalyzeBatchCommand, AnalyzeBatchHandler, BatchSettings, CompletionSettings,
    InvalidateDecisionCommand, InvalidateDecisionHandler, SynthesizeDecisionCommand,
    SynthesizeDecisionHandler,
};
use governance_advisor::domain::decision::{Provenance, VoteChoice};
use governance_advisor::domain::foundation::{ProposalId, Timestamp};
use governance_advisor::domain::persona::Persona;
use governance_advisor::domain::proposal::ProposalContext;
use governance_advisor::ports::{Clock, DecisionCache, DecisionStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Pipeline {
    handler: Arc<SynthesizeDecisionHandler>,
    gateway: Arc<CompletionGateway>,
    provider: MockAIProvider,
    cache: Arc<InMemoryDecisionCache>,
    store: Arc<InMemoryDecisionStore>,
    clock: ManualClock,
}

fn pipeline(provider: MockAIProvider) -> Pipeline {
    let clock = ManualClock::new(Timestamp::from_unix_secs(1_700_000_000));
    let clock_port: Arc<dyn Clock> = Arc::new(clock.clone());
    let limiter = Arc::new(InMemoryRateLimiter::with_clock(
        RateLimitConfig::per_minute(20),
        clock_port.clone(),
    ));
    let gateway = Arc::new(CompletionGateway::new(
        Arc::new(provider.clone()),
        limiter,
        clock_port.clone(),
        GatewayConfig {
            retry: RetryPolicy::immediate(3),
            ..GatewayConfig::default()
        },
    ));
    let cache = Arc::new(InMemoryDecisionCache::with_clock(clock_port));
    let store = Arc::new(InMemoryDecisionStore::new());
    let handler = Arc::new(SynthesizeDecisionHandler::new(
        gateway.clone(),
        cache.clone(),
        store.clone(),
        CompletionSettings::default(),
    ));
    Pipeline {
        handler,
        gateway,
        provider,
        cache,
        store,
        clock,
    }
}

fn proposal(id: &str, title: &str) -> ProposalContext {
    ProposalContext::new(ProposalId::new(id).unwrap(), title, "")
}

fn treasury_allocator() -> ProposalContext {
    proposal("87", "Deploy New Treasury Allocator")
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn gateway_failure_produces_treasury_fallback() {
    let p = pipeline(MockAIProvider::failing(MockError::Unavailable {
        message: "service down".into(),
    }));

    let result = p
        .handler
        .handle(SynthesizeDecisionCommand::new(treasury_allocator(), Persona::neutral()))
        .await;

    let decision = &result.decision;
    assert_eq!(decision.provenance(), Provenance::Fallback);
    assert_eq!(decision.decision(), VoteChoice::For);
    assert!(decision.summary().contains("treasury management"));
    assert_eq!(decision.factors().len(), 3);
    assert!(decision
        .factors()
        .iter()
        .all(|f| f.name().contains("Treasury Delta") && f.explanation().contains("Treasury Delta")));
    assert_eq!(p.provider.call_count(), 3);
}

#[tokio::test]
async fn fallback_is_identical_across_runs() {
    let first = pipeline(MockAIProvider::failing(MockError::AuthenticationFailed));
    let second = pipeline(MockAIProvider::failing(MockError::AuthenticationFailed));
    let cmd = SynthesizeDecisionCommand::new(treasury_allocator(), Persona::neutral());

    let a = first.handler.handle(cmd.clone()).await.decision;
    let b = second.handler.handle(cmd).await.decision;

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[tokio::test]
async fn second_identical_request_makes_no_network_call() {
    let p = pipeline(MockAIProvider::new().with_response(
        r#"{"decision": "against", "confidence": 64, "reasoning": "Unclear budget."}"#,
    ));
    let cmd = SynthesizeDecisionCommand::new(proposal("12", "Fund a hackathon"), Persona::neutral());

    let first = p.handler.handle(cmd.clone()).await;
    let calls_after_first = p.provider.call_count();
    let second = p.handler.handle(cmd).await;

    assert_eq!(first.decision.provenance(), Provenance::Llm);
    assert_eq!(second.decision.provenance(), Provenance::Cache);
    assert_eq!(second.decision.decision(), VoteChoice::Against);
    assert_eq!(p.provider.call_count(), calls_after_first);
}

#[tokio::test]
async fn repeat_request_during_outage_is_served_from_cache() {
    let p = pipeline(MockAIProvider::failing(MockError::Timeout { timeout_secs: 60 }));
    let cmd = SynthesizeDecisionCommand::new(treasury_allocator(), Persona::neutral());

    let first = p.handler.handle(cmd.clone()).await;
    let calls_after_first = p.provider.call_count();
    let second = p.handler.handle(cmd).await;

    assert_eq!(first.decision.provenance(), Provenance::Fallback);
    assert_eq!(calls_after_first, 3);
    assert_eq!(second.decision.provenance(), Provenance::Cache);
    assert_eq!(second.decision.decision(), first.decision.decision());
    assert_eq!(second.decision.factors(), first.decision.factors());
    assert_eq!(p.provider.call_count(), calls_after_first);
    assert_eq!(p.store.save_count().await, 1);
}

#[tokio::test]
async fn flattened_misnamed_fields_are_repaired() {
    let raw = r#"{"proposalsummary":"x","personamatch":70,"decision":"for","confidence":80,"factorname":"A","factorvalue":5}"#;
    let p = pipeline(MockAIProvider::new().with_response(raw));

    let result = p
        .handler
        .handle(SynthesizeDecisionCommand::new(proposal("5", "Fund tooling"), Persona::neutral()))
        .await;

    let decision = &result.decision;
    assert_eq!(decision.provenance(), Provenance::Llm);
    assert_eq!(decision.summary(), "x");
    assert_eq!(decision.persona_match().value(), 70);
    assert_eq!(decision.confidence().value(), 80);
    let factor = decision.factors().iter().find(|f| f.name() == "A").unwrap();
    assert_eq!(factor.value(), 5);
    assert!(decision.pros().count() >= 1);
    assert!(decision.cons().count() >= 1);
}

#[tokio::test]
async fn missing_confidence_defaults_to_75() {
    let p = pipeline(MockAIProvider::new().with_response(r#"{"decision": "abstain"}"#));

    let result = p
        .handler
        .handle(SynthesizeDecisionCommand::new(proposal("6", "Rename a committee"), Persona::neutral()))
        .await;

    assert_eq!(result.decision.provenance(), Provenance::Llm);
    assert_eq!(result.decision.decision(), VoteChoice::Abstain);
    assert_eq!(result.decision.confidence().value(), 75);
}

#[tokio::test]
async fn missing_vote_falls_back() {
    let p = pipeline(MockAIProvider::new().with_response(r#"{"confidence": 90, "reasoning": "?"}"#));

    let result = p
        .handler
        .handle(SynthesizeDecisionCommand::new(treasury_allocator(), Persona::neutral()))
        .await;

    assert_eq!(result.decision.provenance(), Provenance::Fallback);
}

#[tokio::test]
async fn markdown_wrapped_completion_is_parsed() {
    let completion = "## Analysis\n```json\n{\"decision\": \"FOR\", \"confidence\": \"85%\"}\n```";
    let p = pipeline(MockAIProvider::new().with_response(completion));

    let result = p
        .handler
        .handle(SynthesizeDecisionCommand::new(proposal("9", "Upgrade the oracle"), Persona::neutral()))
        .await;

    assert_eq!(result.decision.provenance(), Provenance::Llm);
    assert_eq!(result.decision.decision(), VoteChoice::For);
    assert_eq!(result.decision.confidence().value(), 85);
}

#[tokio::test]
async fn every_decision_is_persisted() {
    let p = pipeline(MockAIProvider::failing(MockError::AuthenticationFailed));

    p.handler
        .handle(SynthesizeDecisionCommand::new(treasury_allocator(), Persona::neutral()))
        .await;

    let stored = p.store.find(&ProposalId::new("87").unwrap()).await.unwrap();
    assert_eq!(stored.map(|d| d.provenance()), Some(Provenance::Fallback));
}

#[tokio::test]
async fn invalidation_forces_fresh_synthesis() {
    let p = pipeline(
        MockAIProvider::new()
            .with_response(r#"{"decision": "for"}"#)
            .with_response(r#"{"decision": "against"}"#),
    );
    let cmd = SynthesizeDecisionCommand::new(proposal("14", "Fund a grant"), Persona::neutral());
    p.handler.handle(cmd.clone()).await;

    let invalidate = InvalidateDecisionHandler::new(p.cache.clone());
    let removed = invalidate
        .handle(InvalidateDecisionCommand {
            proposal_id: ProposalId::new("14").unwrap(),
        })
        .await;
    assert_eq!(removed.removed, 1);
    assert_eq!(p.cache.len().await, 0);

    // The completion cache still holds the first answer for this prompt.
    let again = p.handler.handle(cmd).await;
    assert_eq!(again.decision.provenance(), Provenance::Llm);
    assert_eq!(again.decision.decision(), VoteChoice::For);

    p.gateway.clear_cache().await;
    p.cache.invalidate(&ProposalId::new("14").unwrap()).await;
    let fresh = p
        .handler
        .handle(SynthesizeDecisionCommand::new(proposal("14", "Fund a grant"), Persona::neutral()))
        .await;
    assert_eq!(fresh.decision.decision(), VoteChoice::Against);
}

#[tokio::test]
async fn completion_cache_expires_after_a_day() {
    let p = pipeline(
        MockAIProvider::new()
            .with_response(r#"{"decision": "for"}"#)
            .with_response(r#"{"decision": "against"}"#),
    );
    let cmd = SynthesizeDecisionCommand::new(proposal("15", "Fund a grant"), Persona::neutral());

    p.handler.handle(cmd.clone()).await;
    p.clock.advance(Duration::from_secs(24 * 60 * 60 + 1));
    let later = p.handler.handle(cmd.regenerate()).await;

    assert_eq!(later.decision.decision(), VoteChoice::Against);
    assert_eq!(p.provider.call_count(), 2);
}

#[tokio::test]
async fn budget_overrun_is_advisory() {
    let p = pipeline(MockAIProvider::new().when_exhausted(MockResponse::text(r#"{"decision": "for"}"#)));

    for i in 0..25 {
        let id = format!("b{}", i);
        let title = format!("Fund grant round {}", i);
        let result = p
            .handler
            .handle(SynthesizeDecisionCommand::new(proposal(&id, &title), Persona::neutral()))
            .await;
        assert_eq!(result.decision.provenance(), Provenance::Llm);
    }

    let stats = p.gateway.stats().await;
    assert_eq!(stats.network_calls, 25);
    assert_eq!(stats.budget_overruns, 5);
}

#[tokio::test]
async fn batch_from_feed_mixes_llm_fallback_and_cache() {
    let p = pipeline(
        MockAIProvider::new()
            .with_response(r#"{"decision": "for"}"#)
            .with_response("no json here"),
    );
    let mut first = proposal("1", "Fund tooling");
    first.start = Some(Timestamp::from_unix_secs(300));
    let mut second = proposal("2", "Deploy to a new chain");
    second.start = Some(Timestamp::from_unix_secs(200));
    let feed = Arc::new(InMemoryProposalFeed::new(vec![second, first]));
    let batch = AnalyzeBatchHandler::new(p.handler.clone(), BatchSettings::unpaced(25)).with_feed(feed);

    let run = batch
        .handle(AnalyzeBatchCommand::from_feed(10, Persona::neutral()))
        .await
        .unwrap();

    assert_eq!(run.summary.total, 2);
    assert_eq!(run.items[0].decision.proposal_id().as_str(), "1");
    assert_eq!(run.items[0].decision.provenance(), Provenance::Llm);
    assert_eq!(run.items[1].decision.provenance(), Provenance::Fallback);
    assert!(!run.items[1].failures.is_empty());

    let rerun = batch
        .handle(AnalyzeBatchCommand::from_feed(10, Persona::neutral()))
        .await
        .unwrap();
    assert_eq!(rerun.summary.from_cache, 2);
    assert_eq!(p.provider.call_count(), 2);
    assert_eq!(p.store.save_count().await, 2);
}
