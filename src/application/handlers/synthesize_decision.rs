//! SynthesizeDecisionHandler - one proposal and persona to one validated decision.
//!
//! Cache lookup, heuristic pre-screen, prompt, completion, extraction and
//! normalization, with the fallback synthesizer as the terminal path. Every
//! call returns a decision; what went wrong along the way is reported in
//! `failures`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::adapters::ai::{CompletionGateway, CompletionOutcome};
use crate::domain::analysis::HeuristicMatcher;
use crate::domain::decision::{Decision, Provenance};
use crate::domain::persona::Persona;
use crate::domain::proposal::ProposalContext;
use crate::domain::synthesis::{
    FallbackSynthesizer, NormalizationOutcome, PromptBuilder, ResponseExtractor,
    ResponseNormalizer, SynthesisFailure,
};
use crate::ports::{
    CacheKey, CompletionRequest, DecisionCache, DecisionStore, MessageRole, RequestMetadata,
};

/// Model parameters sent with every decision request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_output_tokens: 1200,
        }
    }
}

/// Command to synthesize a decision.
#[derive(Debug, Clone)]
pub struct SynthesizeDecisionCommand {
    pub proposal: ProposalContext,
    pub persona: Persona,
    /// Skip the cache lookup and replace any stored decision.
    pub force_regenerate: bool,
}

impl SynthesizeDecisionCommand {
    pub fn new(proposal: ProposalContext, persona: Persona) -> Self {
        Self {
            proposal,
            persona,
            force_regenerate: false,
        }
    }

    pub fn regenerate(mut self) -> Self {
        self.force_regenerate = true;
        self
    }
}

/// Result of synthesizing a decision.
#[derive(Debug, Clone)]
pub struct SynthesizeDecisionResult {
    pub decision: Decision,
    /// Failures encountered before the decision was produced. Empty for a
    /// clean completion or a cache hit.
    pub failures: Vec<SynthesisFailure>,
    /// Human-readable normalizer repairs, `field: action`.
    pub repairs: Vec<String>,
}

impl SynthesizeDecisionResult {
    pub fn provenance(&self) -> Provenance {
        self.decision.provenance()
    }

    pub fn from_cache(&self) -> bool {
        self.decision.provenance() == Provenance::Cache
    }

    pub fn used_fallback(&self) -> bool {
        self.decision.provenance() == Provenance::Fallback
    }
}

/// Handler for SynthesizeDecision commands.
///
/// At most one synthesis runs per cache key; a concurrent request for the
/// same key waits for it and is then served from the cache.
pub struct SynthesizeDecisionHandler {
    gateway: Arc<CompletionGateway>,
    cache: Arc<dyn DecisionCache>,
    store: Arc<dyn DecisionStore>,
    settings: CompletionSettings,
    extractor: ResponseExtractor,
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl SynthesizeDecisionHandler {
    pub fn new(
        gateway: Arc<CompletionGateway>,
        cache: Arc<dyn DecisionCache>,
        store: Arc<dyn DecisionStore>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            gateway,
            cache,
            store,
            settings,
            extractor: ResponseExtractor::new(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn handle(&self, cmd: SynthesizeDecisionCommand) -> SynthesizeDecisionResult {
        let key = CacheKey::with_persona(cmd.proposal.id.clone(), &cmd.persona);
        let key_lock = self.key_lock(&key).await;
        let guard = key_lock.lock().await;

        let result = self.synthesize(&key, cmd).await;

        drop(guard);
        self.release_key(&key, &key_lock).await;
        result
    }

    /// Whether a decision for this proposal and persona is already stored.
    pub async fn is_cached(&self, proposal: &ProposalContext, persona: &Persona) -> bool {
        let key = CacheKey::with_persona(proposal.id.clone(), persona);
        self.cache.get(&key).await.is_some()
    }

    async fn synthesize(
        &self,
        key: &CacheKey,
        cmd: SynthesizeDecisionCommand,
    ) -> SynthesizeDecisionResult {
        if !cmd.force_regenerate {
            if let Some(entry) = self.cache.get(key).await {
                debug!(cache_key = %key, "Decision cache hit");
                return SynthesizeDecisionResult {
                    decision: entry.decision.with_provenance(Provenance::Cache),
                    failures: Vec::new(),
                    repairs: Vec::new(),
                };
            }
            debug!(cache_key = %key, "Decision cache miss");
        }

        let mut failures = Vec::new();
        let mut repairs = Vec::new();

        let decision = match self.from_completion(&cmd, &mut failures, &mut repairs).await {
            Some(decision) => decision,
            None => {
                let decision = FallbackSynthesizer::synthesize(&cmd.proposal, &cmd.persona);
                info!(
                    proposal_id = %cmd.proposal.id,
                    decision = %decision.decision(),
                    reason = %failures.last().map(ToString::to_string).unwrap_or_default(),
                    "Fallback synthesizer engaged"
                );
                decision
            }
        };

        // Fallback decisions are cached too; a retry of the completion path
        // goes through `force_regenerate` or invalidation.
        self.cache.put(key.clone(), decision.clone()).await;

        if let Err(err) = self.store.save(&decision).await {
            error!(proposal_id = %cmd.proposal.id, error = %err, "Failed to store decision");
        }

        SynthesizeDecisionResult {
            decision,
            failures,
            repairs,
        }
    }

    /// Primary path. `None` sends the caller to the fallback.
    async fn from_completion(
        &self,
        cmd: &SynthesizeDecisionCommand,
        failures: &mut Vec<SynthesisFailure>,
        repairs: &mut Vec<String>,
    ) -> Option<Decision> {
        let hint = HeuristicMatcher::match_proposal(&cmd.proposal, &cmd.persona);
        let prompt = PromptBuilder::build(&cmd.proposal, &cmd.persona, Some(&hint));

        let request = CompletionRequest::new(RequestMetadata::for_proposal(cmd.proposal.id.clone()))
            .with_system_prompt(prompt.system)
            .with_message(MessageRole::User, prompt.user)
            .with_model(self.settings.model.clone())
            .with_max_tokens(self.settings.max_output_tokens)
            .with_temperature(self.settings.temperature);

        let content = match self.gateway.complete(request).await {
            CompletionOutcome::Completed { content, .. } => content,
            CompletionOutcome::Unavailable { reason } => {
                failures.push(SynthesisFailure::TransportFailure(reason));
                return None;
            }
        };

        let raw = match self.extractor.extract(&content) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(proposal_id = %cmd.proposal.id, error = %err, "Completion had no usable JSON");
                failures.push(SynthesisFailure::MalformedOutput(err.to_string()));
                return None;
            }
        };

        match ResponseNormalizer::normalize(&raw, &cmd.proposal) {
            NormalizationOutcome::Repaired(normalized) => {
                for repair in &normalized.repairs {
                    debug!(proposal_id = %cmd.proposal.id, repair = %repair, "Normalizer repair");
                }
                failures.extend(normalized.failures());
                repairs.extend(normalized.repairs.iter().map(ToString::to_string));
                Some(normalized.decision)
            }
            NormalizationOutcome::Unrepairable(reason) => {
                debug!(proposal_id = %cmd.proposal.id, reason = %reason, "Completion unrepairable");
                failures.push(SynthesisFailure::DecisionUnrepairable(reason));
                None
            }
        }
    }

    async fn key_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the key's lock once no other request holds a handle to it.
    async fn release_key(&self, key: &CacheKey, key_lock: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // One handle in the map, one held by this request.
        if Arc::strong_count(key_lock) <= 2 {
            in_flight.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{GatewayConfig, MockAIProvider, MockError, RetryPolicy};
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::{InMemoryDecisionCache, InMemoryDecisionStore};
    use crate::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
    use crate::domain::decision::VoteChoice;
    use crate::domain::foundation::{ProposalId, Timestamp};
    use crate::ports::{Clock, StoreError};
    use std::time::Duration;

    const CLEAN: &str = r#"{
        "decision": "for",
        "confidence": 82,
        "persona_match": 71,
        "reasoning": "The grant is milestone based and audited.",
        "summary": "Funds developer tooling.",
        "recommendation": "Vote for the proposal.",
        "factors": [
            {"name": "Builder growth", "value": 6, "weight": 7, "explanation": "Supports builders."},
            {"name": "Treasury cost", "value": -3, "weight": 4, "explanation": "Spends reserves."}
        ],
        "chain_of_thought": "Weighed growth against cost."
    }"#;

    struct Fixture {
        handler: Arc<SynthesizeDecisionHandler>,
        provider: MockAIProvider,
        cache: Arc<InMemoryDecisionCache>,
        store: Arc<InMemoryDecisionStore>,
    }

    fn fixture_with_store(provider: MockAIProvider, store: InMemoryDecisionStore) -> Fixture {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Timestamp::from_unix_secs(1_700_000_000)));
        let limiter = Arc::new(InMemoryRateLimiter::with_clock(
            RateLimitConfig::default(),
            clock.clone(),
        ));
        let gateway = Arc::new(CompletionGateway::new(
            Arc::new(provider.clone()),
            limiter,
            clock.clone(),
            GatewayConfig {
                retry: RetryPolicy::immediate(2),
                ..GatewayConfig::default()
            },
        ));
        let cache = Arc::new(InMemoryDecisionCache::with_clock(clock));
        let store = Arc::new(store);
        let handler = Arc::new(SynthesizeDecisionHandler::new(
            gateway,
            cache.clone(),
            store.clone(),
            CompletionSettings::default(),
        ));
        Fixture {
            handler,
            provider,
            cache,
            store,
        }
    }

    fn fixture(provider: MockAIProvider) -> Fixture {
        fixture_with_store(provider, InMemoryDecisionStore::new())
    }

    fn proposal(id: &str, title: &str) -> ProposalContext {
        ProposalContext::new(ProposalId::new(id).unwrap(), title, "Allocate funds to builders.")
            .with_organization("ExampleDAO")
    }

    fn command(id: &str, title: &str) -> SynthesizeDecisionCommand {
        SynthesizeDecisionCommand::new(proposal(id, title), Persona::neutral())
    }

    #[tokio::test]
    async fn clean_completion_yields_llm_decision() {
        let f = fixture(MockAIProvider::new().with_response(CLEAN));

        let result = f.handler.handle(command("1", "Fund tooling")).await;

        assert_eq!(result.provenance(), Provenance::Llm);
        assert_eq!(result.decision.decision(), VoteChoice::For);
        assert_eq!(result.decision.confidence().value(), 82);
        assert!(result.failures.is_empty());
        assert_eq!(f.store.save_count().await, 1);
        assert_eq!(f.cache.len().await, 1);
    }

    #[tokio::test]
    async fn request_carries_prompt_and_settings() {
        let f = fixture(MockAIProvider::new().with_response(CLEAN));

        f.handler.handle(command("1", "Fund tooling")).await;

        let calls = f.provider.get_calls();
        assert_eq!(calls.len(), 1);
        let request = &calls[0];
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(request.max_tokens, Some(1200));
        assert!(request.system_prompt.as_deref().unwrap_or_default().contains("persona_match"));
        assert!(request.messages[0].content.contains("Title: Fund tooling"));
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let f = fixture(MockAIProvider::new().with_response(CLEAN));

        let first = f.handler.handle(command("1", "Fund tooling")).await;
        let second = f.handler.handle(command("1", "Fund tooling")).await;

        assert!(second.from_cache());
        assert_eq!(second.decision.decision(), first.decision.decision());
        assert_eq!(f.provider.call_count(), 1);
    }

    #[tokio::test]
    async fn force_regenerate_bypasses_cache() {
        let f = fixture(MockAIProvider::new().with_response(CLEAN).with_response(CLEAN));

        f.handler.handle(command("1", "Fund tooling")).await;
        let again = f.handler.handle(command("1", "Fund tooling").regenerate()).await;

        assert_eq!(again.provenance(), Provenance::Llm);
        assert_eq!(f.cache.len().await, 1);
    }

    #[tokio::test]
    async fn missing_confidence_is_defaulted_without_fallback() {
        let raw = r#"{"decision": "against", "reasoning": "Too risky."}"#;
        let f = fixture(MockAIProvider::new().with_response(raw));

        let result = f.handler.handle(command("1", "Fund tooling")).await;

        assert_eq!(result.provenance(), Provenance::Llm);
        assert_eq!(result.decision.confidence().value(), 75);
        assert!(result
            .failures
            .iter()
            .any(|f| matches!(f, SynthesisFailure::FieldMissing { field } if field == "confidence")));
        assert!(result.repairs.iter().any(|r| r.starts_with("confidence")));
    }

    #[tokio::test]
    async fn missing_vote_falls_back() {
        let f = fixture(MockAIProvider::new().with_response(r#"{"confidence": 90}"#));

        let result = f.handler.handle(command("1", "Fund tooling")).await;

        assert!(result.used_fallback());
        assert!(matches!(
            result.failures.last(),
            Some(SynthesisFailure::DecisionUnrepairable(_))
        ));
    }

    #[tokio::test]
    async fn prose_completion_falls_back() {
        let f = fixture(MockAIProvider::new().with_response("I think you should vote for it."));

        let result = f.handler.handle(command("1", "Fund tooling")).await;

        assert!(result.used_fallback());
        assert!(matches!(result.failures[0], SynthesisFailure::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn transport_failure_falls_back_and_is_cached() {
        let f = fixture(MockAIProvider::failing(MockError::Timeout { timeout_secs: 60 }));

        let result = f.handler.handle(command("87", "Deploy New Treasury Allocator")).await;

        assert!(result.used_fallback());
        assert!(matches!(result.failures[0], SynthesisFailure::TransportFailure(_)));
        assert_eq!(f.cache.len().await, 1);
        assert_eq!(f.store.save_count().await, 1);

        let calls = f.provider.call_count();
        let again = f.handler.handle(command("87", "Deploy New Treasury Allocator")).await;
        assert!(again.from_cache());
        assert_eq!(again.decision.decision(), result.decision.decision());
        assert_eq!(f.provider.call_count(), calls);
        assert_eq!(f.store.save_count().await, 1);
    }

    #[tokio::test]
    async fn regenerate_retries_completion_after_fallback() {
        let f = fixture(
            MockAIProvider::new()
                .with_error(MockError::AuthenticationFailed)
                .with_response(CLEAN),
        );

        let first = f.handler.handle(command("1", "Fund tooling")).await;
        let retried = f.handler.handle(command("1", "Fund tooling").regenerate()).await;

        assert!(first.used_fallback());
        assert_eq!(retried.provenance(), Provenance::Llm);
        assert!(!f.handler.handle(command("1", "Fund tooling")).await.used_fallback());
    }

    #[tokio::test]
    async fn store_failure_does_not_change_decision() {
        let f = fixture_with_store(
            MockAIProvider::new().with_response(CLEAN),
            InMemoryDecisionStore::failing(StoreError::Unavailable("offline".into())),
        );

        let result = f.handler.handle(command("1", "Fund tooling")).await;

        assert_eq!(result.provenance(), Provenance::Llm);
        assert_eq!(result.decision.confidence().value(), 82);
    }

    #[tokio::test]
    async fn concurrent_requests_for_same_key_call_once() {
        let provider = MockAIProvider::new()
            .with_response(CLEAN)
            .with_delay(Duration::from_millis(20));
        let f = fixture(provider);

        let (a, b) = futures::future::join(
            f.handler.handle(command("1", "Fund tooling")),
            f.handler.handle(command("1", "Fund tooling")),
        )
        .await;

        assert_eq!(f.provider.call_count(), 1);
        assert!(a.from_cache() != b.from_cache());
        assert!(f.handler.in_flight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn is_cached_reflects_cache_state() {
        let f = fixture(MockAIProvider::new().with_response(CLEAN));
        let p = proposal("1", "Fund tooling");

        assert!(!f.handler.is_cached(&p, &Persona::neutral()).await);
        f.handler.handle(command("1", "Fund tooling")).await;
        assert!(f.handler.is_cached(&p, &Persona::neutral()).await);
    }
}
