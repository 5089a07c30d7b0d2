//! Batch runner for the governance advisor.
//!
//! # Usage
//!
//! ```bash
//! governance-advisor proposals.json [persona.json]
//! ```
//!
//! `proposals.json` is an array of proposal records; `persona.json` holds the
//! five sliders (defaults to all 50). Decisions are printed to stdout as JSON
//! in file order, logs go to stderr.

use std::error::Error;
use std::sync::Arc;

use governance_advisor::adapters::ai::{CompletionGateway, OpenAIProvider};
use governance_advisor::adapters::memory::{
    InMemoryDecisionCache, InMemoryDecisionStore, InMemoryProposalFeed,
};
use governance_advisor::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
use governance_advisor::adapters::SystemClock;
use governance_advisor::application::{
    AnalyzeBatchCommand, AnalyzeBatchHandler, SynthesizeDecisionHandler,
};
use governance_advisor::config::{AppConfig, ConfigValidationError, LogConfig};
use governance_advisor::domain::persona::Persona;
use governance_advisor::ports::Clock;
use tracing::info;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.log);
    config.validate()?;

    let mut args = std::env::args().skip(1);
    let proposals_path = args
        .next()
        .ok_or("usage: governance-advisor <proposals.json> [persona.json]")?;
    let persona = match args.next() {
        Some(path) => serde_json::from_str::<Persona>(&tokio::fs::read_to_string(path).await?)?,
        None => Persona::neutral(),
    };

    let provider_config = config
        .ai
        .openai_config()
        .ok_or(ConfigValidationError::MissingRequired("GOVERNANCE_ADVISOR__AI__API_KEY"))?;
    let provider = Arc::new(OpenAIProvider::new(provider_config)?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let limiter = Arc::new(InMemoryRateLimiter::with_clock(
        RateLimitConfig::per_minute(config.ai.calls_per_minute),
        clock.clone(),
    ));
    let gateway = Arc::new(CompletionGateway::new(
        provider,
        limiter,
        clock.clone(),
        config.gateway(),
    ));
    let synthesizer = Arc::new(SynthesizeDecisionHandler::new(
        gateway.clone(),
        Arc::new(InMemoryDecisionCache::with_clock(clock)),
        Arc::new(InMemoryDecisionStore::new()),
        config.ai.completion_settings(),
    ));

    // File order is kept; the batch size cap drops trailing proposals.
    let proposals = InMemoryProposalFeed::from_json_file(&proposals_path)
        .await?
        .all()
        .await;
    let batch = AnalyzeBatchHandler::new(synthesizer, config.batch.settings());

    info!(
        proposals = %proposals_path,
        count = proposals.len(),
        persona = %persona.fingerprint(),
        "Starting batch"
    );
    let result = batch
        .handle(AnalyzeBatchCommand::new(proposals, persona))
        .await?;

    let stats = gateway.stats().await;
    info!(
        network_calls = stats.network_calls,
        cache_hits = stats.cache_hits,
        budget_overruns = stats.budget_overruns,
        "Completion gateway totals"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(log.env_filter())
        .with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
