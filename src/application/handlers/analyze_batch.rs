//! AnalyzeBatchHandler - sequential decisions for a list of proposals.
//!
//! Each proposal is processed end to end before the next. A random stagger
//! is awaited before every proposal that will not be served from the cache,
//! which spreads completion calls out under the per-minute budget.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::decision::{Decision, Provenance};
use crate::domain::persona::Persona;
use crate::domain::proposal::ProposalContext;
use crate::domain::synthesis::SynthesisFailure;
use crate::ports::{FeedError, ProposalFeed};

use super::synthesize_decision::{SynthesizeDecisionCommand, SynthesizeDecisionHandler};

pub const DEFAULT_STAGGER_MIN: Duration = Duration::from_millis(1000);
pub const DEFAULT_STAGGER_MAX: Duration = Duration::from_millis(3000);
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;

/// Pacing and size limits for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    /// Bounds of the random delay before each uncached proposal.
    pub stagger: RangeInclusive<Duration>,
    /// Proposals beyond this count are skipped.
    pub max_batch_size: usize,
}

impl BatchSettings {
    /// No stagger. For tests.
    pub fn unpaced(max_batch_size: usize) -> Self {
        Self {
            stagger: Duration::ZERO..=Duration::ZERO,
            max_batch_size,
        }
    }

    /// A delay drawn uniformly from the stagger range.
    pub fn jitter(&self) -> Duration {
        let min = self.stagger.start().as_millis() as u64;
        let max = self.stagger.end().as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            stagger: DEFAULT_STAGGER_MIN..=DEFAULT_STAGGER_MAX,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

/// Where the batch's proposals come from.
#[derive(Debug, Clone)]
pub enum BatchSource {
    Proposals(Vec<ProposalContext>),
    /// The feed's most recent proposals.
    Feed { limit: usize },
}

/// Command to analyze a batch of proposals for one persona.
#[derive(Debug, Clone)]
pub struct AnalyzeBatchCommand {
    pub source: BatchSource,
    pub persona: Persona,
    pub force_regenerate: bool,
}

impl AnalyzeBatchCommand {
    pub fn new(proposals: Vec<ProposalContext>, persona: Persona) -> Self {
        Self {
            source: BatchSource::Proposals(proposals),
            persona,
            force_regenerate: false,
        }
    }

    pub fn from_feed(limit: usize, persona: Persona) -> Self {
        Self {
            source: BatchSource::Feed { limit },
            persona,
            force_regenerate: false,
        }
    }
}

/// One proposal's outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub decision: Decision,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

/// Provenance counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub from_llm: usize,
    pub from_fallback: usize,
    pub from_cache: usize,
    /// Proposals dropped for exceeding the batch size.
    pub skipped: usize,
}

impl BatchSummary {
    fn record(&mut self, provenance: Provenance) {
        self.total += 1;
        match provenance {
            Provenance::Llm => self.from_llm += 1,
            Provenance::Fallback => self.from_fallback += 1,
            Provenance::Cache => self.from_cache += 1,
        }
    }
}

/// Result of a batch, items in input order.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeBatchResult {
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Error)]
pub enum AnalyzeBatchError {
    #[error("batch source needs a proposal feed but none is configured")]
    NoFeed,

    #[error("proposal feed failed: {0}")]
    Feed(#[from] FeedError),
}

/// Handler for AnalyzeBatch commands.
pub struct AnalyzeBatchHandler {
    synthesizer: Arc<SynthesizeDecisionHandler>,
    feed: Option<Arc<dyn ProposalFeed>>,
    settings: BatchSettings,
}

impl AnalyzeBatchHandler {
    pub fn new(synthesizer: Arc<SynthesizeDecisionHandler>, settings: BatchSettings) -> Self {
        Self {
            synthesizer,
            feed: None,
            settings,
        }
    }

    pub fn with_feed(mut self, feed: Arc<dyn ProposalFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub async fn handle(
        &self,
        cmd: AnalyzeBatchCommand,
    ) -> Result<AnalyzeBatchResult, AnalyzeBatchError> {
        let mut proposals = match cmd.source {
            BatchSource::Proposals(proposals) => proposals,
            BatchSource::Feed { limit } => {
                let feed = self.feed.as_ref().ok_or(AnalyzeBatchError::NoFeed)?;
                feed.recent(limit).await?
            }
        };

        let mut summary = BatchSummary::default();
        if proposals.len() > self.settings.max_batch_size {
            summary.skipped = proposals.len() - self.settings.max_batch_size;
            warn!(
                requested = proposals.len(),
                max_batch_size = self.settings.max_batch_size,
                "Batch too large, trailing proposals skipped"
            );
            proposals.truncate(self.settings.max_batch_size);
        }

        let mut items = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let cached = !cmd.force_regenerate
                && self.synthesizer.is_cached(&proposal, &cmd.persona).await;
            if !cached {
                let delay = self.settings.jitter();
                if !delay.is_zero() {
                    debug!(proposal_id = %proposal.id, delay_ms = delay.as_millis() as u64, "Pacing");
                    sleep(delay).await;
                }
            }

            let command = SynthesizeDecisionCommand {
                proposal,
                persona: cmd.persona,
                force_regenerate: cmd.force_regenerate,
            };
            let result = self.synthesizer.handle(command).await;

            summary.record(result.decision.provenance());
            items.push(BatchItem {
                failures: result.failures.iter().map(SynthesisFailure::to_string).collect(),
                decision: result.decision,
            });
        }

        info!(
            total = summary.total,
            llm = summary.from_llm,
            fallback = summary.from_fallback,
            cache = summary.from_cache,
            skipped = summary.skipped,
            "Batch analyzed"
        );

        Ok(AnalyzeBatchResult { items, summary })
    }
}
