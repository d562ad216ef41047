//! # Research Orchestrator
//!
//! Runs the pipeline: plan, then search, then write. Each stage starts only
//! once the previous one has fully finished, so the writer always sees the
//! complete set of summaries.
//!
//! The orchestrator is generic over its progress sink. The CLI hands it a
//! console reporter, a UI hands it a dashboard reporter; the run itself is
//! the same.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use crate::clock::{Clock, SystemClock};
use crate::error::ResearchError;
use crate::gateway::AgentGateway;
use crate::progress::{ProgressReporter, StepKey};
use crate::stages::{self, WriterPacing};
use crate::types::{Report, RunContext};

pub struct ResearchOrchestrator<G, R> {
    gateway: G,
    reporter: R,
    pacing: WriterPacing,
    clock: Arc<dyn Clock>,
}

impl<G, R> ResearchOrchestrator<G, R>
where
    G: AgentGateway,
    R: ProgressReporter,
{
    pub fn new(gateway: G, reporter: R) -> Self {
        Self {
            gateway,
            reporter,
            pacing: WriterPacing::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_writer_pacing(mut self, pacing: WriterPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Replace the clock that paces the writer's progress messages.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Research `query` and return the finished report.
    ///
    /// Fails only when planning or writing fails. Individual search failures
    /// reduce the number of summaries the writer receives but never abort
    /// the run.
    pub async fn run(&self, query: &str) -> Result<Report, ResearchError> {
        let ctx = RunContext::new();
        let span = info_span!("research", correlation_id = %ctx.correlation_id);
        self.execute(&ctx, query).instrument(span).await
    }

    async fn execute(&self, ctx: &RunContext, query: &str) -> Result<Report, ResearchError> {
        info!(query = %query, started_at = %ctx.started_at, "Research run started");

        self.reporter.update(
            StepKey::Trace,
            &format!("Trace id: {}", ctx.correlation_id),
            true,
        );
        self.reporter.update(StepKey::Starting, "Starting research...", true);

        let plan = stages::plan(&self.gateway, &self.reporter, query)
            .await
            .map_err(ResearchError::Planning)?;

        let results = stages::search(&self.gateway, &self.reporter, &plan)
            .instrument(info_span!("search", planned = plan.len()))
            .await;

        let report = stages::write(
            &self.gateway,
            &self.reporter,
            &self.pacing,
            self.clock.as_ref(),
            query,
            &results,
        )
        .await
        .map_err(ResearchError::Writing)?;

        let elapsed = chrono::Utc::now() - ctx.started_at;
        info!(
            summaries = results.len(),
            planned = plan.len(),
            elapsed_ms = elapsed.num_milliseconds(),
            "Research run finished"
        );

        Ok(report)
    }
}
