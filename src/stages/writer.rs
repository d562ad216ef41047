//! Writer stage: one streamed call that turns the summaries into a report.
//!
//! The stream's contents are not interpreted; events only pace a list of
//! placeholder messages so the user sees that the writer is still working.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::GatewayError;
use crate::gateway::{AgentGateway, AgentRole};
use crate::progress::{ProgressReporter, StepKey};
use crate::types::{Report, SearchResultSet};

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

const OPENING_MESSAGE: &str = "Thinking about report...";

const DEFAULT_MESSAGES: [&str; 7] = [
    "Thinking about report...",
    "Planning report structure...",
    "Drafting outline...",
    "Creating sections...",
    "Cleaning up formatting...",
    "Finalizing report...",
    "Finishing report...",
];

/// Placeholder messages shown while the writer streams, and how fast they may
/// advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterPacing {
    pub messages: Vec<String>,
    pub update_interval: Duration,
}

impl Default for WriterPacing {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }
}

impl WriterPacing {
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages = messages.into_iter().map(Into::into).collect();
        self
    }
}

/// Walks the placeholder list, at most one step per update interval.
struct Ticker<'a> {
    pacing: &'a WriterPacing,
    clock: &'a dyn Clock,
    last_advance: Instant,
    next: usize,
}

impl<'a> Ticker<'a> {
    fn start(pacing: &'a WriterPacing, clock: &'a dyn Clock) -> Self {
        Self {
            pacing,
            clock,
            last_advance: clock.now(),
            next: 0,
        }
    }

    /// Called once per stream event. Returns the next message when it is due.
    fn tick(&mut self) -> Option<&'a str> {
        let message = self.pacing.messages.get(self.next)?;
        let now = self.clock.now();
        if now.saturating_duration_since(self.last_advance) < self.pacing.update_interval {
            return None;
        }
        self.next += 1;
        self.last_advance = now;
        Some(message.as_str())
    }
}

/// Have the writer agent turn `results` into a report for `query`.
pub async fn write<G, R>(
    gateway: &G,
    reporter: &R,
    pacing: &WriterPacing,
    clock: &dyn Clock,
    query: &str,
    results: &SearchResultSet,
) -> Result<Report, GatewayError>
where
    G: AgentGateway + ?Sized,
    R: ProgressReporter + ?Sized,
{
    reporter.update(StepKey::Writing, OPENING_MESSAGE, false);

    let mut stream = gateway
        .invoke_streamed(AgentRole::Writer, &results.writer_input(query))
        .await?;

    let mut ticker = Ticker::start(pacing, clock);
    let mut events = 0usize;
    while let Some(event) = stream.next_event().await {
        event?;
        events += 1;
        if let Some(message) = ticker.tick() {
            reporter.update(StepKey::Writing, message, false);
        }
    }
    debug!(events, "Writer stream finished");

    let report: Report = stream.final_output_as()?;
    if report.markdown_report.trim().is_empty() {
        return Err(GatewayError::schema(AgentRole::Writer, "markdown_report is empty"));
    }

    info!(
        chars = report.markdown_report.len(),
        references = report.references.len(),
        "Report written"
    );
    reporter.mark_done(StepKey::Writing);

    Ok(report)
}
