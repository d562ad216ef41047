//! Shared fixtures: a scripted gateway and a reporter that records everything.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use research_pipeline::{
    AgentGateway, AgentRole, AgentStream, GatewayError, ManualClock, ProgressEvent,
    ProgressReporter, StepKey, StreamEvent,
};

// =============================================================================
// SCRIPTED GATEWAY
// =============================================================================
enum WriterScript {
    Chunks(Vec<String>),
    OpenError(String),
    MidStreamError(Vec<String>),
}

/// Gateway whose answers are fixed up front.
///
/// Search answers are keyed by search term and may be delayed; run tests with
/// a paused tokio clock so the delays decide completion order exactly.
pub struct ScriptedGateway {
    planner: Result<String, String>,
    searches: HashMap<String, (Duration, Result<String, String>)>,
    writer: WriterScript,
    writer_clock: Option<(Arc<ManualClock>, Duration)>,
    calls: Mutex<Vec<(AgentRole, String)>>,
}

pub fn plan_json(terms: &[&str]) -> String {
    let searches: Vec<_> = terms
        .iter()
        .map(|term| serde_json::json!({"query": term, "reason": format!("because {term}")}))
        .collect();
    serde_json::json!({ "searches": searches }).to_string()
}

pub fn report_json(markdown: &str, references: &[&str]) -> String {
    serde_json::json!({ "markdown_report": markdown, "references": references }).to_string()
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            planner: Ok(plan_json(&[])),
            searches: HashMap::new(),
            writer: WriterScript::Chunks(vec![report_json("# Report\n\nNothing found.", &[])]),
            writer_clock: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn plan(mut self, terms: &[&str]) -> Self {
        self.planner = Ok(plan_json(terms));
        self
    }

    pub fn planner_raw(mut self, raw: &str) -> Self {
        self.planner = Ok(raw.to_string());
        self
    }

    pub fn planner_error(mut self, message: &str) -> Self {
        self.planner = Err(message.to_string());
        self
    }

    pub fn search_ok(mut self, term: &str, summary: &str, delay_ms: u64) -> Self {
        self.searches.insert(
            term.to_string(),
            (Duration::from_millis(delay_ms), Ok(summary.to_string())),
        );
        self
    }

    pub fn search_err(mut self, term: &str, message: &str, delay_ms: u64) -> Self {
        self.searches.insert(
            term.to_string(),
            (Duration::from_millis(delay_ms), Err(message.to_string())),
        );
        self
    }

    /// Stream `output` to the writer in `pieces` roughly equal chunks.
    pub fn writer_output(mut self, output: &str, pieces: usize) -> Self {
        self.writer = WriterScript::Chunks(split(output, pieces));
        self
    }

    pub fn writer_open_error(mut self, message: &str) -> Self {
        self.writer = WriterScript::OpenError(message.to_string());
        self
    }

    pub fn writer_mid_stream_error(mut self, chunks: &[&str]) -> Self {
        self.writer = WriterScript::MidStreamError(chunks.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Advance `clock` by `step` before each writer event is delivered.
    pub fn writer_clock(mut self, clock: Arc<ManualClock>, step: Duration) -> Self {
        self.writer_clock = Some((clock, step));
        self
    }

    pub fn calls(&self) -> Vec<(AgentRole, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, role: AgentRole) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, input)| input)
            .collect()
    }

    fn record(&self, role: AgentRole, input: &str) {
        self.calls.lock().unwrap().push((role, input.to_string()));
    }
}

fn split(text: &str, pieces: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = chars.len().div_ceil(pieces.max(1)).max(1);
    let mut chunks: Vec<String> = chars.chunks(size).map(|c| c.iter().collect()).collect();
    // Pad with empty deltas so the event count is exactly `pieces`
    while chunks.len() < pieces {
        chunks.push(String::new());
    }
    chunks
}

#[async_trait]
impl AgentGateway for ScriptedGateway {
    async fn invoke(&self, role: AgentRole, input: &str) -> Result<String, GatewayError> {
        self.record(role, input);
        match role {
            AgentRole::Planner => self
                .planner
                .clone()
                .map_err(|e| GatewayError::agent(role, e)),
            AgentRole::Search => {
                let term = input
                    .lines()
                    .next()
                    .and_then(|line| line.strip_prefix("Search term: "))
                    .unwrap_or_default();
                let (delay, outcome) = self
                    .searches
                    .get(term)
                    .cloned()
                    .unwrap_or((Duration::ZERO, Err(format!("unscripted search: {term}"))));
                tokio::time::sleep(delay).await;
                outcome.map_err(|e| GatewayError::agent(role, e))
            }
            AgentRole::Writer => Err(GatewayError::agent(role, "writer must be streamed")),
        }
    }

    async fn invoke_streamed(
        &self,
        role: AgentRole,
        input: &str,
    ) -> Result<AgentStream, GatewayError> {
        self.record(role, input);

        let events: Vec<Result<StreamEvent, GatewayError>> = match &self.writer {
            WriterScript::OpenError(message) => {
                return Err(GatewayError::agent(role, message));
            }
            WriterScript::Chunks(chunks) => chunks
                .iter()
                .map(|c| Ok(StreamEvent::TextDelta(c.clone())))
                .collect(),
            WriterScript::MidStreamError(chunks) => chunks
                .iter()
                .map(|c| Ok(StreamEvent::TextDelta(c.clone())))
                .chain(std::iter::once(Err(GatewayError::agent(role, "connection reset"))))
                .collect(),
        };

        let clock = self.writer_clock.clone();
        let stream = futures::stream::iter(events).inspect(move |_| {
            if let Some((clock, step)) = &clock {
                clock.advance(*step);
            }
        });

        Ok(AgentStream::new(role, stream))
    }
}

// =============================================================================
// RECORDING REPORTER
// =============================================================================
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Update(ProgressEvent),
    Done(StepKey),
    Fraction(StepKey, f32),
}

#[derive(Default)]
pub struct RecordingReporter {
    log: Mutex<Vec<Recorded>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// Updates and completions for `step`, as events, in order.
    pub fn events(&self, step: StepKey) -> Vec<ProgressEvent> {
        self.log()
            .into_iter()
            .filter_map(|entry| match entry {
                Recorded::Update(event) if event.step_key == step => Some(event),
                Recorded::Done(key) if key == step => Some(ProgressEvent::new(key, "", true)),
                _ => None,
            })
            .collect()
    }

    pub fn fractions(&self, step: StepKey) -> Vec<f32> {
        self.log()
            .into_iter()
            .filter_map(|entry| match entry {
                Recorded::Fraction(key, value) if key == step => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn update(&self, step: StepKey, message: &str, done: bool) {
        self.log
            .lock()
            .unwrap()
            .push(Recorded::Update(ProgressEvent::new(step, message, done)));
    }

    fn mark_done(&self, step: StepKey) {
        self.log.lock().unwrap().push(Recorded::Done(step));
    }

    fn set_fraction(&self, step: StepKey, fraction: f32) {
        self.log
            .lock()
            .unwrap()
            .push(Recorded::Fraction(step, fraction));
    }
}
