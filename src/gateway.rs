//! # Agent Gateway
//!
//! The boundary between the pipeline and whatever actually runs the agents.
//!
//! A gateway takes a role and an input string. It either answers in one go
//! ([`AgentGateway::invoke`]) or hands back an [`AgentStream`] whose events
//! are observed first and whose final output is read afterwards from the same
//! handle ([`AgentGateway::invoke_streamed`]).
//!
//! Gateways return raw text; the stages coerce it into their structured
//! result with [`parse_structured`].

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::GatewayError;

/// The agents the pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Planner,
    Search,
    Writer,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Search => "search",
            Self::Writer => "writer",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event observed on a streamed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of the agent's output text.
    TextDelta(String),
    /// Anything else the runtime reports (tool activity, reasoning, ...).
    /// Carries no output text.
    Activity,
}

type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send>>;

/// Handle to a streamed agent call.
///
/// Text deltas are accumulated as they pass through [`AgentStream::next_event`];
/// once the stream is exhausted the accumulated text is the final output.
pub struct AgentStream {
    role: AgentRole,
    inner: EventStream,
    output: String,
    finished: bool,
}

impl AgentStream {
    pub fn new<S>(role: AgentRole, stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static,
    {
        Self {
            role,
            inner: Box::pin(stream),
            output: String::new(),
            finished: false,
        }
    }

    /// A stream that emits the given output as a single delta.
    pub fn from_complete(role: AgentRole, output: impl Into<String>) -> Self {
        let event = StreamEvent::TextDelta(output.into());
        Self::new(role, futures::stream::once(async move { Ok(event) }))
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    /// Next event, or `None` once the stream is exhausted.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, GatewayError>> {
        if self.finished {
            return None;
        }
        match self.inner.next().await {
            Some(Ok(event)) => {
                if let StreamEvent::TextDelta(text) = &event {
                    self.output.push_str(text);
                }
                Some(Ok(event))
            }
            Some(Err(err)) => Some(Err(err)),
            None => {
                self.finished = true;
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Raw final output. Only available after the stream has been drained.
    pub fn final_output(&self) -> Result<&str, GatewayError> {
        if self.finished {
            Ok(&self.output)
        } else {
            Err(GatewayError::StreamIncomplete { role: self.role })
        }
    }

    /// Final output coerced into `T`.
    pub fn final_output_as<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        parse_structured(self.role, self.final_output()?)
    }
}

impl fmt::Debug for AgentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentStream")
            .field("role", &self.role)
            .field("buffered", &self.output.len())
            .field("finished", &self.finished)
            .finish()
    }
}

/// Runs agents on behalf of the pipeline stages.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Run `role` on `input` and wait for its final output.
    async fn invoke(&self, role: AgentRole, input: &str) -> Result<String, GatewayError>;

    /// Run `role` on `input`, streaming its progress.
    async fn invoke_streamed(
        &self,
        role: AgentRole,
        input: &str,
    ) -> Result<AgentStream, GatewayError>;
}

#[async_trait]
impl<G: AgentGateway + ?Sized> AgentGateway for std::sync::Arc<G> {
    async fn invoke(&self, role: AgentRole, input: &str) -> Result<String, GatewayError> {
        (**self).invoke(role, input).await
    }

    async fn invoke_streamed(
        &self,
        role: AgentRole,
        input: &str,
    ) -> Result<AgentStream, GatewayError> {
        (**self).invoke_streamed(role, input).await
    }
}

// =============================================================================
// STRUCTURED OUTPUT
// =============================================================================
/// Coerce an agent's raw answer into `T`.
///
/// Models wrap JSON in prose or in a fenced block often enough that a strict
/// parse would fail most runs, so the outermost `{...}` object is extracted
/// before deserializing.
pub fn parse_structured<T: DeserializeOwned>(
    role: AgentRole,
    raw: &str,
) -> Result<T, GatewayError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| GatewayError::schema(role, "no JSON object found in agent output"))?;
    serde_json::from_str(json).map_err(|e| GatewayError::schema(role, e))
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Report, SearchPlan};

    #[test]
    fn test_parse_structured_plain_json() {
        let plan: SearchPlan = parse_structured(
            AgentRole::Planner,
            r#"{"searches": [{"search_term": "a", "rationale": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_parse_structured_fenced_block() {
        let raw = "Here is the report:\n```json\n{\"markdown_report\": \"# R\", \"references\": [\"https://x.dev\"]}\n```\n";
        let report: Report = parse_structured(AgentRole::Writer, raw).unwrap();
        assert_eq!(report.markdown_report, "# R");
        assert_eq!(report.references, vec!["https://x.dev".to_string()]);
    }

    #[test]
    fn test_parse_structured_schema_mismatch() {
        let err =
            parse_structured::<Report>(AgentRole::Writer, r#"{"title": "nope"}"#).unwrap_err();
        assert!(matches!(err, GatewayError::Schema { role: AgentRole::Writer, .. }));

        let err = parse_structured::<Report>(AgentRole::Writer, "no json here").unwrap_err();
        assert!(matches!(err, GatewayError::Schema { .. }));
    }

    #[tokio::test]
    async fn test_agent_stream_accumulates_deltas() {
        let events = vec![
            Ok(StreamEvent::TextDelta("{\"markdown_report\":".into())),
            Ok(StreamEvent::Activity),
            Ok(StreamEvent::TextDelta(" \"done\"}".into())),
        ];
        let mut stream = AgentStream::new(AgentRole::Writer, futures::stream::iter(events));

        assert!(matches!(
            stream.final_output(),
            Err(GatewayError::StreamIncomplete { .. })
        ));

        let mut seen = 0;
        while let Some(event) = stream.next_event().await {
            event.unwrap();
            seen += 1;
        }
        assert_eq!(seen, 3);
        assert!(stream.is_finished());

        let report: Report = stream.final_output_as().unwrap();
        assert_eq!(report.markdown_report, "done");
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_from_complete_yields_single_delta() {
        let mut stream = AgentStream::from_complete(AgentRole::Writer, "hello");
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            StreamEvent::TextDelta("hello".into())
        );
        assert!(stream.next_event().await.is_none());
        assert_eq!(stream.final_output().unwrap(), "hello");
    }
}
