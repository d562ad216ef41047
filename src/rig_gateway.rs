//! # Rig Gateway
//!
//! [`AgentGateway`] backed by rig-core's OpenAI client.
//!
//! Every call builds a fresh agent for its role:
//! - planner: single prompt, JSON plan back
//! - search: prompt with the `web_search` tool and a bounded tool loop
//! - writer: streamed completion, text chunks forwarded as they arrive

use async_trait::async_trait;
use futures::StreamExt;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::{Completion, Prompt};
use rig::providers::openai;
use rig::streaming::StreamedAssistantContent;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::GatewayError;
use crate::gateway::{AgentGateway, AgentRole, AgentStream, StreamEvent};
use crate::prompts::{planner_preamble, SEARCH_PREAMBLE, WRITER_PREAMBLE};
use crate::tools::WebSearchTool;

pub struct RigGateway {
    client: openai::Client,
    config: Config,
}

impl RigGateway {
    pub fn new(config: Config) -> Self {
        let client = openai::Client::from_val(config.openai_api_key.clone().into());
        Self { client, config }
    }

    fn temperature(&self) -> f64 {
        f64::from(self.config.temperature)
    }
}

#[async_trait]
impl AgentGateway for RigGateway {
    async fn invoke(&self, role: AgentRole, input: &str) -> Result<String, GatewayError> {
        let prompt = input.to_string();
        debug!(role = %role, model = %self.config.model, "Invoking agent");

        let response = match role {
            AgentRole::Planner => {
                let agent = self
                    .client
                    .agent(&self.config.model)
                    .preamble(&planner_preamble(self.config.max_planned_searches))
                    .temperature(self.temperature())
                    .build();
                agent.prompt(&prompt).await
            }
            AgentRole::Search => {
                let tool = WebSearchTool::new(self.config.max_search_results);
                let agent = self
                    .client
                    .agent(&self.config.model)
                    .preamble(SEARCH_PREAMBLE)
                    .temperature(self.temperature())
                    .tool(tool)
                    .build();
                agent
                    .prompt(&prompt)
                    .multi_turn(self.config.search_max_turns)
                    .await
            }
            AgentRole::Writer => {
                let agent = self
                    .client
                    .agent(&self.config.model)
                    .preamble(WRITER_PREAMBLE)
                    .temperature(self.temperature())
                    .build();
                agent.prompt(&prompt).await
            }
        };

        let output = response.map_err(|e| GatewayError::agent(role, e))?;
        info!(role = %role, chars = output.len(), "Agent answered");
        Ok(output)
    }

    async fn invoke_streamed(
        &self,
        role: AgentRole,
        input: &str,
    ) -> Result<AgentStream, GatewayError> {
        if role != AgentRole::Writer {
            // Only the writer streams; everyone else answers in one piece.
            let output = self.invoke(role, input).await?;
            return Ok(AgentStream::from_complete(role, output));
        }

        let agent = self
            .client
            .agent(&self.config.model)
            .preamble(WRITER_PREAMBLE)
            .temperature(self.temperature())
            .build();

        let stream = agent
            .completion(input.to_string(), Vec::new())
            .await
            .map_err(|e| GatewayError::agent(role, e))?
            .stream()
            .await
            .map_err(|e| GatewayError::agent(role, e))?;

        let events = stream.filter_map(move |item| async move {
            match item {
                Ok(StreamedAssistantContent::Text(text)) => {
                    Some(Ok(StreamEvent::TextDelta(text.text)))
                }
                // The final response repeats nothing we need; usage only.
                Ok(StreamedAssistantContent::Final(_)) => None,
                Ok(_) => Some(Ok(StreamEvent::Activity)),
                Err(err) => Some(Err(GatewayError::agent(role, err))),
            }
        });

        info!(role = %role, "Agent stream opened");
        Ok(AgentStream::new(role, events))
    }
}

impl std::fmt::Debug for RigGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigGateway")
            .field("model", &self.config.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_gateway_is_a_gateway() {
        fn assert_gateway<T: AgentGateway>() {}
        assert_gateway::<RigGateway>();
    }

    #[tokio::test]
    #[ignore] // Requires OPENAI_API_KEY environment variable
    async fn test_planner_round_trip() {
        let config = Config::from_env().unwrap();
        config.validate().unwrap();
        let gateway = RigGateway::new(config);

        let raw = gateway
            .invoke(AgentRole::Planner, "Query: history of the Rust borrow checker")
            .await
            .unwrap();
        let plan: crate::types::SearchPlan =
            crate::gateway::parse_structured(AgentRole::Planner, &raw).unwrap();
        assert!(!plan.is_empty());
    }
}
