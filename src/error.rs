//! # Error Types
//!
//! Library-level errors for the research pipeline.
//!
//! Only two failures ever escape a run: planning and writing. Search task
//! failures are absorbed inside the search stage and never show up here.

use thiserror::Error;

use crate::gateway::AgentRole;

/// Errors raised at the Agent Gateway boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The agent call itself failed (network, provider, tool loop, ...).
    #[error("{role} agent failed: {message}")]
    Agent { role: AgentRole, message: String },

    /// The agent answered, but the answer could not be coerced into the
    /// structured result the role requires.
    #[error("{role} agent returned output that does not match the expected schema: {message}")]
    Schema { role: AgentRole, message: String },

    /// The final result of a streamed call was read before the stream ended.
    #[error("{role} stream was read before it finished")]
    StreamIncomplete { role: AgentRole },
}

impl GatewayError {
    pub fn agent(role: AgentRole, err: impl std::fmt::Display) -> Self {
        Self::Agent {
            role,
            message: err.to_string(),
        }
    }

    pub fn schema(role: AgentRole, err: impl std::fmt::Display) -> Self {
        Self::Schema {
            role,
            message: err.to_string(),
        }
    }

    /// The role whose call produced this error.
    pub fn role(&self) -> AgentRole {
        match self {
            Self::Agent { role, .. }
            | Self::Schema { role, .. }
            | Self::StreamIncomplete { role } => *role,
        }
    }
}

/// Fatal outcomes of a research run.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("planning failed: {0}")]
    Planning(#[source] GatewayError),

    #[error("report writing failed: {0}")]
    Writing(#[source] GatewayError),
}
