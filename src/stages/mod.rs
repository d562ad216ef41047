//! The three pipeline stages: plan, search, write.
//!
//! Each stage is a free function over an [`AgentGateway`](crate::gateway::AgentGateway)
//! and a [`ProgressReporter`](crate::progress::ProgressReporter); the
//! orchestrator owns both and lends them out for the duration of a stage.

pub mod planner;
pub mod search;
pub mod writer;

pub use planner::plan;
pub use search::search;
pub use writer::{write, WriterPacing};
