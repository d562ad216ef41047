//! # Research Pipeline
//!
//! Plan, search, write: a three-stage research pipeline where each stage is
//! delegated to a language-model agent.
//!
//! ```text
//! query ─▶ planner ─▶ search × N (concurrent) ─▶ writer ─▶ report
//!              │              │                    │
//!              └──────────────┴─── progress ───────┘
//! ```
//!
//! - [`ResearchOrchestrator`] sequences the stages and owns the run's
//!   correlation id.
//! - [`AgentGateway`] is the seam to the agent runtime; [`RigGateway`] is the
//!   production implementation.
//! - [`ProgressReporter`] receives progress; [`ConsoleReporter`] and
//!   [`DashboardReporter`] are the two front-end sinks.
//!
//! ## Quick Start
//! ```rust,ignore
//! use research_pipeline::{Config, ConsoleReporter, ResearchOrchestrator, RigGateway};
//!
//! let config = Config::from_env()?;
//! config.validate()?;
//! let orchestrator =
//!     ResearchOrchestrator::new(RigGateway::new(config), ConsoleReporter::stdout());
//! let report = orchestrator.run("impact of remote work on city centers").await?;
//! println!("{}", report.markdown_report);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod rig_gateway;
pub mod stages;
pub mod tools;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{GatewayError, ResearchError};
pub use gateway::{parse_structured, AgentGateway, AgentRole, AgentStream, StreamEvent};
pub use orchestrator::ResearchOrchestrator;
pub use progress::{
    ConsoleReporter, Dashboard, DashboardReporter, ProgressEvent, ProgressReporter, StepKey,
    StepStatus,
};
pub use rig_gateway::RigGateway;
pub use stages::WriterPacing;
pub use types::{Report, RunContext, SearchPlan, SearchResultSet, SearchSummary, SearchTask};
