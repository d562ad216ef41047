//! # Configuration
//!
//! Settings come from the environment, with a `.env` file picked up for
//! local development. Everything has a default except the OpenAI API key,
//! which must be present before the pipeline is allowed to start.

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

/// Runtime configuration for the pipeline and its agents.
#[derive(Clone)]
pub struct Config {
    /// Credential for the agent gateway (OPENAI_API_KEY)
    pub openai_api_key: String,

    /// Model used by all three agents
    pub model: String,

    /// Sampling temperature, 0.0 ..= 2.0
    pub temperature: f32,

    /// Results returned by one web search tool call
    pub max_search_results: usize,

    /// Upper bound on the number of searches the planner is asked for
    pub max_planned_searches: usize,

    /// Tool-call rounds a search agent may take before answering
    pub search_max_turns: usize,

    /// Minimum time between writer progress messages
    pub writer_update_interval: Duration,

    /// Tracing filter directives, from `RUST_LOG`
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_search_results: 5,
            max_planned_searches: 5,
            search_max_turns: 5,
            writer_update_interval: Duration::from_secs(5),
            log_level: "info".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.openai_api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Config")
            .field("openai_api_key", &key)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_search_results", &self.max_search_results)
            .field("max_planned_searches", &self.max_planned_searches)
            .field("search_max_turns", &self.search_max_turns)
            .field("writer_update_interval", &self.writer_update_interval)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(val) = lookup("OPENAI_API_KEY") {
            config.openai_api_key = val.trim().to_string();
        }

        if let Some(val) = lookup("RESEARCH_MODEL") {
            config.model = val;
        }

        if let Some(val) = lookup("TEMPERATURE") {
            config.temperature = val
                .parse()
                .context("TEMPERATURE must be a valid floating-point number (e.g., 0.7)")?;
        }

        if let Some(val) = lookup("MAX_SEARCH_RESULTS") {
            config.max_search_results = val
                .parse()
                .context("MAX_SEARCH_RESULTS must be a valid positive integer")?;
        }

        if let Some(val) = lookup("MAX_PLANNED_SEARCHES") {
            config.max_planned_searches = val
                .parse()
                .context("MAX_PLANNED_SEARCHES must be a valid positive integer")?;
        }

        if let Some(val) = lookup("SEARCH_MAX_TURNS") {
            config.search_max_turns = val
                .parse()
                .context("SEARCH_MAX_TURNS must be a valid positive integer")?;
        }

        if let Some(val) = lookup("WRITER_UPDATE_INTERVAL_SECS") {
            let secs: u64 = val
                .parse()
                .context("WRITER_UPDATE_INTERVAL_SECS must be a whole number of seconds")?;
            config.writer_update_interval = Duration::from_secs(secs);
        }

        if let Some(val) = lookup("RUST_LOG") {
            config.log_level = val;
        }

        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.is_empty() {
            anyhow::bail!("OPENAI_API_KEY is not set (export it or add it to .env)");
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "Temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            );
        }

        if self.max_search_results == 0 {
            anyhow::bail!("MAX_SEARCH_RESULTS must be at least 1");
        }

        if self.max_planned_searches == 0 {
            anyhow::bail!("MAX_PLANNED_SEARCHES must be at least 1");
        }

        if self.search_max_turns == 0 {
            anyhow::bail!("SEARCH_MAX_TURNS must be at least 1");
        }

        if self.writer_update_interval.is_zero() {
            anyhow::bail!("WRITER_UPDATE_INTERVAL_SECS must be at least 1");
        }

        if self.model.is_empty() {
            anyhow::bail!("RESEARCH_MODEL cannot be empty");
        }

        Ok(())
    }
}
