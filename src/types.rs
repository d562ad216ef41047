//! # Pipeline Data Model
//!
//! Plain data passed between the stages: the plan produced by the planner,
//! the summaries produced by the search stage, the final report and the
//! per-run context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// PLAN
// =============================================================================
/// One search the planner wants performed.
///
/// Agents tend to answer with `query`/`reason`, so those names are accepted
/// as aliases when coercing planner output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTask {
    #[serde(alias = "query")]
    pub search_term: String,

    #[serde(alias = "reason", default)]
    pub rationale: String,
}

impl SearchTask {
    pub fn new(search_term: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            rationale: rationale.into(),
        }
    }

    /// The text handed to the search agent for this task.
    pub fn agent_input(&self) -> String {
        format!(
            "Search term: {}\nReason for searching: {}",
            self.search_term, self.rationale
        )
    }
}

/// Ordered list of searches. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlan {
    pub searches: Vec<SearchTask>,
}

impl SearchPlan {
    pub fn new(searches: Vec<SearchTask>) -> Self {
        Self { searches }
    }

    pub fn len(&self) -> usize {
        self.searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }

    /// Every task must carry a non-blank search term.
    pub fn validate(&self) -> Result<(), String> {
        match self
            .searches
            .iter()
            .position(|task| task.search_term.trim().is_empty())
        {
            Some(index) => Err(format!("search #{} has an empty search term", index + 1)),
            None => Ok(()),
        }
    }
}

// =============================================================================
// SEARCH RESULTS
// =============================================================================
/// Digest of one completed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchSummary(pub String);

impl SearchSummary {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SearchSummary {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SearchSummary {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Summaries of the searches that succeeded, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResultSet {
    summaries: Vec<SearchSummary>,
}

impl SearchResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, summary: SearchSummary) {
        self.summaries.push(summary);
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchSummary> {
        self.summaries.iter()
    }

    /// Summary texts, in the order they were collected.
    pub fn texts(&self) -> Vec<&str> {
        self.summaries.iter().map(SearchSummary::as_str).collect()
    }

    /// Text handed to the writer agent.
    pub fn writer_input(&self, query: &str) -> String {
        // Serializing a Vec<String> cannot fail
        let summaries = serde_json::to_string(&self.summaries).unwrap_or_else(|_| "[]".into());
        format!("Original query: {query}\nSummarized search results: {summaries}")
    }
}

impl FromIterator<SearchSummary> for SearchResultSet {
    fn from_iter<I: IntoIterator<Item = SearchSummary>>(iter: I) -> Self {
        Self {
            summaries: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================
/// Final output of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub markdown_report: String,

    #[serde(default)]
    pub references: Vec<String>,
}

impl Report {
    /// Whether every reference URL already appears somewhere in the markdown.
    /// Vacuously true when there are no references.
    pub fn has_inline_references(&self) -> bool {
        self.references
            .iter()
            .all(|url| self.markdown_report.contains(url.as_str()))
    }
}

// =============================================================================
// RUN CONTEXT
// =============================================================================
/// Identity of one pipeline execution. Never reused across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub correlation_id: String,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            correlation_id: format!("trace_{}", Uuid::new_v4().simple()),
            started_at: Utc::now(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
