//! # Web Search Tool
//!
//! The search agent's only tool: a DuckDuckGo HTML search exposed to Rig as
//! `web_search`. Web search itself is not this crate's business; the tool is
//! just enough for the search agent to ground its summaries.

use std::collections::HashSet;
use std::time::Duration;

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to perform web search: {0}")]
    SearchFailed(String),

    #[error("Rate limited by search provider, please wait")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// A single hit from the results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub struct WebSearchTool {
    max_results: usize,
    endpoint: String,
    timeout: Duration,
}

impl WebSearchTool {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Point the tool at a different results page (used by tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        info!(query = %query, "Performing web search");

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
        debug!(url = %url, "Fetching search results");

        let response = client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::SearchFailed(format!("HTTP {status}")));
        }

        let body = response.text().await?;
        let hits = parse_results(&body, self.max_results);

        if hits.is_empty() {
            warn!(query = %query, "No search results found");
        } else {
            info!(query = %query, count = hits.len(), "Search completed");
        }

        Ok(hits)
    }
}

// =============================================================================
// RESULTS PAGE PARSING
// =============================================================================
/// Pull hits out of a DuckDuckGo HTML results page.
///
/// Result anchors (`result__a`) give title and link; the following
/// `result__snippet` gives the snippet. Pages without result anchors fall
/// back to bare `uddg=` redirect links.
fn parse_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let mut seen = HashSet::new();

    for block in html.split("class=\"result__a\"").skip(1) {
        if hits.len() >= limit {
            break;
        }
        let Some(url) = attribute(block, "href").and_then(resolve_link) else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }
        let title = element_text(block).unwrap_or_else(|| domain(&url).unwrap_or_default());
        let snippet = block
            .split_once("result__snippet")
            .and_then(|(_, rest)| element_text(rest))
            .unwrap_or_default();
        hits.push(SearchHit {
            title,
            url,
            snippet,
        });
    }

    if hits.is_empty() {
        for segment in html.split("uddg=").skip(1) {
            if hits.len() >= limit {
                break;
            }
            let end = segment
                .find(['&', '"', '\''])
                .unwrap_or(segment.len());
            let Some(url) = decode_target(&segment[..end]) else {
                continue;
            };
            if seen.insert(url.clone()) {
                hits.push(SearchHit {
                    title: domain(&url).unwrap_or_else(|| "Result".to_string()),
                    url,
                    snippet: String::new(),
                });
            }
        }
    }

    hits
}

/// Value of the first `name="..."` attribute in `fragment`.
fn attribute<'a>(fragment: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!("{name}=\"");
    let start = fragment.find(&marker)? + marker.len();
    let len = fragment[start..].find('"')?;
    Some(&fragment[start..start + len])
}

/// Text content of the element whose opening tag `fragment` is inside of.
fn element_text(fragment: &str) -> Option<String> {
    let start = fragment.find('>')? + 1;
    let len = fragment[start..].find("</a>")?;
    let text = decode_entities(&strip_tags(&fragment[start..start + len]));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Turn a result href into the target URL, unwrapping DuckDuckGo redirects.
fn resolve_link(href: &str) -> Option<String> {
    let href = decode_entities(href);
    if let Some((_, rest)) = href.split_once("uddg=") {
        let end = rest.find('&').unwrap_or(rest.len());
        return decode_target(&rest[..end]);
    }
    let url = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href
    };
    (url.starts_with("http") && !url.contains("duckduckgo.com")).then_some(url)
}

fn decode_target(encoded: &str) -> Option<String> {
    let url = urlencoding::decode(encoded).ok()?.into_owned();
    (url.starts_with("http") && !url.contains("duckduckgo.com")).then_some(url)
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn domain(url: &str) -> Option<String> {
    url.split("//")
        .nth(1)?
        .split('/')
        .next()
        .map(|s| s.to_string())
}

// =============================================================================
// RIG TOOL
// =============================================================================
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchArgs {
    pub query: String,
}

impl Tool for WebSearchTool {
    const NAME: &'static str = "web_search";

    type Args = SearchArgs;
    type Output = String;
    type Error = SearchError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web. Returns titles, URLs and snippets of the top results."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let hits = self.search(&args.query).await?;
        Ok(format_hits(&args.query, &hits))
    }
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for: {query}");
    }

    let formatted = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. **{}**\n   URL: {}\n   {}\n",
                i + 1,
                hit.title,
                hit.url,
                hit.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("## Search Results for: {query}\n\n{formatted}")
}
