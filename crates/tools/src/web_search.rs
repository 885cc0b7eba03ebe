//! Web search: live lookups for real-time or current information.
//!
//! The tool talks to a [`SearchBackend`]. The shipped backend queries the
//! DuckDuckGo Instant Answer API.

use async_trait::async_trait;
use cortex_core::error::ToolError;
use cortex_core::tool::{CapabilityKind, Tool};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Up to `max_results` hits, best first. No results is an empty list.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError>;
}

pub struct WebSearchTool {
    backend: Arc<dyn SearchBackend>,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>, max_results: usize) -> Self {
        Self {
            backend,
            max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "WebSearch"
    }

    fn description(&self) -> &str {
        "Useful when the question needs real-time or current information from the internet."
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::WebSearch
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments("search query is empty".into()));
        }
        let hits = self.backend.search(query, self.max_results).await?;
        Ok(format_hits(&hits))
    }
}

/// `[i] title\nsnippet\nurl\n` per hit, separated by blank lines.
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".into();
    }
    hits.iter()
        .enumerate()
        .map(|(i, h)| format!("[{}] {}\n{}\n{}\n", i + 1, h.title, h.snippet, h.url))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// DuckDuckGo Instant Answer API.
pub struct DuckDuckGoSearch {
    endpoint: String,
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("cortex/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        debug!(query = %query, "Web search");
        let failed = |reason: String| ToolError::ExecutionFailed {
            tool_name: "WebSearch".into(),
            reason,
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| failed(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(failed(format!("search provider returned {}", response.status())));
        }

        let body: InstantAnswer = response
            .json()
            .await
            .map_err(|e| failed(format!("unreadable search response: {e}")))?;

        Ok(body.into_hits(max_results))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Entry {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

impl InstantAnswer {
    fn into_hits(self, max_results: usize) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        if !self.abstract_text.is_empty() {
            hits.push(SearchHit {
                title: self.heading,
                snippet: self.abstract_text,
                url: self.abstract_url,
            });
        }
        flatten_topics(self.related_topics, &mut hits);
        hits.truncate(max_results);
        hits
    }
}

fn flatten_topics(topics: Vec<RelatedTopic>, out: &mut Vec<SearchHit>) {
    for topic in topics {
        match topic {
            RelatedTopic::Entry { text, first_url } => {
                // Topic text reads "Title - description".
                let title = text.split(" - ").next().unwrap_or(&text).to_string();
                out.push(SearchHit {
                    title,
                    snippet: text,
                    url: first_url,
                });
            }
            RelatedTopic::Group { topics } => flatten_topics(topics, out),
        }
    }
}
