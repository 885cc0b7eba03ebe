//! Retriever: semantic lookup in the local document index.
//!
//! Guarded: questions that look time-sensitive are refused before any
//! similarity search runs, so the agent turns to web search instead.

use async_trait::async_trait;
use cortex_config::RetrieverConfig;
use cortex_core::error::ToolError;
use cortex_core::memory::SimilaritySearch;
use cortex_core::tool::{CapabilityKind, Tool};
use std::sync::Arc;
use tracing::debug;

pub const SKIPPED_REALTIME: &str = "(Retriever skipped: question appears to require real-time data.)";

pub struct RetrieverTool {
    index: Arc<dyn SimilaritySearch>,
    top_k: usize,
    realtime_keywords: Vec<String>,
    scope: Option<(String, String)>,
}

impl RetrieverTool {
    pub fn new(index: Arc<dyn SimilaritySearch>, config: &RetrieverConfig) -> Self {
        let scope = match (&config.anchor_term, &config.query_prefix) {
            (Some(anchor), Some(prefix)) => Some((anchor.to_lowercase(), prefix.clone())),
            _ => None,
        };
        Self {
            index,
            top_k: config.top_k,
            realtime_keywords: config
                .realtime_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            scope,
        }
    }

    /// Whether `query` mentions any real-time keyword (case-insensitive substring).
    pub fn needs_realtime(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.realtime_keywords.iter().any(|k| q.contains(k.as_str()))
    }

    /// Prefix the query with the configured context unless it already
    /// mentions the anchor term.
    fn scoped(&self, query: &str) -> String {
        match &self.scope {
            Some((anchor, prefix)) if !query.to_lowercase().contains(anchor.as_str()) => {
                format!("{prefix} {query}")
            }
            _ => query.to_string(),
        }
    }
}

#[async_trait]
impl Tool for RetrieverTool {
    fn name(&self) -> &str {
        "Retriever"
    }

    fn description(&self) -> &str {
        "Use this tool to retrieve documents from the knowledge base. Input should be a query string. \
         Not for questions that need real-time data."
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Retriever
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        if self.needs_realtime(input) {
            debug!(query = %input, "Retrieval skipped for real-time query");
            return Ok(SKIPPED_REALTIME.into());
        }

        let query = self.scoped(input.trim());
        let passages = self
            .index
            .similarity_search(&query, self.top_k)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        if passages.is_empty() {
            return Ok("No relevant documents found.".into());
        }
        Ok(passages.join("\n"))
    }
}
