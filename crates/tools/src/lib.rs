//! Built-in capabilities for cortex.
//!
//! Capabilities give the agent its actions: search the web, do math,
//! retrieve local documents, recall long-term facts, reason over the
//! conversation, run Python, or fall back to a canned reply.

pub mod calculator;
pub mod fallback;
pub mod long_term_memory;
pub mod python_repl;
pub mod reasoning;
pub mod retriever;
pub mod web_search;

use cortex_config::AppConfig;
use cortex_core::error::ToolError;
use cortex_core::memory::SimilaritySearch;
use cortex_core::tool::ToolRegistry;
use cortex_memory::{LongTermMemory, ShortTermMemory};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub use calculator::CalculatorTool;
pub use fallback::FallbackTool;
pub use long_term_memory::LongTermMemoryTool;
pub use python_repl::PythonReplTool;
pub use reasoning::ReasoningTool;
pub use retriever::RetrieverTool;
pub use web_search::{DuckDuckGoSearch, SearchBackend, SearchHit, WebSearchTool};

/// Shared collaborators the capabilities are built around.
pub struct ToolContext {
    pub short_term: Arc<ShortTermMemory>,
    pub long_term: Arc<LongTermMemory>,
    /// The document index, if one has been built.
    pub documents: Option<Arc<dyn SimilaritySearch>>,
    pub search: Arc<dyn SearchBackend>,
}

/// Build the registry in its fixed order: WebSearch, Calculator, Retriever,
/// LongTermMemory, Reasoning, python_repl, Fallback.
///
/// Without a document index the Retriever is left out.
pub fn default_registry(config: &AppConfig, ctx: ToolContext) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();

    registry.register(Box::new(WebSearchTool::new(ctx.search, config.web_search.max_results)))?;
    registry.register(Box::new(CalculatorTool))?;

    match ctx.documents {
        Some(index) => registry.register(Box::new(RetrieverTool::new(index, &config.retriever)))?,
        None => warn!("No document index found; Retriever is disabled. Run `cortex index` to build one."),
    }

    registry.register(Box::new(LongTermMemoryTool::new(
        ctx.long_term,
        config.memory.long_term_k,
    )))?;
    registry.register(Box::new(ReasoningTool::new(
        ctx.short_term,
        &config.reasoning.trigger_phrases,
    )))?;
    registry.register(Box::new(PythonReplTool::new(
        config.code.interpreter.clone(),
        Duration::from_secs(config.code.timeout_secs),
    )))?;
    registry.register(Box::new(FallbackTool))?;

    Ok(registry)
}
