//! Wiring from configuration to live collaborators.

use cortex_agent::{AgentLoop, Session};
use cortex_config::AppConfig;
use cortex_core::memory::{Embedder, SimilaritySearch};
use cortex_memory::{DocumentIndex, FactExtractor, HashEmbedder, LongTermMemory, ProviderEmbedder, ShortTermMemory};
use cortex_providers::{ProviderRouter, build_from_config};
use cortex_tools::{DuckDuckGoSearch, ToolContext, default_registry};
use std::sync::Arc;
use tracing::debug;

type BoxError = Box<dyn std::error::Error>;

/// The offline hash embedder, or a provider's embedding endpoint.
pub fn embedder(config: &AppConfig, router: &ProviderRouter) -> Result<Arc<dyn Embedder>, BoxError> {
    if config.embedding.provider == "hash" {
        return Ok(Arc::new(HashEmbedder::new(config.embedding.dimensions)));
    }
    let provider = router.get(&config.embedding.provider).ok_or_else(|| {
        format!(
            "Embedding provider '{}' is not configured. Use \"hash\" or add [providers.{}].",
            config.embedding.provider, config.embedding.provider
        )
    })?;
    Ok(Arc::new(ProviderEmbedder::new(provider, &config.embedding.model)))
}

pub fn long_term(config: &AppConfig, embedder: Arc<dyn Embedder>) -> Result<LongTermMemory, BoxError> {
    Ok(LongTermMemory::open(&config.memory.long_term_dir, embedder)?)
}

/// A full session: backend, memories, capabilities, fact rules.
pub fn session(config: &AppConfig) -> Result<Session, BoxError> {
    let router = build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;
    let embedder = embedder(config, &router)?;

    let short_term = Arc::new(ShortTermMemory::new());
    let long_term = Arc::new(long_term(config, embedder.clone())?);
    let documents: Option<Arc<dyn SimilaritySearch>> =
        match DocumentIndex::open(&config.memory.vector_store_dir, embedder) {
            Ok(index) => Some(Arc::new(index) as Arc<dyn SimilaritySearch>),
            Err(e) => {
                debug!("Document index unavailable: {e}");
                None
            }
        };

    let registry = default_registry(
        config,
        ToolContext {
            short_term: short_term.clone(),
            long_term: long_term.clone(),
            documents,
            search: Arc::new(DuckDuckGoSearch::new(config.web_search.endpoint.clone())),
        },
    )?;

    let mut agent = AgentLoop::from_config(provider, config);
    if config.agent.recall_limit > 0 {
        agent = agent.with_recall(long_term.clone(), config.agent.recall_limit);
    }

    let facts = FactExtractor::from_config(&config.facts)?;
    Ok(Session::new(agent, registry, short_term, long_term, facts))
}
