//! Long-term memory: atomic facts persisted across sessions.
//!
//! Facts only accumulate. Saving the same text twice stores it twice.

use async_trait::async_trait;
use cortex_core::error::MemoryError;
use cortex_core::memory::{Embedder, SimilaritySearch};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::store::{VectorRecord, VectorStore};

pub struct LongTermMemory {
    store: VectorStore,
    embedder: Arc<dyn Embedder>,
}

impl LongTermMemory {
    /// Open the fact store in `dir`. First use initialises an empty store.
    pub fn open(dir: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Result<Self, MemoryError> {
        let store = VectorStore::open(dir)?;
        Ok(Self { store, embedder })
    }

    /// Embed and persist one fact.
    pub async fn save_fact(&self, text: &str) -> Result<(), MemoryError> {
        let embedding = self.embedder.embed_one(text).await?;
        self.store.append(vec![VectorRecord::new(text, embedding)]).await?;
        info!(fact = %text, "Saved long-term fact");
        Ok(())
    }

    /// Up to `k` facts nearest to `text`, best first. Empty store gives an
    /// empty result without consulting the embedder.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        if k == 0 || self.store.is_empty().await {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed_one(text).await?;
        let hits = self.store.search(&embedding, k).await;
        debug!(query = %text, hits = hits.len(), "Long-term memory query");
        Ok(hits.into_iter().map(|h| h.record.content).collect())
    }

    /// Every fact in the order it was saved.
    pub async fn facts(&self) -> Vec<String> {
        self.store.contents().await
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }
}

#[async_trait]
impl SimilaritySearch for LongTermMemory {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        self.query(query, k).await
    }
}
