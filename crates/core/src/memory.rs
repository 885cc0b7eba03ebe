//! Memory traits: the seams to the embedding model and similarity search.
//!
//! The concrete stores (long-term facts, the document index) live in
//! `cortex-memory`; capabilities only see these traits.

use async_trait::async_trait;
use crate::error::MemoryError;

/// Converts text into dense vector embeddings.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedder name (e.g., "hash", "ollama").
    fn name(&self) -> &str;

    /// Embed every text, returning one vector per input in the same order.
    async fn embed(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, MemoryError>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> std::result::Result<Vec<f32>, MemoryError> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::EmbeddingFailed("embedder returned no vectors".into()))
    }
}

/// Nearest-neighbour text lookup over a pre-built store.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Return up to `k` stored texts, nearest first.
    async fn similarity_search(&self, query: &str, k: usize) -> std::result::Result<Vec<String>, MemoryError>;
}
