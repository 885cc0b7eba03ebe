//! The document index searched by the retriever.
//!
//! Built once, offline, from a folder of plain-text files (one document per
//! file). Queries before any build fail with `StoreUnavailable`.

use async_trait::async_trait;
use cortex_core::error::MemoryError;
use cortex_core::memory::{Embedder, SimilaritySearch};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::store::{VectorRecord, VectorStore};

pub struct DocumentIndex {
    store: VectorStore,
    embedder: Arc<dyn Embedder>,
}

impl DocumentIndex {
    /// Embed `texts` and write them as the index in `dir`, replacing any
    /// previous index there.
    pub async fn build(
        dir: impl Into<PathBuf>,
        texts: &[String],
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, MemoryError> {
        let store = VectorStore::open(dir)?;
        let embeddings = embedder.embed(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(MemoryError::EmbeddingFailed(format!(
                "expected {} vectors, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let records = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| VectorRecord::new(text.clone(), embedding))
            .collect();
        store.replace(records).await?;

        info!(path = %store.dir().display(), documents = texts.len(), "Document index built");
        Ok(Self { store, embedder })
    }

    /// Open a previously built index.
    pub fn open(dir: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Result<Self, MemoryError> {
        let store = VectorStore::open_existing(dir)?;
        Ok(Self { store, embedder })
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }
}

#[async_trait]
impl SimilaritySearch for DocumentIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        let embedding = self.embedder.embed_one(query).await?;
        Ok(self
            .store
            .search(&embedding, k)
            .await
            .into_iter()
            .map(|h| h.record.content)
            .collect())
    }
}

/// Read every regular file in `folder`, sorted by file name.
pub fn load_text_files(folder: &Path) -> Result<Vec<String>, MemoryError> {
    let entries = std::fs::read_dir(folder).map_err(|e| MemoryError::StoreUnavailable {
        path: folder.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|p| {
            std::fs::read_to_string(p)
                .map_err(|e| MemoryError::Storage(format!("Failed to read {}: {e}", p.display())))
        })
        .collect()
}
