//! Persisted vector store: one directory, one JSON-lines collection file.
//!
//! Records are loaded into memory on open and written through to disk on
//! every mutation. Each line of `collection.jsonl` is a [`VectorRecord`].

use chrono::{DateTime, Utc};
use cortex_core::error::MemoryError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::vector::rank_by_similarity;

/// File holding the records inside a store directory.
pub const COLLECTION_FILE: &str = "collection.jsonl";

/// One stored text with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl VectorRecord {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// A record returned by [`VectorStore::search`] with its cosine score.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: VectorRecord,
    pub score: f32,
}

pub struct VectorStore {
    dir: PathBuf,
    records: RwLock<Vec<VectorRecord>>,
}

impl VectorStore {
    /// Open the store in `dir`, creating the directory if needed.
    ///
    /// A directory without a collection file is an empty store.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to create store directory {}: {e}", dir.display()))
        })?;
        let records = load_from_disk(&dir.join(COLLECTION_FILE))?;
        debug!(path = %dir.display(), count = records.len(), "Vector store loaded");
        Ok(Self {
            dir,
            records: RwLock::new(records),
        })
    }

    /// Open a store that must already exist on disk.
    pub fn open_existing(dir: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let dir = dir.into();
        if !Self::exists(&dir) {
            return Err(MemoryError::StoreUnavailable {
                path: dir.display().to_string(),
                reason: "no index found; build one first".into(),
            });
        }
        Self::open(dir)
    }

    /// Whether `dir` holds a collection file.
    pub fn exists(dir: &Path) -> bool {
        dir.join(COLLECTION_FILE).is_file()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append records and write them through to disk.
    pub async fn append(&self, new_records: Vec<VectorRecord>) -> Result<(), MemoryError> {
        if new_records.is_empty() {
            return Ok(());
        }
        let mut records = self.records.write().await;
        let path = self.dir.join(COLLECTION_FILE);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to open {}: {e}", path.display())))?;

        let mut content = String::new();
        for record in &new_records {
            content.push_str(&encode(record)?);
            content.push('\n');
        }
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to write {}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to flush {}: {e}", path.display())))?;

        records.extend(new_records);
        Ok(())
    }

    /// Replace every record and rewrite the collection file.
    pub async fn replace(&self, new_records: Vec<VectorRecord>) -> Result<(), MemoryError> {
        let mut records = self.records.write().await;
        let path = self.dir.join(COLLECTION_FILE);

        let mut content = String::new();
        for record in &new_records {
            content.push_str(&encode(record)?);
            content.push('\n');
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to write {}: {e}", path.display())))?;

        *records = new_records;
        Ok(())
    }

    /// Up to `k` records nearest to `query_embedding`, best first.
    pub async fn search(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredRecord> {
        let records = self.records.read().await;
        rank_by_similarity(records.iter().map(|r| r.embedding.as_slice()), query_embedding, k)
            .into_iter()
            .map(|(i, score)| ScoredRecord {
                record: records[i].clone(),
                score,
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Stored texts in insertion order.
    pub async fn contents(&self) -> Vec<String> {
        self.records.read().await.iter().map(|r| r.content.clone()).collect()
    }
}

fn encode(record: &VectorRecord) -> Result<String, MemoryError> {
    serde_json::to_string(record)
        .map_err(|e| MemoryError::Storage(format!("Failed to serialize record: {e}")))
}

fn load_from_disk(path: &Path) -> Result<Vec<VectorRecord>, MemoryError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(MemoryError::Storage(format!(
                "Failed to read {}: {e}",
                path.display()
            )));
        }
    };

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<VectorRecord>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Skipping corrupted record");
                None
            }
        })
        .collect())
}
