//! Embedders: an offline feature-hashing model and a provider-backed one.

use async_trait::async_trait;
use cortex_core::error::MemoryError;
use cortex_core::memory::Embedder;
use cortex_core::provider::{EmbeddingRequest, Provider};
use std::sync::Arc;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words embedder.
///
/// Lower-cased alphanumeric tokens are FNV-1a hashed into `dimensions`
/// buckets, with the top hash bit choosing the sign. The result is
/// L2-normalised. Needs no network and gives identical vectors for
/// identical text across runs.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let h = fnv1a(token.as_bytes());
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
            v[bucket] += sign;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |h, b| (h ^ *b as u64).wrapping_mul(FNV_PRIME))
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Embeds through a provider's embedding endpoint.
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: texts.to_vec(),
            })
            .await
            .map_err(|e| MemoryError::EmbeddingFailed(e.to_string()))?;
        Ok(response.embeddings)
    }
}
