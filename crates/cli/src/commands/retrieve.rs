//! `cortex retrieve`: query the document index directly.

use cortex_config::AppConfig;
use cortex_core::memory::SimilaritySearch;
use cortex_memory::DocumentIndex;
use cortex_providers::build_from_config;

use crate::runtime;

const PREVIEW_CHARS: usize = 300;

pub async fn run(config: &AppConfig, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = build_from_config(config);
    let embedder = runtime::embedder(config, &router)?;
    let index = DocumentIndex::open(&config.memory.vector_store_dir, embedder)
        .map_err(|e| format!("{e}. Run `cortex index` first."))?;

    let passages = index.similarity_search(query, config.retriever.top_k).await?;
    if passages.is_empty() {
        println!("No relevant documents found.");
        return Ok(());
    }

    for (i, passage) in passages.iter().enumerate() {
        println!("[{}] {}", i + 1, preview(passage));
        println!();
    }
    Ok(())
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
