//! `cortex index`: build the document index from a folder of text files.

use cortex_config::AppConfig;
use cortex_memory::{DocumentIndex, load_text_files};
use cortex_providers::build_from_config;
use std::path::PathBuf;

use crate::runtime;

pub async fn run(config: &AppConfig, documents: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let folder = documents.unwrap_or_else(|| config.memory.documents_dir.clone());
    let texts = load_text_files(&folder)?;
    if texts.is_empty() {
        return Err(format!("No documents found in {}", folder.display()).into());
    }

    let router = build_from_config(config);
    let embedder = runtime::embedder(config, &router)?;
    let index = DocumentIndex::build(&config.memory.vector_store_dir, &texts, embedder).await?;

    println!(
        "Indexed {} documents from {} into {}",
        index.len().await,
        folder.display(),
        config.memory.vector_store_dir.display()
    );
    Ok(())
}
