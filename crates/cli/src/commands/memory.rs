//! `cortex remember` / `cortex recall`: direct long-term memory access.

use cortex_config::AppConfig;
use cortex_providers::build_from_config;

use crate::runtime;

pub async fn remember(config: &AppConfig, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = build_from_config(config);
    let memory = runtime::long_term(config, runtime::embedder(config, &router)?)?;
    memory.save_fact(text.trim()).await?;
    println!("Saved: {}", text.trim());
    println!("  {} facts in {}", memory.len().await, config.memory.long_term_dir.display());
    Ok(())
}

pub async fn recall(config: &AppConfig, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = build_from_config(config);
    let memory = runtime::long_term(config, runtime::embedder(config, &router)?)?;

    let facts = memory.query(query, config.memory.long_term_k).await?;
    if facts.is_empty() {
        println!("Nothing found in long-term memory.");
        return Ok(());
    }
    for (i, fact) in facts.iter().enumerate() {
        println!("  {:>2}. {fact}", i + 1);
    }
    Ok(())
}
