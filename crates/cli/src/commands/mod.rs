pub mod chat;
pub mod index;
pub mod memory;
pub mod retrieve;

use cortex_config::AppConfig;
use std::path::Path;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}
