//! Provider router: selects the generation backend based on config.

use cortex_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use crate::openai_compat::OpenAiCompatProvider;

/// Named generation backends with one default.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// The backend named by `default_provider`.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }
}

/// Build every configured backend, plus the default one if it was not listed.
pub fn build_from_config(config: &cortex_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));

        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key)),
        );
    }

    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        router.register(
            config.default_provider.clone(),
            Arc::new(OpenAiCompatProvider::new(
                &config.default_provider,
                &base_url,
                &api_key,
            )),
        );
    }

    router
}

/// Default base URL for well-known backends.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "ollama" => "http://localhost:11434/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_config::{AppConfig, ProviderConfig};

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("ollama");
        router.register("ollama", Arc::new(OpenAiCompatProvider::ollama(None)));

        assert!(router.get("ollama").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let router = build_from_config(&AppConfig::default());
        let provider = router.default().unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn configured_providers_are_registered() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "local".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("http://localhost:9999/v1".into()),
                default_model: None,
            },
        );
        let router = build_from_config(&config);
        assert!(router.get("local").is_some());
        assert!(router.get("ollama").is_some());
        assert!(router.get("openai").is_none());
    }
}
