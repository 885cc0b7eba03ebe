//! Configuration loading, validation, and management for cortex.
//!
//! Loads configuration from `~/.cortex/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cortex/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Memory store locations
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Embedding model used by both vector stores
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Document retrieval settings
    #[serde(default)]
    pub retriever: RetrieverConfig,

    /// Fact extraction rules
    #[serde(default)]
    pub facts: FactsConfig,

    /// Conversation-only reasoning settings
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Web search settings
    #[serde(default)]
    pub web_search: WebSearchConfig,

    /// Code execution settings
    #[serde(default)]
    pub code: CodeConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_model() -> String {
    "mistral".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("agent", &self.agent)
            .field("memory", &self.memory)
            .field("embedding", &self.embedding)
            .field("retriever", &self.retriever)
            .field("facts", &self.facts)
            .field("reasoning", &self.reasoning)
            .field("web_search", &self.web_search)
            .field("code", &self.code)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum capability invocations per user turn
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Deadline for a single capability invocation
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Long-term facts recalled into the prompt per turn (0 disables)
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,

    /// Replace the built-in role instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

fn default_max_steps() -> u32 {
    3
}
fn default_tool_timeout_secs() -> u64 {
    30
}
fn default_recall_limit() -> usize {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            tool_timeout_secs: default_tool_timeout_secs(),
            recall_limit: default_recall_limit(),
            instructions: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Directory of the persisted long-term fact store
    #[serde(default = "default_long_term_dir")]
    pub long_term_dir: PathBuf,

    /// Directory of the document index used by the retriever
    #[serde(default = "default_vector_store_dir")]
    pub vector_store_dir: PathBuf,

    /// Folder of plain-text documents consumed by `cortex index`
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// Facts returned per long-term memory query
    #[serde(default = "default_long_term_k")]
    pub long_term_k: usize,
}

fn default_long_term_dir() -> PathBuf {
    PathBuf::from("longterm_memory")
}
fn default_vector_store_dir() -> PathBuf {
    PathBuf::from("vectorstore")
}
fn default_documents_dir() -> PathBuf {
    PathBuf::from("data").join("documents")
}
fn default_long_term_k() -> usize {
    3
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            long_term_dir: default_long_term_dir(),
            vector_store_dir: default_vector_store_dir(),
            documents_dir: default_documents_dir(),
            long_term_k: default_long_term_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "hash" for the offline embedder, or the name of a configured provider
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model passed to the provider's embedding endpoint
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector width of the offline embedder
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_embedding_provider() -> String {
    "hash".into()
}
fn default_embedding_model() -> String {
    "all-minilm".into()
}
fn default_dimensions() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Passages returned per retrieval
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Queries containing any of these (case-insensitive) skip retrieval
    #[serde(default = "default_realtime_keywords")]
    pub realtime_keywords: Vec<String>,

    /// When set with `query_prefix`, queries lacking this term get the prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_term: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_prefix: Option<String>,
}

fn default_top_k() -> usize {
    4
}
fn default_realtime_keywords() -> Vec<String> {
    ["weather", "forecast", "temperature", "time", "today", "tomorrow"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            realtime_keywords: default_realtime_keywords(),
            anchor_term: None,
            query_prefix: None,
        }
    }
}

/// One fact extraction rule: a regex with exactly one capture group, and a
/// sentence template containing `{fact}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRuleConfig {
    pub pattern: String,
    pub template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactsConfig {
    /// Rules tried in order; the first match wins
    #[serde(default = "default_fact_rules")]
    pub rules: Vec<FactRuleConfig>,
}

// Trigger phrases match in any case; the captured name or place must start
// with a capital letter and stops at the first lowercase word or punctuation.
const NAME_TOKEN: &str = r"(?-i:[A-Z][A-Za-z'-]*)";
const PLACE: &str = r"(?-i:[A-Z][A-Za-z'-]*(?:,? [A-Z][A-Za-z'-]*)*)";

fn default_fact_rules() -> Vec<FactRuleConfig> {
    vec![
        FactRuleConfig {
            pattern: format!(r"(?i)\bmy name is ({NAME_TOKEN})\b"),
            template: "The user's name is {fact}.".into(),
        },
        FactRuleConfig {
            pattern: format!(r"(?i)\bi live in ({PLACE})"),
            template: "The user lives in {fact}.".into(),
        },
        FactRuleConfig {
            pattern: format!(r"(?i)\bi am from ({PLACE})"),
            template: "The user is from {fact}.".into(),
        },
    ]
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            rules: default_fact_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Phrases marking a prior self-disclosure in the conversation
    #[serde(default = "default_trigger_phrases")]
    pub trigger_phrases: Vec<String>,
}

fn default_trigger_phrases() -> Vec<String> {
    ["my name is", "i live in", "i am from"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            trigger_phrases: default_trigger_phrases(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_search_endpoint() -> String {
    "https://api.duckduckgo.com/".into()
}
fn default_max_results() -> usize {
    3
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_code_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_interpreter() -> String {
    "python3".into()
}
fn default_code_timeout_secs() -> u64 {
    10
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_code_timeout_secs(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.cortex/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment overrides:
    /// - `CORTEX_API_KEY` then `OPENAI_API_KEY` (only when no key is configured)
    /// - `CORTEX_PROVIDER`
    /// - `CORTEX_MODEL`
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("CORTEX_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("CORTEX_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("CORTEX_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cortex")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be > 0".into(),
            ));
        }

        for rule in &self.facts.rules {
            let re = regex_lite::Regex::new(&rule.pattern).map_err(|e| {
                ConfigError::ValidationError(format!("fact rule '{}' does not compile: {e}", rule.pattern))
            })?;
            // Group 0 is the whole match.
            if re.captures_len() != 2 {
                return Err(ConfigError::ValidationError(format!(
                    "fact rule '{}' must have exactly one capture group",
                    rule.pattern
                )));
            }
            if !rule.template.contains("{fact}") {
                return Err(ConfigError::ValidationError(format!(
                    "fact template '{}' must contain {{fact}}",
                    rule.template
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
            embedding: EmbeddingConfig::default(),
            retriever: RetrieverConfig::default(),
            facts: FactsConfig::default(),
            reasoning: ReasoningConfig::default(),
            web_search: WebSearchConfig::default(),
            code: CodeConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "ollama");
        assert_eq!(config.agent.max_steps, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.facts.rules, config.facts.rules);
        assert_eq!(parsed.retriever.realtime_keywords, config.retriever.realtime_keywords);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_step_budget_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn fact_rule_without_capture_group_rejected() {
        let mut config = AppConfig::default();
        config.facts.rules.push(FactRuleConfig {
            pattern: r"(?i)\bi like cats\b".into(),
            template: "The user likes {fact}.".into(),
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("capture group"));
    }

    #[test]
    fn fact_template_without_placeholder_rejected() {
        let mut config = AppConfig::default();
        config.facts.rules[0].template = "The user has a name.".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_model, "mistral");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"
default_model = "llama3"

[agent]
max_steps = 5

[retriever]
realtime_keywords = ["news"]
anchor_term = "bristol"
query_prefix = "In the context of the July 4th celebrations in Bristol, Rhode Island:"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(tmp.path()).unwrap();
        assert_eq!(config.default_model, "llama3");
        assert_eq!(config.agent.max_steps, 5);
        assert_eq!(config.agent.tool_timeout_secs, 30);
        assert_eq!(config.retriever.realtime_keywords, vec!["news".to_string()]);
        assert_eq!(config.retriever.anchor_term.as_deref(), Some("bristol"));
        assert_eq!(config.facts.rules.len(), 3);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "default_model = ").unwrap();
        let err = AppConfig::load_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("mistral"));
        assert!(toml_str.contains("max_steps"));
    }
}
