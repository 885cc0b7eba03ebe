//! Rule-based fact capture from raw user input.
//!
//! Rules are tried in order and the first match wins. Each rule's pattern has
//! exactly one capture group; the trimmed capture is substituted for
//! `{fact}` in the rule's template.

use cortex_config::{FactRuleConfig, FactsConfig};
use cortex_core::error::{Error, MemoryError};
use regex_lite::Regex;
use tracing::debug;

use crate::long_term::LongTermMemory;

#[derive(Debug, Clone)]
pub struct FactRule {
    pattern: Regex,
    template: String,
}

impl FactRule {
    pub fn new(pattern: &str, template: impl Into<String>) -> Result<Self, Error> {
        let pattern = Regex::new(pattern).map_err(|e| Error::Config {
            message: format!("invalid fact pattern '{pattern}': {e}"),
        })?;
        Ok(Self {
            pattern,
            template: template.into(),
        })
    }

    fn apply(&self, raw: &str) -> Option<String> {
        let captured = self.pattern.captures(raw)?.get(1)?.as_str();
        let fact = captured.trim().trim_end_matches(',').trim_end();
        if fact.is_empty() {
            return None;
        }
        Some(self.template.replace("{fact}", fact))
    }
}

#[derive(Debug, Clone)]
pub struct FactExtractor {
    rules: Vec<FactRule>,
}

impl FactExtractor {
    pub fn new(rules: Vec<FactRule>) -> Self {
        Self { rules }
    }

    pub fn from_rules(rules: &[FactRuleConfig]) -> Result<Self, Error> {
        let rules = rules
            .iter()
            .map(|r| FactRule::new(&r.pattern, r.template.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn from_config(config: &FactsConfig) -> Result<Self, Error> {
        Self::from_rules(&config.rules)
    }

    /// The normalised fact sentence for `raw`, if any rule matches.
    pub fn extract(&self, raw: &str) -> Option<String> {
        self.rules.iter().find_map(|rule| rule.apply(raw))
    }

    /// Extract and, on a match, save the fact to long-term memory.
    pub async fn maybe_extract(
        &self,
        raw: &str,
        memory: &LongTermMemory,
    ) -> Result<Option<String>, MemoryError> {
        let Some(fact) = self.extract(raw) else {
            return Ok(None);
        };
        debug!(fact = %fact, "Extracted fact from input");
        memory.save_fact(&fact).await?;
        Ok(Some(fact))
    }
}

impl Default for FactExtractor {
    fn default() -> Self {
        // The shipped defaults always compile; an invalid custom rule set is
        // caught by config validation before reaching here.
        Self::from_config(&FactsConfig::default()).unwrap_or_else(|_| Self::new(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn name_rule() {
        let x = FactExtractor::default();
        assert_eq!(x.extract("My name is Alice").as_deref(), Some("The user's name is Alice."));
        assert_eq!(x.extract("hey, MY NAME IS Bob!").as_deref(), Some("The user's name is Bob."));
    }

    #[test]
    fn location_rules() {
        let x = FactExtractor::default();
        assert_eq!(x.extract("I live in Boston").as_deref(), Some("The user lives in Boston."));
        assert_eq!(
            x.extract("I live in New York, USA.").as_deref(),
            Some("The user lives in New York, USA.")
        );
        assert_eq!(x.extract("i am from Ohio").as_deref(), Some("The user is from Ohio."));
    }

    #[test]
    fn first_match_wins() {
        let x = FactExtractor::default();
        assert_eq!(
            x.extract("My name is Alice and I live in Boston").as_deref(),
            Some("The user's name is Alice.")
        );
    }

    #[test]
    fn conservative_boundaries() {
        let x = FactExtractor::default();
        assert!(x.extract("What's the weather?").is_none());
        assert!(x.extract("Where do I live?").is_none());
        assert!(x.extract("enemy name is Zed").is_none());
        assert!(x.extract("I am from").is_none());
        assert!(x.extract("My name is not important").is_none());
        assert!(x.extract("I live in fear of spiders").is_none());
        assert!(x.extract("I am from the government and here to help").is_none());
        assert_eq!(
            x.extract("I live in Boston and I work in New York").as_deref(),
            Some("The user lives in Boston.")
        );
        assert_eq!(
            x.extract("I am from Ohio, but I moved away.").as_deref(),
            Some("The user is from Ohio.")
        );
        assert_eq!(
            x.extract("I live in Paris! It's lovely.").as_deref(),
            Some("The user lives in Paris.")
        );
    }

    #[test]
    fn custom_rules_are_ordered() {
        let x = FactExtractor::new(vec![
            FactRule::new(r"(?i)\bi like ([a-z]+)", "The user likes {fact}.").unwrap(),
            FactRule::new(r"(?i)\bi (?:like|love) ([a-z]+)", "The user loves {fact}.").unwrap(),
        ]);
        assert_eq!(x.extract("I like tea").as_deref(), Some("The user likes tea."));
        assert_eq!(x.extract("I love tea").as_deref(), Some("The user loves tea."));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = FactRule::new("(unclosed", "{fact}").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn maybe_extract_commits_exactly_one_fact() {
        let tmp = TempDir::new().unwrap();
        let memory = LongTermMemory::open(tmp.path(), Arc::new(HashEmbedder::default())).unwrap();
        let x = FactExtractor::default();

        let saved = x.maybe_extract("My name is Alice", &memory).await.unwrap();
        assert_eq!(saved.as_deref(), Some("The user's name is Alice."));
        assert_eq!(memory.facts().await, vec!["The user's name is Alice."]);
    }

    #[tokio::test]
    async fn maybe_extract_without_match_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let memory = LongTermMemory::open(tmp.path(), Arc::new(HashEmbedder::default())).unwrap();
        let saved = FactExtractor::default()
            .maybe_extract("What's the weather?", &memory)
            .await
            .unwrap();
        assert!(saved.is_none());
        assert!(memory.is_empty().await);
    }
}
