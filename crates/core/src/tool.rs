//! Tool trait: the abstraction over agent capabilities.
//!
//! Capabilities are what the agent may choose to do on a reasoning step:
//! search the web, evaluate arithmetic, retrieve documents, recall facts,
//! reason over the conversation, run code, or fall back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::ToolError;

/// The closed set of capability kinds the agent knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    WebSearch,
    Calculator,
    Retriever,
    LongTermMemory,
    Reasoning,
    CodeExecution,
    Fallback,
}

/// The core Tool trait.
///
/// Each capability implements this trait and is registered once in the
/// [`ToolRegistry`] at agent construction. Input and output are plain text:
/// the backend writes the input after `Action Input:` and reads the output
/// back as the observation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "Calculator", "WebSearch").
    fn name(&self) -> &str;

    /// A description of when to use this tool (sent to the LLM).
    fn description(&self) -> &str;

    /// Which capability kind this tool provides.
    fn kind(&self) -> CapabilityKind;

    /// Execute the tool with the given action input.
    async fn execute(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools.
///
/// Registration order is preserved: it is the order the action vocabulary is
/// shown to the backend, and it must not change within a session.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name already exists.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(ToolError::DuplicateCapability(name));
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Resolve a tool by exact name.
    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        self.by_name.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// All tools in registration order.
    pub fn list(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|t| t.as_ref())
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { self.0 }
        fn description(&self) -> &str { "Echoes back the input" }
        fn kind(&self) -> CapabilityKind { CapabilityKind::Fallback }
        async fn execute(&self, input: &str) -> std::result::Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    #[test]
    fn registry_register_and_resolve() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();
        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("nonexistent").is_none());
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();
        let err = registry.register(Box::new(EchoTool("echo"))).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateCapability(ref n) if n == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(Box::new(EchoTool(name))).unwrap();
        }
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        // Stable across calls
        assert_eq!(registry.names(), registry.list().map(|t| t.name()).collect::<Vec<_>>());
    }
}
