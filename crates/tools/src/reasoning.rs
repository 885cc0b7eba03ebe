//! Reasoning capability: answers from the conversation alone.
//!
//! Makes no external call. Walks the short-term turn log newest first and
//! quotes the first turn containing a trigger phrase.

use async_trait::async_trait;
use cortex_core::error::ToolError;
use cortex_core::tool::{CapabilityKind, Tool};
use cortex_memory::ShortTermMemory;
use std::sync::Arc;

pub struct ReasoningTool {
    short_term: Arc<ShortTermMemory>,
    triggers: Vec<String>,
}

impl ReasoningTool {
    pub fn new(short_term: Arc<ShortTermMemory>, triggers: &[String]) -> Self {
        Self {
            short_term,
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    fn name(&self) -> &str {
        "Reasoning"
    }

    fn description(&self) -> &str {
        "Use this tool when the answer is likely already known from prior conversation \
         or can be reasoned from memory."
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Reasoning
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let turns = self.short_term.turns().await;
        let hit = turns.iter().rev().find(|turn| {
            let content = turn.content.to_lowercase();
            self.triggers.iter().any(|t| content.contains(t.as_str()))
        });

        Ok(match hit {
            Some(turn) => format!("You told me earlier: {}", turn.content),
            None => format!(
                "I tried to reason about your question: '{input}', but I couldn't find anything in memory."
            ),
        })
    }
}
