//! LongTermMemory capability: recall facts saved in earlier sessions.

use async_trait::async_trait;
use cortex_core::error::ToolError;
use cortex_core::tool::{CapabilityKind, Tool};
use cortex_memory::LongTermMemory;
use std::sync::Arc;

pub const NOTHING_FOUND: &str = "I couldn't find anything in long-term memory.";

pub struct LongTermMemoryTool {
    memory: Arc<LongTermMemory>,
    k: usize,
}

impl LongTermMemoryTool {
    pub fn new(memory: Arc<LongTermMemory>, k: usize) -> Self {
        Self { memory, k }
    }
}

#[async_trait]
impl Tool for LongTermMemoryTool {
    fn name(&self) -> &str {
        "LongTermMemory"
    }

    fn description(&self) -> &str {
        "Use this to retrieve known long-term facts from previous sessions or user history."
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::LongTermMemory
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let facts = self
            .memory
            .query(input, self.k)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        if facts.is_empty() {
            Ok(NOTHING_FOUND.into())
        } else {
            Ok(facts.join("\n"))
        }
    }
}
