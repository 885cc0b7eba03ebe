use async_trait::async_trait;
use cortex_core::error::ToolError;
use cortex_core::tool::{CapabilityKind, Tool};

pub const FALLBACK_REPLY: &str = "I'm not sure how to help with that yet, but I'm still learning.";

/// Catch-all for input no other capability fits.
pub struct FallbackTool;

#[async_trait]
impl Tool for FallbackTool {
    fn name(&self) -> &str {
        "Fallback"
    }

    fn description(&self) -> &str {
        "Used when the input is ambiguous, self-referential, or not clearly directed at a specific task."
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Fallback
    }

    async fn execute(&self, _input: &str) -> Result<String, ToolError> {
        Ok(FALLBACK_REPLY.into())
    }
}
