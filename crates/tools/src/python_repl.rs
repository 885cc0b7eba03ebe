//! python_repl: runs a snippet in a local interpreter.
//!
//! Every failure (interpreter missing, non-zero exit, timeout) comes back as
//! text so the agent can read it as an observation.

use async_trait::async_trait;
use cortex_core::error::ToolError;
use cortex_core::tool::{CapabilityKind, Tool};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

pub struct PythonReplTool {
    interpreter: String,
    timeout: Duration,
}

impl PythonReplTool {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    /// Run `code` and describe the outcome.
    pub async fn run(&self, code: &str) -> String {
        let code = strip_fences(code);
        debug!(interpreter = %self.interpreter, "Running code");

        let child = Command::new(&self.interpreter)
            .arg("-c")
            .arg(code)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return format!("Failed to start {}: {e}", self.interpreter),
            Err(_) => {
                warn!(timeout = ?self.timeout, "Code execution timed out");
                return format!("Execution timed out after {:?}", self.timeout);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let text = if output.status.success() {
            if stderr.trim().is_empty() {
                stdout.into_owned()
            } else {
                format!("{stdout}\n[stderr]: {stderr}")
            }
        } else {
            let exit = output.status.code().unwrap_or(-1);
            format!("[exit code: {exit}]\n{stdout}\n{stderr}")
        };

        let text = text.trim();
        if text.is_empty() {
            "Code ran with no output.".into()
        } else {
            text.to_string()
        }
    }
}

/// Remove a surrounding markdown code fence, if present.
fn strip_fences(code: &str) -> &str {
    let trimmed = code.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[async_trait]
impl Tool for PythonReplTool {
    fn name(&self) -> &str {
        "python_repl"
    }

    fn description(&self) -> &str {
        "Executes Python code using a local REPL. Print the values you need to see."
    }

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::CodeExecution
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        Ok(self.run(input).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_fences("```python\nprint(1)\n```"), "print(1)");
        assert_eq!(strip_fences("  print(2)  "), "print(2)");
    }

    #[tokio::test]
    async fn missing_interpreter_is_text() {
        let tool = PythonReplTool::new("definitely-not-an-interpreter", Duration::from_secs(5));
        let out = tool.execute("print(1)").await.unwrap();
        assert!(out.starts_with("Failed to start definitely-not-an-interpreter"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_with_a_stand_in_interpreter() {
        // `sh -c` accepts the same calling convention as `python3 -c`.
        let tool = PythonReplTool::new("sh", Duration::from_secs(5));
        assert_eq!(tool.execute("echo 42").await.unwrap(), "42");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let tool = PythonReplTool::new("sh", Duration::from_secs(5));
        let out = tool.execute("echo oops >&2; exit 3").await.unwrap();
        assert!(out.starts_with("[exit code: 3]"));
        assert!(out.contains("oops"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_is_reported() {
        let tool = PythonReplTool::new("sh", Duration::from_millis(200));
        let out = tool.execute("sleep 5").await.unwrap();
        assert_eq!(out, "Execution timed out after 200ms");
    }
}
