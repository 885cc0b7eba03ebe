//! The agent loop: one user turn of think, act, observe.
//!
//! Every step is one backend call. A step that names a capability runs it
//! and feeds the result back as an observation. Malformed output and unknown
//! capability names also produce an observation and also use up a step, so
//! a turn makes at most `max_steps` backend calls whatever the backend says.
//! Backend errors end the turn; capability errors never do.

use cortex_config::AppConfig;
use cortex_core::error::ToolError;
use cortex_core::memory::SimilaritySearch;
use cortex_core::provider::{Provider, ProviderRequest};
use cortex_core::tool::{Tool, ToolRegistry};
use cortex_memory::ShortTermMemory;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::context::{AgentStep, ContextBundle, DEFAULT_INSTRUCTIONS};
use crate::parser::{ParsedOutput, parse};

/// Generation stops before the backend invents its own observation.
pub const STOP_SEQUENCE: &str = "\nObservation:";

pub const UNABLE_TO_COMPLETE: &str =
    "I'm sorry, I wasn't able to complete that request within the allowed number of steps.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinishReason {
    /// The backend gave a final answer.
    Answered,
    /// The step budget ran out; the answer is best-effort.
    StepLimitExceeded,
}

/// The result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub answer: String,
    pub steps: Vec<AgentStep>,
    pub finish: FinishReason,
}

impl TurnOutcome {
    /// Steps that ran a capability or tried to.
    pub fn steps_used(&self) -> usize {
        self.steps.iter().filter(|s| s.observation.is_some()).count()
    }
}

pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_steps: u32,
    tool_timeout: Duration,
    instructions: String,
    recall: Option<Arc<dyn SimilaritySearch>>,
    recall_limit: usize,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.3,
            max_tokens: None,
            max_steps: 3,
            tool_timeout: Duration::from_secs(30),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            recall: None,
            recall_limit: 0,
        }
    }

    /// Loop settings from the `[agent]` section and top-level model options.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        let mut agent = Self::new(provider, &config.default_model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_max_steps(config.agent.max_steps)
            .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs));
        if let Some(instructions) = &config.agent.instructions {
            agent = agent.with_instructions(instructions);
        }
        agent
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Clamped to at least one step.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Recall up to `limit` long-term facts into each turn's context.
    pub fn with_recall(mut self, store: Arc<dyn SimilaritySearch>, limit: usize) -> Self {
        self.recall = Some(store);
        self.recall_limit = limit;
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    async fn recall_facts(&self, input: &str) -> Vec<String> {
        let Some(store) = &self.recall else {
            return Vec::new();
        };
        if self.recall_limit == 0 {
            return Vec::new();
        }
        match store.similarity_search(input, self.recall_limit).await {
            Ok(facts) => {
                if !facts.is_empty() {
                    debug!(count = facts.len(), "Recalled long-term facts");
                }
                facts
            }
            Err(e) => {
                warn!("Long-term recall failed: {e}");
                Vec::new()
            }
        }
    }

    /// Run one capability under the per-call deadline. Failures become text.
    async fn invoke(&self, tool: &dyn Tool, input: &str) -> String {
        let start = Instant::now();
        let result = tokio::time::timeout(self.tool_timeout, tool.execute(input)).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(output)) => {
                debug!(tool = tool.name(), duration_ms, "Capability succeeded");
                output
            }
            Ok(Err(e)) => {
                warn!(tool = tool.name(), duration_ms, error = %e, "Capability failed");
                format!("Error: {e}")
            }
            Err(_) => {
                let e = ToolError::Timeout {
                    tool_name: tool.name().to_string(),
                    timeout_secs: self.tool_timeout.as_secs(),
                };
                warn!(tool = tool.name(), duration_ms, "Capability timed out");
                format!("Error: {e}")
            }
        }
    }

    /// Run one user turn.
    ///
    /// Only a backend failure is an error. Everything a capability or the
    /// backend's text can do wrong is folded into the step history.
    pub async fn run(
        &self,
        input: &str,
        short_term: &ShortTermMemory,
        registry: &ToolRegistry,
    ) -> Result<TurnOutcome, cortex_core::Error> {
        info!(model = %self.model, max_steps = self.max_steps, "Agent turn starting");

        let history = short_term.render().await;
        let facts = self.recall_facts(input).await;
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut last_tool_observation: Option<String> = None;

        for step in 1..=self.max_steps {
            let bundle = ContextBundle::new(&self.instructions, registry, &history, &facts, input, &steps);
            let request = ProviderRequest {
                model: self.model.clone(),
                messages: bundle.to_messages(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                stop: vec![STOP_SEQUENCE.to_string()],
            };

            let response = self.provider.complete(request).await?;

            match parse(&response.message.content) {
                ParsedOutput::Final { thought, answer } => {
                    steps.push(AgentStep::finish(thought));
                    info!(step, "Agent turn answered");
                    return Ok(TurnOutcome {
                        answer,
                        steps,
                        finish: FinishReason::Answered,
                    });
                }
                ParsedOutput::Act { thought, action, input: action_input } => {
                    debug!(step, action = %action, "Agent chose capability");
                    let tool = registry.resolve(&action);
                    let kind = tool.map(|t| t.kind());
                    let observation = match tool {
                        Some(tool) => {
                            debug!(step, kind = ?tool.kind(), "Invoking capability");
                            let out = self.invoke(tool, &action_input).await;
                            last_tool_observation = Some(out.clone());
                            out
                        }
                        None => {
                            warn!(step, action = %action, "Unknown capability");
                            format!(
                                "{action} is not a valid tool, try one of [{}].",
                                registry.names().join(", ")
                            )
                        }
                    };
                    steps.push(AgentStep {
                        thought,
                        action: Some(action),
                        kind,
                        action_input: Some(action_input),
                        observation: Some(observation),
                    });
                }
                ParsedOutput::Malformed { thought, reason } => {
                    warn!(step, reason = %reason, "Malformed backend output");
                    steps.push(AgentStep {
                        thought,
                        action: None,
                        kind: None,
                        action_input: None,
                        observation: Some(format!(
                            "Invalid format: {reason}. Reply with an 'Action:' and an \
                             'Action Input:' line, or with a 'Final Answer:' line."
                        )),
                    });
                }
            }
        }

        warn!(max_steps = self.max_steps, "Step limit reached");
        let answer = last_tool_observation.unwrap_or_else(|| UNABLE_TO_COMPLETE.to_string());
        Ok(TurnOutcome {
            answer,
            steps,
            finish: FinishReason::StepLimitExceeded,
        })
    }
}
