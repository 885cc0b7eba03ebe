//! Step history for one turn.

use cortex_core::tool::CapabilityKind;
use serde::Serialize;

/// One think/act/observe step. Transient: lives for a single turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStep {
    pub thought: String,
    pub action: Option<String>,
    /// Kind of the capability that ran; unset for unknown names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CapabilityKind>,
    pub action_input: Option<String>,
    pub observation: Option<String>,
}

impl AgentStep {
    /// A step that ended the turn with an answer.
    pub fn finish(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            action: None,
            kind: None,
            action_input: None,
            observation: None,
        }
    }

    /// Render in the same text format the backend writes.
    pub fn render(&self) -> String {
        let mut out = format!("Thought: {}\n", self.thought);
        if let Some(action) = &self.action {
            out.push_str(&format!("Action: {action}\n"));
        }
        if let Some(input) = &self.action_input {
            out.push_str(&format!("Action Input: {input}\n"));
        }
        if let Some(observation) = &self.observation {
            out.push_str(&format!("Observation: {observation}\n"));
        }
        out
    }
}

/// The accumulated steps as a ReAct scratchpad, ending with a fresh
/// `Thought:` prompt.
pub fn render_scratchpad(steps: &[AgentStep]) -> String {
    let mut out: String = steps.iter().map(AgentStep::render).collect();
    out.push_str("Thought:");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_full_step() {
        let step = AgentStep {
            thought: "I should add.".into(),
            action: Some("Calculator".into()),
            kind: Some(CapabilityKind::Calculator),
            action_input: Some("2 + 2".into()),
            observation: Some("Result: 4".into()),
        };
        assert_eq!(
            step.render(),
            "Thought: I should add.\nAction: Calculator\nAction Input: 2 + 2\nObservation: Result: 4\n"
        );
    }

    #[test]
    fn malformed_step_has_no_action_lines() {
        let step = AgentStep {
            thought: "hmm".into(),
            action: None,
            kind: None,
            action_input: None,
            observation: Some("Invalid format".into()),
        };
        assert_eq!(step.render(), "Thought: hmm\nObservation: Invalid format\n");
    }

    #[test]
    fn trace_names_capability_kind() {
        let step = AgentStep {
            thought: "add".into(),
            action: Some("Calculator".into()),
            kind: Some(CapabilityKind::Calculator),
            action_input: Some("1+1".into()),
            observation: Some("Result: 2".into()),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["kind"], "calculator");

        let json = serde_json::to_value(AgentStep::finish("done")).unwrap();
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn empty_scratchpad_prompts_for_thought() {
        assert_eq!(render_scratchpad(&[]), "Thought:");
    }
}
