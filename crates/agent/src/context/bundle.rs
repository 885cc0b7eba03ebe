//! The context bundle sent to the backend on every step.
//!
//! Layout of the rendered prompt:
//!
//! | Section | Source |
//! |---------|--------|
//! | Instructions | config or [`DEFAULT_INSTRUCTIONS`] |
//! | Tools | registry, in registration order |
//! | Format | fixed ReAct grammar |
//! | Conversation | short-term memory |
//! | Known facts | long-term recall (optional) |
//! | Question | raw user input |
//! | Scratchpad | steps taken so far this turn |

use cortex_core::message::Message;
use cortex_core::tool::ToolRegistry;

use super::scratchpad::{AgentStep, render_scratchpad};

pub const DEFAULT_INSTRUCTIONS: &str = "You are Cortex, a helpful assistant. Answer the user's \
question as well as you can. Prefer answering from the conversation and known facts when they \
already contain the answer; otherwise use one of the tools below.";

pub struct ContextBundle<'a> {
    pub instructions: &'a str,
    pub tools: Vec<(&'a str, &'a str)>,
    pub history: &'a str,
    pub known_facts: &'a [String],
    pub question: &'a str,
    pub steps: &'a [AgentStep],
}

impl<'a> ContextBundle<'a> {
    pub fn new(
        instructions: &'a str,
        registry: &'a ToolRegistry,
        history: &'a str,
        known_facts: &'a [String],
        question: &'a str,
        steps: &'a [AgentStep],
    ) -> Self {
        Self {
            instructions,
            tools: registry.list().map(|t| (t.name(), t.description())).collect(),
            history,
            known_facts,
            question,
            steps,
        }
    }

    /// The static part: instructions, tool vocabulary and output format.
    pub fn system_prompt(&self) -> String {
        let tool_lines: Vec<String> = self
            .tools
            .iter()
            .map(|(name, description)| format!("{name}: {description}"))
            .collect();
        let names: Vec<&str> = self.tools.iter().map(|(name, _)| *name).collect();

        format!(
            "{instructions}\n\n\
             You have access to the following tools:\n\n\
             {tools}\n\n\
             Use the following format:\n\n\
             Question: the input question you must answer\n\
             Thought: you should always think about what to do\n\
             Action: the action to take, should be one of [{names}]\n\
             Action Input: the input to the action\n\
             Observation: the result of the action\n\
             ... (this Thought/Action/Action Input/Observation can repeat N times)\n\
             Thought: I now know the final answer\n\
             Final Answer: the final answer to the original input question\n\n\
             Never write both an Action and a Final Answer in the same reply.",
            instructions = self.instructions,
            tools = tool_lines.join("\n"),
            names = names.join(", "),
        )
    }

    /// The per-step part: history, facts, question and scratchpad.
    pub fn user_prompt(&self) -> String {
        let mut out = String::new();
        if !self.history.is_empty() {
            out.push_str("Previous conversation:\n");
            out.push_str(self.history);
            out.push_str("\n\n");
        }
        if !self.known_facts.is_empty() {
            out.push_str("Known facts:\n");
            for fact in self.known_facts {
                out.push_str("- ");
                out.push_str(fact);
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str("Begin!\n\nQuestion: ");
        out.push_str(self.question);
        out.push('\n');
        out.push_str(&render_scratchpad(self.steps));
        out
    }

    pub fn to_messages(&self) -> Vec<Message> {
        vec![Message::system(self.system_prompt()), Message::user(self.user_prompt())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cortex_core::error::ToolError;
    use cortex_core::tool::{CapabilityKind, Tool};

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "does things"
        }
        fn kind(&self) -> CapabilityKind {
            CapabilityKind::Fallback
        }
        async fn execute(&self, _input: &str) -> Result<String, ToolError> {
            Ok(String::new())
        }
    }

    fn registry() -> ToolRegistry {
        let mut r = ToolRegistry::new();
        r.register(Box::new(Named("WebSearch"))).unwrap();
        r.register(Box::new(Named("Calculator"))).unwrap();
        r
    }

    #[test]
    fn system_prompt_lists_tools_in_order() {
        let registry = registry();
        let bundle = ContextBundle::new(DEFAULT_INSTRUCTIONS, &registry, "", &[], "hi", &[]);
        let prompt = bundle.system_prompt();
        assert!(prompt.contains("WebSearch: does things\nCalculator: does things"));
        assert!(prompt.contains("one of [WebSearch, Calculator]"));
    }

    #[test]
    fn user_prompt_sections() {
        let registry = registry();
        let facts = vec!["The user lives in Boston.".to_string()];
        let steps = vec![AgentStep {
            thought: "look it up".into(),
            action: Some("WebSearch".into()),
            kind: Some(CapabilityKind::WebSearch),
            action_input: Some("boston".into()),
            observation: Some("No results found.".into()),
        }];
        let bundle = ContextBundle::new(
            DEFAULT_INSTRUCTIONS,
            &registry,
            "Human: hi\nAI: hello",
            &facts,
            "Where do I live?",
            &steps,
        );
        let prompt = bundle.user_prompt();

        let history = prompt.find("Previous conversation:").unwrap();
        let known = prompt.find("Known facts:\n- The user lives in Boston.").unwrap();
        let question = prompt.find("Question: Where do I live?").unwrap();
        let observation = prompt.find("Observation: No results found.").unwrap();
        assert!(history < known && known < question && question < observation);
        assert!(prompt.ends_with("Thought:"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let registry = registry();
        let bundle = ContextBundle::new(DEFAULT_INSTRUCTIONS, &registry, "", &[], "hi", &[]);
        let prompt = bundle.user_prompt();
        assert!(!prompt.contains("Previous conversation"));
        assert!(!prompt.contains("Known facts"));
        assert_eq!(bundle.to_messages().len(), 2);
    }
}
