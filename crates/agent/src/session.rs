//! A conversation session: one user, one outstanding turn at a time.
//!
//! Per turn the raw input first goes through the fact extractor, which may
//! write to long-term memory directly. Then the agent loop runs, and on
//! success the input and answer are appended to short-term memory. A failed
//! turn leaves short-term memory untouched.

use cortex_core::tool::ToolRegistry;
use cortex_memory::{FactExtractor, LongTermMemory, ShortTermMemory};
use std::sync::Arc;
use tracing::{info, warn};

use crate::loop_runner::{AgentLoop, TurnOutcome};

pub struct Session {
    agent: AgentLoop,
    registry: ToolRegistry,
    short_term: Arc<ShortTermMemory>,
    long_term: Arc<LongTermMemory>,
    facts: FactExtractor,
}

impl Session {
    /// `registry` should be built around the same `short_term` and
    /// `long_term` instances so capabilities see what the session writes.
    pub fn new(
        agent: AgentLoop,
        registry: ToolRegistry,
        short_term: Arc<ShortTermMemory>,
        long_term: Arc<LongTermMemory>,
        facts: FactExtractor,
    ) -> Self {
        Self {
            agent,
            registry,
            short_term,
            long_term,
            facts,
        }
    }

    pub async fn handle(&self, input: &str) -> Result<TurnOutcome, cortex_core::Error> {
        match self.facts.maybe_extract(input, &self.long_term).await {
            Ok(Some(fact)) => info!(fact = %fact, "Committed fact from input"),
            Ok(None) => {}
            Err(e) => warn!("Fact capture failed: {e}"),
        }

        let outcome = self.agent.run(input, &self.short_term, &self.registry).await?;
        self.short_term.append_exchange(input, outcome.answer.as_str()).await;
        Ok(outcome)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn short_term(&self) -> &ShortTermMemory {
        &self.short_term
    }

    pub fn long_term(&self) -> &LongTermMemory {
        &self.long_term
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loop_runner::FinishReason;
    use crate::test_helpers::{FailingProvider, SequentialMockProvider, act, final_answer};
    use cortex_memory::{HashEmbedder, TurnRole};
    use cortex_tools::{FallbackTool, ReasoningTool};
    use tempfile::TempDir;

    fn session(provider: Arc<dyn cortex_core::Provider>, tmp: &TempDir) -> Session {
        let short_term = Arc::new(ShortTermMemory::new());
        let long_term = Arc::new(
            LongTermMemory::open(tmp.path().join("longterm_memory"), Arc::new(HashEmbedder::default()))
                .unwrap(),
        );
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(ReasoningTool::new(
                short_term.clone(),
                &["i live in".to_string()],
            )))
            .unwrap();
        registry.register(Box::new(FallbackTool)).unwrap();
        Session::new(
            AgentLoop::new(provider, "mock"),
            registry,
            short_term,
            long_term,
            FactExtractor::default(),
        )
    }

    #[tokio::test]
    async fn successful_turn_appends_one_exchange() {
        let tmp = TempDir::new().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![final_answer("Hi there.")]));
        let session = session(provider, &tmp);

        let out = session.handle("hello").await.unwrap();
        assert_eq!(out.answer, "Hi there.");

        let turns = session.short_term().turns().await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::Human);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].role, TurnRole::Agent);
        assert_eq!(turns[1].content, "Hi there.");
    }

    #[tokio::test]
    async fn fact_is_committed_before_the_loop() {
        let tmp = TempDir::new().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![final_answer("Nice!")]));
        let session = session(provider, &tmp);

        session.handle("My name is Alice").await.unwrap();
        assert_eq!(session.long_term().facts().await, vec!["The user's name is Alice.".to_string()]);
    }

    #[tokio::test]
    async fn no_fact_for_plain_questions() {
        let tmp = TempDir::new().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![final_answer("Sunny.")]));
        let session = session(provider, &tmp);

        session.handle("What's the weather?").await.unwrap();
        assert!(session.long_term().is_empty().await);
    }

    #[tokio::test]
    async fn failed_turn_leaves_short_term_untouched() {
        let tmp = TempDir::new().unwrap();
        let session = session(Arc::new(FailingProvider), &tmp);

        assert!(session.handle("I live in Boston").await.is_err());
        assert!(session.short_term().is_empty().await);
        // The side channel already ran.
        assert_eq!(session.long_term().len().await, 1);
    }

    #[tokio::test]
    async fn reasoning_sees_earlier_turns() {
        let tmp = TempDir::new().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            final_answer("Noted."),
            act("Reasoning", "Where do I live?"),
            final_answer("You live in Boston."),
        ]));
        let session = session(provider, &tmp);

        session.handle("I live in Boston").await.unwrap();
        let out = session.handle("Where do I live?").await.unwrap();

        assert_eq!(out.finish, FinishReason::Answered);
        assert_eq!(
            out.steps[0].observation.as_deref(),
            Some("You told me earlier: I live in Boston")
        );
        assert_eq!(session.short_term().len().await, 4);
    }
}
