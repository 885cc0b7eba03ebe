//! Short-term memory: the ordered turn log of the current session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnRole {
    Human,
    Agent,
}

impl TurnRole {
    pub fn label(self) -> &'static str {
        match self {
            TurnRole::Human => "Human",
            TurnRole::Agent => "AI",
        }
    }
}

/// One utterance. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only turn log. Shared between the session and the capabilities
/// that read it; only the session appends.
#[derive(Debug, Default)]
pub struct ShortTermMemory {
    turns: RwLock<Vec<Turn>>,
}

impl ShortTermMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, role: TurnRole, content: impl Into<String>) {
        self.turns.write().await.push(Turn {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    /// Append a human input and the agent's answer as one exchange.
    pub async fn append_exchange(&self, input: impl Into<String>, answer: impl Into<String>) {
        let now = Utc::now();
        let mut turns = self.turns.write().await;
        turns.push(Turn {
            role: TurnRole::Human,
            content: input.into(),
            timestamp: now,
        });
        turns.push(Turn {
            role: TurnRole::Agent,
            content: answer.into(),
            timestamp: now,
        });
    }

    /// Snapshot of every turn, oldest first.
    pub async fn turns(&self) -> Vec<Turn> {
        self.turns.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }

    /// `Human: ...` / `AI: ...` lines, oldest first.
    pub async fn render(&self) -> String {
        self.turns
            .read()
            .await
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_preserves_order() {
        let memory = ShortTermMemory::new();
        memory.append_exchange("hi", "hello").await;
        memory.append(TurnRole::Human, "bye").await;

        let turns = memory.turns().await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, TurnRole::Human);
        assert_eq!(turns[1].role, TurnRole::Agent);
        assert_eq!(turns[2].content, "bye");
    }

    #[tokio::test]
    async fn render_labels_roles() {
        let memory = ShortTermMemory::new();
        memory.append_exchange("My name is Alice", "Nice to meet you, Alice.").await;
        assert_eq!(
            memory.render().await,
            "Human: My name is Alice\nAI: Nice to meet you, Alice."
        );
    }

    #[tokio::test]
    async fn empty_render_is_empty() {
        let memory = ShortTermMemory::new();
        assert!(memory.is_empty().await);
        assert_eq!(memory.render().await, "");
    }
}
