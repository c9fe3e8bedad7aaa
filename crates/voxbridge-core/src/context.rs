//! Conversation history sent to the language model on every turn.
//!
//! The window always starts with the system instruction and holds at most
//! `context_limit` turns. Old history leaves one exchange (user + assistant) at a time.

use serde::{Deserialize, Serialize};

/// Who authored a turn. Serialized the way chat-completion APIs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Bounded, system-anchored conversation log.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    turns: Vec<Turn>,
    limit: usize,
}

impl ContextWindow {
    /// Seed a window with the system instruction. A limit of 0 is treated as 1.
    pub fn new(system: Turn, context_limit: usize) -> Self {
        Self {
            turns: vec![system],
            limit: context_limit.max(1),
        }
    }

    /// Append an exchange, then drop the oldest exchanges until the window fits.
    ///
    /// Index 0 is never touched. When the limit leaves no room for even one exchange
    /// (limit 1 or 2) the new exchange is itself dropped and only the system turn remains.
    pub fn append(&mut self, user: Turn, assistant: Turn) {
        self.turns.push(user);
        self.turns.push(assistant);
        while self.turns.len() > self.limit && self.turns.len() >= 3 {
            self.turns.drain(1..3);
        }
    }

    /// Current history, system turn first.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn system(&self) -> &Turn {
        &self.turns[0]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: the system turn is permanent.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of user/assistant exchanges currently retained.
    pub fn exchanges(&self) -> usize {
        (self.turns.len() - 1) / 2
    }
}
