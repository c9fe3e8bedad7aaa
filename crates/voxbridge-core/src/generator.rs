//! Response generation: window + new user turn in, raw model reply out.

use crate::context::{ContextWindow, Turn};
use crate::error::GenerationError;
use tracing::debug;

/// A chat-completion backend. Receives the full ordered history, returns the first completion.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[Turn]) -> Result<String, GenerationError>;
}

/// Unprocessed model output, possibly starting with a `[sentiment]` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelReply {
    pub content: String,
}

impl RawModelReply {
    /// True when the reply has nothing to say once whitespace is removed.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Asks the language model for the next assistant turn. Never touches the window.
pub struct ResponseGenerator {
    model: Box<dyn LanguageModel>,
}

impl ResponseGenerator {
    pub fn new(model: Box<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn generate(
        &self,
        window: &ContextWindow,
        user: &Turn,
    ) -> Result<RawModelReply, GenerationError> {
        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.extend_from_slice(window.snapshot());
        messages.push(user.clone());
        debug!(history = messages.len(), "Requesting completion");

        let content = self.model.complete(&messages).await?;
        Ok(RawModelReply { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording {
        seen: Arc<Mutex<Vec<Turn>>>,
    }

    #[async_trait::async_trait]
    impl LanguageModel for Recording {
        async fn complete(&self, messages: &[Turn]) -> Result<String, GenerationError> {
            if let Ok(mut seen) = self.seen.lock() {
                *seen = messages.to_vec();
            }
            Ok("[happy] ok".to_string())
        }
    }

    #[tokio::test]
    async fn sends_history_then_user_turn_without_mutating_window() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let generator = ResponseGenerator::new(Box::new(Recording { seen: Arc::clone(&seen) }));

        let mut window = ContextWindow::new(Turn::system("sys"), 11);
        window.append(Turn::user("earlier"), Turn::assistant("[teasing] sure"));

        let reply = generator.generate(&window, &Turn::user("now")).await.unwrap();
        assert_eq!(reply.content, "[happy] ok");
        assert_eq!(window.len(), 3);

        let sent = seen.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![
                Turn::system("sys"),
                Turn::user("earlier"),
                Turn::assistant("[teasing] sure"),
                Turn::user("now"),
            ]
        );
    }

    #[test]
    fn blank_reply_detection() {
        assert!(RawModelReply { content: " \n".into() }.is_blank());
        assert!(!RawModelReply { content: "[mad]".into() }.is_blank());
    }
}
