//! OpenRouter bridge: chat completions over the OpenAI-compatible OpenRouter API.
//!
//! API key: `VOXBRIDGE_OPENROUTER_API_KEY`. Default model: `google/gemini-2.0-flash-exp:free`.

use crate::context::Turn;
use crate::error::GenerationError;
use crate::generator::LanguageModel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";

// OpenAI-compatible request/response for OpenRouter
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter chat-completion client.
pub struct OpenRouterBridge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterBridge {
    /// Create a bridge with an explicit API key; every request is bounded by `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENROUTER_API_BASE.to_string(),
            client,
        })
    }

    /// Set the model (e.g. `google/gemini-2.0-flash-exp:free`, `anthropic/claude-3.5-sonnet`).
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenRouterBridge {
    async fn complete(&self, messages: &[Turn]) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages,
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "https://voxbridge.local")
            .header("X-Title", "voxbridge")
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(GenerationError::EmptyChoices)
    }
}
