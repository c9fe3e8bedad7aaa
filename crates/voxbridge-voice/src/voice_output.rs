//! **VoiceOutput** — text-to-speech and the spoken-reply artifact.
//!
//! `TtsBackend` turns text into encoded audio; `SpeechSynthesizer` writes the bytes to the
//! well-known path the client application plays from, replacing the previous reply.

use crate::error::{VoiceError, VoiceResult};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io";
const DEFAULT_TTS_MODEL: &str = "eleven_flash_v2_5";
const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Backend that turns text into audio bytes (MP3/WAV).
#[async_trait::async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize text to encoded audio.
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>>;
}

/// Production TTS backend: ElevenLabs text-to-speech.
#[derive(Debug, Clone)]
pub struct ElevenLabsTts {
    /// Base URL without trailing slash (e.g. https://api.elevenlabs.io).
    pub base_url: String,
    api_key: String,
    /// Voice to speak with.
    pub voice_id: String,
    /// Model: eleven_flash_v2_5 (fast, cheaper) or eleven_multilingual_v2.
    pub model: String,
    /// ElevenLabs output format, e.g. mp3_44100_128.
    pub output_format: String,
    client: reqwest::Client,
}

impl ElevenLabsTts {
    /// Create with an API key and voice; every request is bounded by `timeout`.
    pub fn new(
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
        timeout: Duration,
    ) -> VoiceResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(VoiceError::Config("TTS requires a non-empty ElevenLabs key".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoiceError::Tts(e.to_string()))?;
        Ok(Self {
            base_url: ELEVENLABS_API_BASE.to_string(),
            api_key,
            voice_id: voice_id.into(),
            model: DEFAULT_TTS_MODEL.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }
}

#[async_trait::async_trait]
impl TtsBackend for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url, self.voice_id, self.output_format
        );
        let body = serde_json::json!({
            "text": text,
            "model_id": self.model,
        });
        let res = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!("TTS API error {}: {}", status, body)));
        }
        let bytes = res.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Where the last spoken reply was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Synthesizes reply text and overwrites the output file the client plays.
pub struct SpeechSynthesizer {
    backend: Box<dyn TtsBackend>,
    output_path: PathBuf,
}

impl SpeechSynthesizer {
    pub fn new(backend: Box<dyn TtsBackend>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Synthesize `text` and replace the artifact on disk.
    pub async fn synthesize(&self, text: &str) -> VoiceResult<AudioArtifact> {
        let audio = self.backend.synthesize(text).await?;
        tokio::fs::write(&self.output_path, &audio).await?;
        info!(path = %self.output_path.display(), bytes = audio.len(), "Speech written");
        Ok(AudioArtifact {
            path: self.output_path.clone(),
            bytes: audio.len(),
        })
    }
}
