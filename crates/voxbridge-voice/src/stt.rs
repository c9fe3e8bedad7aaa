//! **Speech-to-Text (STT)** — turn the caller's recorded utterance into text for the turn pipeline.
//!
//! Implement `SttBackend` for any remote transcription service. `AssemblyAiStt` is the
//! production backend; `Transcriber` reads the recording from disk and separates
//! "nothing was said" from a backend failure.

use crate::error::{VoiceError, VoiceResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const ASSEMBLYAI_API_BASE: &str = "https://api.assemblyai.com";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_MAX_POLLS: u32 = 240;

/// Backend for converting recorded audio bytes (WAV/MP3) to text.
#[async_trait::async_trait]
pub trait SttBackend: Send + Sync {
    /// Transcribe one recording. Return an empty string if nothing was said.
    async fn transcribe(&self, audio: Vec<u8>) -> VoiceResult<String>;
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Production STT backend: AssemblyAI upload → transcript → poll.
#[derive(Debug, Clone)]
pub struct AssemblyAiStt {
    /// Base URL without trailing slash (e.g. https://api.assemblyai.com).
    pub base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_polls: u32,
    client: reqwest::Client,
}

impl AssemblyAiStt {
    /// Create with an API key; every request is bounded by `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> VoiceResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(VoiceError::Config("STT requires a non-empty AssemblyAI key".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        Ok(Self {
            base_url: ASSEMBLYAI_API_BASE.to_string(),
            api_key,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
            client,
        })
    }

    /// Point at a different host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// How often and how many times to poll a queued transcript before giving up.
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls.max(1);
        self
    }

    async fn upload(&self, audio: Vec<u8>) -> VoiceResult<String> {
        let url = format!("{}/v2/upload", self.base_url);
        let res = self
            .client
            .post(&url)
            .header("authorization", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(audio)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!("STT upload error {}: {}", status, body)));
        }
        let parsed: UploadResponse = res
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("STT upload parse failed: {}", e)))?;
        Ok(parsed.upload_url)
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> VoiceResult<TranscriptResponse> {
        let res = request.header("authorization", &self.api_key).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!("STT API error {}: {}", status, body)));
        }
        res.json()
            .await
            .map_err(|e| VoiceError::Stt(format!("STT response parse failed: {}", e)))
    }
}

#[async_trait::async_trait]
impl SttBackend for AssemblyAiStt {
    async fn transcribe(&self, audio: Vec<u8>) -> VoiceResult<String> {
        if audio.is_empty() {
            return Ok(String::new());
        }
        let upload_url = self.upload(audio).await?;
        let create = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .json(&serde_json::json!({ "audio_url": upload_url }));
        let mut transcript = self.fetch(create).await?;
        debug!(id = %transcript.id, "STT transcript queued");

        for _ in 0..self.max_polls {
            match transcript.status.as_str() {
                "completed" => return Ok(transcript.text.unwrap_or_default().trim().to_string()),
                "error" => {
                    let reason = transcript.error.unwrap_or_else(|| "unknown".to_string());
                    return Err(VoiceError::Stt(format!("transcription failed: {}", reason)));
                }
                _ => {}
            }
            tokio::time::sleep(self.poll_interval).await;
            let poll = self
                .client
                .get(format!("{}/v2/transcript/{}", self.base_url, transcript.id));
            transcript = self.fetch(poll).await?;
        }
        Err(VoiceError::Stt(format!(
            "transcript {} not ready after {} polls",
            transcript.id, self.max_polls
        )))
    }
}

/// Outcome of a successful transcription call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// The caller said something.
    Speech(String),
    /// The backend answered but the transcript was blank (muted mic, silence).
    Empty,
}

/// Reads the recording from disk and hands it to an `SttBackend`.
pub struct Transcriber {
    backend: Box<dyn SttBackend>,
}

impl Transcriber {
    pub fn new(backend: Box<dyn SttBackend>) -> Self {
        Self { backend }
    }

    /// Transcribe the recording at `path`. A missing file is a failure, not empty speech.
    pub async fn transcribe(&self, path: &Path) -> VoiceResult<Transcription> {
        let audio = tokio::fs::read(path).await?;
        let text = self.backend.transcribe(audio).await?;
        if text.trim().is_empty() {
            info!(path = %path.display(), "Recording transcribed to nothing");
            return Ok(Transcription::Empty);
        }
        Ok(Transcription::Speech(text))
    }
}
