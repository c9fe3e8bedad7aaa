//! In-memory backends shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use voxbridge_core::{GenerationError, LanguageModel, Turn};
use voxbridge_voice::{SttBackend, TtsBackend, VoiceError, VoiceResult};

/// Replays canned completions in order and counts calls.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    pub calls: Arc<AtomicUsize>,
    pub last_messages: Arc<Mutex<Vec<Turn>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::new(AtomicUsize::new(0)),
            last_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(GenerationError::Status {
            status: 502,
            body: "upstream unavailable".to_string(),
        })])
    }
}

#[async_trait::async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, messages: &[Turn]) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyChoices))
    }
}

/// Returns a fixed transcript, or fails.
pub struct FakeStt(pub Option<String>);

#[async_trait::async_trait]
impl SttBackend for FakeStt {
    async fn transcribe(&self, _audio: Vec<u8>) -> VoiceResult<String> {
        self.0
            .clone()
            .ok_or_else(|| VoiceError::Stt("service unavailable".to_string()))
    }
}

/// Records what it was asked to say; optionally fails.
pub struct FakeTts {
    pub fail: bool,
    pub spoken: Arc<Mutex<Vec<String>>>,
}

impl FakeTts {
    pub fn ok() -> Self {
        Self {
            fail: false,
            spoken: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn broken() -> Self {
        Self {
            fail: true,
            spoken: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait::async_trait]
impl TtsBackend for FakeTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(VoiceError::Tts("TTS API error 429: rate limited".to_string()));
        }
        Ok(b"ID3fake".to_vec())
    }
}
