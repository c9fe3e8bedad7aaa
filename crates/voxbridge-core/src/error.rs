//! Error types for the turn pipeline and its infrastructure.

use thiserror::Error;
use voxbridge_voice::VoiceError;

/// Why the language-model call produced no usable reply.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response parse failed: {0}")]
    Decode(String),

    #[error("LLM returned no choices")]
    EmptyChoices,
}

/// Configuration could not be loaded or is out of range.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to build speech backend: {0}")]
    Backend(#[from] VoiceError),

    #[error("failed to build LLM client: {0}")]
    Llm(#[from] GenerationError),
}

/// A connection that could not be served.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("client closed the connection without sending a message")]
    EmptyMessage,

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a turn ended in `failed`. Logged, never sent to the client.
#[derive(Error, Debug)]
pub enum TurnFailure {
    #[error("received audio but transcription is not configured")]
    TranscriptionDisabled,

    #[error("transcription failed: {0}")]
    Transcription(#[source] VoiceError),

    #[error("transcript was empty")]
    EmptySpeech,

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("model returned an empty reply")]
    EmptyReply,

    #[error("speech synthesis failed: {0}")]
    Synthesis(#[source] VoiceError),
}
