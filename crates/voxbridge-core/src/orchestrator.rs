//! Turn orchestrator: one inbound message in, one `TurnResult` out.
//!
//! ```text
//! Routing ─► (Transcribing) ─► Generating ─► Decoding ─► (Synthesizing) ─► Responding
//! ```
//!
//! Any failure jumps straight to Responding with `failed`. The exchange is committed to the
//! session during Decoding, before synthesis, so a synthesis failure does not undo it.

use crate::config::BridgeConfig;
use crate::context::Turn;
use crate::error::{ConfigError, TurnFailure};
use crate::generator::{LanguageModel, ResponseGenerator};
use crate::openrouter_service::OpenRouterBridge;
use crate::protocol::{InboundMessage, TurnResult};
use crate::sentiment::{self, Sentiment};
use crate::session::Session;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use voxbridge_voice::{
    AssemblyAiStt, ElevenLabsTts, SpeechSynthesizer, Transcriber, Transcription,
};

/// Where a turn currently is. Used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    Routing,
    Transcribing,
    Generating,
    Decoding,
    Synthesizing,
    Responding,
}

impl TurnFailure {
    /// Stage the turn was in when it failed.
    pub fn stage(&self) -> TurnStage {
        match self {
            TurnFailure::TranscriptionDisabled => TurnStage::Routing,
            TurnFailure::Transcription(_) | TurnFailure::EmptySpeech => TurnStage::Transcribing,
            TurnFailure::Generation(_) | TurnFailure::EmptyReply => TurnStage::Generating,
            TurnFailure::Synthesis(_) => TurnStage::Synthesizing,
        }
    }
}

/// Runs the turn pipeline against a caller's session.
pub struct TurnOrchestrator {
    generator: ResponseGenerator,
    transcriber: Option<(Transcriber, PathBuf)>,
    synthesizer: Option<SpeechSynthesizer>,
}

impl TurnOrchestrator {
    /// Text-only orchestrator. Add speech components with the `with_*` builders.
    pub fn new(model: Box<dyn LanguageModel>) -> Self {
        Self {
            generator: ResponseGenerator::new(model),
            transcriber: None,
            synthesizer: None,
        }
    }

    /// Enable `*audio*` requests, reading the recording from `recording_path`.
    pub fn with_transcriber(mut self, transcriber: Transcriber, recording_path: impl Into<PathBuf>) -> Self {
        self.transcriber = Some((transcriber, recording_path.into()));
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: SpeechSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Wire the production backends. Blank speech credentials leave those stages out.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        let timeout = config.request_timeout();
        if config.openrouter_api_key.trim().is_empty() {
            warn!("No OpenRouter key configured; every turn will fail at generation");
        }
        let model = OpenRouterBridge::new(config.openrouter_api_key.as_str(), timeout)?
            .with_model(&config.llm_model)
            .with_base_url(&config.llm_base_url);
        let mut orchestrator = Self::new(Box::new(model));

        if config.transcription_enabled() {
            let stt = AssemblyAiStt::new(config.assemblyai_api_key.as_str(), timeout)?
                .with_base_url(config.stt_base_url.as_str())
                .with_polling(
                    Duration::from_millis(config.stt_poll_interval_ms),
                    config.stt_max_polls,
                );
            orchestrator = orchestrator
                .with_transcriber(Transcriber::new(Box::new(stt)), config.recording_path.clone());
        }

        if config.speech_enabled() {
            if config.elevenlabs_voice_id.trim().is_empty() {
                warn!("ElevenLabs key set without a voice id; synthesis will fail");
            }
            let tts = ElevenLabsTts::new(
                config.elevenlabs_api_key.as_str(),
                config.elevenlabs_voice_id.as_str(),
                timeout,
            )?
            .with_base_url(config.tts_base_url.as_str())
            .with_model(config.tts_model.as_str())
            .with_output_format(config.tts_output_format.as_str());
            orchestrator = orchestrator.with_synthesizer(SpeechSynthesizer::new(
                Box::new(tts),
                config.speech_output_path.clone(),
            ));
        }

        info!(
            model = %config.llm_model,
            transcription = orchestrator.transcription_enabled(),
            speech = orchestrator.speech_enabled(),
            "Turn orchestrator ready"
        );
        Ok(orchestrator)
    }

    pub fn speech_enabled(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn transcription_enabled(&self) -> bool {
        self.transcriber.is_some()
    }

    /// Process one request. Never fails: every failure becomes `TurnResult::Failed`.
    pub async fn handle(&self, session: &mut Session, inbound: InboundMessage) -> TurnResult {
        match self.run_turn(session, inbound).await {
            Ok(sentiment) => {
                debug!(stage = ?TurnStage::Responding, %sentiment, "Turn complete");
                TurnResult::Sentiment(sentiment)
            }
            Err(failure) => {
                warn!(
                    session = %session.key(),
                    stage = ?failure.stage(),
                    error = %failure,
                    "Turn failed"
                );
                TurnResult::Failed
            }
        }
    }

    /// Process one request, keeping the failure cause.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        inbound: InboundMessage,
    ) -> Result<Sentiment, TurnFailure> {
        debug!(stage = ?TurnStage::Routing, "Routing inbound message");
        let utterance = match inbound {
            InboundMessage::Audio => self.transcribe().await?,
            InboundMessage::Text(text) => text,
        };
        info!(session = %session.key(), message = %utterance, "User message");
        self.respond(session, utterance).await
    }

    async fn transcribe(&self) -> Result<String, TurnFailure> {
        let (transcriber, recording) = self
            .transcriber
            .as_ref()
            .ok_or(TurnFailure::TranscriptionDisabled)?;
        debug!(stage = ?TurnStage::Transcribing, path = %recording.display(), "Transcribing recording");
        match transcriber.transcribe(recording).await {
            Ok(Transcription::Speech(text)) => {
                info!(transcript = %text, "Audio transcribed");
                Ok(text)
            }
            Ok(Transcription::Empty) => Err(TurnFailure::EmptySpeech),
            Err(e) => Err(TurnFailure::Transcription(e)),
        }
    }

    async fn respond(&self, session: &mut Session, utterance: String) -> Result<Sentiment, TurnFailure> {
        let user = Turn::user(utterance);

        debug!(stage = ?TurnStage::Generating, "Generating reply");
        let reply = self.generator.generate(session.window(), &user).await?;
        if reply.is_blank() {
            return Err(TurnFailure::EmptyReply);
        }

        debug!(stage = ?TurnStage::Decoding, "Decoding sentiment");
        let decoded = sentiment::decode(reply.content.trim());
        let sentiment = decoded.sentiment();
        if !decoded.tagged {
            info!("No sentiment tag in reply; using neutral");
        } else if Sentiment::from_tag(decoded.tag).is_none() {
            warn!(tag = %decoded.tag, "Sentiment tag outside vocabulary; using neutral");
        }
        info!(%sentiment, reply = %decoded.text, "Model reply");
        let spoken = decoded.text.to_string();

        session.commit(user, Turn::assistant(reply.content));

        if let Some(synthesizer) = &self.synthesizer {
            debug!(stage = ?TurnStage::Synthesizing, "Synthesizing speech");
            synthesizer
                .synthesize(&spoken)
                .await
                .map_err(TurnFailure::Synthesis)?;
        }
        Ok(sentiment)
    }

    /// Path the recording is read from, when transcription is enabled.
    pub fn recording_path(&self) -> Option<&Path> {
        self.transcriber.as_ref().map(|(_, path)| path.as_path())
    }
}
