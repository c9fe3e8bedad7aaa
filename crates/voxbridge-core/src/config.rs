//! Bridge configuration loaded from TOML and environment.
//!
//! Precedence: environment (`VOXBRIDGE_<FIELD>`, e.g. `VOXBRIDGE_OPENROUTER_API_KEY`) >
//! config file (`VOXBRIDGE_CONFIG`, default `config/voxbridge.toml`) > built-in defaults.
//! Blank speech credentials switch the optional services off.

use crate::error::ConfigError;
use crate::openrouter_service::{DEFAULT_MODEL, OPENROUTER_API_BASE};
use crate::sentiment::{encode_instruction, Sentiment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/voxbridge.toml";

/// Which callers share a context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
    /// One conversation for every caller.
    #[default]
    Shared,
    /// One conversation per peer IP address.
    PerPeer,
}

/// Everything the bridge needs to start.
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | host / port | 127.0.0.1 / 25001 | Listener address. |
/// | max_message_bytes | 1024 | Largest inbound message read per connection. |
/// | openrouter_api_key | "" | LLM credential. |
/// | llm_model | google/gemini-2.0-flash-exp:free | OpenRouter model id. |
/// | context_limit | 11 | Turns kept in history, system instruction included. |
/// | personality | "You are a nice person." | Appended to the system instruction. |
/// | elevenlabs_api_key / elevenlabs_voice_id | "" | Blank key disables speech synthesis. |
/// | assemblyai_api_key | "" | Blank key disables transcription. |
/// | session_scope | shared | `shared` or `per_peer`. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    pub max_message_bytes: usize,

    pub openrouter_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub context_limit: usize,
    pub personality: String,

    pub elevenlabs_api_key: String,
    pub elevenlabs_voice_id: String,
    pub tts_base_url: String,
    pub tts_model: String,
    pub tts_output_format: String,

    pub assemblyai_api_key: String,
    pub stt_base_url: String,
    pub stt_poll_interval_ms: u64,
    pub stt_max_polls: u32,

    /// Recorded user speech, read when the client sends `*audio*`.
    pub recording_path: PathBuf,
    /// Synthesized reply, overwritten on every successful turn.
    pub speech_output_path: PathBuf,
    /// Per-request timeout for every backend call.
    pub request_timeout_secs: u64,
    pub session_scope: SessionScope,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 25001,
            max_message_bytes: 1024,
            openrouter_api_key: String::new(),
            llm_base_url: OPENROUTER_API_BASE.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            context_limit: 11,
            personality: "You are a nice person.".to_string(),
            elevenlabs_api_key: String::new(),
            elevenlabs_voice_id: String::new(),
            tts_base_url: "https://api.elevenlabs.io".to_string(),
            tts_model: "eleven_flash_v2_5".to_string(),
            tts_output_format: "mp3_44100_128".to_string(),
            assemblyai_api_key: String::new(),
            stt_base_url: "https://api.assemblyai.com".to_string(),
            stt_poll_interval_ms: 500,
            stt_max_polls: 240,
            recording_path: PathBuf::from("./user_recording.wav"),
            speech_output_path: PathBuf::from("generated_audio.mp3"),
            request_timeout_secs: 60,
            session_scope: SessionScope::Shared,
        }
    }
}

impl BridgeConfig {
    /// Load from the file named by `VOXBRIDGE_CONFIG` (or the default path) plus environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("VOXBRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load with an explicit config file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("VOXBRIDGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let loaded: Self = built.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context_limit < 1 {
            return Err(ConfigError::Invalid(
                "context_limit must be at least 1 (the system instruction)".to_string(),
            ));
        }
        if self.max_message_bytes < 1 {
            return Err(ConfigError::Invalid("max_message_bytes must be at least 1".to_string()));
        }
        if self.request_timeout_secs < 1 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn speech_enabled(&self) -> bool {
        !self.elevenlabs_api_key.trim().is_empty()
    }

    pub fn transcription_enabled(&self) -> bool {
        !self.assemblyai_api_key.trim().is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The fixed system instruction every session starts with.
    pub fn system_instruction(&self) -> String {
        encode_instruction(&Sentiment::ALL, &self.personality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BridgeConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.port, 25001);
        assert_eq!(cfg.context_limit, 11);
        assert_eq!(cfg.session_scope, SessionScope::Shared);
        assert!(!cfg.speech_enabled());
        assert!(!cfg.transcription_enabled());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxbridge.toml");
        std::fs::write(
            &path,
            r#"
port = 26000
context_limit = 3
personality = "You are a pirate."
elevenlabs_api_key = "el-key"
session_scope = "per_peer"
"#,
        )
        .unwrap();

        let cfg = BridgeConfig::load_from(&path).unwrap();
        assert_eq!(cfg.port, 26000);
        assert_eq!(cfg.context_limit, 3);
        assert_eq!(cfg.session_scope, SessionScope::PerPeer);
        assert!(cfg.speech_enabled());
        assert!(cfg.system_instruction().ends_with("You are a pirate."));
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn zero_context_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxbridge.toml");
        std::fs::write(&path, "context_limit = 0\n").unwrap();
        let err = BridgeConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn whitespace_key_does_not_enable_speech() {
        let cfg = BridgeConfig {
            elevenlabs_api_key: "   ".to_string(),
            ..Default::default()
        };
        assert!(!cfg.speech_enabled());
    }
}
