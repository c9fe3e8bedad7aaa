//! # voxbridge-voice - speech in, speech out
//!
//! Remote speech backends used by the bridge's turn pipeline:
//!
//! ```text
//!  user_recording.wav ──► Transcriber ──► SttBackend (AssemblyAI)  ──► text
//!  reply text ──► SpeechSynthesizer ──► TtsBackend (ElevenLabs) ──► generated_audio.mp3
//! ```
//!
//! Both sides are optional in the bridge: a blank credential means the component is
//! never constructed.

pub mod error;
pub mod stt;
pub mod voice_output;

pub use error::{VoiceError, VoiceResult};
pub use stt::{AssemblyAiStt, SttBackend, Transcriber, Transcription};
pub use voice_output::{AudioArtifact, ElevenLabsTts, SpeechSynthesizer, TtsBackend};
