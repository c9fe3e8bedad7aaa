//! voxbridge-core: the conversational turn pipeline behind the bridge.
//!
//! A client application sends one message per connection (typed text, or `*audio*` for a
//! recording on disk). The bridge asks a language model for a sentiment-tagged reply,
//! keeps a bounded conversation history, optionally speaks the reply to a file, and
//! answers with the sentiment name or `failed`.

mod config;
mod context;
mod error;
mod generator;
mod openrouter_service;
mod orchestrator;
mod protocol;
pub mod sentiment;
mod server;
mod session;

pub use config::{BridgeConfig, SessionScope};
pub use context::{ContextWindow, Role, Turn};
pub use error::{ConfigError, GenerationError, ProtocolError, TurnFailure};
pub use generator::{LanguageModel, RawModelReply, ResponseGenerator};
pub use openrouter_service::{OpenRouterBridge, DEFAULT_MODEL, OPENROUTER_API_BASE};
pub use orchestrator::{TurnOrchestrator, TurnStage};
pub use protocol::{InboundMessage, TurnResult, AUDIO_SENTINEL, NO_SPEECH_SUFFIX};
pub use sentiment::{DecodedReply, Sentiment};
pub use server::BridgeServer;
pub use session::{Session, SessionRegistry};
