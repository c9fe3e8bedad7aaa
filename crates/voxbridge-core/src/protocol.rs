//! Wire messages between the client application and the bridge.
//!
//! Inbound: `*audio*` (a recording is waiting on disk) or any other UTF-8 text.
//! Outbound: a sentiment name or `failed`, suffixed with ` no stt` when the bridge
//! produced no speech audio because synthesis is not configured.

use crate::sentiment::Sentiment;
use std::fmt;

/// Sentinel meaning "transcribe the recording instead of reading this message".
pub const AUDIO_SENTINEL: &str = "*audio*";

/// Appended to every reply when speech synthesis is disabled.
pub const NO_SPEECH_SUFFIX: &str = " no stt";

const FAILED: &str = "failed";

/// What the client asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// The client recorded the user's voice.
    Audio,
    /// A typed utterance.
    Text(String),
}

impl InboundMessage {
    /// Decode raw bytes from the socket. Invalid UTF-8 is replaced, never rejected.
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        if text == AUDIO_SENTINEL {
            InboundMessage::Audio
        } else {
            InboundMessage::Text(text.into_owned())
        }
    }
}

/// The single value that crosses back to the client for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnResult {
    Sentiment(Sentiment),
    Failed,
}

impl TurnResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, TurnResult::Failed)
    }

    /// Render the outbound message.
    pub fn encode(&self, speech_enabled: bool) -> String {
        let mut out = self.to_string();
        if !speech_enabled {
            out.push_str(NO_SPEECH_SUFFIX);
        }
        out
    }
}

impl fmt::Display for TurnResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnResult::Sentiment(s) => f.write_str(s.as_str()),
            TurnResult::Failed => f.write_str(FAILED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_sentinel_must_match_exactly() {
        assert_eq!(InboundMessage::parse(b"*audio*"), InboundMessage::Audio);
        assert_eq!(
            InboundMessage::parse(b"*audio* please"),
            InboundMessage::Text("*audio* please".to_string())
        );
        assert_eq!(
            InboundMessage::parse(b" *audio*"),
            InboundMessage::Text(" *audio*".to_string())
        );
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        match InboundMessage::parse(&[b'h', 0xff, b'i']) {
            InboundMessage::Text(t) => assert_eq!(t, "h\u{fffd}i"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn encodes_reply_tokens() {
        assert_eq!(TurnResult::Sentiment(Sentiment::Happy).encode(true), "happy");
        assert_eq!(TurnResult::Failed.encode(true), "failed");
        assert_eq!(TurnResult::Sentiment(Sentiment::Neutral).encode(false), "neutral no stt");
        assert_eq!(TurnResult::Failed.encode(false), "failed no stt");
    }
}
