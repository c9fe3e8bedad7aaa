//! Sentiment tagging: the system instruction that asks the model to prefix every reply with
//! a bracketed sentiment, and the decoder that peels that tag back off.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading `[word]` tag. Only matched at the very start of a reply.
static LEADING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\w+)\]").expect("sentiment tag pattern is valid"));

/// Closed sentiment vocabulary the client application knows how to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[default]
    Neutral,
    Annoyed,
    Mad,
    Happy,
    Teasing,
    Sarcastic,
}

impl Sentiment {
    /// Every sentiment, in the order they are listed to the model.
    pub const ALL: [Sentiment; 6] = [
        Sentiment::Neutral,
        Sentiment::Annoyed,
        Sentiment::Mad,
        Sentiment::Happy,
        Sentiment::Teasing,
        Sentiment::Sarcastic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Neutral => "neutral",
            Sentiment::Annoyed => "annoyed",
            Sentiment::Mad => "mad",
            Sentiment::Happy => "happy",
            Sentiment::Teasing => "teasing",
            Sentiment::Sarcastic => "sarcastic",
        }
    }

    /// Look up a decoded tag in the vocabulary (case-insensitive). `None` if out of vocabulary.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A model reply split into its sentiment tag and the text to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedReply<'a> {
    /// Tag as the model produced it, or `neutral` when the reply carried none.
    pub tag: &'a str,
    /// Reply text with the tag and the whitespace after it removed.
    pub text: &'a str,
    /// Whether a leading tag was present.
    pub tagged: bool,
}

impl DecodedReply<'_> {
    /// Resolve the tag against the vocabulary, falling back to neutral.
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_tag(self.tag).unwrap_or_default()
    }
}

/// Build the system instruction sent as the first turn of every conversation.
pub fn encode_instruction(vocabulary: &[Sentiment], personality: &str) -> String {
    let names: Vec<&str> = vocabulary.iter().map(|s| s.as_str()).collect();
    let listed = match names.split_last() {
        None => String::new(),
        Some((only, [])) => (*only).to_string(),
        Some((last, rest)) => format!("{}, and {}", rest.join(", "), last),
    };
    format!(
        "do not include descriptions, emojis, and actions. Keep responses on the shorter end. \
         Always prepend each response with one corresponding sentiment. \
         Your only sentiments are: {listed}. Enclose the sentiment with square brackets. \
         An example is: [happy] Thank you for that compliment! {personality}"
    )
}

/// Split a leading `[tag]` off a model reply. Never fails: no tag means neutral.
pub fn decode(raw: &str) -> DecodedReply<'_> {
    match LEADING_TAG.captures(raw) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            let tag = caps.get(1).map_or("", |m| m.as_str());
            DecodedReply {
                tag,
                text: raw[whole..].trim_start(),
                tagged: true,
            }
        }
        None => DecodedReply {
            tag: Sentiment::Neutral.as_str(),
            text: raw,
            tagged: false,
        },
    }
}
