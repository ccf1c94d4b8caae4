//! The nine affective labels the orchestrator attaches to a completed answer
//! (§4.7.2). Detection itself lives in the orchestrator crate; this is just
//! the shared enum so the server and cache can serialize/deserialize it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Excited,
    Sad,
    Surprised,
    Confused,
    Thinking,
    Greeting,
    Goodbye,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Excited => "excited",
            Emotion::Sad => "sad",
            Emotion::Surprised => "surprised",
            Emotion::Confused => "confused",
            Emotion::Thinking => "thinking",
            Emotion::Greeting => "greeting",
            Emotion::Goodbye => "goodbye",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Neutral
    }
}
