//! Query-scoped types: the transient, one-per-request record the
//! orchestrator builds up as it classifies and retrieves for a single
//! question (§3).

use crate::entity::{ExtractedEntity, QueryIntent};
use serde::{Deserialize, Serialize};

/// Requested response format. Drives both the prompt's word budget (§6.3)
/// and half of the response cache key (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Web,
    Voice,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Web => "web",
            ResponseFormat::Voice => "voice",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "web" => Some(ResponseFormat::Web),
            "voice" => Some(ResponseFormat::Voice),
            _ => None,
        }
    }

    /// Target word-count range for the format-specific instruction block
    /// the orchestrator appends to the system prompt (§6.3).
    pub fn word_budget(&self) -> (usize, usize) {
        match self {
            ResponseFormat::Web => (150, 300),
            ResponseFormat::Voice => (50, 80),
        }
    }

    /// Word-count range for the external current-information provider path
    /// (§4.7.3) — narrower for voice than the RAG path's budget, since the
    /// provider system prompt carries its own format instruction.
    pub fn provider_word_budget(&self) -> (usize, usize) {
        match self {
            ResponseFormat::Web => (150, 300),
            ResponseFormat::Voice => (40, 60),
        }
    }
}

/// The raw, client-submitted request (§6.1): a question and a format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub question: String,
    pub format: ResponseFormat,
}

impl Query {
    pub fn new(question: impl Into<String>, format: ResponseFormat) -> Self {
        Self {
            question: question.into(),
            format,
        }
    }
}

/// The derived record the orchestrator builds while working a single query
/// (§3, §4.7). Constructed on request entry, discarded after the response
/// completes — the core keeps no state across requests.
#[derive(Debug, Clone)]
pub struct QueryRecord {
    pub normalized_text: String,
    pub intent: QueryIntent,
    pub entity: Option<ExtractedEntity>,
    pub temporal: bool,
    /// Mirrors `temporal` unless downgraded by an error during processing
    /// (§4.7, §7): an exception always sets this false regardless of how
    /// the query was classified.
    pub cache_safe: bool,
}

impl QueryRecord {
    pub fn new(normalized_text: impl Into<String>) -> Self {
        Self {
            normalized_text: normalized_text.into(),
            intent: QueryIntent::General,
            entity: None,
            temporal: false,
            cache_safe: true,
        }
    }

    pub fn mark_cache_unsafe(&mut self) {
        self.cache_safe = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!(ResponseFormat::parse("Web"), Some(ResponseFormat::Web));
        assert_eq!(ResponseFormat::parse("VOICE"), Some(ResponseFormat::Voice));
        assert_eq!(ResponseFormat::parse("chat"), None);
    }

    #[test]
    fn word_budgets_match_spec() {
        assert_eq!(ResponseFormat::Web.word_budget(), (150, 300));
        assert_eq!(ResponseFormat::Voice.word_budget(), (50, 80));
    }

    #[test]
    fn provider_word_budget_is_narrower_for_voice() {
        assert_eq!(ResponseFormat::Voice.provider_word_budget(), (40, 60));
        assert_eq!(ResponseFormat::Web.provider_word_budget(), (150, 300));
    }
}
