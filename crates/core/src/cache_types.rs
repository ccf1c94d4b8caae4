//! Cached response record (§3, C6). The cache store (crate `query-engine-cache`)
//! owns persistence; this is the shared value type so the server and
//! orchestrator can read it without depending on the cache crate's internals.

use crate::emotion::Emotion;
use crate::query::ResponseFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Invariant: an entry is only ever written when the query that produced it
/// was `cache_safe == true`; readers additionally enforce the TTL (an entry
/// older than TTL is invisible even though the file still exists until the
/// next cleanup pass).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub question_normalized: String,
    pub format: ResponseFormat,
    pub llm_response: String,
    pub emotion: Emotion,
    pub timestamp: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(
        question_normalized: impl Into<String>,
        format: ResponseFormat,
        llm_response: impl Into<String>,
        emotion: Emotion,
    ) -> Self {
        Self {
            question_normalized: question_normalized.into(),
            format,
            llm_response: llm_response.into(),
            emotion,
            timestamp: Utc::now(),
        }
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.timestamp)
    }
}
