//! The post-stream record and channel pair a query resolves to (§5 DESIGN
//! DECISION): tokens drain through an `mpsc::Receiver<String>` in upstream
//! order; the caller awaits the paired `oneshot::Receiver<QueryOutcome>` only
//! after the channel yields `None`, never before.

use query_engine_core::Emotion;
use tokio::sync::{mpsc, oneshot};

/// Which of the two retrieval paths produced the answer, echoed in the HTTP
/// response metadata (§6.1 SUPPLEMENT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Temporal,
    Rag,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Temporal => "temporal",
            QueryType::Rag => "rag",
        }
    }
}

/// Delivered once, after the token stream has fully drained (§4.7, §5).
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub emotion: Emotion,
    pub cache_safe: bool,
    pub query_type: QueryType,
    pub temporal_detected: bool,
    /// Number of retrieved chunks the answer was grounded on; 0 for the
    /// temporal path and for cache hits, which re-stream a prior answer
    /// rather than retrieving again (§6.1 SUPPLEMENT `metadata.chunk_count`).
    pub chunk_count: usize,
}

pub struct QueryHandle {
    pub tokens: mpsc::Receiver<String>,
    pub outcome: oneshot::Receiver<QueryOutcome>,
}

impl QueryHandle {
    /// Drains every token, joining them unmodified, then awaits the outcome.
    /// Matches the HTTP handler's collect-then-respond model (§6.1): the
    /// streaming channel exists for ordering and cancellation, not because
    /// the client sees partial chunks.
    pub async fn collect(mut self) -> (String, Option<QueryOutcome>) {
        let mut answer = String::new();
        while let Some(token) = self.tokens.recv().await {
            answer.push_str(&token);
        }
        let outcome = self.outcome.await.ok();
        (answer, outcome)
    }
}
