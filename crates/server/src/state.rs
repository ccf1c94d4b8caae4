//! Shared application state: the long-lived handles every request reads
//! from, built once at startup and handed to the router as axum state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use query_engine_cache::ResponseCache;
use query_engine_config::Settings;
use query_engine_orchestrator::Orchestrator;
use query_engine_rag::QdrantCollection;

/// Counters surfaced through `GET /stats` (§6.1 SUPPLEMENT). Plain atomics
/// rather than a mutex-guarded struct, since each field is updated
/// independently and never read-modify-written together.
#[derive(Debug, Default)]
pub struct RequestCounters {
    pub total_queries: AtomicU64,
    pub temporal_queries: AtomicU64,
}

impl RequestCounters {
    pub fn record_query(&self, temporal: bool) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        if temporal {
            self.temporal_queries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.total_queries.load(Ordering::Relaxed),
            self.temporal_queries.load(Ordering::Relaxed),
        )
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orchestrator: Arc<Orchestrator>,
    pub cache: Option<Arc<ResponseCache>>,
    pub vector_collection: Arc<QdrantCollection>,
    /// Set at startup from whether `PERPLEXITY_API_KEY` was present (§6.4);
    /// the temporal path is disabled, not retried, when this is false.
    pub provider_available: bool,
    pub counters: Arc<RequestCounters>,
}
