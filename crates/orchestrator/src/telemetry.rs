//! Named recorder functions over the `metrics` facade (§1 AMBIENT), mirroring
//! the teacher server's `record_*` helpers rather than scattering bare
//! `metrics::counter!`/`metrics::histogram!` calls through the pipeline.

pub fn record_request() {
    metrics::counter!("query_engine_requests_total").increment(1);
}

pub fn record_temporal_request() {
    metrics::counter!("query_engine_temporal_requests_total").increment(1);
}

pub fn record_cache_hit() {
    metrics::counter!("query_engine_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    metrics::counter!("query_engine_cache_misses_total").increment(1);
}

pub fn record_request_latency(seconds: f64) {
    metrics::histogram!("query_engine_request_duration_seconds").record(seconds);
}

pub fn record_retrieval_latency(seconds: f64) {
    metrics::histogram!("query_engine_retrieval_duration_seconds").record(seconds);
}

pub fn record_llm_latency(seconds: f64) {
    metrics::histogram!("query_engine_llm_duration_seconds").record(seconds);
}
