//! Prometheus text exposition for `GET /metrics` (§6.1 AMBIENT), matching
//! the teacher server's existing metrics route.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the global Prometheus recorder. Must be called once, before any
/// `metrics::counter!`/`metrics::histogram!` call sites are hit.
pub fn install() -> Result<(), String> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| e.to_string())?;
    HANDLE.set(handle).map_err(|_| "prometheus recorder installed twice".to_string())
}

pub async fn render() -> impl IntoResponse {
    match HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics not enabled\n".to_string()),
    }
}
