//! Client-facing HTTP surface (§6.1): health, query, introspection, and
//! cache-control routes, composed behind the same trace/compression/CORS
//! layering the teacher server already used.

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Datelike;
use query_engine_core::{Query, ResponseFormat};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.settings.server.cors_origins, state.settings.server.cors_enabled);

    Router::new()
        .route("/health", get(health))
        .route("/query", post(query))
        .route("/stats", get(stats))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/clear", post(cache_clear))
        .route("/metrics", get(crate::metrics::render))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!("request", request_id = %Uuid::new_v4(), method = %request.method(), uri = %request.uri())
        }))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Builds the CORS layer from configured origins, falling back to a
/// permissive-but-logged default when disabled or misconfigured rather than
/// refusing to start.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled; all cross-origin requests will be rejected by the browser");
        return CorsLayer::new();
    }

    if origins.is_empty() {
        tracing::warn!("no CORS origins configured; falling back to http://localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(tower_http::cors::Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin, error = %e, "invalid CORS origin, skipping");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        tracing::error!("no valid CORS origins after parsing; falling back to http://localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(tower_http::cors::Any);
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    message: &'static str,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.vector_collection.document_count().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                service: "query-engine",
                version: env!("CARGO_PKG_VERSION"),
                message: "ready",
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "health check: vector store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    service: "query-engine",
                    version: env!("CARGO_PKG_VERSION"),
                    message: "vector store unreachable",
                }),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    question: String,
    format: String,
}

#[derive(Debug, Serialize)]
struct QueryResponseBody {
    response: String,
    emotion: &'static str,
    cache_safe: bool,
    metadata: QueryMetadata,
}

#[derive(Debug, Serialize)]
struct QueryMetadata {
    question: String,
    format: &'static str,
    response_length: usize,
    chunk_count: usize,
    query_type: &'static str,
    temporal_detected: bool,
}

async fn query(State(state): State<AppState>, Json(body): Json<QueryRequest>) -> Result<Json<QueryResponseBody>, ServerError> {
    let question = body.question.trim();
    if question.is_empty() {
        return Err(ServerError::invalid_request("question", "must not be empty"));
    }
    if question.chars().count() > state.settings.server.question_max_chars {
        return Err(ServerError::invalid_request(
            "question",
            format!("must be at most {} characters", state.settings.server.question_max_chars),
        ));
    }

    let format = ResponseFormat::parse(&body.format)
        .ok_or_else(|| ServerError::invalid_request("format", "must be \"web\" or \"voice\""))?;

    let handle = state.orchestrator.query(Query::new(question, format));
    let (answer, outcome) = handle.collect().await;

    let outcome = outcome.ok_or_else(|| ServerError::Internal("orchestrator did not report an outcome".to_string()))?;

    state.counters.record_query(outcome.temporal_detected);

    let response_length = answer.chars().count();

    Ok(Json(QueryResponseBody {
        response: answer,
        emotion: outcome.emotion.as_str(),
        cache_safe: outcome.cache_safe,
        metadata: QueryMetadata {
            question: question.to_string(),
            format: format.as_str(),
            response_length,
            chunk_count: outcome.chunk_count,
            query_type: outcome.query_type.as_str(),
            temporal_detected: outcome.temporal_detected,
        },
    }))
}

async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (total_queries, temporal_queries) = state.counters.snapshot();

    let document_count = state.vector_collection.document_count().await.ok();
    let cache_stats = state.cache.as_ref().and_then(|c| c.stats().ok());

    let current_year = chrono::Utc::now().year();
    let year_window = state.settings.temporal.year_window;

    Json(json!({
        "feature_flags": {
            "emotion_detection": true,
            "format_aware_responses": true,
            "temporal_detection": true,
            "perplexity_integration": state.provider_available,
            "cache_control": state.cache.is_some(),
        },
        "configuration": {
            "max_query_length": state.settings.server.question_max_chars,
            "default_results": state.settings.scoring.default_results,
            "supported_formats": ["web", "voice"],
            "supported_emotions": ["happy", "excited", "sad", "surprised", "confused", "thinking", "greeting", "goodbye", "neutral"],
        },
        "document_count": document_count,
        "cache_stats": cache_stats,
        "perplexity_status": {
            "available": state.provider_available,
            "enabled": state.provider_available,
        },
        "temporal_detection": {
            "current_year": current_year,
            "year_range": [current_year - year_window, current_year + year_window],
        },
        "counters": {
            "total_queries": total_queries,
            "temporal_queries": temporal_queries,
        },
    }))
}

async fn cache_stats(State(state): State<AppState>) -> Result<Json<query_engine_cache::CacheStats>, ServerError> {
    let cache = state.cache.as_ref().ok_or(ServerError::NotFound)?;
    cache.stats().map(Json).map_err(|e| ServerError::Internal(e.to_string()))
}

async fn cache_clear(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    let cache = state.cache.as_ref().ok_or(ServerError::NotFound)?;
    let removed = cache.clear_all().map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(Json(json!({ "removed": removed })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RequestCounters;
    use query_engine_config::{EmbeddingConfig, LlmSettings, ScoringConfig, Settings, VectorStoreConfig};
    use query_engine_core::{EntityCatalogue, LanguageModel, LocationCatalogue, PersonCatalogue};
    use query_engine_llm::{OllamaEmbedder, OpenAiBackend};
    use query_engine_orchestrator::Orchestrator;
    use query_engine_rag::{QdrantCollection, Reranker, VectorSearchService};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let settings = Arc::new(Settings::default());
        let vector_store = VectorStoreConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            ..VectorStoreConfig::default()
        };
        let collection = Arc::new(QdrantCollection::new(&vector_store).expect("client construction is lazy"));
        let embedder = Arc::new(OllamaEmbedder::new(&EmbeddingConfig::default(), 4));
        let vector_search = Arc::new(VectorSearchService::new(embedder, collection.clone(), 8, 1_000));
        let reranker = Arc::new(Reranker::new(ScoringConfig::default()));
        let llm = Arc::new(OpenAiBackend::new(&LlmSettings::default(), None).expect("client construction is lazy")) as Arc<dyn LanguageModel>;
        let catalogue = Arc::new(EntityCatalogue::new(PersonCatalogue::default(), vec![], LocationCatalogue::default(), vec![], vec![]));

        let orchestrator = Arc::new(Orchestrator::new(catalogue, vector_search, reranker, llm, None, None, 5, 1));

        AppState {
            settings,
            orchestrator,
            cache: None,
            vector_collection: collection,
            provider_available: false,
            counters: Arc::new(RequestCounters::default()),
        }
    }

    #[tokio::test]
    async fn router_builds_and_serves_health() {
        let router = build_router(test_state());
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn cache_routes_404_when_cache_disabled() {
        let router = build_router(test_state());
        let request = axum::http::Request::builder()
            .uri("/cache/stats")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
