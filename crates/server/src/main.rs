//! Process entry point: loads configuration, wires up every collaborator,
//! and serves the HTTP surface until signalled to stop.

use std::sync::Arc;

use query_engine_cache::ResponseCache;
use query_engine_config::{load_settings, Settings};
use query_engine_llm::{OllamaEmbedder, OpenAiBackend, PerplexityProvider};
use query_engine_orchestrator::Orchestrator;
use query_engine_rag::{load_catalogue, QdrantCollection, Reranker, VectorSearchService};
use query_engine_server::{build_router, metrics, AppState, RequestCounters};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = std::env::var("QUERY_ENGINE_ENV").ok();
    let settings = load_settings(env.as_deref())?;

    init_tracing(&settings);

    if settings.observability.metrics_enabled {
        if let Err(e) = metrics::install() {
            tracing::warn!(error = %e, "failed to install Prometheus recorder");
        }
    }

    tracing::info!(environment = ?settings.environment, "starting query engine");

    let catalogue = Arc::new(load_catalogue(
        &settings.catalogues.persons,
        &settings.catalogues.organizations,
        &settings.catalogues.locations,
        &settings.catalogues.events,
        &settings.catalogues.titles,
    ));

    let vector_collection = Arc::new(QdrantCollection::new(&settings.vector_store)?);
    vector_collection.ensure_reachable().await.map_err(|e| {
        tracing::error!(error = %e, "vector store unreachable at startup");
        e
    })?;

    let embedder = Arc::new(OllamaEmbedder::new(&settings.embedding, settings.vector_store.vector_dim));
    let vector_search = Arc::new(VectorSearchService::new(
        embedder,
        vector_collection.clone() as Arc<dyn query_engine_core::VectorCollection>,
        settings.embedding.cache_size,
        settings.embedding.timeout_ms,
    ));

    let reranker = Arc::new(Reranker::new(settings.scoring.clone()));

    let openai_key = std::env::var("OPENAI_API_KEY").ok();
    if openai_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; LLM generation requests will fail");
    }
    let llm = Arc::new(OpenAiBackend::new(&settings.llm, openai_key)?) as Arc<dyn query_engine_core::LanguageModel>;

    let perplexity_key = std::env::var("PERPLEXITY_API_KEY").ok();
    let provider_available = perplexity_key.is_some();
    let provider = match perplexity_key {
        Some(key) => {
            let backend = PerplexityProvider::new(&settings.provider, key)?;
            Some(Arc::new(backend) as Arc<dyn query_engine_core::CurrentInfoProvider>)
        }
        None => {
            tracing::info!("PERPLEXITY_API_KEY not set; temporal queries will fall through to local retrieval");
            None
        }
    };

    let cache = if settings.cache.enabled {
        match ResponseCache::new(
            &settings.cache.directory,
            settings.cache.ttl_days,
            settings.cache.cleanup_interval_hours,
            settings.cache.size_ceiling_bytes,
        ) {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to initialize response cache; continuing without it");
                None
            }
        }
    } else {
        None
    };

    let orchestrator = Arc::new(Orchestrator::new(
        catalogue,
        vector_search,
        reranker,
        llm,
        provider,
        cache.clone(),
        settings.scoring.default_results,
        settings.temporal.year_window,
    ));

    let settings = Arc::new(settings);
    let state = AppState {
        settings: settings.clone(),
        orchestrator,
        cache,
        vector_collection,
        provider_available,
        counters: Arc::new(RequestCounters::default()),
    };

    let router = build_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.observability.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.observability.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(e) => tracing::error!(error = %e, "failed to install ctrl-c handler"),
    }
}
