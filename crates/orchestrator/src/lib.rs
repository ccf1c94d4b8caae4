//! Query Orchestrator (C7, §4.7): the end-to-end pipeline from a submitted
//! question to a streamed, emotion-labeled answer.
//!
//! Tokens are delivered over an `mpsc::Sender<String>` in the exact order
//! produced upstream; the detected emotion and `cache_safe` flag are
//! delivered once, after the stream is fully drained, over a paired
//! `oneshot::Sender<QueryOutcome>` (§5 DESIGN DECISION) — the direct
//! analogue of the source's generator-to-callback redesign (§9).

pub mod emotion;
pub mod fallback;
pub mod outcome;
pub mod telemetry;

pub use emotion::detect_emotion;
pub use outcome::{QueryHandle, QueryOutcome, QueryType};

use std::sync::Arc;

use chrono::{Datelike, Utc};
use query_engine_cache::ResponseCache;
use query_engine_config::{format_instruction, provider_system_prompt, system_prompt};
use query_engine_core::{
    CachedResponse, CurrentInfoProvider, EntityCatalogue, EntityType, Error, LanguageModel, Message, Query,
    QueryIntent, QueryRecord, ResponseFormat,
};
use query_engine_rag::{NameMatcher, Reranker, VectorSearchService};
use tokio::sync::{mpsc, oneshot};

use crate::fallback::{temporal_failure, LLM_STREAM_FAILURE};

const TOKEN_CHANNEL_CAPACITY: usize = 64;

pub struct Orchestrator {
    catalogue: Arc<EntityCatalogue>,
    vector_search: Arc<VectorSearchService>,
    reranker: Arc<Reranker>,
    llm: Arc<dyn LanguageModel>,
    provider: Option<Arc<dyn CurrentInfoProvider>>,
    cache: Option<Arc<ResponseCache>>,
    default_results: usize,
    year_window: i32,
}

impl Orchestrator {
    pub fn new(
        catalogue: Arc<EntityCatalogue>,
        vector_search: Arc<VectorSearchService>,
        reranker: Arc<Reranker>,
        llm: Arc<dyn LanguageModel>,
        provider: Option<Arc<dyn CurrentInfoProvider>>,
        cache: Option<Arc<ResponseCache>>,
        default_results: usize,
        year_window: i32,
    ) -> Self {
        Self {
            catalogue,
            vector_search,
            reranker,
            llm,
            provider,
            cache,
            default_results,
            year_window,
        }
    }

    /// Entry point (§4.7): spawns the pipeline onto its own task and returns
    /// immediately with the channel pair the caller drains.
    pub fn query(self: &Arc<Self>, query: Query) -> QueryHandle {
        let (token_tx, token_rx) = mpsc::channel(TOKEN_CHANNEL_CAPACITY);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.run(query, token_tx, outcome_tx).await;
        });

        QueryHandle {
            tokens: token_rx,
            outcome: outcome_rx,
        }
    }

    async fn run(&self, query: Query, tokens: mpsc::Sender<String>, outcome: oneshot::Sender<QueryOutcome>) {
        telemetry::record_request();
        let started = std::time::Instant::now();

        let mut record = QueryRecord::new(query_engine_text::clean(&query.question));
        let current_year = Utc::now().year();
        record.temporal = query_engine_rag::needs_current(&query.question, current_year, self.year_window);

        let result = if record.temporal {
            if let Some(provider) = self.provider.clone() {
                record.mark_cache_unsafe();
                telemetry::record_temporal_request();
                self.run_provider_path(&provider, &query, &tokens).await
            } else {
                self.run_rag_path(&query, record, &tokens).await
            }
        } else {
            self.run_rag_path(&query, record, &tokens).await
        };

        telemetry::record_request_latency(started.elapsed().as_secs_f64());
        let _ = outcome.send(result);
    }

    /// §4.7.3: the external current-information path. The full response is
    /// buffered before re-streaming, since citation stripping and the
    /// terminal-punctuation fixup need the whole text (see
    /// `query-engine-llm::provider` for why that buffering isn't done
    /// upstream).
    async fn run_provider_path(
        &self,
        provider: &Arc<dyn CurrentInfoProvider>,
        query: &Query,
        tokens: &mpsc::Sender<String>,
    ) -> QueryOutcome {
        let system_prompt = provider_system_prompt(Utc::now(), query.format);

        match collect_stream(provider.stream(&system_prompt, &query.question)).await {
            Ok(raw) => {
                let stripped = query_engine_llm::strip_citation_brackets(&raw);
                let finished = query_engine_llm::ensure_terminal_punctuation(&stripped);
                stream_word_by_word(&finished, tokens).await;

                QueryOutcome {
                    emotion: detect_emotion(&finished, &query.question),
                    cache_safe: false,
                    query_type: QueryType::Temporal,
                    temporal_detected: true,
                    chunk_count: 0,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, provider = provider.provider_name(), "current-information provider failed");
                let fallback = temporal_failure(query.format);
                stream_word_by_word(fallback, tokens).await;

                QueryOutcome {
                    emotion: detect_emotion(fallback, &query.question),
                    cache_safe: false,
                    query_type: QueryType::Temporal,
                    temporal_detected: true,
                    chunk_count: 0,
                }
            }
        }
    }

    /// §4.7 steps 3-7: the local-knowledge retrieval-augmented path.
    async fn run_rag_path(&self, query: &Query, mut record: QueryRecord, tokens: &mpsc::Sender<String>) -> QueryOutcome {
        let matcher = NameMatcher::new(&self.catalogue);

        let entity = matcher.extract_entity(&record.normalized_text);
        if let Some(entity) = &entity {
            record.intent = QueryIntent::Entity(entity.entity_type);
        }
        record.entity = entity;

        let question_normalized = record.normalized_text.to_lowercase();
        let cache_key = self.cache.as_ref().map(|_| ResponseCache::fingerprint(&question_normalized, query.format));

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(cached) = cache.get(key) {
                telemetry::record_cache_hit();
                stream_word_by_word(&cached.llm_response, tokens).await;
                return QueryOutcome {
                    emotion: detect_emotion(&cached.llm_response, &query.question),
                    cache_safe: true,
                    query_type: QueryType::Rag,
                    temporal_detected: record.temporal,
                    chunk_count: 0,
                };
            }
            telemetry::record_cache_miss();
        }

        let retrieval_started = std::time::Instant::now();
        let scored = self.retrieve_and_rerank(query, &record, &matcher).await;
        telemetry::record_retrieval_latency(retrieval_started.elapsed().as_secs_f64());
        let chunk_count = scored.len();
        let user_prompt = query_engine_llm::build_user_prompt(&scored, &query.question);
        let system = format!("{}\n\n{}", system_prompt(Utc::now().date_naive()), format_instruction(query.format));
        let messages = [Message::system(system), Message::user(user_prompt)];

        let llm_started = std::time::Instant::now();
        let llm_result = stream_llm_and_collect(self.llm.as_ref(), &messages, tokens).await;
        telemetry::record_llm_latency(llm_started.elapsed().as_secs_f64());

        match llm_result {
            Ok(answer) => {
                let emotion = detect_emotion(&answer, &query.question);
                if record.cache_safe {
                    if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
                        let entry = CachedResponse::new(question_normalized, query.format, answer, emotion);
                        if let Err(e) = cache.put(key, &entry) {
                            tracing::warn!(error = %e, "failed to write response cache entry");
                        }
                    }
                }

                QueryOutcome {
                    emotion,
                    cache_safe: record.cache_safe,
                    query_type: QueryType::Rag,
                    temporal_detected: record.temporal,
                    chunk_count,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "llm generation failed");
                stream_word_by_word(LLM_STREAM_FAILURE, tokens).await;
                QueryOutcome {
                    emotion: detect_emotion(LLM_STREAM_FAILURE, &query.question),
                    cache_safe: false,
                    query_type: QueryType::Rag,
                    temporal_detected: record.temporal,
                    chunk_count,
                }
            }
        }
    }

    /// §4.7 step 5: entity-first search for PERSON/ORGANIZATION intents
    /// falling back to plain semantic search, otherwise plain semantic
    /// search over `3 * default_results` candidates — either way re-ranked
    /// down to `default_results`.
    async fn retrieve_and_rerank(
        &self,
        query: &Query,
        record: &QueryRecord,
        matcher: &NameMatcher<'_>,
    ) -> Vec<query_engine_core::ScoredChunk> {
        let k = self.default_results;
        let query_terms = query_engine_text::terms(&query.question);

        let hits = match &record.entity {
            Some(entity) if matches!(entity.entity_type, EntityType::Person | EntityType::Organization) => {
                let entity_hits = self.vector_search.entity_first_search(&query.question, &entity.text, k).await;
                if entity_hits.is_empty() {
                    self.vector_search.semantic_search(&query.question, k * 3).await
                } else {
                    entity_hits
                }
            }
            _ => self.vector_search.semantic_search(&query.question, k * 3).await,
        };

        self.reranker.rerank(hits, &query_terms, record.entity.as_ref(), matcher)
    }
}

/// Drains an LLM token stream to the caller unchanged (§4.7 step 6, §5
/// ordering guarantee), accumulating the full text for post-stream emotion
/// detection and caching.
async fn stream_llm_and_collect(
    llm: &dyn LanguageModel,
    messages: &[Message],
    tokens: &mpsc::Sender<String>,
) -> query_engine_core::Result<String> {
    use futures::StreamExt;

    let mut answer = String::new();
    let mut stream = llm.generate_stream(messages);
    while let Some(token) = stream.next().await {
        let token = token?;
        answer.push_str(&token);
        if tokens.send(token).await.is_err() {
            break;
        }
    }
    Ok(answer)
}

/// Buffers an upstream stream into a single string, propagating the first
/// error encountered (§4.7.3: the provider path must see the whole answer
/// before it can strip citations and fix punctuation).
async fn collect_stream(mut stream: query_engine_core::TokenStream<'_>) -> query_engine_core::Result<String> {
    use futures::StreamExt;

    let mut buffer = String::new();
    while let Some(chunk) = stream.next().await {
        buffer.push_str(&chunk?);
    }
    Ok(buffer)
}

/// Re-streams already-complete text one word at a time (§4.7 step 4, §4.7.3)
/// — used for cache hits and the provider path, both of which must buffer
/// before they can emit (a cached answer is already final; the provider
/// answer needs citation-stripping first).
async fn stream_word_by_word(text: &str, tokens: &mpsc::Sender<String>) {
    for (i, word) in text.split_whitespace().enumerate() {
        let piece = if i == 0 { word.to_string() } else { format!(" {word}") };
        if tokens.send(piece).await.is_err() {
            return;
        }
    }
}

impl From<Error> for QueryOutcome {
    /// Generic catch-all fallback (§7, §4.7 step 8): any failure not already
    /// handled by a more specific path (provider failure, LLM stream
    /// failure) is surfaced as not cache-safe and labeled confused.
    fn from(_: Error) -> Self {
        QueryOutcome {
            emotion: query_engine_core::Emotion::Confused,
            cache_safe: false,
            query_type: QueryType::Rag,
            temporal_detected: false,
            chunk_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream;
    use query_engine_config::ScoringConfig;
    use query_engine_core::{DocumentChunk, EmbeddingModel, EntityFilter, LocationCatalogue, PersonCatalogue, Role, TokenStream, VectorCollection, VectorHit};
    use std::pin::Pin;

    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingModel for StubEmbedder {
        async fn embed(&self, _text: &str) -> query_engine_core::Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
        fn dimensions(&self) -> usize {
            4
        }
        fn model_name(&self) -> &str {
            "stub"
        }
    }

    struct StubCollection {
        body: &'static str,
    }

    #[async_trait]
    impl VectorCollection for StubCollection {
        async fn query(&self, _vector: &[f32], _k: usize) -> query_engine_core::Result<Vec<VectorHit>> {
            Ok(vec![VectorHit::new(DocumentChunk::new("1", "src", 0, self.body), 0.1)])
        }
        async fn query_with_entity_filter(
            &self,
            _vector: &[f32],
            _k: usize,
            _filter: &EntityFilter,
        ) -> query_engine_core::Result<Vec<VectorHit>> {
            Ok(vec![])
        }
        fn collection_name(&self) -> &str {
            "test"
        }
    }

    struct StubLlm {
        answer: &'static str,
    }

    impl LanguageModel for StubLlm {
        fn generate_stream<'a>(&'a self, _messages: &'a [Message]) -> TokenStream<'a> {
            let answer = self.answer;
            let s = stream::iter(answer.split_whitespace().map(|w| Ok(format!("{w} "))));
            Box::pin(s) as Pin<Box<dyn futures::Stream<Item = query_engine_core::Result<String>> + Send>>
        }
        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn orchestrator(body: &'static str, answer: &'static str) -> Arc<Orchestrator> {
        let catalogue = Arc::new(EntityCatalogue::new(PersonCatalogue::default(), vec![], LocationCatalogue::default(), vec![], vec![]));
        let vector_search = Arc::new(VectorSearchService::new(Arc::new(StubEmbedder), Arc::new(StubCollection { body }), 8, 5_000));
        let reranker = Arc::new(Reranker::new(ScoringConfig::default()));
        let llm = Arc::new(StubLlm { answer }) as Arc<dyn LanguageModel>;

        Arc::new(Orchestrator::new(catalogue, vector_search, reranker, llm, None, None, 5, 1))
    }

    #[tokio::test]
    async fn rag_path_streams_llm_tokens_and_reports_outcome() {
        let orchestrator = orchestrator("the director of the institute is B. Ravi", "The director is B. Ravi.");
        let handle = orchestrator.query(Query::new("who is the director", ResponseFormat::Web));
        let (answer, outcome) = handle.collect().await;

        assert!(answer.contains("B. Ravi"));
        let outcome = outcome.expect("outcome should resolve");
        assert_eq!(outcome.query_type, QueryType::Rag);
        assert!(outcome.cache_safe);
    }

    #[tokio::test]
    async fn temporal_query_without_provider_still_falls_through_to_rag() {
        let orchestrator = orchestrator("campus news archive", "Nothing new to report.");
        let handle = orchestrator.query(Query::new("what's happening today on campus", ResponseFormat::Web));
        let (_answer, outcome) = handle.collect().await;

        let outcome = outcome.expect("outcome should resolve");
        assert!(outcome.temporal_detected);
        assert_eq!(outcome.query_type, QueryType::Rag);
    }
}
