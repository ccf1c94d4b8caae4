//! Vector Search Service (C4, §4.4): wraps an embedding model and a vector
//! collection behind a small cache and a pair of search entry points.

use std::sync::Mutex;
use std::time::Duration;

use lru::LruCache;
use query_engine_core::{EntityFilter, Result, VectorHit};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Embeds queries (with a bounded LRU cache, §4.4) and runs similarity
/// search against the configured collection. Embedding or collection
/// failures — including a timeout — are logged and surfaced as empty result
/// sets rather than propagated — a single bad vector-store round trip should
/// degrade the answer, not fail the request outright (§7).
pub struct VectorSearchService {
    embedder: Arc<dyn query_engine_core::EmbeddingModel>,
    collection: Arc<dyn query_engine_core::VectorCollection>,
    embedding_cache: Mutex<LruCache<String, Vec<f32>>>,
    timeout: Duration,
}

impl VectorSearchService {
    pub fn new(
        embedder: Arc<dyn query_engine_core::EmbeddingModel>,
        collection: Arc<dyn query_engine_core::VectorCollection>,
        cache_size: usize,
        timeout_ms: u64,
    ) -> Self {
        let capacity = NonZeroUsize::new(cache_size.max(1)).unwrap();
        Self {
            embedder,
            collection,
            embedding_cache: Mutex::new(LruCache::new(capacity)),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Embeds `text`, serving from cache when available.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.embedding_cache.lock().unwrap().get(text) {
            return Ok(cached.clone());
        }

        let vector = self.embedder.embed(text).await?;
        self.embedding_cache.lock().unwrap().put(text.to_string(), vector.clone());
        Ok(vector)
    }

    /// Plain semantic search over the top `k` nearest chunks.
    pub async fn semantic_search(&self, query: &str, k: usize) -> Vec<VectorHit> {
        let vector = match self.timed(self.embed(query)).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, returning empty result set");
                return Vec::new();
            }
        };

        match self.timed(self.collection.query(&vector, k)).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "vector search failed, returning empty result set");
                Vec::new()
            }
        }
    }

    /// Search restricted to chunks tagged with the extracted entity. Hits
    /// from this path are marked exact-match downstream by the reranker
    /// (§4.5), since the filter already guarantees the chunk references the
    /// entity in question.
    pub async fn entity_first_search(&self, query: &str, entity_text: &str, k: usize) -> Vec<VectorHit> {
        let vector = match self.timed(self.embed(query)).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, returning empty result set");
                return Vec::new();
            }
        };

        let filter = EntityFilter {
            entity_text: entity_text.to_string(),
        };

        match self.timed(self.collection.query_with_entity_filter(&vector, k, &filter)).await {
            Ok(mut hits) => {
                // The filter already guarantees the entity's text occurs in the
                // body, so every hit from this path is exact by construction
                // regardless of what the collection itself reports (§4.4).
                for hit in &mut hits {
                    hit.exact_match = true;
                }
                hits
            }
            Err(e) => {
                tracing::warn!(error = %e, "entity-filtered vector search failed, returning empty result set");
                Vec::new()
            }
        }
    }

    /// Bounds a suspension point to the configured vector-store timeout
    /// (default 5s, §5), collapsing a timeout into the same `Result` the
    /// wrapped future would have returned on failure.
    async fn timed<T>(&self, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(query_engine_core::Error::Retrieval("vector store request timed out".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use query_engine_core::{DocumentChunk, EmbeddingModel, VectorCollection};

    struct SlowEmbedder;

    #[async_trait]
    impl EmbeddingModel for SlowEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(vec![0.0; 4])
        }
        fn dimensions(&self) -> usize {
            4
        }
        fn model_name(&self) -> &str {
            "slow"
        }
    }

    struct EmptyCollection;

    #[async_trait]
    impl VectorCollection for EmptyCollection {
        async fn query(&self, _vector: &[f32], _k: usize) -> Result<Vec<VectorHit>> {
            Ok(vec![VectorHit::new(DocumentChunk::new("1", "src", 0, "body"), 0.1)])
        }
        async fn query_with_entity_filter(&self, _vector: &[f32], _k: usize, _filter: &EntityFilter) -> Result<Vec<VectorHit>> {
            Ok(vec![])
        }
        fn collection_name(&self) -> &str {
            "test"
        }
    }

    #[tokio::test]
    async fn embedding_timeout_degrades_to_empty_results() {
        let service = VectorSearchService::new(Arc::new(SlowEmbedder), Arc::new(EmptyCollection), 8, 5);
        let hits = service.semantic_search("who is the director", 5).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn search_within_timeout_returns_hits() {
        let service = VectorSearchService::new(Arc::new(SlowEmbedder), Arc::new(EmptyCollection), 8, 500);
        let hits = service.semantic_search("who is the director", 5).await;
        assert_eq!(hits.len(), 1);
    }
}
