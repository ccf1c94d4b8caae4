//! Embedding model interface (C4's wrapped collaborator).

use crate::Result;
use async_trait::async_trait;

/// Text → dense vector. Implementations talk to a local or remote embedding
/// model; the wrapping `VectorSearchService` (crate `query-engine-rag`) adds
/// the LRU cache described in §4.4.
#[async_trait]
pub trait EmbeddingModel: Send + Sync + 'static {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimensionality of vectors this model produces.
    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}
