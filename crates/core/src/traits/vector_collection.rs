//! Vector collection interface (C4's wrapped collaborator): an
//! approximate-NN index with metadata filtering, externally managed and
//! read-only to the core at query time (§5).

use crate::chunk::DocumentChunk;
use crate::Result;
use async_trait::async_trait;

/// One nearest-neighbor hit: the chunk plus its raw distance in `[0, 2]`
/// (cosine space, 0 = identical).
///
/// `exact_match` is set by the retrieval layer, not derived from distance —
/// `query_with_entity_filter` hits are exact by construction of the filter
/// (the entity's text is guaranteed present in the body), and the reranker
/// (§4.5) adds the entity boost unconditionally for them regardless of the
/// vector distance.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub chunk: DocumentChunk,
    pub distance: f32,
    pub exact_match: bool,
}

impl VectorHit {
    pub fn new(chunk: DocumentChunk, distance: f32) -> Self {
        Self { chunk, distance, exact_match: false }
    }
}

/// An optional substring filter applied at the collection layer for
/// entity-first search (§4.4): restrict to documents whose body contains
/// `entity_text` (case-insensitive).
#[derive(Debug, Clone)]
pub struct EntityFilter {
    pub entity_text: String,
}

#[async_trait]
pub trait VectorCollection: Send + Sync + 'static {
    /// Plain dense nearest-neighbor search.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<VectorHit>>;

    /// Dense search additionally filtered to chunks whose body contains the
    /// entity's canonical text. Implementations that can push the filter
    /// down to the collection should; a local fallback may over-fetch and
    /// filter client-side.
    async fn query_with_entity_filter(&self, vector: &[f32], k: usize, filter: &EntityFilter) -> Result<Vec<VectorHit>>;

    fn collection_name(&self) -> &str;
}
