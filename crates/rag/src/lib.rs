//! Retrieval layer: entity dictionary & name matching (C2), temporal
//! classification (C3), vector search (C4), and scoring/re-ranking (C5).

pub mod entity_dict;
pub mod qdrant_collection;
pub mod reranker;
pub mod temporal;
pub mod vector_search;

pub use entity_dict::{load_catalogue, NameMatcher};
pub use qdrant_collection::QdrantCollection;
pub use reranker::Reranker;
pub use temporal::{detection_info, needs_current, TemporalDetection};
pub use vector_search::VectorSearchService;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("catalogue error: {0}")]
    Catalogue(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("vector search error: {0}")]
    VectorSearch(String),
}

impl From<RagError> for query_engine_core::Error {
    fn from(err: RagError) -> Self {
        query_engine_core::Error::Retrieval(err.to_string())
    }
}
