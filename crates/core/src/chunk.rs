//! Document chunk: the unit of retrieval, owned and written by the external
//! indexer. The core only ever reads these.

use crate::entity::DocumentEntities;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short text passage stored in the vector collection, with metadata.
///
/// Invariant: `(source_id, chunk_position)` is unique across the collection.
/// The core never constructs or mutates these outside of tests — they arrive
/// from `VectorCollection::query` already embedded and chunked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub source_id: String,
    pub chunk_position: u32,
    pub body: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(id: impl Into<String>, source_id: impl Into<String>, chunk_position: u32, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            chunk_position,
            body: body.into(),
            metadata: ChunkMetadata::default(),
        }
    }

    /// Stable fingerprint used to de-duplicate candidates and to memoize
    /// entity extraction over the chunk body.
    pub fn body_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.body.hash(&mut hasher);
        hasher.finish()
    }
}

/// Metadata carried alongside a chunk's body. Field names mirror the flattened
/// keys the indexer writes onto the vector collection (`§6.2`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub platform: String,
    pub source_url: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub author: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub entities: DocumentEntities,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_hash_is_stable_and_content_sensitive() {
        let a = DocumentChunk::new("1", "src", 0, "the director of NITK is...");
        let b = DocumentChunk::new("2", "src", 1, "the director of NITK is...");
        let c = DocumentChunk::new("3", "src", 0, "something else entirely");

        assert_eq!(a.body_hash(), b.body_hash());
        assert_ne!(a.body_hash(), c.body_hash());
    }
}
