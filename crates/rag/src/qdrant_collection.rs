//! Qdrant-backed `VectorCollection` (C4's wrapped collaborator, §4.4, §6.2).
//!
//! The collection itself is externally managed — built and kept populated by
//! an indexer outside this crate's scope — so this module is read-only: it
//! never creates the collection or upserts points, only queries it and
//! decodes the flattened metadata keys the indexer is assumed to write.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    condition::ConditionOneOf, r#match::MatchValue, value::Kind, Condition, FieldCondition, Filter,
    Match, ScoredPoint, SearchPointsBuilder,
};
use qdrant_client::Qdrant;
use query_engine_config::VectorStoreConfig;
use query_engine_core::{ChunkMetadata, DocumentChunk, DocumentEntities, EntityFilter, Error, Result, VectorCollection, VectorHit};

use crate::RagError;

/// The payload key the collection stores a chunk's text under. Not named by
/// the spec's persisted-state list (§6.2), which otherwise enumerates every
/// metadata key; chosen to match `DocumentChunk::body`.
const BODY_KEY: &str = "body";

pub struct QdrantCollection {
    client: Qdrant,
    collection: String,
}

impl QdrantCollection {
    pub fn new(settings: &VectorStoreConfig) -> std::result::Result<Self, RagError> {
        let mut builder = Qdrant::from_url(&settings.endpoint);
        if let Some(api_key) = &settings.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder.build().map_err(|e| RagError::VectorSearch(e.to_string()))?;

        Ok(Self {
            client,
            collection: settings.collection.clone(),
        })
    }

    /// Confirms the collection is reachable. Called once at startup — its
    /// failure is fatal (§4.7, §7), unlike a query-time failure which is
    /// caught and degraded by `VectorSearchService`.
    pub async fn ensure_reachable(&self) -> std::result::Result<(), RagError> {
        self.client
            .collection_info(&self.collection)
            .await
            .map(|_| ())
            .map_err(|e| RagError::VectorSearch(format!("vector collection unreachable: {e}")))
    }

    /// Best-effort point count for the `/stats` endpoint (§6.1).
    pub async fn document_count(&self) -> std::result::Result<u64, RagError> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| RagError::VectorSearch(e.to_string()))?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    async fn run_search(&self, vector: &[f32], k: usize, filter: Option<Filter>) -> Result<Vec<VectorHit>> {
        let mut builder = SearchPointsBuilder::new(&self.collection, vector.to_vec(), k as u64).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| Error::Retrieval(format!("qdrant search failed: {e}")))?;

        Ok(response.result.into_iter().filter_map(point_to_hit).collect())
    }
}

#[async_trait]
impl VectorCollection for QdrantCollection {
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        self.run_search(vector, k, None).await
    }

    async fn query_with_entity_filter(&self, vector: &[f32], k: usize, filter: &EntityFilter) -> Result<Vec<VectorHit>> {
        let qdrant_filter = Filter {
            must: vec![Condition {
                condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
                    key: BODY_KEY.to_string(),
                    r#match: Some(Match {
                        match_value: Some(MatchValue::Text(filter.entity_text.clone())),
                    }),
                    ..Default::default()
                })),
            }],
            ..Default::default()
        };

        self.run_search(vector, k, Some(qdrant_filter)).await
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }
}

/// Converts a raw Qdrant cosine similarity score into the `[0, 2]` distance
/// space the scorer expects (§4.4): `distance = 1 - similarity`.
fn score_to_distance(score: f32) -> f32 {
    (1.0 - score).clamp(0.0, 2.0)
}

fn point_to_hit(point: ScoredPoint) -> Option<VectorHit> {
    let id = point_id_to_string(&point)?;
    let distance = score_to_distance(point.score);

    let mut payload = point.payload;
    let body = take_string(&mut payload, BODY_KEY).unwrap_or_default();
    let source_id = take_string(&mut payload, "source_id").unwrap_or_else(|| id.clone());
    let chunk_position = take_string(&mut payload, "chunk_position").and_then(|s| s.parse().ok()).unwrap_or(0);

    let metadata = ChunkMetadata {
        platform: take_string(&mut payload, "platform").unwrap_or_default(),
        source_url: take_string(&mut payload, "source_url"),
        created_date: take_string(&mut payload, "created_date").and_then(|s| s.parse().ok()),
        author: take_string(&mut payload, "author"),
        hashtags: take_string_array(&mut payload, "hashtags"),
        mentions: take_string_array(&mut payload, "mentions"),
        entities: DocumentEntities {
            persons: take_string_array(&mut payload, "persons"),
            organizations: take_string_array(&mut payload, "organizations"),
            locations: take_string_array(&mut payload, "locations"),
            events: take_string_array(&mut payload, "events"),
            titles: take_string_array(&mut payload, "titles"),
        },
    };

    let mut chunk = DocumentChunk::new(id, source_id, chunk_position, body);
    chunk.metadata = metadata;

    Some(VectorHit::new(chunk, distance))
}

fn point_id_to_string(point: &ScoredPoint) -> Option<String> {
    use qdrant_client::qdrant::point_id::PointIdOptions;

    point.id.as_ref().and_then(|pid| match &pid.point_id_options {
        Some(PointIdOptions::Uuid(u)) => Some(u.clone()),
        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
        None => None,
    })
}

fn take_string(payload: &mut HashMap<String, qdrant_client::qdrant::Value>, key: &str) -> Option<String> {
    payload.remove(key).and_then(|v| match v.kind {
        Some(Kind::StringValue(s)) => Some(s),
        _ => None,
    })
}

/// Parses a JSON-encoded string array stored in a payload field (§6.2).
fn take_string_array(payload: &mut HashMap<String, qdrant_client::qdrant::Value>, key: &str) -> Vec<String> {
    take_string(payload, key)
        .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_to_distance_maps_identical_to_zero() {
        assert!((score_to_distance(1.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn score_to_distance_clamps_to_range() {
        assert_eq!(score_to_distance(-2.0), 2.0);
        assert_eq!(score_to_distance(3.0), 0.0);
    }
}
