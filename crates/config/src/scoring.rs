//! Scoring & re-ranker tunables (C5, §4.5).
//!
//! The original looked up a per-entity-type boost with
//! `getattr(config, f'{ent_type}_BOOST')` — a stringly-typed field access
//! that only works because the attribute name happens to match the entity
//! label. [`ScoringConfig::entity_boost`] replaces that with a `match` over
//! `EntityType`, so the mapping is checked at compile time instead of
//! discovered by a failed attribute lookup at runtime (§9 redesign flags).

use query_engine_core::EntityType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_exact_match_boost")]
    pub exact_match_boost: f32,
    #[serde(default = "default_person_boost")]
    pub person_boost: f32,
    #[serde(default = "default_organization_boost")]
    pub organization_boost: f32,
    #[serde(default = "default_location_boost")]
    pub location_boost: f32,
    #[serde(default = "default_event_boost")]
    pub event_boost: f32,
    /// TITLE carries no dedicated boost constant in the spec; it shares the
    /// organization rate since both are institutional-role categories.
    #[serde(default = "default_organization_boost")]
    pub title_boost: f32,

    #[serde(default = "default_hashtag_boost")]
    pub hashtag_boost: f32,
    #[serde(default = "default_mention_boost")]
    pub mention_boost: f32,

    #[serde(default = "default_min_term_match")]
    pub min_term_match: f32,
    #[serde(default = "default_min_relevance_score")]
    pub min_relevance_score: f32,
    #[serde(default = "default_name_match_threshold")]
    pub name_match_threshold: u8,

    #[serde(default = "default_default_results")]
    pub default_results: usize,

    /// Bound on the document-entity-extraction memoization LRU (§4.5).
    #[serde(default = "default_entity_extraction_cache_size")]
    pub entity_extraction_cache_size: usize,
}

fn default_exact_match_boost() -> f32 {
    0.15
}
fn default_person_boost() -> f32 {
    0.15
}
fn default_organization_boost() -> f32 {
    0.10
}
fn default_location_boost() -> f32 {
    0.08
}
fn default_event_boost() -> f32 {
    0.08
}
fn default_hashtag_boost() -> f32 {
    0.02
}
fn default_mention_boost() -> f32 {
    0.02
}
fn default_min_term_match() -> f32 {
    0.7
}
fn default_min_relevance_score() -> f32 {
    0.25
}
fn default_name_match_threshold() -> u8 {
    80
}
fn default_default_results() -> usize {
    5
}
fn default_entity_extraction_cache_size() -> usize {
    1000
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            exact_match_boost: default_exact_match_boost(),
            person_boost: default_person_boost(),
            organization_boost: default_organization_boost(),
            location_boost: default_location_boost(),
            event_boost: default_event_boost(),
            title_boost: default_organization_boost(),
            hashtag_boost: default_hashtag_boost(),
            mention_boost: default_mention_boost(),
            min_term_match: default_min_term_match(),
            min_relevance_score: default_min_relevance_score(),
            name_match_threshold: default_name_match_threshold(),
            default_results: default_default_results(),
            entity_extraction_cache_size: default_entity_extraction_cache_size(),
        }
    }
}

impl ScoringConfig {
    /// The fixed `EntityType -> boost` mapping (§9 redesign flag).
    pub fn entity_boost(&self, entity_type: EntityType) -> f32 {
        match entity_type {
            EntityType::Person => self.person_boost,
            EntityType::Organization => self.organization_boost,
            EntityType::Location => self.location_boost,
            EntityType::Event => self.event_boost,
            EntityType::Title => self.title_boost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let config = ScoringConfig::default();
        assert_eq!(config.exact_match_boost, 0.15);
        assert_eq!(config.person_boost, 0.15);
        assert_eq!(config.organization_boost, 0.10);
        assert_eq!(config.location_boost, 0.08);
        assert_eq!(config.event_boost, 0.08);
        assert_eq!(config.hashtag_boost, 0.02);
        assert_eq!(config.mention_boost, 0.02);
        assert_eq!(config.min_term_match, 0.7);
        assert_eq!(config.min_relevance_score, 0.25);
    }

    #[test]
    fn entity_boost_dispatches_by_type_not_by_name() {
        let config = ScoringConfig::default();
        assert_eq!(config.entity_boost(EntityType::Person), config.person_boost);
        assert_eq!(config.entity_boost(EntityType::Event), config.event_boost);
    }
}
