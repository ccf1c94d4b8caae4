//! Scored result types produced by the re-ranker (§3, C5).

use crate::chunk::DocumentChunk;
use serde::{Deserialize, Serialize};

/// The additive breakdown behind a candidate's final relevance score.
///
/// Invariant: `final_score == initial + term_boost + metadata_boost +
/// entity_boost + person_boost`, enforced by [`ScoreBreakdown::finalize`]
/// rather than trusted at each call site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub initial: f32,
    pub term_boost: f32,
    pub metadata_boost: f32,
    pub entity_boost: f32,
    pub person_boost: f32,
    pub final_score: f32,
    pub reasons: Vec<String>,
}

impl ScoreBreakdown {
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            ..Default::default()
        }
    }

    pub fn add_term_boost(&mut self, boost: f32, reason: impl Into<String>) {
        if boost > 0.0 {
            self.term_boost += boost;
            self.reasons.push(reason.into());
        }
    }

    pub fn add_metadata_boost(&mut self, boost: f32, reason: impl Into<String>) {
        if boost > 0.0 {
            self.metadata_boost += boost;
            self.reasons.push(reason.into());
        }
    }

    pub fn add_entity_boost(&mut self, boost: f32, reason: impl Into<String>) {
        if boost > 0.0 {
            self.entity_boost += boost;
            self.reasons.push(reason.into());
        }
    }

    pub fn add_person_boost(&mut self, boost: f32, reason: impl Into<String>) {
        if boost > 0.0 {
            self.person_boost += boost;
            self.reasons.push(reason.into());
        }
    }

    /// Sum the components into `final_score`. Called once, after every boost
    /// has been applied, so the invariant always holds for a completed
    /// breakdown.
    pub fn finalize(mut self) -> Self {
        self.final_score = self.initial + self.term_boost + self.metadata_boost + self.entity_boost + self.person_boost;
        self
    }
}

/// A document chunk joined with its raw vector distance and score breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub distance: f32,
    pub exact_match: bool,
    pub score: ScoreBreakdown,
}

impl ScoredChunk {
    pub fn final_score(&self) -> f32 {
        self.score.final_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_sums_all_components() {
        let mut breakdown = ScoreBreakdown::new(0.6);
        breakdown.add_term_boost(0.1, "term overlap");
        breakdown.add_metadata_boost(0.02, "hashtag");
        breakdown.add_entity_boost(0.1, "entity match");
        breakdown.add_person_boost(0.05, "name similarity");
        let breakdown = breakdown.finalize();

        assert!((breakdown.final_score - 0.87).abs() < 1e-6);
        assert!(breakdown.final_score >= breakdown.initial);
        assert_eq!(breakdown.reasons.len(), 4);
    }

    #[test]
    fn zero_boosts_are_not_recorded_as_reasons() {
        let breakdown = ScoreBreakdown::new(0.4).finalize();
        assert_eq!(breakdown.final_score, 0.4);
        assert!(breakdown.reasons.is_empty());
    }
}
