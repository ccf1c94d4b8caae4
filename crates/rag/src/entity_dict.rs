//! Entity Dictionary & Name Matcher (C2, §4.2).
//!
//! Loads the five curated catalogues at startup and exposes entity
//! extraction and name-similarity scoring over an immutable view of them.
//! The catalogue itself lives in `query-engine-core`; this module owns the
//! loading and matching logic.

use once_cell::sync::Lazy;
use query_engine_core::{EntityCatalogue, EntityType, ExtractedEntity, LocationCatalogue, PersonCatalogue};
use regex::Regex;
use std::path::Path;

/// Load the five catalogues from disk. A missing or unparsable file yields
/// an empty category plus a logged warning — never a hard failure (§4.2,
/// §7: "missing catalogue file" is a configuration error that degrades
/// gracefully, not a fatal one).
pub fn load_catalogue(
    persons_path: &str,
    organizations_path: &str,
    locations_path: &str,
    events_path: &str,
    titles_path: &str,
) -> EntityCatalogue {
    let persons = load_json_or_warn::<PersonCatalogueFile>(persons_path)
        .map(|f| PersonCatalogue {
            known_persons: f.known_persons,
            name_formats: f.name_formats,
            transliterations: f.transliterations,
            title_patterns: f.title_patterns,
            role_patterns: f.role_patterns,
        })
        .unwrap_or_default();

    let organizations = load_json_or_warn::<Vec<String>>(organizations_path).unwrap_or_default();
    let locations = load_json_or_warn::<LocationCatalogue>(locations_path).unwrap_or_default();
    let events = load_json_or_warn::<Vec<String>>(events_path).unwrap_or_default();
    let titles = load_json_or_warn::<Vec<String>>(titles_path).unwrap_or_default();

    EntityCatalogue::new(persons, organizations, locations, events, titles)
}

#[derive(Debug, Default, serde::Deserialize)]
struct PersonCatalogueFile {
    #[serde(default)]
    known_persons: Vec<String>,
    #[serde(default)]
    name_formats: Vec<query_engine_core::NameFormatRule>,
    #[serde(default)]
    transliterations: std::collections::HashMap<String, String>,
    /// Stripped from a name before the rewrite rules run (§4.2).
    #[serde(default)]
    title_patterns: Vec<String>,
    #[serde(default)]
    role_patterns: Vec<String>,
}

fn load_json_or_warn<T: serde::de::DeserializeOwned>(path: &str) -> Option<T> {
    if !Path::new(path).exists() {
        tracing::warn!(path, "catalogue file not found, loading category as empty");
        return None;
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path, error = %e, "failed to read catalogue file, loading category as empty");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path, error = %e, "failed to parse catalogue file, loading category as empty");
            None
        }
    }
}

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static INITIAL_CLUSTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Za-z])\.\s*([A-Za-z])\.").unwrap());
static PUNCTUATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Name normalization and similarity scoring, plus whole-query entity
/// extraction, over an immutable catalogue view (§4.2).
pub struct NameMatcher<'a> {
    catalogue: &'a EntityCatalogue,
}

impl<'a> NameMatcher<'a> {
    pub fn new(catalogue: &'a EntityCatalogue) -> Self {
        Self { catalogue }
    }

    /// PERSON-only normalization: transliterate, strip honorific/role
    /// tokens, collapse whitespace, rewrite `X.` initial clusters, then
    /// apply each rewrite rule in order.
    pub fn normalize_name(&self, name: &str) -> String {
        let lower = name.to_lowercase();
        let transliterated = self
            .catalogue
            .persons
            .transliterations
            .get(lower.trim())
            .cloned()
            .unwrap_or(lower);

        // Strip title/role tokens ("prof", "dr", "director") before the
        // rewrite rules run, so the rules compare given/family names rather
        // than honorifics (§4.2).
        let without_titles = self.strip_titles_and_roles(&transliterated);

        let collapsed = WHITESPACE_RE.replace_all(without_titles.trim(), " ").to_string();
        // "x. y." -> "x y" : drop the periods between chained initials.
        let without_initial_dots = INITIAL_CLUSTER_RE.replace_all(&collapsed, "$1 $2");

        let mut result = without_initial_dots.to_string();
        for rule in &self.catalogue.persons.name_formats {
            if let Ok(re) = Regex::new(&rule.pattern) {
                result = re.replace_all(&result, rule.replacement.as_str()).to_string();
            }
        }

        WHITESPACE_RE.replace_all(result.trim(), " ").to_string()
    }

    /// Removes any substring matching a `title_patterns` or `role_patterns`
    /// regex from the catalogue (e.g. "prof.", "director of"). An
    /// unparsable pattern is skipped rather than aborting normalization.
    fn strip_titles_and_roles(&self, s: &str) -> String {
        let mut result = s.to_string();
        for pattern in self
            .catalogue
            .persons
            .title_patterns
            .iter()
            .chain(self.catalogue.persons.role_patterns.iter())
        {
            if let Ok(re) = Regex::new(pattern) {
                result = re.replace_all(&result, "").to_string();
            }
        }
        result
    }

    fn strip_punctuation_lower(&self, s: &str) -> String {
        PUNCTUATION_RE.replace_all(&s.to_lowercase(), "").to_string()
    }

    /// Position-weighted 0-100 name similarity (§4.2).
    pub fn name_similarity(&self, a: &str, b: &str) -> f32 {
        let norm_a = self.strip_punctuation_lower(&self.normalize_name(a));
        let norm_b = self.strip_punctuation_lower(&self.normalize_name(b));

        if norm_a == norm_b {
            return 100.0;
        }

        let tokens_a: Vec<&str> = norm_a.split_whitespace().collect();
        let tokens_b: Vec<&str> = norm_b.split_whitespace().collect();

        if tokens_a.is_empty() && tokens_b.is_empty() {
            return 0.0;
        }

        let len = tokens_a.len().max(tokens_b.len());
        let mut weighted_sum = 0.0f32;
        let mut weight_total = 0.0f32;

        for i in 0..len {
            let ta = tokens_a.get(i).copied().unwrap_or("");
            let tb = tokens_b.get(i).copied().unwrap_or("");

            let position_score = if ta == tb && !ta.is_empty() {
                1.0
            } else if (ta.len() == 1 && !tb.is_empty() && ta.chars().next() == tb.chars().next())
                || (tb.len() == 1 && !ta.is_empty() && tb.chars().next() == ta.chars().next())
            {
                0.4
            } else {
                strsim::normalized_levenshtein(ta, tb) as f32 * 0.6
            };

            let weight = if i == 0 || i == len - 1 { 1.2 } else { 1.0 };
            weighted_sum += position_score * weight;
            weight_total += weight;
        }

        let mut score = (weighted_sum / weight_total) * 100.0;

        let a_is_known = self.catalogue.is_known_person(&norm_a);
        let b_is_known = self.catalogue.is_known_person(&norm_b);
        if a_is_known || b_is_known {
            score *= 1.1;
        }

        score.min(100.0)
    }

    /// Token-sort ratio in `[0,1]`: sort each string's words, then compare
    /// via normalized Levenshtein. Used for the non-PERSON high-confidence
    /// extraction path, where word order in the query is unreliable
    /// ("NITK campus" vs "campus of NITK").
    fn token_sort_ratio(&self, a: &str, b: &str) -> f64 {
        let sort_words = |s: &str| {
            let mut words: Vec<&str> = s.split_whitespace().collect();
            words.sort_unstable();
            words.join(" ")
        };
        strsim::normalized_levenshtein(&sort_words(&a.to_lowercase()), &sort_words(&b.to_lowercase()))
    }

    /// Extract at most one entity from a query string (§4.2): exact
    /// (lowercased) membership first, then a scan over prefix chunks of up
    /// to five tokens. Tie-break precedence: exact match, then non-PERSON
    /// high-confidence, then PERSON.
    pub fn extract_entity(&self, query: &str) -> Option<ExtractedEntity> {
        let lower = query.to_lowercase();

        if let Some(entity) = self.exact_match(&lower) {
            return Some(entity);
        }

        let tokens: Vec<&str> = query.split_whitespace().collect();
        let mut best_non_person: Option<(ExtractedEntity, f64)> = None;
        let mut best_person: Option<(ExtractedEntity, f32)> = None;

        for window in 1..=5.min(tokens.len()) {
            for start in 0..=tokens.len().saturating_sub(window) {
                let chunk = tokens[start..start + window].join(" ");
                if chunk.trim().is_empty() {
                    continue;
                }

                if let Some((entity, score)) = self.best_non_person_candidate(&chunk) {
                    if best_non_person.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
                        best_non_person = Some((entity, score));
                    }
                }

                if let Some(best_match) = self.best_person_candidate(&chunk) {
                    if best_person.as_ref().map(|(_, s)| best_match.1 > *s).unwrap_or(true) {
                        best_person = Some(best_match);
                    }
                }
            }
        }

        if let Some((entity, _)) = best_non_person {
            return Some(entity);
        }

        best_person.map(|(entity, _)| entity)
    }

    fn exact_match(&self, lowercase_query: &str) -> Option<ExtractedEntity> {
        if self.catalogue.is_known_person(lowercase_query) {
            return Some(ExtractedEntity::new(EntityType::Person, lowercase_query));
        }
        if self.catalogue.is_known_organization(lowercase_query) {
            return Some(ExtractedEntity::new(EntityType::Organization, lowercase_query));
        }
        if self.catalogue.is_known_location(lowercase_query) {
            return Some(ExtractedEntity::new(EntityType::Location, lowercase_query));
        }
        if self.catalogue.is_known_event(lowercase_query) {
            return Some(ExtractedEntity::new(EntityType::Event, lowercase_query));
        }
        if self.catalogue.is_known_title(lowercase_query) {
            return Some(ExtractedEntity::new(EntityType::Title, lowercase_query));
        }
        None
    }

    fn best_non_person_candidate(&self, chunk: &str) -> Option<(ExtractedEntity, f64)> {
        const THRESHOLD: f64 = 0.9;
        let mut best: Option<(ExtractedEntity, f64)> = None;

        let mut consider = |entity_type: EntityType, candidate: &str| {
            let ratio = self.token_sort_ratio(chunk, candidate);
            if ratio >= THRESHOLD && best.as_ref().map(|(_, s)| ratio > *s).unwrap_or(true) {
                best = Some((ExtractedEntity::new(entity_type, candidate), ratio));
            }
        };

        for org in &self.catalogue.organizations {
            consider(EntityType::Organization, org);
        }
        for loc in self.catalogue.locations.all() {
            consider(EntityType::Location, loc);
        }
        for event in &self.catalogue.events {
            consider(EntityType::Event, event);
        }
        for title in &self.catalogue.titles {
            consider(EntityType::Title, title);
        }

        best
    }

    fn best_person_candidate(&self, chunk: &str) -> Option<(ExtractedEntity, f32)> {
        const THRESHOLD: f32 = 80.0;
        let mut best: Option<(ExtractedEntity, f32)> = None;

        for person in &self.catalogue.persons.known_persons {
            let score = self.name_similarity(chunk, person);
            if score >= THRESHOLD && best.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
                best = Some((ExtractedEntity::new(EntityType::Person, person.clone()), score));
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_core::{LocationCatalogue as LC, NameFormatRule, PersonCatalogue as PC};

    fn catalogue() -> EntityCatalogue {
        EntityCatalogue::new(
            PC {
                known_persons: vec!["B. Ravi".to_string(), "Prof. B. Ravi".to_string()],
                name_formats: vec![NameFormatRule {
                    pattern: r"^prof\.?\s+".to_string(),
                    replacement: String::new(),
                }],
                ..Default::default()
            },
            vec!["NITK".to_string(), "National Institute of Technology Karnataka".to_string()],
            LC {
                cities: vec!["Mangalore".to_string()],
                states: vec!["Karnataka".to_string()],
                campus_locations: vec!["Main Gate".to_string()],
                ..Default::default()
            },
            vec!["Engineer's Day".to_string()],
            vec!["Director".to_string()],
        )
    }

    #[test]
    fn name_similarity_is_100_for_identical_strings() {
        let catalogue = catalogue();
        let matcher = NameMatcher::new(&catalogue);
        assert_eq!(matcher.name_similarity("B. Ravi", "B. Ravi"), 100.0);
    }

    #[test]
    fn name_similarity_handles_empty_inputs() {
        let catalogue = catalogue();
        let matcher = NameMatcher::new(&catalogue);
        assert_eq!(matcher.name_similarity("", ""), 0.0);
    }

    #[test]
    fn name_similarity_is_symmetric() {
        let catalogue = catalogue();
        let matcher = NameMatcher::new(&catalogue);
        let a = matcher.name_similarity("Prof. B. Ravi", "B Ravi");
        let b = matcher.name_similarity("B Ravi", "Prof. B. Ravi");
        assert!((a - b).abs() < 0.01);
    }

    #[test]
    fn extract_entity_prefers_exact_match() {
        let catalogue = catalogue();
        let matcher = NameMatcher::new(&catalogue);
        let entity = matcher.extract_entity("nitk").unwrap();
        assert_eq!(entity.entity_type, EntityType::Organization);
    }

    #[test]
    fn extract_entity_finds_person_by_fuzzy_match() {
        let catalogue = catalogue();
        let matcher = NameMatcher::new(&catalogue);
        let entity = matcher.extract_entity("Tell me about Prof. B. Ravi").unwrap();
        assert_eq!(entity.entity_type, EntityType::Person);
    }

    #[test]
    fn normalize_name_strips_title_and_role_tokens() {
        let catalogue = EntityCatalogue::new(
            PC {
                known_persons: vec!["B. Ravi".to_string()],
                title_patterns: vec![r"(?i)\bprof\.?\b".to_string()],
                role_patterns: vec![r"(?i)\bdirector\b".to_string()],
                ..Default::default()
            },
            vec![],
            LC::default(),
            vec![],
            vec![],
        );
        let matcher = NameMatcher::new(&catalogue);
        assert_eq!(matcher.normalize_name("Prof. B. Ravi, Director"), matcher.normalize_name("B. Ravi,"));
    }

    #[test]
    fn extract_entity_returns_none_for_unrelated_query() {
        let catalogue = catalogue();
        let matcher = NameMatcher::new(&catalogue);
        assert!(matcher.extract_entity("what is the weather today").is_none());
    }
}
