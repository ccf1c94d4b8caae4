//! Entity catalogue: curated PERSON/ORGANIZATION/LOCATION/EVENT/TITLE sets,
//! loaded once at startup and treated as immutable for the life of the
//! process.
//!
//! This is the redesign of the original's heterogeneous "persons" blob
//! (a JSON object mixing bare name strings with pattern-rewrite objects):
//! here each concern gets its own field instead of being recovered by
//! sniffing value shapes at lookup time.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single name-normalization rewrite rule, applied in catalogue order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameFormatRule {
    pub pattern: String,
    pub replacement: String,
}

/// The PERSON catalogue: known names plus the rules used to normalize a
/// free-form query name before matching against them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonCatalogue {
    #[serde(default)]
    pub known_persons: Vec<String>,
    #[serde(default)]
    pub name_formats: Vec<NameFormatRule>,
    #[serde(default)]
    pub transliterations: std::collections::HashMap<String, String>,
    /// Regexes stripped from a candidate name before normalization rules
    /// run (honorifics like "Prof.", "Dr.") (§4.2).
    #[serde(default)]
    pub title_patterns: Vec<String>,
    #[serde(default)]
    pub role_patterns: Vec<String>,
}

/// LOCATION is hierarchical: the same flat set would lose the distinction
/// between "Mangalore" (a city) and "Karnataka" (a state) that the original
/// exploited for scoring and disambiguation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationCatalogue {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub campus_locations: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

impl LocationCatalogue {
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.cities
            .iter()
            .chain(self.states.iter())
            .chain(self.countries.iter())
            .chain(self.campus_locations.iter())
            .chain(self.other.iter())
    }
}

/// The five curated catalogues, loaded at startup from separate files and
/// held immutably for the process lifetime (§3, §4.2).
#[derive(Debug, Clone, Default)]
pub struct EntityCatalogue {
    pub persons: PersonCatalogue,
    pub organizations: Vec<String>,
    pub locations: LocationCatalogue,
    pub events: Vec<String>,
    pub titles: Vec<String>,

    persons_lower: HashSet<String>,
    organizations_lower: HashSet<String>,
    locations_lower: HashSet<String>,
    events_lower: HashSet<String>,
    titles_lower: HashSet<String>,
}

impl EntityCatalogue {
    /// Build lowercase indices for O(1) exact match once the raw catalogues
    /// have been loaded or assembled.
    pub fn new(
        persons: PersonCatalogue,
        organizations: Vec<String>,
        locations: LocationCatalogue,
        events: Vec<String>,
        titles: Vec<String>,
    ) -> Self {
        let persons_lower = persons.known_persons.iter().map(|s| s.to_lowercase()).collect();
        let organizations_lower = organizations.iter().map(|s| s.to_lowercase()).collect();
        let locations_lower = locations.all().map(|s| s.to_lowercase()).collect();
        let events_lower = events.iter().map(|s| s.to_lowercase()).collect();
        let titles_lower = titles.iter().map(|s| s.to_lowercase()).collect();

        Self {
            persons,
            organizations,
            locations,
            events,
            titles,
            persons_lower,
            organizations_lower,
            locations_lower,
            events_lower,
            titles_lower,
        }
    }

    pub fn is_known_person(&self, lowercase_name: &str) -> bool {
        self.persons_lower.contains(lowercase_name)
    }

    pub fn is_known_organization(&self, lowercase_name: &str) -> bool {
        self.organizations_lower.contains(lowercase_name)
    }

    pub fn is_known_location(&self, lowercase_name: &str) -> bool {
        self.locations_lower.contains(lowercase_name)
    }

    pub fn is_known_event(&self, lowercase_name: &str) -> bool {
        self.events_lower.contains(lowercase_name)
    }

    pub fn is_known_title(&self, lowercase_name: &str) -> bool {
        self.titles_lower.contains(lowercase_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_case_insensitive() {
        let catalogue = EntityCatalogue::new(
            PersonCatalogue {
                known_persons: vec!["B. Ravi".to_string()],
                ..Default::default()
            },
            vec!["NITK".to_string()],
            LocationCatalogue {
                cities: vec!["Mangalore".to_string()],
                states: vec!["Karnataka".to_string()],
                ..Default::default()
            },
            vec![],
            vec![],
        );

        assert!(catalogue.is_known_person("b. ravi"));
        assert!(catalogue.is_known_organization("nitk"));
        assert!(catalogue.is_known_location("mangalore"));
        assert!(catalogue.is_known_location("karnataka"));
        assert!(!catalogue.is_known_event("nitk"));
    }
}
