//! Entity categories shared across the catalogue, scoring, and retrieval layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five curated entity categories plus the absence of a classified entity.
///
/// `EntityType` is the redesign of the original's stringly-typed entity
/// label (`query_ent['label']` looked up against a `f'{ent_type}_BOOST'`
/// config attribute): every place that needs a per-type boost matches on
/// this enum directly instead of formatting a field name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Event,
    Title,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Location => "LOCATION",
            EntityType::Event => "EVENT",
            EntityType::Title => "TITLE",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query intent: a classified entity type, or GENERAL when none was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryIntent {
    General,
    Entity(EntityType),
}

impl QueryIntent {
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            QueryIntent::General => None,
            QueryIntent::Entity(t) => Some(*t),
        }
    }
}

/// A single extracted entity: its category and the surface form matched
/// against the catalogue (not necessarily the exact query substring — for
/// PERSON this is the canonical catalogue name the query was matched to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub entity_type: EntityType,
    pub text: String,
}

impl ExtractedEntity {
    pub fn new(entity_type: EntityType, text: impl Into<String>) -> Self {
        Self {
            entity_type,
            text: text.into(),
        }
    }
}

/// Typed entity lists attached to a document chunk, as decoded from the
/// vector collection's flattened metadata fields (`persons`, `organizations`,
/// `locations`, `events`, `titles`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentEntities {
    #[serde(default)]
    pub persons: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
}

impl DocumentEntities {
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
            && self.organizations.is_empty()
            && self.locations.is_empty()
            && self.events.is_empty()
            && self.titles.is_empty()
    }

    pub fn of_type(&self, entity_type: EntityType) -> &[String] {
        match entity_type {
            EntityType::Person => &self.persons,
            EntityType::Organization => &self.organizations,
            EntityType::Location => &self.locations,
            EntityType::Event => &self.events,
            EntityType::Title => &self.titles,
        }
    }
}
