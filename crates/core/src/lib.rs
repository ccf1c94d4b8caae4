//! Core traits and types for the query engine
//!
//! This crate provides the foundational, dependency-free data model shared
//! by every other crate in the workspace:
//! - The document chunk and entity catalogue types the retrieval layer reads
//! - The per-query record the orchestrator builds up during a request
//! - The scoring breakdown and cached-response types
//! - The trait seams (`EmbeddingModel`, `VectorCollection`, `LanguageModel`,
//!   `CurrentInfoProvider`) that let every other crate depend on an
//!   interface instead of a concrete backend
//! - The top-level error type every other crate's error converges into

pub mod cache_types;
pub mod catalogue;
pub mod chunk;
pub mod entity;
pub mod error;
pub mod emotion;
pub mod query;
pub mod scoring;
pub mod traits;

pub use cache_types::CachedResponse;
pub use catalogue::{EntityCatalogue, LocationCatalogue, NameFormatRule, PersonCatalogue};
pub use chunk::{ChunkMetadata, DocumentChunk};
pub use emotion::Emotion;
pub use entity::{DocumentEntities, EntityType, ExtractedEntity, QueryIntent};
pub use error::{Error, Result};
pub use query::{Query, QueryRecord, ResponseFormat};
pub use scoring::{ScoreBreakdown, ScoredChunk};
pub use traits::{
    CurrentInfoProvider, EmbeddingModel, EntityFilter, LanguageModel, Message, Role, TokenStream,
    VectorCollection, VectorHit,
};
