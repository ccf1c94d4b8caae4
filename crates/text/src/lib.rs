//! Text Normalizer (C1): cleaning and term extraction shared by the scoring,
//! retrieval, and entity-matching layers.

pub mod normalizer;

pub use normalizer::{clean, terms};
