//! Trait seams between the core query engine and its external collaborators
//! (§2's "surrounding collaborators", §5's shared resources).

mod embedding;
mod language_model;
mod provider;
mod vector_collection;

pub use embedding::EmbeddingModel;
pub use language_model::{LanguageModel, Message, Role, TokenStream};
pub use provider::CurrentInfoProvider;
pub use vector_collection::{EntityFilter, VectorCollection, VectorHit};
