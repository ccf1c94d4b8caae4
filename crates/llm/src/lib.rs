//! Generative LLM and external current-information provider backends (§6.3,
//! §6.4), plus RAG prompt assembly (§4.7.1).

pub mod embedding;
pub mod openai;
pub mod prompt;
pub mod provider;

pub use embedding::OllamaEmbedder;
pub use openai::OpenAiBackend;
pub use prompt::build_user_prompt;
pub use provider::{ensure_terminal_punctuation, strip_citation_brackets, PerplexityProvider};
