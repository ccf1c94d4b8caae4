//! Top-level error type for the query engine.
//!
//! Every crate defines its own `thiserror` enum for its failure modes and
//! converts into this one at the boundary, so callers downstream of the
//! orchestrator only ever handle a single type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("retrieval error: {0}")]
    Retrieval(String),

    #[error("llm error: {0}")]
    Llm(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}
