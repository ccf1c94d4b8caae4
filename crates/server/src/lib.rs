//! HTTP surface for the query engine (§6.1): request validation, the
//! orchestrator hand-off, and introspection/cache-control routes.

pub mod error;
pub mod http;
pub mod metrics;
pub mod state;

pub use error::ServerError;
pub use http::build_router;
pub use state::{AppState, RequestCounters};
