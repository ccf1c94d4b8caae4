//! The fixed fallback strings delivered on a recoverable per-request failure
//! (§7, §4.7.3). These are the only user-visible strings the orchestrator
//! ever emits itself rather than forwarding from an upstream model.

use query_engine_core::ResponseFormat;

pub const LLM_STREAM_FAILURE: &str = "An error occurred.";

pub fn temporal_failure(format: ResponseFormat) -> &'static str {
    match format {
        ResponseFormat::Voice => "I can't access current information right now.",
        ResponseFormat::Web => "I'm unable to access current information at the moment. Please try again later.",
    }
}
