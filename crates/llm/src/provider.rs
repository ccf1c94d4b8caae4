//! External current-information provider (§4.7.3): a Perplexity-compatible
//! streaming chat completion used for temporal questions instead of the
//! local knowledge base.
//!
//! `PERPLEXITY_API_KEY` is read directly from the environment, matching
//! `OPENAI_API_KEY`'s treatment in [`crate::openai`] (§6.4) — its absence
//! disables the temporal path entirely rather than substituting a default.
//!
//! This module only emits the raw upstream token stream; collecting the
//! full text, stripping citation brackets, and enforcing terminal
//! punctuation (§4.7.3) is the orchestrator's job, since it must buffer the
//! whole response before deciding what to re-stream to the caller. The two
//! pure helpers below — [`strip_citation_brackets`] and
//! [`ensure_terminal_punctuation`] — live here because they're specific to
//! this provider's output format.

use std::time::Duration;

use async_stream::try_stream;
use futures::StreamExt;
use once_cell::sync::Lazy;
use query_engine_config::ProviderSettings;
use query_engine_core::{CurrentInfoProvider, Error, Result, TokenStream};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct PerplexityProvider {
    client: Client,
    model: String,
    endpoint: String,
    api_key: String,
}

impl PerplexityProvider {
    pub fn new(settings: &ProviderSettings, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| Error::Llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            api_key,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

impl CurrentInfoProvider for PerplexityProvider {
    fn stream<'a>(&'a self, system_prompt: &'a str, question: &'a str) -> TokenStream<'a> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            stream: true,
        };

        let stream = try_stream! {
            let response = self.client
                .post(self.chat_url())
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::Llm(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(Error::Llm(format!("provider request failed ({status}): {body}")))?;
            }

            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk.map_err(|e| Error::Llm(e.to_string()))?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim().to_string();
                    buffer.drain(..=newline);

                    let Some(payload) = line.strip_prefix("data: ") else { continue };
                    if payload == "[DONE]" {
                        return;
                    }

                    let event: StreamEvent = match serde_json::from_str(payload) {
                        Ok(event) => event,
                        Err(_) => continue,
                    };

                    if let Some(choice) = event.choices.into_iter().next() {
                        if let Some(token) = choice.delta.content {
                            if !token.is_empty() {
                                yield token;
                            }
                        }
                    }
                }
            }
        };

        Box::pin(stream)
    }

    fn provider_name(&self) -> &str {
        &self.model
    }
}

static CITATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+(?:[-,]\d+)*\]").unwrap());

/// Strips inline citation markers like `[1]`, `[1-3]`, `[1,2]` (§4.7.3).
pub fn strip_citation_brackets(text: &str) -> String {
    CITATION_RE.replace_all(text, "").to_string()
}

/// Appends a period if `text` doesn't already end with terminal punctuation (§4.7.3).
pub fn ensure_terminal_punctuation(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() || trimmed.ends_with(['.', '!', '?']) {
        trimmed.to_string()
    } else {
        format!("{trimmed}.")
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_and_ranged_citations() {
        assert_eq!(strip_citation_brackets("NITK was founded in 1960 [1]."), "NITK was founded in 1960 .");
        assert_eq!(strip_citation_brackets("see sources [1-3] and [2,4]"), "see sources  and ");
    }

    #[test]
    fn leaves_text_without_citations_untouched() {
        assert_eq!(strip_citation_brackets("no citations here"), "no citations here");
    }

    #[test]
    fn appends_period_when_missing() {
        assert_eq!(ensure_terminal_punctuation("the event starts at noon"), "the event starts at noon.");
    }

    #[test]
    fn leaves_existing_terminal_punctuation_alone() {
        assert_eq!(ensure_terminal_punctuation("is it open?"), "is it open?");
        assert_eq!(ensure_terminal_punctuation("great!"), "great!");
    }
}
