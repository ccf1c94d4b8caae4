//! OpenAI-compatible chat-completions backend implementing the core
//! `LanguageModel` streaming interface (§6.3, §6.4).
//!
//! `OPENAI_API_KEY` is read directly from the environment at construction
//! time, matching the original rather than threading the key through
//! `Settings` (§6.4).

use std::time::Duration;

use async_stream::try_stream;
use futures::StreamExt;
use query_engine_config::LlmSettings;
use query_engine_core::{Error, LanguageModel, Message, Result, Role, TokenStream};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct OpenAiBackend {
    client: Client,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    max_tokens: usize,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn new(settings: &LlmSettings, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| Error::Llm(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            api_key,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

impl LanguageModel for OpenAiBackend {
    fn generate_stream<'a>(&'a self, messages: &'a [Message]) -> TokenStream<'a> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: true,
        };

        let stream = try_stream! {
            let mut builder = self.client.post(self.chat_url()).json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let response = builder.send().await.map_err(|e| Error::Llm(e.to_string()))?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(Error::Llm(format!("chat completion request failed ({status}): {body}")))?;
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

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: match message.role {
                Role::System => "system".to_string(),
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: message.content.clone(),
        }
    }
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
    fn chat_url_joins_endpoint_and_path() {
        let settings = LlmSettings {
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            timeout_ms: 1000,
            max_tokens: 10,
            temperature: 0.1,
        };
        let backend = OpenAiBackend::new(&settings, None).unwrap();
        assert_eq!(backend.chat_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn role_maps_to_lowercase_strings() {
        let message = Message::system("hi");
        let chat_message = ChatMessage::from(&message);
        assert_eq!(chat_message.role, "system");
    }
}
