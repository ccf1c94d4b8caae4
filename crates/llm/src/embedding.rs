//! Ollama-backed `EmbeddingModel` (§4.4's wrapped collaborator), grounded on
//! the teacher's Qwen3-Embedding client.
//!
//! ## Qwen3-Embedding instruction format
//!
//! Queries are embedded with an instruction prefix — `Instruct: <task>\nQuery:
//! <query>` — for better retrieval quality. Documents are embedded without a
//! prefix; this module only ever sees queries, since document embedding is
//! the (out-of-scope) indexer's job.
//! See: https://huggingface.co/Qwen/Qwen3-Embedding-0.6B

use async_trait::async_trait;
use query_engine_config::EmbeddingConfig;
use query_engine_core::{EmbeddingModel, Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    instruction: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig, dimensions: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            instruction: config.retrieval_instruction.clone(),
            dimensions,
        }
    }

    async fn embed_raw(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let url = format!("{}/api/embed", self.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Retrieval(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!("embedding backend returned {status}: {body}")));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Retrieval(format!("failed to parse embedding response: {e}")))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Retrieval("embedding backend returned no vectors".to_string()))
    }
}

#[async_trait]
impl EmbeddingModel for OllamaEmbedder {
    /// Embeds a query, applying the instruction prefix (§4.4). Every caller
    /// of this trait in the query-serving path embeds a question, never a
    /// document, so the prefix is unconditional here.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let formatted = format!("Instruct: {}\nQuery:{}", self.instruction, text);
        self.embed_raw(&formatted).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_reports_configured_model_name() {
        let config = EmbeddingConfig::default();
        let embedder = OllamaEmbedder::new(&config, 1024);
        assert_eq!(embedder.model_name(), "qwen3-embedding:0.6b");
        assert_eq!(embedder.dimensions(), 1024);
    }
}
