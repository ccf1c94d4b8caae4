//! Generative LLM interface used for prompt-grounded synthesis (C7, §6.3).

use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

pub type TokenStream<'a> = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>>;

/// A streaming text-completion backend. Tokens must be yielded in the exact
/// order the upstream produced them (§5's ordering guarantee) — the
/// orchestrator forwards each item to the caller unchanged and never
/// reorders or buffers beyond what it needs to also accumulate the full
/// text for emotion detection and caching.
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    fn generate_stream<'a>(&'a self, messages: &'a [Message]) -> TokenStream<'a>;

    fn model_name(&self) -> &str;
}
