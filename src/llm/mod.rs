/// Remote language model seam.
///
/// The chat assistant talks to a [`LanguageModel`]; the Cohere chat API is the
/// production implementation and tests plug in their own.

pub mod cohere;

pub use cohere::CohereClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who wrote a chat message. Any role other than `user` is the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(other)]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything a model needs to answer the latest message
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub preamble: String,
    /// Earlier messages, oldest first, already capped.
    pub history: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn chat(&self, request: &ChatRequest) -> Result<String>;
}
