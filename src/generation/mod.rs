//! Text generation capability.
//!
//! The summarizer and the assistant talk to a language model only through
//! [`TextGenerator`], so either can run with no model configured.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message sent to a chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

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

/// Trait for chat-completion providers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply to the given message list.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier, for logging and document metadata.
    fn model_name(&self) -> &str;
}
