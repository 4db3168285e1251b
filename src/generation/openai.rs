//! Chat generation through an OpenAI-compatible API (Groq by default).

use super::{ChatMessage, Role, TextGenerator};
use crate::error::{GlimtError, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat completion generator.
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIGenerator {
    pub fn new(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.3,
            max_tokens: 4000,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let content = message.content.clone();
        let built = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()
                .map(Into::into),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map(Into::into),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()
                .map(Into::into),
        };
        built.map_err(|e| GlimtError::GeneratorFailure(e.to_string()))
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| GlimtError::GeneratorFailure(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            GlimtError::GeneratorFailure(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| GlimtError::GeneratorFailure("Empty response from model".to_string()))?
            .clone();

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_message_roles() {
        let messages = [
            ChatMessage::system("rules"),
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
        ];
        let converted: Vec<_> = messages
            .iter()
            .map(OpenAIGenerator::to_request_message)
            .collect::<Result<_>>()
            .unwrap();

        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(converted[2], ChatCompletionRequestMessage::Assistant(_)));
    }
}
