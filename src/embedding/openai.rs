//! OpenAI embeddings implementation.

use super::{normalize, Embedder};
use crate::error::{GlimtError, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Maximum inputs per embeddings request.
const BATCH_SIZE: usize = 100;

/// OpenAI-based embedder. Vectors are normalized before they are returned.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder with the default endpoint (`OPENAI_API_KEY`).
    pub fn new(model: &str, dimensions: usize) -> Result<Self> {
        Ok(Self::with_client(crate::openai::create_client()?, model, dimensions))
    }

    pub fn with_client(client: Client<OpenAIConfig>, model: &str, dimensions: usize) -> Self {
        Self {
            client,
            model: model.to_string(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| GlimtError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| GlimtError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self.client.embeddings().create(request).await.map_err(|e| {
                GlimtError::OpenAI(format!("Embedding API error: {}", e))
            })?;

            if response.data.len() != chunk.len() {
                return Err(GlimtError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // The API may return items out of order
            let mut embeddings = response.data;
            embeddings.sort_by_key(|e| e.index);

            for data in embeddings {
                let mut vector = data.embedding;
                normalize(&mut vector);
                all_embeddings.push(vector);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::create_client_with_config;
    use std::time::Duration;

    #[test]
    fn test_embedder_creation() {
        let client = create_client_with_config(
            OpenAIConfig::new().with_api_key("test"),
            Duration::from_secs(5),
        )
        .unwrap();
        let embedder = OpenAIEmbedder::with_client(client, "text-embedding-3-large", 3072);
        assert_eq!(embedder.dimensions(), 3072);
    }
}
