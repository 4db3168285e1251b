//! Offline feature-hashing embedder.
//!
//! Lowercased alphanumeric terms are hashed into a fixed number of buckets, with one
//! hash bit choosing the sign. Similar wording gives similar vectors; nothing is
//! learned and nothing leaves the machine.

use super::{normalize, Embedder};
use crate::error::{GlimtError, Result};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic bag-of-words embedder.
///
/// `DefaultHasher` may change between Rust releases, so vectors are only
/// comparable within one build and must not be persisted.
#[derive(Debug, Clone)]
pub struct LocalEmbedder {
    dimensions: usize,
}

impl LocalEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(GlimtError::Config(
                "embedding dimensions must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn hash_term(term: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        term.hash(&mut hasher);
        hasher.finish()
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for term in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = Self::hash_term(&term.to_lowercase());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        normalize(&mut vector);
        vector
    }
}

impl Default for LocalEmbedder {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = LocalEmbedder::default();
        let a = embedder.embed("Self-attention weighs every token").await.unwrap();
        let b = embedder.embed("Self-attention weighs every token").await.unwrap();

        assert_eq!(a.len(), 384);
        assert_eq!(a, b);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_case_and_punctuation_insensitive() {
        let embedder = LocalEmbedder::new(64).unwrap();
        let a = embedder.embed("Positional Encoding!").await.unwrap();
        let b = embedder.embed("positional encoding").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_overlap_scores_higher() {
        let embedder = LocalEmbedder::default();
        let query = embedder.embed("how does positional encoding work").await.unwrap();
        let related = embedder
            .embed("Positional encoding adds sine waves to word embeddings")
            .await
            .unwrap();
        let unrelated = embedder
            .embed("The softmax turns scores into probabilities")
            .await
            .unwrap();

        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text() {
        let embedder = LocalEmbedder::new(16).unwrap();
        let v = embedder.embed("  ...  ").await.unwrap();
        assert_eq!(v, vec![0.0; 16]);

        let batch = embedder.embed_batch(&[]).await.unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(LocalEmbedder::new(0).is_err());
    }
}
