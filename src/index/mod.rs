//! In-memory similarity index over summarized sections.
//!
//! The index is an immutable snapshot: it is built once from a document's sections
//! and replaced whole when the document changes.

use crate::embedding::{normalize, Embedder};
use crate::error::{GlimtError, Result};
use crate::summarizer::Section;
use tracing::{debug, instrument};

/// Normalized embedding of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub section_index: usize,
    pub vector: Vec<f32>,
}

/// A ranked query hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSection {
    pub section_index: usize,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

/// Similarity index over a document's sections.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    records: Vec<EmbeddingRecord>,
}

impl EmbeddingIndex {
    /// Embed every section's title and summary.
    #[instrument(skip_all, fields(sections = sections.len()))]
    pub async fn build(sections: &[Section], embedder: &dyn Embedder) -> Result<Self> {
        let texts: Vec<String> = sections.iter().map(Section::embedding_text).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        if vectors.len() != sections.len() {
            return Err(GlimtError::Embedding(format!(
                "Expected {} embeddings, got {}",
                sections.len(),
                vectors.len()
            )));
        }

        let records = vectors
            .into_iter()
            .enumerate()
            .map(|(section_index, mut vector)| {
                normalize(&mut vector);
                EmbeddingRecord {
                    section_index,
                    vector,
                }
            })
            .collect();

        debug!("Built index over {} sections", sections.len());
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    /// Embed `text` and return the `top_k` most similar sections.
    pub async fn query(
        &self,
        text: &str,
        top_k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<ScoredSection>> {
        let mut query_vector = embedder.embed(text).await?;
        normalize(&mut query_vector);
        Ok(self.rank(&query_vector, top_k))
    }

    /// Rank sections against an already normalized query vector.
    ///
    /// Returns `min(top_k, len)` hits, best first; equal scores keep section order.
    pub fn rank(&self, query_vector: &[f32], top_k: usize) -> Vec<ScoredSection> {
        let mut scored: Vec<ScoredSection> = self
            .records
            .iter()
            .map(|record| ScoredSection {
                section_index: record.section_index,
                score: dot(&record.vector, query_vector),
            })
            .collect();

        // sort_by is stable, so ties stay in ascending section order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
