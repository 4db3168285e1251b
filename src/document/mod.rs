//! The Summary Document: the persisted result of summarizing one video.

mod export;
mod store;

pub use export::{export_document, ExportFormat};
pub use store::{DocumentInfo, DocumentStore};

use crate::summarizer::{Section, SummarySource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A summarized video: sections in chronological order plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub video_id: String,
    pub language: String,
    /// Total media duration in seconds.
    pub duration: f64,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    /// Whether at least one section was summarized by a language model.
    #[serde(default)]
    pub model_used: bool,
}

impl SummaryDocument {
    pub fn new(
        video_id: impl Into<String>,
        language: impl Into<String>,
        duration: f64,
        sections: Vec<Section>,
    ) -> Self {
        let model_used = sections.iter().any(|s| s.source == SummarySource::Model);
        Self {
            video_id: video_id.into(),
            language: language.into(),
            duration,
            sections,
            title: None,
            generated_at: Some(Utc::now()),
            model_used,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title for display, falling back to the video ID.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.video_id)
    }

    pub fn fallback_count(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.source == SummarySource::Fallback)
            .count()
    }
}
