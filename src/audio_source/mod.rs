//! Video source abstraction for Glimt.
//!
//! Resolves user input (URL or bare ID) to a video and its metadata. Metadata lookup
//! is delegated to `yt-dlp`.

mod youtube;

pub use youtube::YoutubeSource;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Platform video ID.
    pub id: String,
    pub title: String,
    /// Channel or uploader name.
    pub author: Option<String>,
    /// Duration in seconds (if known).
    pub duration_seconds: Option<u32>,
    pub view_count: Option<u64>,
    pub description: Option<String>,
    /// Canonical watch URL, used for audio download.
    pub source_url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Trait for video source providers.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch metadata for a video by ID or URL.
    async fn fetch_metadata(&self, input: &str) -> Result<VideoMetadata>;

    /// Check if this source can handle the given input.
    fn can_handle(&self, input: &str) -> bool;

    /// Extract the video ID from input (URL or bare ID).
    fn extract_id(&self, input: &str) -> Option<String>;
}
