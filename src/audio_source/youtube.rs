//! YouTube source implementation.

use super::{VideoMetadata, VideoSource};
use crate::error::{GlimtError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Matches the common YouTube URL formats and bare 11-character video IDs.
fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/live/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .unwrap_or_else(|e| panic!("invalid video id regex: {e}"))
    })
}

/// YouTube video source backed by `yt-dlp`.
#[derive(Debug, Default)]
pub struct YoutubeSource;

impl YoutubeSource {
    pub fn new() -> Self {
        Self
    }

    /// Extract video ID from a YouTube URL or bare ID.
    pub fn extract_video_id(input: &str) -> Option<String> {
        let caps = video_id_regex().captures(input.trim())?;

        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Watch URL for a video ID.
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }

    /// Deep link that starts playback at `seconds`.
    pub fn timestamp_link(video_id: &str, seconds: f64) -> String {
        format!("https://youtu.be/{}?t={}", video_id, seconds.max(0.0) as u64)
    }

    /// Deep link for IDs that look like YouTube IDs; `None` for anything else,
    /// such as IDs given to imported transcripts.
    pub fn deep_link(video_id: &str, seconds: f64) -> Option<String> {
        Self::extract_video_id(video_id)
            .filter(|id| id == video_id)
            .map(|id| Self::timestamp_link(&id, seconds))
    }

    /// Parse `yt-dlp --dump-json` output.
    fn parse_metadata(video_id: &str, json_str: &str) -> Result<VideoMetadata> {
        let json: serde_json::Value = serde_json::from_str(json_str).map_err(|e| {
            GlimtError::VideoSource(format!("Failed to parse yt-dlp output: {}", e))
        })?;

        let published_at = json["upload_date"].as_str().and_then(|date_str| {
            // yt-dlp returns date as YYYYMMDD
            chrono::NaiveDate::parse_from_str(date_str, "%Y%m%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });

        Ok(VideoMetadata {
            id: video_id.to_string(),
            title: json["title"].as_str().unwrap_or("Unknown Title").to_string(),
            author: json["channel"]
                .as_str()
                .or_else(|| json["uploader"].as_str())
                .map(|s| s.to_string()),
            duration_seconds: json["duration"].as_f64().map(|d| d as u32),
            view_count: json["view_count"].as_u64(),
            description: json["description"].as_str().map(|s| s.to_string()),
            source_url: Self::watch_url(video_id),
            published_at,
        })
    }
}

#[async_trait]
impl VideoSource for YoutubeSource {
    async fn fetch_metadata(&self, input: &str) -> Result<VideoMetadata> {
        let video_id = self.extract_id(input).ok_or_else(|| {
            GlimtError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", input))
        })?;

        let url = Self::watch_url(&video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--no-download", "--no-warnings", "--no-playlist", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GlimtError::ToolNotFound("yt-dlp".to_string())
                } else {
                    GlimtError::VideoSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GlimtError::VideoNotFound(format!(
                "Video {} not found or unavailable: {}",
                video_id, stderr
            )));
        }

        Self::parse_metadata(&video_id, &String::from_utf8_lossy(&output.stdout))
    }

    fn can_handle(&self, input: &str) -> bool {
        Self::extract_video_id(input).is_some()
    }

    fn extract_id(&self, input: &str) -> Option<String> {
        Self::extract_video_id(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        for input in [
            "https://www.youtube.com/watch?v=zxQyTK8quyY",
            "https://youtube.com/watch?feature=share&v=zxQyTK8quyY",
            "https://youtu.be/zxQyTK8quyY?si=abc",
            "https://youtube.com/embed/zxQyTK8quyY",
            "https://www.youtube.com/shorts/zxQyTK8quyY",
            "zxQyTK8quyY",
        ] {
            assert_eq!(
                YoutubeSource::extract_video_id(input),
                Some("zxQyTK8quyY".to_string()),
                "input: {}",
                input
            );
        }

        assert_eq!(YoutubeSource::extract_video_id("not-a-video-id"), None);
        assert_eq!(YoutubeSource::extract_video_id(""), None);
        assert!(!YoutubeSource::new().can_handle("/path/to/video.mp4"));
    }

    #[test]
    fn test_timestamp_link() {
        assert_eq!(
            YoutubeSource::timestamp_link("zxQyTK8quyY", 125.7),
            "https://youtu.be/zxQyTK8quyY?t=125"
        );
    }

    #[test]
    fn test_deep_link_only_for_youtube_ids() {
        assert_eq!(
            YoutubeSource::deep_link("zxQyTK8quyY", 95.5).as_deref(),
            Some("https://youtu.be/zxQyTK8quyY?t=95")
        );
        assert_eq!(YoutubeSource::deep_link("local_talk-01", 0.0), None);
        assert_eq!(YoutubeSource::deep_link("https://youtu.be/zxQyTK8quyY", 0.0), None);
    }

    #[test]
    fn test_parse_metadata() {
        let json = r#"{
            "title": "Transformer Neural Networks, Clearly Explained",
            "uploader": "StatQuest",
            "duration": 2166.0,
            "view_count": 1200345,
            "upload_date": "20230724"
        }"#;

        let meta = YoutubeSource::parse_metadata("zxQyTK8quyY", json).unwrap();
        assert_eq!(meta.author.as_deref(), Some("StatQuest"));
        assert_eq!(meta.duration_seconds, Some(2166));
        assert_eq!(meta.view_count, Some(1200345));
        assert!(meta.published_at.is_some());
        assert_eq!(meta.source_url, "https://www.youtube.com/watch?v=zxQyTK8quyY");
    }
}
