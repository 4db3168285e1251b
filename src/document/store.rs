//! JSON persistence for summary documents.
//!
//! Layout under the store directory:
//! - `<video_id>.json`: one file per summarized video
//! - `latest.json`: copy of the most recently saved document

use super::SummaryDocument;
use crate::error::{GlimtError, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const LATEST_FILE: &str = "latest.json";

/// Listing entry for a stored document.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub video_id: String,
    pub title: Option<String>,
    pub duration: f64,
    pub section_count: usize,
    pub generated_at: Option<DateTime<Utc>>,
}

/// File-backed document store.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the stored document for a video.
    pub fn path_for(&self, video_id: &str) -> Result<PathBuf> {
        validate_id(video_id)?;
        Ok(self.dir.join(format!("{}.json", video_id)))
    }

    /// Save a document and mark it as the latest. Returns the per-video path.
    pub fn save(&self, doc: &SummaryDocument) -> Result<PathBuf> {
        let path = self.path_for(&doc.video_id)?;
        std::fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(doc)?;
        self.write_atomic(&path, &json)?;
        self.write_atomic(&self.dir.join(LATEST_FILE), &json)?;

        info!("Saved summary for {} to {}", doc.video_id, path.display());
        Ok(path)
    }

    /// Load the document for a video.
    pub fn load(&self, video_id: &str) -> Result<SummaryDocument> {
        let path = self.path_for(video_id)?;
        if !path.exists() {
            return Err(GlimtError::SummaryNotFound(video_id.to_string()));
        }
        Self::read(&path)
    }

    /// Load the most recently saved document.
    pub fn load_latest(&self) -> Result<SummaryDocument> {
        let path = self.dir.join(LATEST_FILE);
        if !path.exists() {
            return Err(GlimtError::SummaryNotFound(
                "no summary has been saved yet".to_string(),
            ));
        }
        Self::read(&path)
    }

    /// Load by ID, or the latest document when `video_id` is `None`.
    pub fn load_or_latest(&self, video_id: Option<&str>) -> Result<SummaryDocument> {
        match video_id {
            Some(id) => self.load(id),
            None => self.load_latest(),
        }
    }

    /// Whether a document exists for the video.
    pub fn contains(&self, video_id: &str) -> bool {
        self.path_for(video_id).map(|p| p.exists()).unwrap_or(false)
    }

    /// List stored documents, newest first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<DocumentInfo>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut infos = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let is_latest = path.file_name().is_some_and(|name| name == LATEST_FILE);
            if !is_json || is_latest {
                continue;
            }

            match Self::read(&path) {
                Ok(doc) => infos.push(DocumentInfo {
                    section_count: doc.sections.len(),
                    video_id: doc.video_id,
                    title: doc.title,
                    duration: doc.duration,
                    generated_at: doc.generated_at,
                }),
                Err(e) => warn!("Skipping unreadable summary {}: {}", path.display(), e),
            }
        }

        infos.sort_by(|a, b| {
            b.generated_at
                .cmp(&a.generated_at)
                .then_with(|| a.video_id.cmp(&b.video_id))
        });
        Ok(infos)
    }

    fn read(path: &Path) -> Result<SummaryDocument> {
        debug!("Reading summary from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| GlimtError::Io(e.error))?;
        Ok(())
    }
}

/// Video IDs become file names, so path separators, dots-only names and the
/// name of the latest-pointer file are refused.
fn validate_id(video_id: &str) -> Result<()> {
    let invalid = video_id.is_empty()
        || video_id.chars().all(|c| c == '.')
        || format!("{}.json", video_id) == LATEST_FILE
        || video_id.contains(['/', '\\'])
        || video_id.trim() != video_id;
    if invalid {
        return Err(GlimtError::InvalidInput(format!(
            "Invalid video ID: {:?}",
            video_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_document;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("summaries"));
        let doc = sample_document();

        let path = assert_ok!(store.save(&doc));
        assert!(path.ends_with("zxQyTK8quyY.json"));
        assert!(store.contains("zxQyTK8quyY"));

        assert_eq!(store.load("zxQyTK8quyY").unwrap(), doc);
        assert_eq!(store.load_latest().unwrap(), doc);
        assert_eq!(store.load_or_latest(None).unwrap(), doc);
    }

    #[test]
    fn test_latest_tracks_last_save() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        let first = sample_document();
        let mut second = sample_document();
        second.video_id = "second".to_string();

        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load_latest().unwrap().video_id, "second");
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_documents() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("nothing-here"));

        assert!(matches!(store.load("abc"), Err(GlimtError::SummaryNotFound(_))));
        assert!(matches!(store.load_latest(), Err(GlimtError::SummaryNotFound(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let store = DocumentStore::new(dir.path());

        assert!(matches!(store.load("broken"), Err(GlimtError::Json(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let store = DocumentStore::new("/tmp/unused");
        assert_err!(store.path_for("../etc/passwd"));
        assert_err!(store.path_for(".."));
        assert_err!(store.path_for(""));
        assert_err!(store.path_for("latest"));
        assert_ok!(store.path_for("local_talk-01"));
    }
}
