//! Import of Whisper-style transcript JSON files.
//!
//! Accepts the shape written by the Python `whisper` CLI and similar tools:
//!
//! ```json
//! {
//!   "text": "...",
//!   "language": "en",
//!   "segments": [
//!     {"text": "...", "start": 0.0, "end": 4.2,
//!      "words": [{"word": " Hello", "start": 0.0, "end": 0.4}]}
//!   ]
//! }
//! ```
//!
//! A top-level `"error"` field marks a failed transcription.

use super::{Token, Transcript};
use crate::error::{GlimtError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct RawTranscript {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<RawSegment>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    text: String,
    start: f64,
    end: f64,
    #[serde(default)]
    words: Option<Vec<RawWord>>,
}

#[derive(Debug, Deserialize)]
struct RawWord {
    word: String,
    start: f64,
    end: f64,
}

/// Parse transcript JSON into a token stream.
///
/// Word-level tokens are used when a segment carries them, segment-level tokens
/// otherwise. Non-speech markers (words starting with `[`) are dropped.
pub fn parse_transcript_json(video_id: &str, json: &str) -> Result<Transcript> {
    let raw: RawTranscript = serde_json::from_str(json)?;

    if let Some(error) = raw.error {
        return Err(GlimtError::Transcription(error));
    }

    let mut tokens = Vec::new();
    for segment in raw.segments {
        match segment.words {
            Some(words) if !words.is_empty() => {
                tokens.extend(
                    words
                        .into_iter()
                        .filter(|w| !w.word.trim_start().starts_with('['))
                        .map(|w| Token::new(w.word, w.start, w.end)),
                );
            }
            _ => {
                let text = segment.text.trim();
                if !text.is_empty() {
                    tokens.push(Token::new(text, segment.start, segment.end));
                }
            }
        }
    }

    debug!("Parsed {} tokens", tokens.len());

    Ok(Transcript::new(
        video_id.to_string(),
        raw.language.unwrap_or_else(|| "en".to_string()),
        tokens,
    ))
}

/// Load a transcript JSON file.
pub fn load_transcript_file(video_id: &str, path: &Path) -> Result<Transcript> {
    let content = std::fs::read_to_string(path)?;
    let transcript = parse_transcript_json(video_id, &content)?;
    info!(
        "Loaded transcript {:?}: {} tokens, {:.0}s",
        path,
        transcript.tokens.len(),
        transcript.duration_seconds
    );
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_level_tokens_preferred() {
        let json = r#"{
            "text": "Hello world",
            "language": "de",
            "segments": [
                {"text": "Hello world", "start": 0.0, "end": 2.0,
                 "words": [
                    {"word": " Hello", "start": 0.0, "end": 0.8},
                    {"word": " [Music]", "start": 0.8, "end": 1.0},
                    {"word": " world", "start": 1.0, "end": 2.0}
                 ]}
            ]
        }"#;

        let transcript = parse_transcript_json("vid", json).unwrap();
        assert_eq!(transcript.language, "de");
        assert_eq!(transcript.tokens.len(), 2);
        assert_eq!(transcript.tokens[1].text, " world");
        assert_eq!(transcript.duration_seconds, 2.0);
    }

    #[test]
    fn test_segment_tokens_without_words() {
        let json = r#"{
            "segments": [
                {"text": " First part ", "start": 0.0, "end": 5.0},
                {"text": "   ", "start": 5.0, "end": 6.0},
                {"text": "Second part", "start": 6.0, "end": 9.5}
            ]
        }"#;

        let transcript = parse_transcript_json("vid", json).unwrap();
        assert_eq!(transcript.language, "en");
        assert_eq!(transcript.tokens.len(), 2);
        assert_eq!(transcript.tokens[0].text, "First part");
    }

    #[test]
    fn test_error_payload_is_a_failure() {
        let json = r#"{"text": "", "segments": [], "error": "CUDA out of memory"}"#;
        let err = parse_transcript_json("vid", json).unwrap_err();
        assert!(matches!(err, GlimtError::Transcription(msg) if msg.contains("CUDA")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        std::fs::write(&path, r#"{"segments": [{"text": "hi", "start": 1.0, "end": 2.0}]}"#)
            .unwrap();

        let transcript = load_transcript_file("vid", &path).unwrap();
        assert_eq!(transcript.tokens.len(), 1);
    }
}
