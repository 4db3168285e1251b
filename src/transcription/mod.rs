//! Transcription module for Glimt.
//!
//! Produces the timestamped token stream the rest of the pipeline consumes, either
//! from a Whisper-compatible API or from a transcript JSON file.

mod import;
mod models;
mod whisper;

pub use import::{load_transcript_file, parse_transcript_json};
pub use models::{format_timestamp, join_token_text, Token, Transcript};
pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into timed tokens, with an optional language hint.
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript>;
}
