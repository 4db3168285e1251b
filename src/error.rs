//! Error types for Glimt.

use thiserror::Error;

/// Library-level error type for Glimt operations.
#[derive(Error, Debug)]
pub enum GlimtError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media source error: {0}")]
    VideoSource(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("No language model is configured: {0}")]
    GeneratorUnavailable(String),

    #[error("Language model call failed: {0}")]
    GeneratorFailure(String),

    #[error("Assistant is not ready: no summary document has been loaded")]
    NotReady,

    #[error("Summary not found: {0}")]
    SummaryNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Media not found: {0}")]
    VideoNotFound(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Glimt operations.
pub type Result<T> = std::result::Result<T, GlimtError>;
