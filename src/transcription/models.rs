//! Data models for transcription.

use serde::{Deserialize, Serialize};

/// The smallest timed unit of transcript text (a word or phrase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Token text as produced by the recognizer (may carry leading whitespace).
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl Token {
    /// Create a new token.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Duration of this token in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A complete transcript as an ordered token stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Detected or requested language code.
    pub language: String,
    /// Tokens in chronological order.
    pub tokens: Vec<Token>,
    /// Total duration in seconds (end of the last token).
    pub duration_seconds: f64,
}

impl Transcript {
    /// Create a new transcript from tokens.
    pub fn new(video_id: String, language: String, tokens: Vec<Token>) -> Self {
        let duration_seconds = tokens.last().map(|t| t.end).unwrap_or(0.0);

        Self {
            video_id,
            language,
            tokens,
            duration_seconds,
        }
    }

    /// Full transcript text (token texts joined by single spaces).
    pub fn full_text(&self) -> String {
        join_token_text(&self.tokens)
    }

    /// Whether the transcript has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Join token texts with single spaces, trimming recognizer whitespace.
pub fn join_token_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format seconds as HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_creation() {
        let tokens = vec![
            Token::new(" Hello", 0.0, 0.4),
            Token::new(" world.", 0.4, 1.0),
            Token::new(" Next", 1.5, 2.0),
        ];

        let transcript = Transcript::new("test_video".to_string(), "en".to_string(), tokens);

        assert_eq!(transcript.video_id, "test_video");
        assert_eq!(transcript.full_text(), "Hello world. Next");
        assert_eq!(transcript.duration_seconds, 2.0);
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new("empty".to_string(), "en".to_string(), vec![]);
        assert!(transcript.is_empty());
        assert_eq!(transcript.duration_seconds, 0.0);
        assert_eq!(transcript.full_text(), "");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00");
        assert_eq!(format_timestamp(65.9), "00:01:05");
        assert_eq!(format_timestamp(3665.0), "01:01:05");
        assert_eq!(format_timestamp(-3.0), "00:00:00");
    }
}
