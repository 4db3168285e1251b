//! Segmentation of a timed token stream into duration-bounded sections.
//!
//! Tokens are accumulated greedily: a token joins the open buffer while the buffer's
//! span including that token stays strictly below `max_duration`. When a token would
//! reach or exceed the limit, the buffer is closed and the token opens the next one.
//! Buffers shorter than `min_duration` are handled by the configured
//! [`UndersizedPolicy`].

use crate::error::{GlimtError, Result};
use crate::transcription::{join_token_text, Token};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do with a closed buffer shorter than the minimum duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndersizedPolicy {
    /// Discard the buffer and its tokens.
    #[default]
    Drop,
    /// Append the tokens to the previously emitted section.
    Merge,
    /// Emit the buffer as its own section.
    Keep,
}

impl std::str::FromStr for UndersizedPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(UndersizedPolicy::Drop),
            "merge" => Ok(UndersizedPolicy::Merge),
            "keep" => Ok(UndersizedPolicy::Keep),
            _ => Err(format!(
                "Unknown undersized policy: {}. Use drop, merge, or keep.",
                s
            )),
        }
    }
}

impl std::fmt::Display for UndersizedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndersizedPolicy::Drop => write!(f, "drop"),
            UndersizedPolicy::Merge => write!(f, "merge"),
            UndersizedPolicy::Keep => write!(f, "keep"),
        }
    }
}

/// Segmenter configuration. Durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionConfig {
    pub min_duration: f64,
    pub max_duration: f64,
    pub undersized: UndersizedPolicy,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            min_duration: 60.0,
            max_duration: 300.0,
            undersized: UndersizedPolicy::Drop,
        }
    }
}

impl SectionConfig {
    pub fn new(min_duration: f64, max_duration: f64) -> Self {
        Self {
            min_duration,
            max_duration,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, undersized: UndersizedPolicy) -> Self {
        self.undersized = undersized;
        self
    }

    /// Requires `0 <= min_duration <= max_duration` and `max_duration > 0`.
    pub fn validate(&self) -> Result<()> {
        if !self.min_duration.is_finite() || !self.max_duration.is_finite() {
            return Err(GlimtError::InvalidInput(
                "section durations must be finite".to_string(),
            ));
        }
        if self.min_duration < 0.0 {
            return Err(GlimtError::InvalidInput(format!(
                "minimum section duration must not be negative (got {})",
                self.min_duration
            )));
        }
        if self.max_duration <= 0.0 {
            return Err(GlimtError::InvalidInput(format!(
                "maximum section duration must be positive (got {})",
                self.max_duration
            )));
        }
        if self.min_duration > self.max_duration {
            return Err(GlimtError::InvalidInput(format!(
                "minimum section duration {} exceeds maximum {}",
                self.min_duration, self.max_duration
            )));
        }
        Ok(())
    }
}

/// A time-bounded group of consecutive tokens, before summarization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSkeleton {
    pub start: f64,
    pub end: f64,
    pub tokens: Vec<Token>,
}

impl SectionSkeleton {
    fn from_tokens(tokens: Vec<Token>) -> Option<Self> {
        let start = tokens.first()?.start;
        let end = tokens.last()?.end;
        Some(Self { start, end, tokens })
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Token texts joined with single spaces.
    pub fn text(&self) -> String {
        join_token_text(&self.tokens)
    }
}

/// Group tokens into sections.
///
/// Returns an empty list for an empty stream. A single token whose own span exceeds
/// `max_duration` becomes a section by itself; tokens are never split.
pub fn segment(tokens: &[Token], config: &SectionConfig) -> Result<Vec<SectionSkeleton>> {
    config.validate()?;

    let mut sections: Vec<SectionSkeleton> = Vec::new();
    let mut buffer: Vec<Token> = Vec::new();

    for token in tokens {
        if let Some(first) = buffer.first() {
            if token.end - first.start < config.max_duration {
                buffer.push(token.clone());
                continue;
            }
            close_buffer(&mut sections, std::mem::take(&mut buffer), config);
        }
        buffer.push(token.clone());
    }
    close_buffer(&mut sections, buffer, config);

    debug!(
        "Segmented {} tokens into {} sections",
        tokens.len(),
        sections.len()
    );
    Ok(sections)
}

fn close_buffer(sections: &mut Vec<SectionSkeleton>, buffer: Vec<Token>, config: &SectionConfig) {
    let Some(section) = SectionSkeleton::from_tokens(buffer) else {
        return;
    };

    if section.duration() >= config.min_duration {
        sections.push(section);
        return;
    }

    match config.undersized {
        UndersizedPolicy::Drop => {
            debug!(
                "Dropping undersized section {:.1}s-{:.1}s ({} tokens)",
                section.start,
                section.end,
                section.tokens.len()
            );
        }
        UndersizedPolicy::Merge => match sections.last_mut() {
            Some(previous) => {
                previous.end = previous.end.max(section.end);
                previous.tokens.extend(section.tokens);
            }
            None => sections.push(section),
        },
        UndersizedPolicy::Keep => sections.push(section),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, start: f64, end: f64) -> Token {
        Token::new(text, start, end)
    }

    /// One token per `step` seconds from `from` to `to`.
    fn stream(from: u32, to: u32, step: u32) -> Vec<Token> {
        (from..to)
            .step_by(step as usize)
            .map(|s| tok("word", s as f64, (s + step) as f64))
            .collect()
    }

    #[test]
    fn test_empty_stream() {
        let sections = segment(&[], &SectionConfig::default()).unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn test_short_stream_is_dropped() {
        let tokens = vec![tok("Hello", 0.0, 10.0), tok("there", 10.0, 40.0)];
        let sections = segment(&tokens, &SectionConfig::new(60.0, 300.0)).unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn test_closes_before_reaching_max() {
        let tokens = vec![
            tok("a", 0.0, 70.0),
            tok("b", 70.0, 140.0),
            tok("c", 140.0, 320.0),
        ];
        let sections = segment(&tokens, &SectionConfig::new(60.0, 300.0)).unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!((sections[0].start, sections[0].end), (0.0, 140.0));
        assert_eq!(sections[0].text(), "a b");
        assert_eq!((sections[1].start, sections[1].end), (140.0, 320.0));
        assert_eq!(sections[1].tokens.len(), 1);
    }

    #[test]
    fn test_exact_max_closes_on_next_token() {
        // 0..300 would be exactly max, so the second token opens a new buffer.
        let tokens = vec![tok("a", 0.0, 100.0), tok("b", 100.0, 300.0)];
        let sections = segment(&tokens, &SectionConfig::new(60.0, 300.0)).unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].end, 100.0);
        assert_eq!(sections[1].start, 100.0);
    }

    #[test]
    fn test_oversized_token_is_own_section() {
        let tokens = vec![
            tok("intro", 0.0, 90.0),
            tok("monologue", 90.0, 500.0),
            tok("outro", 500.0, 580.0),
        ];
        let sections = segment(&tokens, &SectionConfig::new(60.0, 300.0)).unwrap();

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].tokens.len(), 1);
        assert_eq!(sections[1].duration(), 410.0);
    }

    #[test]
    fn test_sections_respect_bounds() {
        let tokens = stream(0, 1000, 7);
        let config = SectionConfig::new(60.0, 300.0);
        let sections = segment(&tokens, &config).unwrap();

        assert!(!sections.is_empty());
        for pair in sections.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for section in &sections {
            assert!(section.duration() >= config.min_duration);
            assert!(section.duration() < config.max_duration);
        }

        // Surviving tokens are an in-order subsequence of the input, each used once.
        let kept: Vec<&Token> = sections.iter().flat_map(|s| s.tokens.iter()).collect();
        let mut remaining = tokens.iter();
        for token in &kept {
            assert!(remaining.any(|t| t == *token), "out of order: {:?}", token);
        }
        assert!(kept.windows(2).all(|w| w[0].start < w[1].start));
        assert_eq!(sections[0].tokens[0], tokens[0]);
    }

    #[test]
    fn test_keep_policy_partitions_input() {
        let mut tokens = stream(0, 1000, 7);
        tokens.push(tok("tail", 1001.0, 1010.0));
        let config = SectionConfig::new(60.0, 300.0).with_policy(UndersizedPolicy::Keep);
        let sections = segment(&tokens, &config).unwrap();

        let kept: Vec<Token> = sections
            .iter()
            .flat_map(|s| s.tokens.iter().cloned())
            .collect();
        assert_eq!(kept, tokens);
        assert_eq!(sections.last().unwrap().end, 1010.0);
    }

    #[test]
    fn test_trailing_remainder_dropped() {
        // 0..290 fills one section, 290..320 remains and is too short.
        let mut tokens = stream(0, 290, 10);
        tokens.push(tok("tail", 290.0, 320.0));
        let sections = segment(&tokens, &SectionConfig::new(60.0, 300.0)).unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].end, 290.0);
    }

    #[test]
    fn test_merge_policy_extends_previous() {
        let mut tokens = stream(0, 290, 10);
        tokens.push(tok("tail", 290.0, 320.0));
        let config = SectionConfig::new(60.0, 300.0).with_policy(UndersizedPolicy::Merge);
        let sections = segment(&tokens, &config).unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].end, 320.0);
        assert_eq!(sections[0].tokens.len(), tokens.len());
    }

    #[test]
    fn test_merge_policy_without_previous_emits() {
        let tokens = vec![tok("short", 0.0, 20.0)];
        let config = SectionConfig::new(60.0, 300.0).with_policy(UndersizedPolicy::Merge);
        let sections = segment(&tokens, &config).unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].end, 20.0);
    }

    #[test]
    fn test_keep_policy() {
        let tokens = vec![tok("Hello", 0.0, 10.0), tok("there", 10.0, 40.0)];
        let config = SectionConfig::new(60.0, 300.0).with_policy(UndersizedPolicy::Keep);
        let sections = segment(&tokens, &config).unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!((sections[0].start, sections[0].end), (0.0, 40.0));
    }

    #[test]
    fn test_invalid_config() {
        assert!(SectionConfig::new(300.0, 60.0).validate().is_err());
        assert!(SectionConfig::new(-1.0, 60.0).validate().is_err());
        assert!(SectionConfig::new(0.0, 0.0).validate().is_err());
        assert!(SectionConfig::new(0.0, 1.0).validate().is_ok());
        assert!(segment(&[tok("a", 0.0, 1.0)], &SectionConfig::new(10.0, 5.0)).is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Merge".parse::<UndersizedPolicy>(), Ok(UndersizedPolicy::Merge));
        assert!("split".parse::<UndersizedPolicy>().is_err());
        assert_eq!(UndersizedPolicy::Keep.to_string(), "keep");
    }
}
