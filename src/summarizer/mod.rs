//! Per-section title and summary generation.
//!
//! Each section is summarized by the configured [`TextGenerator`]. When no generator
//! is configured, the call fails, or the model returns nothing usable, the section
//! gets a deterministic fallback summary built from its own text instead.

use crate::config::Prompts;
use crate::generation::{ChatMessage, TextGenerator};
use crate::sections::SectionSkeleton;
use crate::transcription::{format_timestamp, join_token_text, Token};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Title used when none can be recovered from the model output.
pub const DEFAULT_TITLE: &str = "Section";

/// Characters of section text kept in a fallback summary.
const FALLBACK_CHARS: usize = 200;

const DISCLAIMER_PREFIX: &str = "here is the summary";

/// How a section's summary was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Model,
    Fallback,
}

/// A summarized section of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub start: f64,
    pub end: f64,
    pub tokens: Vec<Token>,
    pub title: String,
    pub summary: String,
    pub source: SummarySource,
}

impl Section {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Section transcript text.
    pub fn text(&self) -> String {
        join_token_text(&self.tokens)
    }

    /// Text used to embed the section for retrieval.
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.title, self.summary)
    }

    /// Drop the summary and return to the segmenter's view of the section.
    pub fn to_skeleton(&self) -> SectionSkeleton {
        SectionSkeleton {
            start: self.start,
            end: self.end,
            tokens: self.tokens.clone(),
        }
    }
}

/// A section that could not be summarized at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SummaryError {
    #[error("section {index} has no tokens")]
    EmptySection { index: usize },

    #[error("section {index} ends before it starts ({start:.1}s > {end:.1}s)")]
    InvertedBounds { index: usize, start: f64, end: f64 },
}

/// Turns section skeletons into titled, summarized sections.
pub struct SectionSummarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    prompts: Prompts,
    max_concurrent: usize,
}

impl SectionSummarizer {
    /// Create a summarizer. `None` means every section gets a fallback summary.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            generator,
            prompts: Prompts::default(),
            max_concurrent: 1,
        }
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sections summarized at once. Output order never depends on this.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Model name of the configured generator, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.generator.as_ref().map(|g| g.model_name())
    }

    /// Summarize a single section. Never fails: problems produce a fallback summary.
    #[instrument(skip_all, fields(start = section.start, end = section.end))]
    pub async fn summarize(&self, section: &SectionSkeleton) -> Section {
        let text = section.text();
        let timestamp = format_timestamp(section.start);

        let generated = match &self.generator {
            Some(generator) => {
                let messages = self.build_messages(&timestamp, &text);
                match generator.generate(&messages).await {
                    Ok(output) => parse_model_output(&output),
                    Err(e) => {
                        warn!("Summary generation failed for section at {}: {}", timestamp, e);
                        None
                    }
                }
            }
            None => None,
        };

        let (title, summary, source) = match generated {
            Some((title, summary)) => (title, summary, SummarySource::Model),
            None => {
                debug!("Using fallback summary for section at {}", timestamp);
                (
                    DEFAULT_TITLE.to_string(),
                    fallback_summary(section.start, &text),
                    SummarySource::Fallback,
                )
            }
        };

        Section {
            start: section.start,
            end: section.end,
            tokens: section.tokens.clone(),
            title,
            summary,
            source,
        }
    }

    /// Summarize every section, in input order.
    ///
    /// Structurally broken sections yield an `Err` for that item only.
    pub async fn summarize_all(
        &self,
        sections: &[SectionSkeleton],
    ) -> Vec<Result<Section, SummaryError>> {
        info!(
            "Summarizing {} sections (concurrency {})",
            sections.len(),
            self.max_concurrent
        );

        stream::iter(sections.iter().enumerate())
            .map(|(index, section)| async move {
                check_section(index, section)?;
                Ok::<_, SummaryError>(self.summarize(section).await)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    fn build_messages(&self, timestamp: &str, text: &str) -> Vec<ChatMessage> {
        let mut vars = HashMap::new();
        vars.insert("section".to_string(), format!("[{}] {}", timestamp, text));

        vec![
            ChatMessage::system(self.prompts.render_with_custom(&self.prompts.summary.system, &vars)),
            ChatMessage::user(self.prompts.render_with_custom(&self.prompts.summary.user, &vars)),
        ]
    }
}

fn check_section(index: usize, section: &SectionSkeleton) -> Result<(), SummaryError> {
    if section.tokens.is_empty() {
        return Err(SummaryError::EmptySection { index });
    }
    if section.end < section.start {
        return Err(SummaryError::InvertedBounds {
            index,
            start: section.start,
            end: section.end,
        });
    }
    Ok(())
}

/// Split model output into `(title, summary)`, or `None` if nothing usable remains.
fn parse_model_output(output: &str) -> Option<(String, String)> {
    let cleaned = strip_disclaimer(output);
    if cleaned.is_empty() {
        return None;
    }

    let first_line = cleaned.lines().next().unwrap_or_default();
    Some((extract_title(first_line), cleaned))
}

/// Remove leading "Here is the summary..." lines and surrounding blank lines.
pub fn strip_disclaimer(output: &str) -> String {
    let lines: Vec<&str> = output
        .trim()
        .lines()
        .skip_while(|line| {
            let line = line.trim();
            line.is_empty() || line.to_lowercase().starts_with(DISCLAIMER_PREFIX)
        })
        .collect();

    lines.join("\n").trim().to_string()
}

/// Title from the first summary line: the text after the last `]`, without heading marks.
pub fn extract_title(line: &str) -> String {
    let after_bracket = match line.rfind(']') {
        Some(pos) => &line[pos + 1..],
        None => line,
    };

    let title = after_bracket
        .trim()
        .trim_start_matches('#')
        .trim_matches('*')
        .trim();

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// `[HH:MM:SS] ` followed by the first 200 characters of the text.
pub fn fallback_summary(start: f64, text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(FALLBACK_CHARS).collect();
    let ellipsis = if chars.next().is_some() { "..." } else { "" };

    format!("[{}] {}{}", format_timestamp(start), head, ellipsis)
}
