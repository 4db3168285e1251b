//! Configuration module for Glimt.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts, SummaryPrompts};
pub use settings::{
    AssistantSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, LlmSettings,
    PromptSettings, SectionSettings, Settings, SummarizerSettings, TranscriptionSettings,
};
