//! Glimt - Video summaries you can talk to
//!
//! Turns a long, timestamped video transcript into titled, summarized sections and
//! answers questions about the video from those sections.
//!
//! # Overview
//!
//! Glimt allows you to:
//! - Transcribe YouTube videos into word-timed tokens
//! - Split the transcript into sections of bounded length
//! - Summarize each section with a language model (or a local excerpt without one)
//! - Ask questions and get answers grounded in the relevant sections
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `audio_source` - YouTube ID parsing and metadata
//! - `audio` - Audio download and splitting
//! - `transcription` - Speech-to-text and transcript import
//! - `sections` - Segmentation into duration-bounded sections
//! - `generation` - Text generation capability
//! - `summarizer` - Per-section titles and summaries
//! - `embedding` - Embedding generation
//! - `index` - Similarity ranking over sections
//! - `document` - Summary documents, storage and export
//! - `assistant` - Conversational question answering
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use glimt::config::Settings;
//! use glimt::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator.process_media("zxQyTK8quyY", false).await?;
//!     println!("{} sections", result.document.sections.len());
//!
//!     let mut assistant = orchestrator.assistant_for(Some("zxQyTK8quyY"))?;
//!     println!("{}", assistant.respond("What is positional encoding?").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod audio;
pub mod audio_source;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod sections;
pub mod summarizer;
pub mod transcription;

pub use error::{GlimtError, Result};
