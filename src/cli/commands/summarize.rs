//! Summarize command implementation.

use super::print_document;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcription::load_transcript_file;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the summarize command.
pub async fn run_summarize(
    transcript_path: &str,
    video_id: Option<String>,
    title: Option<String>,
    settings: Settings,
) -> Result<()> {
    let path = Path::new(transcript_path);
    let video_id = match video_id {
        Some(id) => id,
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .context("Cannot derive a video ID from the file name; pass --video-id")?,
    };

    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::warning(&format!("{}. Sections will get transcript excerpts.", e));
    }

    let transcript = load_transcript_file(&video_id, path)
        .with_context(|| format!("Failed to load transcript from {}", path.display()))?;

    if transcript.is_empty() {
        Output::warning("Transcript has no tokens; nothing to summarize.");
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Summarizing sections...");
    let result = orchestrator.summarize_transcript(&transcript, title).await;
    spinner.finish_and_clear();

    let result = result?;
    Output::success(&format!("Saved summary to {}", result.path.display()));
    print_document(&result.document);
    Ok(())
}
