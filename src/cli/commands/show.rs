//! Show command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::document::{DocumentStore, SummaryDocument};
use crate::transcription::format_timestamp;
use anyhow::Result;

/// Run the show command.
pub fn run_show(video_id: Option<&str>, settings: Settings) -> Result<()> {
    let store = DocumentStore::new(settings.summaries_dir());

    match store.load_or_latest(video_id) {
        Ok(document) => {
            print_document(&document);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Use 'glimt list' to see stored summaries.");
            Err(e.into())
        }
    }
}

/// Print a document with all of its sections.
pub fn print_document(document: &SummaryDocument) {
    Output::header(document.display_title());
    Output::kv("Video", &document.video_id);
    Output::kv("Duration", &format_timestamp(document.duration));
    Output::kv("Language", &document.language);
    Output::kv("Sections", &document.sections.len().to_string());

    let fallbacks = document.fallback_count();
    if fallbacks > 0 {
        Output::kv("Transcript excerpts", &fallbacks.to_string());
    }

    if document.sections.is_empty() {
        Output::warning("No sections: the transcript is shorter than the minimum section length.");
        return;
    }

    for section in &document.sections {
        Output::section(&document.video_id, section);
    }
    println!();
}
