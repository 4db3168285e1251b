//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::document::DocumentStore;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let store = DocumentStore::new(settings.summaries_dir());

    match store.list() {
        Ok(documents) => {
            if documents.is_empty() {
                Output::info("No summaries yet. Use 'glimt process <url>' to add one.");
            } else {
                Output::header(&format!("Summaries ({})", documents.len()));
                println!();

                for info in &documents {
                    Output::summary_info(
                        info.title.as_deref().unwrap_or(&info.video_id),
                        &info.video_id,
                        info.section_count,
                        info.duration,
                    );
                }

                let total_sections: usize = documents.iter().map(|d| d.section_count).sum();
                println!();
                Output::kv("Total videos", &documents.len().to_string());
                Output::kv("Total sections", &total_sections.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list summaries: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
