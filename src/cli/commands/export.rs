//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::document::{export_document, DocumentStore, ExportFormat};
use anyhow::Result;

/// Run the export command.
pub fn run_export(
    video_id: Option<&str>,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let export_format: ExportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let store = DocumentStore::new(settings.summaries_dir());
    let document = match store.load_or_latest(video_id) {
        Ok(document) => document,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Use 'glimt list' to see stored summaries.");
            return Err(e.into());
        }
    };

    let output_str = export_document(&document, export_format)?;

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &output_str)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} sections)",
                document.display_title(),
                path,
                document.sections.len()
            ));
        }
        _ => {
            println!("{}", output_str);
        }
    }

    Ok(())
}
