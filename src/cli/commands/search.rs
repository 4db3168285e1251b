//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    video: Option<&str>,
    limit: usize,
    settings: Settings,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let mut assistant = orchestrator.assistant_for(video)?;

    let video_id = assistant
        .document()
        .map(|d| d.video_id.clone())
        .unwrap_or_default();

    let spinner = Output::spinner("Searching...");
    let results = assistant.search(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(sources) => {
            if sources.is_empty() {
                Output::warning("This summary has no sections to search.");
            } else {
                Output::success(&format!("Top {} sections", sources.len()));
                for source in &sources {
                    Output::source(&video_id, source);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
