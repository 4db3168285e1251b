//! Resection command implementation.

use super::print_document;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::sections::UndersizedPolicy;
use anyhow::Result;

/// Run the resection command.
pub async fn run_resection(
    video_id: &str,
    min_seconds: Option<u32>,
    max_seconds: Option<u32>,
    undersized: Option<UndersizedPolicy>,
    settings: Settings,
) -> Result<()> {
    let mut config = settings.sections.to_config();
    if let Some(min) = min_seconds {
        config.min_duration = min as f64;
    }
    if let Some(max) = max_seconds {
        config.max_duration = max as f64;
    }
    if let Some(policy) = undersized {
        config.undersized = policy;
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Re-sectioning {}...", video_id));
    let result = orchestrator.resection(video_id, Some(config)).await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            Output::success(&format!(
                "Re-sectioned into {} sections",
                result.document.sections.len()
            ));
            print_document(&result.document);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Re-sectioning failed: {}", e));
            Err(e.into())
        }
    }
}
