//! Process command implementation.

use super::print_document;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the process command.
pub async fn run_process(input: &str, force: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Process, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Downloading, transcribing and summarizing...");
    let result = orchestrator.process_media(input, force).await;
    spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Processing failed: {}", e));
            return Err(e.into());
        }
    };

    if result.skipped {
        Output::info("Already summarized (use --force to process again).");
    } else {
        Output::success(&format!("Saved summary to {}", result.path.display()));
    }

    print_document(&result.document);
    Ok(())
}
