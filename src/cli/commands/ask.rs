//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    video: Option<&str>,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Generate, &settings) {
        Output::warning(&format!("{}", e));
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut assistant = match orchestrator.assistant_for(video) {
        Ok(assistant) => assistant,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Summarize a video first with 'glimt process <url>'.");
            return Err(e.into());
        }
    };
    if let Some(k) = top_k {
        assistant = assistant.with_top_k(k);
    }

    let video_id = assistant
        .document()
        .map(|d| d.video_id.clone())
        .unwrap_or_default();

    let spinner = Output::spinner("Thinking...");
    let reply = assistant.reply(question).await;
    spinner.finish_and_clear();

    let reply = reply?;
    println!("\n{}\n", reply.answer);

    if !reply.sources.is_empty() {
        Output::header("Sources");
        for source in &reply.sources {
            Output::source(&video_id, source);
        }
    }

    Ok(())
}
