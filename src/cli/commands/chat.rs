//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(video: Option<&str>, settings: Settings) -> Result<()> {
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

    let (video_id, title) = assistant
        .document()
        .map(|d| (d.video_id.clone(), d.display_title().to_string()))
        .unwrap_or_default();

    println!("\n{} {}", style("Glimt Chat:").bold().cyan(), style(&title).bold());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            assistant.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        match assistant.reply(input).await {
            Ok(reply) => {
                println!("\n{} {}\n", style("Glimt:").cyan().bold(), reply.answer);
                if !reply.degraded {
                    for source in &reply.sources {
                        Output::source(&video_id, source);
                    }
                    println!();
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
