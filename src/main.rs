//! Glimt CLI entry point.

use anyhow::Result;
use clap::Parser;
use glimt::cli::{commands, Cli, Commands};
use glimt::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("glimt={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    match &cli.command {
        Commands::Process { input, force } => {
            commands::run_process(input, *force, settings).await?;
        }

        Commands::Summarize {
            transcript,
            video_id,
            title,
        } => {
            commands::run_summarize(transcript, video_id.clone(), title.clone(), settings).await?;
        }

        Commands::Show { video_id } => {
            commands::run_show(video_id.as_deref(), settings)?;
        }

        Commands::Ask {
            question,
            video,
            top_k,
        } => {
            commands::run_ask(question, video.as_deref(), *top_k, settings).await?;
        }

        Commands::Chat { video } => {
            commands::run_chat(video.as_deref(), settings).await?;
        }

        Commands::Search {
            query,
            video,
            limit,
        } => {
            commands::run_search(query, video.as_deref(), *limit, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings)?;
        }

        Commands::Resection {
            video_id,
            min_seconds,
            max_seconds,
            undersized,
        } => {
            commands::run_resection(video_id, *min_seconds, *max_seconds, *undersized, settings)
                .await?;
        }

        Commands::Export {
            video_id,
            output,
            format,
        } => {
            commands::run_export(video_id.as_deref(), output.clone(), format, settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
