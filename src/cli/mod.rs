//! CLI module for Glimt.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::sections::UndersizedPolicy;
use clap::{Parser, Subcommand};

/// Glimt - Video summaries you can talk to
///
/// Splits a video transcript into timed sections, summarizes each one, and answers
/// questions about the video from those summaries.
#[derive(Parser, Debug)]
#[command(name = "glimt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download, transcribe, and summarize a YouTube video
    Process {
        /// YouTube URL or video ID
        input: String,

        /// Force re-processing even if a summary exists
        #[arg(short, long)]
        force: bool,
    },

    /// Summarize an existing transcript JSON file
    Summarize {
        /// Path to the transcript JSON
        transcript: String,

        /// Video ID to store the summary under (defaults to the file name)
        #[arg(long)]
        video_id: Option<String>,

        /// Video title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Show a stored summary
    Show {
        /// Video ID (defaults to the latest summary)
        video_id: Option<String>,
    },

    /// Ask a single question about a video
    Ask {
        /// The question to ask
        question: String,

        /// Video ID (defaults to the latest summary)
        #[arg(long)]
        video: Option<String>,

        /// Number of sections to use as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start an interactive chat about a video
    Chat {
        /// Video ID (defaults to the latest summary)
        #[arg(long)]
        video: Option<String>,
    },

    /// Find the sections most relevant to a query
    Search {
        /// Search query
        query: String,

        /// Video ID (defaults to the latest summary)
        #[arg(long)]
        video: Option<String>,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// List stored summaries
    List,

    /// Re-section and re-summarize a stored video without re-transcribing
    Resection {
        /// Video ID
        video_id: String,

        /// Minimum section length in seconds
        #[arg(long)]
        min_seconds: Option<u32>,

        /// Maximum section length in seconds
        #[arg(long)]
        max_seconds: Option<u32>,

        /// Handling of sections shorter than the minimum (drop, merge, keep)
        #[arg(long)]
        undersized: Option<UndersizedPolicy>,
    },

    /// Export a stored summary
    Export {
        /// Video ID (defaults to the latest summary)
        video_id: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, markdown, srt, vtt)
        #[arg(long, default_value = "markdown")]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resection_flags() {
        let cli = Cli::try_parse_from([
            "glimt",
            "resection",
            "zxQyTK8quyY",
            "--max-seconds",
            "120",
            "--undersized",
            "merge",
        ])
        .unwrap();

        match cli.command {
            Commands::Resection {
                video_id,
                min_seconds,
                max_seconds,
                undersized,
            } => {
                assert_eq!(video_id, "zxQyTK8quyY");
                assert_eq!(min_seconds, None);
                assert_eq!(max_seconds, Some(120));
                assert_eq!(undersized, Some(UndersizedPolicy::Merge));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["glimt", "-vv", "ask", "what?", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("c.toml"));
    }
}
