//! CLI output formatting utilities.

use crate::assistant::SourceSection;
use crate::audio_source::YoutubeSource;
use crate::summarizer::{Section, SummarySource};
use crate::transcription::format_timestamp;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a stored summary entry.
    pub fn summary_info(title: &str, id: &str, sections: usize, duration: f64) {
        println!(
            "  {} {} ({}, {} sections, {})",
            style("*").cyan(),
            style(title).bold(),
            style(id).dim(),
            sections,
            format_duration(duration)
        );
    }

    /// Print a section with its time range, link, and summary.
    pub fn section(video_id: &str, section: &Section) {
        let marker = match section.source {
            SummarySource::Model => String::new(),
            SummarySource::Fallback => format!(" {}", style("(transcript excerpt)").dim()),
        };
        println!(
            "\n{} {}{}",
            style(format!(
                "[{} - {}]",
                format_timestamp(section.start),
                format_timestamp(section.end)
            ))
            .cyan(),
            style(&section.title).bold(),
            marker
        );
        if let Some(link) = YoutubeSource::deep_link(video_id, section.start) {
            println!("   {}", style(link).dim());
        }
        for line in section.summary.lines() {
            println!("   {}", line);
        }
    }

    /// Print a retrieved section.
    pub fn source(video_id: &str, source: &SourceSection) {
        println!(
            "  {} {} @ {} (score: {:.2})",
            style(">>").green(),
            style(&source.title).bold(),
            style(source.time_range()).cyan(),
            source.score
        );
        if let Some(link) = YoutubeSource::deep_link(video_id, source.start) {
            println!("     {}", style(link).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
