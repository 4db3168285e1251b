//! Summary export (JSON, Markdown, SRT, VTT).
//!
//! Subtitle formats carry one cue per section: the title on the first line, the
//! summary below it.

use super::SummaryDocument;
use crate::audio_source::YoutubeSource;
use crate::error::Result;
use crate::summarizer::Section;
use crate::transcription::format_timestamp;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    Srt,
    Vtt,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "srt" => Ok(ExportFormat::Srt),
            "vtt" | "webvtt" => Ok(ExportFormat::Vtt),
            _ => Err(format!(
                "Unknown format: {}. Use json, markdown, srt, or vtt.",
                s
            )),
        }
    }
}

impl ExportFormat {
    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Srt => "srt",
            ExportFormat::Vtt => "vtt",
        }
    }
}

/// Render a document in the given format.
pub fn export_document(doc: &SummaryDocument, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Json => serde_json::to_string_pretty(doc)?,
        ExportFormat::Markdown => format_markdown(doc),
        ExportFormat::Srt => format_srt(doc),
        ExportFormat::Vtt => format_vtt(doc),
    })
}

fn format_markdown(doc: &SummaryDocument) -> String {
    let mut output = format!("# {}\n\n", doc.display_title());
    output.push_str(&format!(
        "Duration: {} | Sections: {} | Language: {}\n",
        format_timestamp(doc.duration),
        doc.sections.len(),
        doc.language
    ));

    for section in &doc.sections {
        output.push_str(&format!(
            "\n## [{} - {}] {}\n\n",
            format_timestamp(section.start),
            format_timestamp(section.end),
            section.title
        ));
        if let Some(link) = YoutubeSource::deep_link(&doc.video_id, section.start) {
            output.push_str(&format!("[Watch]({})\n\n", link));
        }
        output.push_str(section.summary.trim());
        output.push('\n');
    }

    output
}

fn cue_text(section: &Section) -> String {
    format!("{}\n{}", section.title, section.summary.trim())
}

fn format_srt(doc: &SummaryDocument) -> String {
    let mut output = String::new();

    for (i, section) in doc.sections.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            cue_timestamp(section.start, ','),
            cue_timestamp(section.end, ',')
        ));
        output.push_str(&cue_text(section));
        output.push_str("\n\n");
    }

    output
}

fn format_vtt(doc: &SummaryDocument) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, section) in doc.sections.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            cue_timestamp(section.start, '.'),
            cue_timestamp(section.end, '.')
        ));
        output.push_str(&cue_text(section));
        output.push_str("\n\n");
    }

    output
}

/// `HH:MM:SS<sep>mmm`; SRT uses `,` and WebVTT uses `.`.
fn cue_timestamp(seconds: f64, separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, ms)
}
