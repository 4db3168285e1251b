//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{GlimtError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Processing a video requires the download tools and an API key.
    Process,
    /// Model-written summaries and answers require an API key.
    Generate,
    /// Search runs locally.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Process => {
            check_api_key(settings)?;
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Generate => {
            check_api_key(settings)?;
        }
        Operation::Search => {}
    }
    Ok(())
}

/// Check that the provider API key is set.
fn check_api_key(settings: &Settings) -> Result<()> {
    let env = &settings.llm.api_key_env;
    match settings.llm.resolve_api_key() {
        Some(_) => Ok(()),
        None => Err(GlimtError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            env, env
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(GlimtError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GlimtError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(GlimtError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
