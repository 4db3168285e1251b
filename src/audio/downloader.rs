//! Audio extraction and splitting via yt-dlp, ffmpeg and ffprobe.

use crate::error::{GlimtError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Extensions yt-dlp may leave behind before conversion.
const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "m4a", "opus", "webm", "ogg"];

/// Downloads the audio track of a video as MP3.
///
/// A previously downloaded file for the same video is reused.
#[instrument(skip(output_dir), fields(video_id = %video_id))]
pub async fn download_audio(url: &str, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target_path = output_dir.join(format!("{}.mp3", video_id));
    if target_path.exists() {
        info!("Using cached audio file");
        return Ok(target_path);
    }

    info!("Downloading audio from {}", url);

    let template = output_dir.join(format!("{}.%(ext)s", video_id));

    let output = Command::new("yt-dlp")
        .arg("--format").arg("bestaudio")
        .arg("--extract-audio")
        .arg("--audio-format").arg("mp3")
        .arg("--output").arg(&template)
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GlimtError::ToolNotFound("yt-dlp".into()),
            _ => GlimtError::AudioDownload(format!("yt-dlp execution failed: {e}")),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GlimtError::AudioDownload(format!("yt-dlp failed: {stderr}")));
    }

    let downloaded = AUDIO_EXTENSIONS
        .iter()
        .map(|ext| output_dir.join(format!("{}.{}", video_id, ext)))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| GlimtError::AudioDownload("Audio file not found after download".into()))?;

    if downloaded != target_path {
        run_ffmpeg(&[
            OsStr::new("-i"),
            downloaded.as_os_str(),
            OsStr::new("-vn"),
            OsStr::new("-codec:a"),
            OsStr::new("libmp3lame"),
            OsStr::new("-qscale:a"),
            OsStr::new("2"),
            OsStr::new("-y"),
            target_path.as_os_str(),
        ])
        .await?;
        if let Err(e) = std::fs::remove_file(&downloaded) {
            warn!("Failed to remove intermediate audio file: {}", e);
        }
    }

    Ok(target_path)
}

/// Splits a long audio file into pieces of about `chunk_seconds`.
///
/// Returns `(path, offset_seconds)` pairs in playback order. Audio no longer than
/// one chunk is returned unchanged with offset 0.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds.max(1) as f64;
    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut pieces = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let piece_path = output_dir.join(format!("{}_{:04}.mp3", base_name, idx));
        let piece_len = chunk_len.min(total_duration - offset);

        let start = format!("{:.3}", offset);
        let length = format!("{:.3}", piece_len);
        run_ffmpeg(&[
            OsStr::new("-ss"),
            OsStr::new(&start),
            OsStr::new("-i"),
            source.as_os_str(),
            OsStr::new("-t"),
            OsStr::new(&length),
            OsStr::new("-codec:a"),
            OsStr::new("libmp3lame"),
            OsStr::new("-qscale:a"),
            OsStr::new("2"),
            OsStr::new("-y"),
            piece_path.as_os_str(),
        ])
        .await?;

        debug!("Created piece {} at offset {:.1}s", idx, offset);
        pieces.push((piece_path, offset));

        offset += chunk_len;
        idx += 1;
    }

    info!("Created {} audio pieces", pieces.len());
    Ok(pieces)
}

/// Runs ffmpeg quietly with the given arguments.
async fn run_ffmpeg(args: &[&OsStr]) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-loglevel")
        .arg("error")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GlimtError::ToolNotFound("ffmpeg".into()),
            _ => GlimtError::AudioDownload(format!("ffmpeg error: {e}")),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        let err = String::from_utf8_lossy(&output.stderr);
        Err(GlimtError::AudioDownload(format!("ffmpeg failed: {err}")))
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GlimtError::ToolNotFound("ffprobe".into()),
            _ => GlimtError::AudioDownload(format!("ffprobe failed: {e}")),
        })?;

    if !output.status.success() {
        return Err(GlimtError::AudioDownload("ffprobe returned error".into()));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Extracts `format.duration` from ffprobe JSON.
fn parse_probe_duration(json_str: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|_| GlimtError::AudioDownload("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GlimtError::AudioDownload("Could not determine audio duration".into()))
}
