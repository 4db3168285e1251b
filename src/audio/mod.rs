//! Audio download and processing utilities.
//!
//! Thin wrappers around `yt-dlp`, `ffmpeg` and `ffprobe`; no decoding happens in-process.

mod downloader;

pub use downloader::{download_audio, probe_duration, split_audio};
