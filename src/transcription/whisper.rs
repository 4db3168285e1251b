//! Whisper API transcription with word-level timestamps.

use super::{Token, Transcriber, Transcript};
use crate::audio::split_audio;
use crate::error::{GlimtError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs, TimestampGranularity,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Whisper-based transcriber for any OpenAI-compatible endpoint (OpenAI, Groq).
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
}

/// Tokens and detected language for one uploaded audio file.
struct ChunkResult {
    tokens: Vec<Token>,
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Create a new transcriber.
    pub fn new(
        client: Client<OpenAIConfig>,
        model: &str,
        chunk_duration_seconds: u32,
        max_concurrent_chunks: usize,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            chunk_duration_seconds,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
        }
    }

    /// Transcribe a single audio file (no splitting) with word-level timestamps.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path, language: Option<&str>) -> Result<ChunkResult> {
        debug!("Transcribing audio file with word-level timestamps");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            .timestamp_granularities(vec![TimestampGranularity::Word, TimestampGranularity::Segment]);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| GlimtError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| GlimtError::OpenAI(format!("Whisper API error: {}", e)))?;

        let tokens: Vec<Token> = match response.words {
            Some(words) if !words.is_empty() => words
                .into_iter()
                .filter(|w| !w.word.trim_start().starts_with('['))
                .map(|w| Token::new(w.word, w.start as f64, w.end as f64))
                .collect(),
            _ => {
                warn!("No word-level timestamps returned, falling back to segments");
                response
                    .segments
                    .map(|segs| {
                        segs.into_iter()
                            .filter(|s| !s.text.trim().is_empty())
                            .map(|s| Token::new(s.text.trim(), s.start as f64, s.end as f64))
                            .collect()
                    })
                    .unwrap_or_else(|| {
                        let text = response.text.trim();
                        if text.is_empty() {
                            Vec::new()
                        } else {
                            vec![Token::new(text, 0.0, response.duration as f64)]
                        }
                    })
            }
        };

        debug!("Transcribed {} tokens", tokens.len());
        Ok(ChunkResult {
            tokens,
            language: Some(response.language).filter(|l| !l.is_empty()),
        })
    }

    /// Transcribe an audio file, splitting it first when it is long.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_with_splitting(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        video_id: &str,
    ) -> Result<Transcript> {
        let temp_dir = tempfile::tempdir()?;
        let chunks = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            let result = self.transcribe_single(audio_path, language).await?;
            let language = detected_language(language, result.language);
            return Ok(Transcript::new(video_id.to_string(), language, result.tokens));
        }

        let chunk_count = chunks.len();
        info!("Processing {} audio chunks with {}", chunk_count, self.model);

        let pb = ProgressBar::new(chunk_count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Transcribing [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        // Chunks upload concurrently; results are re-ordered by index below.
        let mut results: Vec<(usize, f64, ChunkResult)> = Vec::with_capacity(chunk_count);

        let mut stream = stream::iter(chunks.into_iter().enumerate())
            .map(|(idx, (chunk_path, time_offset))| async move {
                let result = self.transcribe_single(&chunk_path, language).await;
                (idx, time_offset, result)
            })
            .buffer_unordered(self.max_concurrent_chunks);

        while let Some((idx, time_offset, result)) = stream.next().await {
            pb.inc(1);
            match result {
                Ok(chunk) => results.push((idx, time_offset, chunk)),
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(GlimtError::Transcription(format!(
                        "Chunk {} at {:.0}s failed: {}",
                        idx, time_offset, e
                    )));
                }
            }
        }

        pb.finish_and_clear();

        results.sort_by_key(|(idx, _, _)| *idx);

        let mut detected = None;
        let mut all_tokens = Vec::new();
        for (_, time_offset, chunk) in results {
            if detected.is_none() {
                detected = chunk.language;
            }
            all_tokens.extend(chunk.tokens.into_iter().map(|mut token| {
                token.start += time_offset;
                token.end += time_offset;
                token
            }));
        }

        drop(temp_dir);

        Ok(Transcript::new(
            video_id.to_string(),
            detected_language(language, detected),
            all_tokens,
        ))
    }
}

/// Prefer the requested language, then the detected one, then English.
fn detected_language(requested: Option<&str>, detected: Option<String>) -> String {
    requested
        .map(|l| l.to_string())
        .or(detected)
        .unwrap_or_else(|| "en".to_string())
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        let video_id = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        self.transcribe_with_splitting(audio_path, language, &video_id).await
    }
}
