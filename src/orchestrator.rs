//! Pipeline orchestrator for Glimt.
//!
//! Wires the capabilities described by [`Settings`] and runs the pipeline from a
//! video link to a stored summary document.

use crate::assistant::Assistant;
use crate::audio::download_audio;
use crate::audio_source::{VideoSource, YoutubeSource};
use crate::config::{EmbeddingProvider, Prompts, Settings};
use crate::document::{DocumentStore, SummaryDocument};
use crate::embedding::{Embedder, LocalEmbedder, OpenAIEmbedder};
use crate::error::{GlimtError, Result};
use crate::generation::{OpenAIGenerator, TextGenerator};
use crate::openai::create_provider_client;
use crate::sections::{segment, SectionConfig};
use crate::summarizer::SectionSummarizer;
use crate::transcription::{Token, Transcriber, Transcript, WhisperTranscriber};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Capabilities the pipeline runs on.
///
/// Language-model capabilities are `None` when no API key is configured.
pub struct Components {
    pub source: Arc<dyn VideoSource>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub summary_generator: Option<Arc<dyn TextGenerator>>,
    pub chat_generator: Option<Arc<dyn TextGenerator>>,
    pub embedder: Arc<dyn Embedder>,
}

impl Components {
    /// Build capabilities from settings. The API key is read once, here.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = create_provider_client(&settings.llm)?;
        if client.is_none() {
            warn!(
                "{} is not set; transcription is disabled and summaries use the fallback",
                settings.llm.api_key_env
            );
        }

        let transcriber = client.clone().map(|client| {
            Arc::new(WhisperTranscriber::new(
                client,
                &settings.transcription.model,
                settings.transcription.chunk_duration_seconds,
                settings.transcription.max_concurrent_chunks,
            )) as Arc<dyn Transcriber>
        });

        let summary_generator = client
            .clone()
            .filter(|_| settings.summarizer.enabled)
            .map(|client| {
                Arc::new(
                    OpenAIGenerator::new(client, settings.summarizer.model.clone())
                        .with_temperature(settings.summarizer.temperature)
                        .with_max_tokens(settings.summarizer.max_tokens),
                ) as Arc<dyn TextGenerator>
            });

        let chat_generator = client.map(|client| {
            Arc::new(
                OpenAIGenerator::new(client, settings.assistant.model.clone())
                    .with_temperature(settings.assistant.temperature)
                    .with_max_tokens(settings.assistant.max_tokens),
            ) as Arc<dyn TextGenerator>
        });

        let dimensions = settings.embedding.dimensions as usize;
        let embedder: Arc<dyn Embedder> = match settings.embedding.provider {
            EmbeddingProvider::Local => Arc::new(LocalEmbedder::new(dimensions)?),
            EmbeddingProvider::OpenAI => {
                Arc::new(OpenAIEmbedder::new(&settings.embedding.model, dimensions)?)
            }
        };

        Ok(Self {
            source: Arc::new(YoutubeSource::new()),
            transcriber,
            summary_generator,
            chat_generator,
            embedder,
        })
    }
}

/// The main orchestrator for the Glimt pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    components: Components,
    store: DocumentStore,
    temp_dir: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator with capabilities built from the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let components = Components::from_settings(&settings)?;
        Self::with_components(settings, components)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(settings: Settings, components: Components) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let store = DocumentStore::new(settings.summaries_dir());
        let temp_dir = settings.temp_dir();

        Ok(Self {
            settings,
            prompts,
            components,
            store,
            temp_dir,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.components.embedder)
    }

    /// Whether model-written summaries are available.
    pub fn has_summary_model(&self) -> bool {
        self.components.summary_generator.is_some()
    }

    /// A summarizer configured from settings.
    pub fn summarizer(&self) -> SectionSummarizer {
        SectionSummarizer::new(self.components.summary_generator.clone())
            .with_prompts(self.prompts.clone())
            .with_max_concurrent(self.settings.summarizer.max_concurrent)
    }

    /// A fresh assistant with no document loaded.
    pub fn assistant(&self) -> Assistant {
        Assistant::new(
            Arc::clone(&self.components.embedder),
            self.components.chat_generator.clone(),
        )
        .with_prompts(self.prompts.clone())
        .with_top_k(self.settings.assistant.top_k)
        .with_history_turns(self.settings.assistant.history_turns)
    }

    /// An assistant with a stored document loaded (the latest one when `video_id` is `None`).
    pub fn assistant_for(&self, video_id: Option<&str>) -> Result<Assistant> {
        let document = self.store.load_or_latest(video_id)?;
        let mut assistant = self.assistant();
        assistant.load_document(document);
        Ok(assistant)
    }

    /// Download, transcribe, section, summarize and store a video.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn process_media(&self, input: &str, force: bool) -> Result<ProcessResult> {
        let video_id = self.components.source.extract_id(input).ok_or_else(|| {
            GlimtError::InvalidInput(format!("Could not parse input: {}", input))
        })?;

        if !force && self.store.contains(&video_id) {
            info!("Video {} is already summarized, skipping", video_id);
            let document = self.store.load(&video_id)?;
            return Ok(ProcessResult {
                path: self.store.path_for(&video_id)?,
                document,
                skipped: true,
            });
        }

        let transcriber = self.components.transcriber.clone().ok_or_else(|| {
            GlimtError::GeneratorUnavailable(format!(
                "transcription needs an API key in {}",
                self.settings.llm.api_key_env
            ))
        })?;

        info!("Fetching metadata for {}", video_id);
        let metadata = self.components.source.fetch_metadata(&video_id).await?;

        if let Some(duration) = metadata.duration_seconds {
            if duration > self.settings.transcription.max_duration_seconds {
                return Err(GlimtError::InvalidInput(format!(
                    "Video duration ({} seconds) exceeds maximum ({} seconds)",
                    duration, self.settings.transcription.max_duration_seconds
                )));
            }
        }

        info!("Extracting audio for: {}", metadata.title);
        let audio_path = download_audio(&metadata.source_url, &video_id, &self.temp_dir).await?;

        info!("Transcribing audio...");
        let mut transcript = transcriber
            .transcribe(&audio_path, self.settings.transcription.language.as_deref())
            .await?;
        transcript.video_id = video_id.clone();
        if let Some(duration) = metadata.duration_seconds {
            transcript.duration_seconds = transcript.duration_seconds.max(duration as f64);
        }
        info!("Transcription complete ({} tokens)", transcript.tokens.len());

        if let Err(e) = std::fs::remove_file(&audio_path) {
            warn!("Failed to clean up audio file: {}", e);
        }

        self.summarize_transcript(&transcript, Some(metadata.title))
            .await
    }

    /// Section and summarize a transcript, then store the document.
    #[instrument(skip_all, fields(video_id = %transcript.video_id))]
    pub async fn summarize_transcript(
        &self,
        transcript: &Transcript,
        title: Option<String>,
    ) -> Result<ProcessResult> {
        let document = self
            .build_document(
                &transcript.video_id,
                &transcript.language,
                transcript.duration_seconds,
                &transcript.tokens,
                &self.settings.sections.to_config(),
            )
            .await?;

        let document = match title {
            Some(title) => document.with_title(title),
            None => document,
        };

        self.save(document)
    }

    /// Re-section a stored document from its kept tokens and summarize it again.
    ///
    /// Tokens that an earlier run dropped are not recovered.
    #[instrument(skip(self))]
    pub async fn resection(
        &self,
        video_id: &str,
        config: Option<SectionConfig>,
    ) -> Result<ProcessResult> {
        let previous = self.store.load(video_id)?;
        let config = config.unwrap_or_else(|| self.settings.sections.to_config());

        let tokens: Vec<Token> = previous
            .sections
            .iter()
            .flat_map(|s| s.tokens.iter().cloned())
            .collect();

        info!("Re-sectioning {} from {} tokens", video_id, tokens.len());

        let mut document = self
            .build_document(
                &previous.video_id,
                &previous.language,
                previous.duration,
                &tokens,
                &config,
            )
            .await?;
        document.title = previous.title;

        self.save(document)
    }

    async fn build_document(
        &self,
        video_id: &str,
        language: &str,
        duration: f64,
        tokens: &[Token],
        config: &SectionConfig,
    ) -> Result<SummaryDocument> {
        let skeletons = segment(tokens, config)?;
        info!("Created {} sections", skeletons.len());

        let mut sections = Vec::with_capacity(skeletons.len());
        for result in self.summarizer().summarize_all(&skeletons).await {
            match result {
                Ok(section) => sections.push(section),
                Err(e) => warn!("Skipping section: {}", e),
            }
        }

        Ok(SummaryDocument::new(video_id, language, duration, sections))
    }

    fn save(&self, document: SummaryDocument) -> Result<ProcessResult> {
        let path = self.store.save(&document)?;
        Ok(ProcessResult {
            document,
            path,
            skipped: false,
        })
    }
}

/// Result of processing a video.
#[derive(Debug)]
pub struct ProcessResult {
    pub document: SummaryDocument,
    /// Where the document was stored.
    pub path: PathBuf,
    /// Whether processing was skipped (already summarized).
    pub skipped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_source::VideoMetadata;
    use crate::generation::ChatMessage;
    use crate::summarizer::SummarySource;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;

    struct StubSource;

    #[async_trait]
    impl VideoSource for StubSource {
        async fn fetch_metadata(&self, input: &str) -> Result<VideoMetadata> {
            Ok(VideoMetadata {
                id: input.to_string(),
                title: "Stub Talk".to_string(),
                author: None,
                duration_seconds: Some(400),
                view_count: None,
                description: None,
                source_url: format!("https://example.invalid/{}", input),
                published_at: None,
            })
        }

        fn can_handle(&self, _input: &str) -> bool {
            true
        }

        fn extract_id(&self, input: &str) -> Option<String> {
            Some(input.to_string())
        }
    }

    struct TitleGenerator;

    #[async_trait]
    impl TextGenerator for TitleGenerator {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String> {
            Ok("[00:00:00] Generated Title\n- point".to_string())
        }

        fn model_name(&self) -> &str {
            "title"
        }
    }

    fn settings_in(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.join("data").to_string_lossy().into_owned();
        settings.general.temp_dir = dir.join("tmp").to_string_lossy().into_owned();
        settings
    }

    fn orchestrator(dir: &Path, generator: Option<Arc<dyn TextGenerator>>) -> Orchestrator {
        let components = Components {
            source: Arc::new(StubSource),
            transcriber: None,
            summary_generator: generator.clone(),
            chat_generator: generator,
            embedder: Arc::new(LocalEmbedder::default()),
        };
        Orchestrator::with_components(settings_in(dir), components).unwrap()
    }

    /// One token every 10 seconds for `seconds` seconds.
    fn transcript(seconds: u32) -> Transcript {
        let tokens = (0..seconds)
            .step_by(10)
            .map(|s| Token::new(format!("word{}", s), s as f64, (s + 10) as f64))
            .collect();
        Transcript::new("talk01".to_string(), "en".to_string(), tokens)
    }

    #[tokio::test]
    async fn test_summarize_transcript_without_model() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(dir.path(), None);

        let result = orchestrator
            .summarize_transcript(&transcript(400), Some("A Talk".to_string()))
            .await
            .unwrap();

        let doc = &result.document;
        assert!(!result.skipped);
        assert_eq!(doc.title.as_deref(), Some("A Talk"));
        assert!(!doc.model_used);
        assert_eq!(doc.sections.len(), 2);
        assert!(doc
            .sections
            .iter()
            .all(|s| s.source == SummarySource::Fallback && !s.summary.is_empty()));

        assert_eq!(orchestrator.store().load_latest().unwrap(), *doc);
    }

    #[tokio::test]
    async fn test_summarize_with_model_then_ask() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(dir.path(), Some(Arc::new(TitleGenerator)));

        let result = orchestrator
            .summarize_transcript(&transcript(400), None)
            .await
            .unwrap();
        assert!(result.document.model_used);
        assert_eq!(result.document.sections[0].title, "Generated Title");

        let mut assistant = orchestrator.assistant_for(None).unwrap();
        let reply = assistant.reply("generated title").await.unwrap();
        assert!(!reply.degraded);
        assert_eq!(reply.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_resection_with_new_bounds() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(dir.path(), None);
        orchestrator
            .summarize_transcript(&transcript(400), Some("A Talk".to_string()))
            .await
            .unwrap();

        let result = orchestrator
            .resection("talk01", Some(SectionConfig::new(30.0, 100.0)))
            .await
            .unwrap();

        assert_eq!(result.document.title.as_deref(), Some("A Talk"));
        assert!(result.document.sections.len() > 2);
        for section in &result.document.sections {
            assert!(section.duration() < 100.0);
        }
    }

    #[tokio::test]
    async fn test_process_skips_stored_video() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(dir.path(), None);
        orchestrator
            .summarize_transcript(&transcript(400), None)
            .await
            .unwrap();

        let result = orchestrator.process_media("talk01", false).await.unwrap();
        assert!(result.skipped);
        assert_eq!(result.document.video_id, "talk01");
    }

    #[tokio::test]
    async fn test_process_requires_transcriber() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(dir.path(), None);

        let result = orchestrator.process_media("fresh", false).await;
        assert!(matches!(result, Err(GlimtError::GeneratorUnavailable(_))));
    }

    #[test]
    fn test_assistant_for_missing_document() {
        let dir = TempDir::new().unwrap();
        let orchestrator = orchestrator(dir.path(), None);
        assert!(matches!(
            orchestrator.assistant_for(Some("nope")),
            Err(GlimtError::SummaryNotFound(_))
        ));
    }
}
