//! Configuration settings for Glimt.

use crate::sections::{SectionConfig, UndersizedPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub transcription: TranscriptionSettings,
    pub sections: SectionSettings,
    pub summarizer: SummarizerSettings,
    pub embedding: EmbeddingSettings,
    pub assistant: AssistantSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (summaries live under `summaries/`).
    pub data_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.glimt".to_string(),
            temp_dir: "/tmp/glimt".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Connection settings for the OpenAI-compatible chat/transcription provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_seconds: crate::openai::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmSettings {
    /// Read the API key from the configured environment variable.
    ///
    /// Empty values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Speech-to-text model.
    pub model: String,
    /// Language hint (ISO-639-1). None lets the model detect it.
    pub language: Option<String>,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Maximum concurrent chunk uploads.
    pub max_concurrent_chunks: usize,
    /// Maximum media duration to process (in seconds).
    pub max_duration_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-large-v3".to_string(),
            language: None,
            chunk_duration_seconds: 600,
            max_concurrent_chunks: 2,
            max_duration_seconds: 10800, // 3 hours
        }
    }
}

/// Segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSettings {
    /// Minimum section duration in seconds.
    pub min_seconds: u32,
    /// Maximum section duration in seconds.
    pub max_seconds: u32,
    /// What happens to a section shorter than `min_seconds`.
    pub undersized: UndersizedPolicy,
}

impl Default for SectionSettings {
    fn default() -> Self {
        Self {
            min_seconds: 60,
            max_seconds: 300,
            undersized: UndersizedPolicy::Drop,
        }
    }
}

impl SectionSettings {
    /// Build the segmenter configuration.
    pub fn to_config(&self) -> SectionConfig {
        SectionConfig {
            min_duration: self.min_seconds as f64,
            max_duration: self.max_seconds as f64,
            undersized: self.undersized,
        }
    }
}

/// Section summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// Use the language model for summaries (fallback summaries otherwise).
    pub enabled: bool,
    /// Model used for section summaries.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Sections summarized concurrently. 1 keeps the pipeline sequential.
    pub max_concurrent: usize,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "llama3-70b-8192".to_string(),
            temperature: 0.3,
            max_tokens: 4000,
            max_concurrent: 1,
        }
    }
}

/// Embedding provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic feature-hashing embedder, no network.
    #[default]
    Local,
    /// OpenAI embeddings API (reads `OPENAI_API_KEY`).
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "hashing" => Ok(EmbeddingProvider::Local),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Local => write!(f, "local"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    /// Model name (openai provider only).
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
        }
    }
}

/// Conversational assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Chat model for answers.
    pub model: String,
    /// Number of sections retrieved per question.
    pub top_k: usize,
    /// Number of most recent conversation turns included in the prompt.
    pub history_turns: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: "llama3-70b-8192".to_string(),
            top_k: 3,
            history_turns: 6,
            temperature: 0.2,
            max_tokens: 1200,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.sections.to_config().validate()?;

        if self.assistant.top_k == 0 {
            return Err(crate::error::GlimtError::Config(
                "assistant.top_k must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(crate::error::GlimtError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GlimtError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glimt")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Directory holding persisted summary documents.
    pub fn summaries_dir(&self) -> PathBuf {
        self.data_dir().join("summaries")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.sections.min_seconds, 60);
        assert_eq!(settings.sections.max_seconds, 300);
        assert_eq!(settings.sections.undersized, UndersizedPolicy::Drop);
        assert_eq!(settings.assistant.top_k, 3);
        assert_eq!(settings.assistant.history_turns, 6);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [sections]
            max_seconds = 120
            undersized = "merge"

            [embedding]
            provider = "openai"
            dimensions = 1536
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.sections.max_seconds, 120);
        assert_eq!(settings.sections.min_seconds, 60);
        assert_eq!(settings.sections.undersized, UndersizedPolicy::Merge);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::OpenAI);
        assert_eq!(settings.assistant.model, "llama3-70b-8192");
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut settings = Settings::default();
        settings.sections.min_seconds = 400;
        settings.sections.max_seconds = 300;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.assistant.top_k = 5;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.assistant.top_k, 5);
    }

    #[test]
    fn test_missing_api_key_resolves_to_none() {
        let llm = LlmSettings {
            api_key_env: "GLIMT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmSettings::default()
        };
        assert!(llm.resolve_api_key().is_none());
    }
}
