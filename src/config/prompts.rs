//! Prompt templates for Glimt.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Matches `{{name}}` placeholders.
fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{(\w+)\}\}")
            .unwrap_or_else(|e| panic!("invalid placeholder regex: {e}"))
    })
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub assistant: AssistantPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for per-section summaries.
///
/// The user template receives `{{section}}`: the section text prefixed with its
/// `[HH:MM:SS]` start time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert technical content summarizer. Create a comprehensive summary with:
- Original timestamps preserved in [HH:MM:SS] format
- Clear section titles reflecting content
- Bullet points for important details
- No introductory phrases"#
                .to_string(),

            user: r#"Please summarize this technical content:

{{section}}

Required format:
[HH:MM:SS] Specific Section Title
- Key concept 1
- Key concept 2
- Technical detail
- Practical application

Do not include any introductory text like "Here is the summary"."#
                .to_string(),
        }
    }
}

/// Prompts for the conversational assistant.
///
/// The user template receives `{{context}}` (retrieved sections) and `{{question}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: "You are a highly knowledgeable AI assistant helping users understand a YouTube video. \
Use the provided sections and conversation history to answer clearly, cite timestamps if useful. \
If you don't have enough info, say you don't know."
                .to_string(),

            user: "Video Context:\n{{context}}\n\nAnswer based on the context: {{question}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in one pass; substituted values are never
    /// scanned again, and unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &regex::Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
