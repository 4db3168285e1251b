//! Conversational question answering over a summary document.
//!
//! The assistant retrieves the sections most similar to a question, packs them into
//! the prompt together with recent conversation turns, and asks the text generator
//! for an answer. Generation problems never surface as errors: the user gets a
//! readable fixed reply instead.

mod context;

pub use context::{format_context, SourceSection};

use crate::config::Prompts;
use crate::document::SummaryDocument;
use crate::embedding::Embedder;
use crate::error::{GlimtError, Result};
use crate::generation::{ChatMessage, TextGenerator};
use crate::index::EmbeddingIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Reply when no language model is configured.
pub const NO_GENERATOR_REPLY: &str =
    "No language model API key found. Set it in your environment to enable answers.";

/// Reply when retrieval or generation fails.
pub const FAILED_REPLY: &str = "Sorry, I could not generate a response right now. Please try again.";

/// Who said a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    fn to_message(&self) -> ChatMessage {
        match self.role {
            TurnRole::User => ChatMessage::user(self.content.clone()),
            TurnRole::Assistant => ChatMessage::assistant(self.content.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantState {
    /// No document loaded yet.
    NotReady,
    Ready,
}

/// Answer plus the sections it was grounded on.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub answer: String,
    pub sources: Vec<SourceSection>,
    /// True when `answer` is a fixed fallback reply rather than model output.
    pub degraded: bool,
}

/// Retrieval-augmented conversation over one document at a time.
pub struct Assistant {
    embedder: Arc<dyn Embedder>,
    generator: Option<Arc<dyn TextGenerator>>,
    prompts: Prompts,
    top_k: usize,
    history_turns: usize,
    document: Option<Arc<SummaryDocument>>,
    index: Option<Arc<EmbeddingIndex>>,
    history: Vec<ConversationTurn>,
}

impl Assistant {
    pub fn new(embedder: Arc<dyn Embedder>, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            embedder,
            generator,
            prompts: Prompts::default(),
            top_k: 3,
            history_turns: 6,
            document: None,
            index: None,
            history: Vec::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sections retrieved per question (at least 1).
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Most recent turns included in each prompt.
    pub fn with_history_turns(mut self, history_turns: usize) -> Self {
        self.history_turns = history_turns;
        self
    }

    /// Load a document, replacing any previous one and its index.
    ///
    /// Conversation history belongs to the previous document and is cleared.
    pub fn load_document(&mut self, document: SummaryDocument) {
        info!(
            "Assistant loaded {} ({} sections)",
            document.video_id,
            document.sections.len()
        );
        self.document = Some(Arc::new(document));
        self.index = None;
        self.history.clear();
    }

    pub fn state(&self) -> AssistantState {
        match self.document {
            Some(_) => AssistantState::Ready,
            None => AssistantState::NotReady,
        }
    }

    pub fn document(&self) -> Option<&SummaryDocument> {
        self.document.as_deref()
    }

    /// Full conversation history, oldest first.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Index snapshot for the loaded document, built on first use.
    pub async fn index(&mut self) -> Result<Arc<EmbeddingIndex>> {
        if let Some(index) = &self.index {
            return Ok(Arc::clone(index));
        }

        let document = self.document.clone().ok_or(GlimtError::NotReady)?;
        let index = Arc::new(EmbeddingIndex::build(&document.sections, self.embedder.as_ref()).await?);
        self.index = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Rank the loaded document's sections against `query`.
    pub async fn search(&mut self, query: &str, top_k: usize) -> Result<Vec<SourceSection>> {
        let document = self.document.clone().ok_or(GlimtError::NotReady)?;
        let index = self.index().await?;
        let hits = index.query(query, top_k, self.embedder.as_ref()).await?;
        Ok(SourceSection::from_hits(&document, &hits))
    }

    /// Answer a question. Fails only with `NotReady`.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn reply(&mut self, query: &str) -> Result<AssistantReply> {
        let document = self.document.clone().ok_or(GlimtError::NotReady)?;

        let sources = match self.search(query, self.top_k).await {
            Ok(sources) => sources,
            Err(e) => {
                warn!("Retrieval failed: {}", e);
                return Ok(Self::degraded(FAILED_REPLY, Vec::new()));
            }
        };
        debug!("Retrieved {} sections", sources.len());

        let context = format_context(&document, &sources);
        self.history.push(ConversationTurn {
            role: TurnRole::User,
            content: query.to_string(),
        });

        let Some(generator) = self.generator.clone() else {
            return Ok(Self::degraded(NO_GENERATOR_REPLY, sources));
        };

        let messages = self.build_messages(&context, query);
        match generator.generate(&messages).await {
            Ok(answer) => {
                self.history.push(ConversationTurn {
                    role: TurnRole::Assistant,
                    content: answer.clone(),
                });
                Ok(AssistantReply {
                    answer,
                    sources,
                    degraded: false,
                })
            }
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                Ok(Self::degraded(FAILED_REPLY, sources))
            }
        }
    }

    /// Answer a question, returning only the reply text.
    pub async fn respond(&mut self, query: &str) -> Result<String> {
        Ok(self.reply(query).await?.answer)
    }

    /// System instruction, the recent turns, then the context-bearing question.
    pub fn build_messages(&self, context: &str, query: &str) -> Vec<ChatMessage> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("question".to_string(), query.to_string());

        let recent = &self.history[self.history.len().saturating_sub(self.history_turns)..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(
            self.prompts.render_with_custom(&self.prompts.assistant.system, &vars),
        ));
        messages.extend(recent.iter().map(ConversationTurn::to_message));
        messages.push(ChatMessage::user(
            self.prompts.render_with_custom(&self.prompts.assistant.user, &vars),
        ));
        messages
    }

    fn degraded(answer: &str, sources: Vec<SourceSection>) -> AssistantReply {
        AssistantReply {
            answer: answer.to_string(),
            sources,
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_document;
    use crate::embedding::LocalEmbedder;
    use crate::generation::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Numbers its answers and records every prompt.
    #[derive(Default)]
    struct EchoGenerator {
        calls: AtomicUsize,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("answer {}", n))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String> {
            Err(GlimtError::GeneratorFailure("timeout".into()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(GlimtError::Embedding("offline".into()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(GlimtError::Embedding("offline".into()))
        }

        fn dimensions(&self) -> usize {
            1
        }
    }

    fn ready_assistant(generator: Option<Arc<dyn TextGenerator>>) -> Assistant {
        let mut assistant = Assistant::new(Arc::new(LocalEmbedder::default()), generator);
        assistant.load_document(sample_document());
        assistant
    }

    #[tokio::test]
    async fn test_not_ready_without_document() {
        let mut assistant = Assistant::new(Arc::new(LocalEmbedder::default()), None);
        assert_eq!(assistant.state(), AssistantState::NotReady);

        let result = assistant.respond("what is attention?").await;
        assert!(matches!(result, Err(GlimtError::NotReady)));
        assert!(assistant.history().is_empty());
    }

    #[tokio::test]
    async fn test_reply_with_sources() {
        let generator = Arc::new(EchoGenerator::default());
        let mut assistant = ready_assistant(Some(generator.clone()));
        assert_eq!(assistant.state(), AssistantState::Ready);

        let reply = assistant.reply("word embeddings").await.unwrap();
        assert_eq!(reply.answer, "answer 0");
        assert!(!reply.degraded);
        assert_eq!(reply.sources.len(), 2);
        assert_eq!(reply.sources[0].title, "Word Embeddings");

        let prompts = generator.prompts.lock().unwrap();
        let messages = &prompts[0];
        assert_eq!(messages[0].role, Role::System);
        let last = messages.last().unwrap();
        assert!(last.content.starts_with("Video Context:\n[From 00:00:00 to 00:01:35]"));
        assert!(last.content.ends_with("Answer based on the context: word embeddings"));
        assert_eq!(assistant.history().len(), 2);
    }

    #[tokio::test]
    async fn test_question_with_placeholder_is_kept_literally() {
        for _ in 0..20 {
            let generator = Arc::new(EchoGenerator::default());
            let mut assistant = ready_assistant(Some(generator.clone()));

            assistant.respond("what does {{context}} mean?").await.unwrap();

            let prompts = generator.prompts.lock().unwrap();
            let last = prompts[0].last().unwrap();
            assert!(last
                .content
                .ends_with("Answer based on the context: what does {{context}} mean?"));
            assert_eq!(last.content.matches("Video Context:").count(), 1);
        }
    }

    #[tokio::test]
    async fn test_prompt_keeps_only_recent_turns() {
        let generator = Arc::new(EchoGenerator::default());
        let mut assistant = ready_assistant(Some(generator.clone())).with_history_turns(3);

        for i in 0..5 {
            assistant.respond(&format!("question {}", i)).await.unwrap();
        }

        assert_eq!(assistant.history().len(), 10);

        let prompts = generator.prompts.lock().unwrap();
        let last_prompt = prompts.last().unwrap();
        // system + 3 recent turns + context question
        assert_eq!(last_prompt.len(), 5);
        assert_eq!(last_prompt[1].content, "question 3");
        assert_eq!(last_prompt[2].content, "answer 3");
        assert_eq!(last_prompt[3].content, "question 4");
    }

    #[tokio::test]
    async fn test_no_generator_returns_fixed_reply() {
        let mut assistant = ready_assistant(None);

        let reply = assistant.reply("anything").await.unwrap();
        assert_eq!(reply.answer, NO_GENERATOR_REPLY);
        assert!(reply.degraded);
        assert_eq!(assistant.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_user_turn() {
        let mut assistant = ready_assistant(Some(Arc::new(FailingGenerator)));

        let answer = assistant.respond("positional encoding?").await.unwrap();
        assert_eq!(answer, FAILED_REPLY);
        assert_eq!(
            assistant.history(),
            &[ConversationTurn {
                role: TurnRole::User,
                content: "positional encoding?".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_retrieval_failure_appends_nothing() {
        let mut assistant = Assistant::new(
            Arc::new(BrokenEmbedder),
            Some(Arc::new(EchoGenerator::default())),
        );
        assistant.load_document(sample_document());

        let reply = assistant.reply("anything").await.unwrap();
        assert_eq!(reply.answer, FAILED_REPLY);
        assert!(reply.sources.is_empty());
        assert!(assistant.history().is_empty());
    }

    #[tokio::test]
    async fn test_loading_document_resets_index_and_history() {
        let mut assistant = ready_assistant(Some(Arc::new(EchoGenerator::default())));
        assistant.respond("first").await.unwrap();
        let first_index = assistant.index().await.unwrap();

        let mut other = sample_document();
        other.video_id = "other".to_string();
        other.sections.truncate(1);
        assistant.load_document(other);

        assert!(assistant.history().is_empty());
        let second_index = assistant.index().await.unwrap();
        assert!(!Arc::ptr_eq(&first_index, &second_index));
        assert_eq!(second_index.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let mut assistant = ready_assistant(Some(Arc::new(EchoGenerator::default())));
        assistant.respond("hello").await.unwrap();
        assistant.clear_history();
        assert!(assistant.history().is_empty());
        assert_eq!(assistant.state(), AssistantState::Ready);
    }
}
