//! Multi-part transcript summarization.
//!
//! The transcript is split into contiguous character slices whose step size is
//! derived from the word count, then each slice is summarized by the LLM in
//! order and the responses are joined with blank lines.

use crate::config::Prompts;
use crate::error::{FortellError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Split `text` into contiguous character slices for summarization.
///
/// The step size is `word_count / target_parts` while the slice boundaries are
/// character indices, and slicing stops once the start index reaches the word
/// count. This mirrors the summarizer's historical coverage behavior; changing
/// it changes which portion of the transcript each part sees.
///
/// A text with fewer words than `target_parts` comes back as a single chunk;
/// empty text yields no chunks.
pub fn split_for_summary(text: &str, target_parts: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let word_count = text.split_whitespace().count();
    let chunk_size = if target_parts == 0 {
        0
    } else {
        word_count / target_parts
    };

    if chunk_size == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < word_count {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start.min(chars.len())..end].iter().collect());
        start += chunk_size;
    }

    chunks
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Issue one completion request and return the generated text.
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String>;
}

/// OpenAI chat-completion backend.
pub struct OpenAiCompleter {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiCompleter {
    /// Create a new completer for the given chat model.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatCompleter for OpenAiCompleter {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .map_err(|e| FortellError::Summarization(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user.to_string())
                .build()
                .map_err(|e| FortellError::Summarization(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .build()
            .map_err(|e| FortellError::Summarization(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| FortellError::OpenAI(format!("Completion request failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| FortellError::Summarization("Empty response from LLM".to_string()))?
            .clone();

        Ok(content)
    }
}

/// LLM-backed summarizer producing a podcast-style script.
pub struct Summarizer {
    completer: Box<dyn ChatCompleter>,
    temperature: f32,
    prompts: Prompts,
}

impl Summarizer {
    /// Create a new summarizer backed by the OpenAI chat endpoint.
    pub fn new(model: &str, temperature: f32, prompts: Prompts) -> Self {
        Self::with_completer(Box::new(OpenAiCompleter::new(model)), temperature, prompts)
    }

    /// Create a summarizer around a substituted completion backend.
    pub fn with_completer(
        completer: Box<dyn ChatCompleter>,
        temperature: f32,
        prompts: Prompts,
    ) -> Self {
        Self {
            completer,
            temperature,
            prompts,
        }
    }

    /// Summarize a full transcript into `target_parts` sequential parts.
    ///
    /// Parts are requested strictly in order and the responses concatenated in
    /// request order, each trimmed and followed by a blank line. Any completion
    /// failure aborts the whole summary.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn summarize(&self, text: &str, target_parts: usize) -> Result<String> {
        let chunks = split_for_summary(text, target_parts);
        let total = chunks.len();
        info!("Generating {}-part summary", total);

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Summary   [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("█▓░"),
        );

        let mut full_summary = String::new();

        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Summarizing part {}/{}", i + 1, total);

            let mut vars = HashMap::new();
            vars.insert("part".to_string(), (i + 1).to_string());
            vars.insert("total_parts".to_string(), total.to_string());
            vars.insert("chunk".to_string(), chunk.to_string());

            let user_prompt = self
                .prompts
                .render_with_custom(&self.prompts.summary.user, &vars);

            let part_text = self
                .completer
                .complete(&self.prompts.summary.system, &user_prompt, self.temperature)
                .await?;

            full_summary.push_str(part_text.trim());
            full_summary.push_str("\n\n");

            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(full_summary)
    }
}
