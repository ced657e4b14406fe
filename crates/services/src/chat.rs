//! Chat scoped to a previously extracted stack. Single-shot: no retry, no
//! history kept here; the UI owns the conversation log.

use providers::gemini::{Content, GeminiClient, GenerateRequest, GenerationConfig, TextGenerator};
use shared::error::StackError;
use shared::settings::ModelSettings;
use shared::types::{ChatMessage, ExtractionResult};

use crate::prompt;

/// Natural-phrasing sampling for conversation.
const CHAT_TEMPERATURE: f64 = 0.7;

/// Canned reply when the model produces no text.
pub const CHAT_FALLBACK_REPLY: &str =
    "Je suis désolé, mes circuits neuraux sont un peu flous pour le moment.";

pub struct ChatClient<G = GeminiClient> {
    backend: G,
    model: String,
}

impl ChatClient<GeminiClient> {
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, StackError> {
        Ok(Self::with_backend(
            GeminiClient::from_settings(settings)?,
            settings.text_model.clone(),
        ))
    }
}

impl<G: TextGenerator> ChatClient<G> {
    pub fn with_backend(backend: G, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Answer the latest user turn, scoped to the extracted stack. Provider
    /// failures propagate to the caller untouched.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        stack: &ExtractionResult,
    ) -> Result<String, StackError> {
        let request = GenerateRequest {
            contents: vec![Content::user(prompt::chat_prompt(history, stack))],
            system_instruction: Some(Content::text(prompt::CHAT_SYSTEM_PROMPT)),
            generation_config: Some(GenerationConfig {
                temperature: Some(CHAT_TEMPERATURE),
                ..GenerationConfig::default()
            }),
            ..GenerateRequest::default()
        };
        let response = self.backend.generate(&self.model, request).await?;
        Ok(response
            .text()
            .unwrap_or_else(|| CHAT_FALLBACK_REPLY.to_string()))
    }
}
