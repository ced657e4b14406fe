//! Transcript → tech-stack extraction against the Gemini API.
//!
//! One extraction is a single prompt, retried on transient server errors
//! with exponential backoff, then normalized into an [`ExtractionResult`].

use chrono::Utc;
use providers::gemini::{
    permissive_safety_settings, Content, GeminiClient, GenerateRequest, GenerateResponse,
    GenerationConfig, TextGenerator, Tool,
};
use serde::Deserialize;
use shared::error::StackError;
use shared::settings::ModelSettings;
use shared::types::{ExtractionResult, ExtractionStats, ToolMention, TranscriptChunk, PENDING_RESULT_ID};
use std::time::Duration;
use tracing::warn;

use crate::parse;
use crate::prompt;

/// Retries after the initial attempt, on transient server errors only.
const MAX_RETRIES: u32 = 2;
/// Base of the exponential backoff between attempts.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(2000);
/// Low-variance sampling, extraction should be near-deterministic.
const EXTRACTION_TEMPERATURE: f64 = 0.15;

/// Backoff before re-running failed attempt `attempt` (0-based): 2s, then 4s.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt)
}

/// Shape of the model's JSON answer; anything beyond `tools`/`stats` is
/// ignored.
#[derive(Debug, Default, Deserialize)]
struct ParsedExtraction {
    #[serde(default)]
    tools: Vec<ToolMention>,
    #[serde(default)]
    stats: Option<ExtractionStats>,
}

pub struct ExtractionClient<G = GeminiClient> {
    backend: G,
    model: String,
    retry_base_delay: Duration,
}

impl ExtractionClient<GeminiClient> {
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, StackError> {
        Ok(Self::with_backend(
            GeminiClient::from_settings(settings)?,
            settings.text_model.clone(),
        ))
    }
}

impl<G: TextGenerator> ExtractionClient<G> {
    pub fn with_backend(backend: G, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }

    /// Extract tool mentions from a transcript.
    ///
    /// Fails with [`StackError::ServiceOverloaded`] when transient server
    /// errors survive every retry, [`StackError::EmptyResponse`] when the
    /// model returns no text, and [`StackError::InvalidFormat`] when no JSON
    /// object can be recovered from the text.
    pub async fn extract(&self, chunks: &[TranscriptChunk]) -> Result<ExtractionResult, StackError> {
        let prompt_text = prompt::extraction_prompt(chunks);
        let response = self.attempt_generation(&prompt_text).await.map_err(|err| {
            warn!("extraction failed: {err}");
            err
        })?;

        let raw_text = response.text().ok_or_else(|| {
            warn!("Gemini response missing text, likely a safety block");
            StackError::EmptyResponse
        })?;

        let parsed: ParsedExtraction = serde_json::from_value(parse::extract_json_object(&raw_text)?)
            .map_err(|_| StackError::InvalidFormat)?;

        let stats = parsed.stats.unwrap_or_else(|| ExtractionStats {
            total_tools: parsed.tools.len() as u32,
            processing_time_ms: 0,
        });

        Ok(ExtractionResult {
            tools: parsed.tools,
            stats,
            id: PENDING_RESULT_ID.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            grounding_urls: response.grounding_urls(),
        })
    }

    /// Run the generation with sequential retry/backoff. The search tool is
    /// enabled on the first attempts and dropped on the last one: the
    /// external search call is itself a suspected source of 500s, so the
    /// final attempt trades grounding for a better chance of any answer.
    async fn attempt_generation(&self, prompt_text: &str) -> Result<GenerateResponse, StackError> {
        let mut attempt = 0u32;
        loop {
            let use_search = attempt < MAX_RETRIES;
            let request = self.build_request(prompt_text, use_search);
            match self.backend.generate(&self.model, request).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < MAX_RETRIES && err.is_transient() => {
                    warn!(
                        "Gemini server error ({err}), retrying (attempt {})",
                        attempt + 1
                    );
                    tokio::time::sleep(backoff_delay(self.retry_base_delay, attempt)).await;
                    attempt += 1;
                }
                Err(err) if err.is_transient() => return Err(StackError::ServiceOverloaded(err)),
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn build_request(&self, prompt_text: &str, use_search: bool) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content::text(prompt_text)],
            system_instruction: Some(Content::text(prompt::EXTRACTION_SYSTEM_PROMPT)),
            generation_config: Some(GenerationConfig {
                temperature: Some(EXTRACTION_TEMPERATURE),
                response_mime_type: Some("application/json".to_string()),
                image_config: None,
            }),
            safety_settings: Some(permissive_safety_settings()),
            tools: use_search.then(|| vec![Tool::google_search()]),
        }
    }
}
