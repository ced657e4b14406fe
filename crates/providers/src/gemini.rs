//! HTTP transport for the Gemini `generateContent` endpoint, plus the wire
//! types the service layer builds requests out of.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{ProviderError, StackError};
use shared::settings::ModelSettings;
use std::sync::LazyLock;
use std::time::Duration;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(45))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Binary payload of an image part, base64 on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Role-less content, used for single-shot prompts and system instructions.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// All four harm categories at `BLOCK_NONE`. The domain is technical tool
/// names, so the default thresholds only cost us blocked extractions.
pub fn permissive_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_NONE".to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleSearch {}

impl Tool {
    /// The grounding/search capability used to verify tool URLs.
    pub fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Grounding chunks are kept as raw values: the provider has changed their
/// shape before, and a malformed entry must not poison the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<Value>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, mirroring the SDK's
    /// `response.text` accessor. `None` when there is no text at all.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut out = String::new();
        for part in &content.parts {
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// Web URIs from the first candidate's grounding chunks, in provider
    /// order. Entries without a string `web.uri` are skipped.
    pub fn grounding_urls(&self) -> Vec<String> {
        let Some(metadata) = self
            .candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
        else {
            return Vec::new();
        };
        metadata
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.get("web"))
            .filter_map(|web| web.get("uri"))
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }
}

/// Seam between the service clients and the HTTP transport; tests substitute
/// a scripted implementation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(
        &self,
        model: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        (**self).generate(model, request).await
    }
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
}

impl GeminiClient {
    /// Resolves the credential up front, so a missing key fails here and
    /// never reaches the network.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, StackError> {
        Ok(Self::with_api_key(settings.resolve_api_key()?))
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        let url = format!("{API_BASE}/models/{model}:generateContent");
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail: String = body.chars().take(800).collect();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: detail.trim().to_string(),
            });
        }

        resp.json::<GenerateResponse>()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_with_api_field_names() {
        let request = GenerateRequest {
            contents: vec![Content::user("hello")],
            system_instruction: Some(Content::text("system")),
            generation_config: Some(GenerationConfig {
                temperature: Some(0.15),
                response_mime_type: Some("application/json".into()),
                image_config: None,
            }),
            safety_settings: Some(permissive_safety_settings()),
            tools: Some(vec![Tool::google_search()]),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["safetySettings"][0]["threshold"], "BLOCK_NONE");
        assert_eq!(value["tools"][0]["googleSearch"], json!({}));
    }

    #[test]
    fn test_disabled_tools_are_omitted_from_the_wire() {
        let request = GenerateRequest {
            contents: vec![Content::text("hello")],
            ..GenerateRequest::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value["contents"][0].get("role").is_none());
    }

    #[test]
    fn test_text_accessor_joins_first_candidate_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"tools\"" }, { "text": ":[]}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"tools\":[]}"));
    }

    #[test]
    fn test_text_accessor_is_none_without_text() {
        let empty = GenerateResponse::default();
        assert!(empty.text().is_none());

        let image_only: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "inlineData": { "data": "Zm9v" } }] } }
            ]
        }))
        .unwrap();
        assert!(image_only.text().is_none());
    }

    #[test]
    fn test_grounding_urls_keep_only_string_uris_in_order() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "ok" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://docker.com" } },
                        { "web": { "uri": 42 } },
                        { "retrieved_context": { "uri": "https://ignored.dev" } },
                        { "web": {} },
                        { "web": { "uri": "https://github.com/docker" } }
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(
            response.grounding_urls(),
            vec!["https://docker.com", "https://github.com/docker"]
        );
    }

    #[test]
    fn test_grounding_urls_default_to_empty() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        }))
        .unwrap();
        assert!(response.grounding_urls().is_empty());
    }
}
