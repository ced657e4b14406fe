//! Best-effort tool thumbnails. Cosmetic by contract: nothing in here may
//! fail an extraction flow, so every error degrades to `None`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use providers::gemini::{
    Content, GeminiClient, GenerateRequest, GenerateResponse, GenerationConfig, ImageConfig,
    TextGenerator,
};
use shared::settings::ModelSettings;
use tracing::warn;

use crate::prompt;

pub struct VisualClient<G = GeminiClient> {
    /// `None` when no credential was available; the client then answers
    /// `None` without touching the network.
    backend: Option<G>,
    model: String,
}

impl VisualClient<GeminiClient> {
    /// A missing credential disables the client instead of failing it.
    pub fn from_settings(settings: &ModelSettings) -> Self {
        Self {
            backend: GeminiClient::from_settings(settings).ok(),
            model: settings.image_model.clone(),
        }
    }
}

impl<G: TextGenerator> VisualClient<G> {
    pub fn with_backend(backend: G, model: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            model: model.into(),
        }
    }

    /// Generate a square thumbnail for a named tool, as a
    /// `data:image/png;base64,...` URI. `None` on any failure.
    pub async fn generate_visual(&self, tool_name: &str, category: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        let request = GenerateRequest {
            contents: vec![Content::text(prompt::visual_prompt(tool_name, category))],
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: "1:1".to_string(),
                }),
                ..GenerationConfig::default()
            }),
            ..GenerateRequest::default()
        };
        match backend.generate(&self.model, request).await {
            Ok(response) => first_inline_image(&response),
            Err(err) => {
                warn!("visual generation failed for {tool_name}: {err}");
                None
            }
        }
    }
}

/// First usable inline image across all candidates. Parts whose payload is
/// not valid base64 are skipped rather than turned into a broken data URI.
fn first_inline_image(response: &GenerateResponse) -> Option<String> {
    for candidate in &response.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            let Some(inline) = &part.inline_data else {
                continue;
            };
            if inline.data.is_empty() {
                continue;
            }
            if BASE64.decode(inline.data.as_bytes()).is_err() {
                warn!("skipping undecodable inline image part");
                continue;
            }
            return Some(format!("data:image/png;base64,{}", inline.data));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{status_error, ScriptedGenerator};
    use serde_json::json;
    use std::sync::Arc;

    fn client(mock: &Arc<ScriptedGenerator>) -> VisualClient<Arc<ScriptedGenerator>> {
        VisualClient::with_backend(mock.clone(), "gemini-image-test")
    }

    fn image_response(data: &str) -> GenerateResponse {
        serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "voici l'icône" },
                    { "inlineData": { "mimeType": "image/png", "data": data } }
                ] }
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_inline_image_becomes_a_data_uri() {
        let mock = ScriptedGenerator::new(vec![Ok(image_response("aGVsbG8="))]);
        let uri = client(&mock).generate_visual("Docker", "Conteneurs").await;
        assert_eq!(uri.as_deref(), Some("data:image/png;base64,aGVsbG8="));
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_none() {
        let mock = ScriptedGenerator::new(vec![Err(status_error(500))]);
        assert!(client(&mock).generate_visual("Docker", "Conteneurs").await.is_none());
    }

    #[tokio::test]
    async fn test_response_without_image_part_is_none() {
        let mock = ScriptedGenerator::new(vec![Ok(crate::testing::text_response("pas d'image"))]);
        assert!(client(&mock).generate_visual("Docker", "Conteneurs").await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_skipped() {
        let mock = ScriptedGenerator::new(vec![Ok(image_response("not!!valid@@base64"))]);
        assert!(client(&mock).generate_visual("Docker", "Conteneurs").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_credential_means_disabled() {
        let disabled: VisualClient<Arc<ScriptedGenerator>> = VisualClient {
            backend: None,
            model: "gemini-image-test".into(),
        };
        assert!(disabled.generate_visual("Docker", "Conteneurs").await.is_none());
    }

    #[tokio::test]
    async fn test_request_asks_for_a_square_image() {
        let mock = ScriptedGenerator::new(vec![Ok(image_response("aGVsbG8="))]);
        client(&mock).generate_visual("Docker", "Conteneurs").await;

        let requests = mock.requests.lock().unwrap();
        let config = requests[0].generation_config.as_ref().unwrap();
        assert_eq!(config.image_config.as_ref().unwrap().aspect_ratio, "1:1");
        let prompt_text = requests[0].contents[0].parts[0].text.as_deref().unwrap();
        assert!(prompt_text.contains("\"Docker\""));
    }
}
