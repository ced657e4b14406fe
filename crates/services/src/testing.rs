//! Scripted [`TextGenerator`] for the service tests.

use async_trait::async_trait;
use providers::gemini::{GenerateRequest, GenerateResponse, TextGenerator};
use shared::error::ProviderError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Pops one pre-seeded outcome per call and records every request, so tests
/// can assert on attempt counts and per-attempt request shape.
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<Result<GenerateResponse, ProviderError>>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    pub fn new(outcomes: Vec<Result<GenerateResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_outcome(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedGenerator called more times than scripted")
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _model: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        self.next_outcome(request)
    }
}

/// A response whose first candidate carries exactly `text`.
pub fn text_response(text: &str) -> GenerateResponse {
    serde_json::from_value(serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
    .expect("valid response fixture")
}

/// An HTTP-status provider failure with an empty body.
pub fn status_error(status: u16) -> ProviderError {
    ProviderError::Status {
        status,
        body: String::new(),
    }
}
