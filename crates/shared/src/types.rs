//! Data model shared between the service layer and the rendering UI.
//!
//! Field names are camelCase on the wire so the structures match both the
//! JSON the model is asked to produce and what the UI consumes.

use serde::{Deserialize, Serialize};

/// Placeholder id on a freshly extracted result; the caller assigns the
/// real id when it persists or displays the result.
pub const PENDING_RESULT_ID: &str = "pending";

/// One timed slice of a YouTube transcript, produced upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptChunk {
    /// Start of the slice in seconds; absent on some transcript sources.
    #[serde(default)]
    pub offset: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
}

impl TranscriptChunk {
    pub fn new(offset: f64, text: impl Into<String>) -> Self {
        Self {
            offset: Some(offset),
            text: Some(text.into()),
        }
    }
}

/// A tool or service the model spotted in the transcript.
///
/// There is no identity beyond `name` and duplicates are kept as-is;
/// deduplication belongs to whoever displays the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMention {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    /// Human-readable timestamp of the first mention, e.g. "12:34".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_label: Option<String>,
    /// Same position in whole seconds, for deep links into the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions_count: Option<u32>,
    /// Data URI filled in later by the visual service; never model-provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    #[serde(default)]
    pub total_tools: u32,
    #[serde(default)]
    pub processing_time_ms: u64,
}

/// Normalized outcome of one extraction call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub tools: Vec<ToolMention>,
    pub stats: ExtractionStats,
    /// [`PENDING_RESULT_ID`] until the caller finalizes the lifecycle.
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Search URLs the model grounded its answer on; possibly empty, kept
    /// in provider order, neither deduplicated nor validated.
    pub grounding_urls: Vec<String>,
}

/// One turn of the stack chat; the UI owns the append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "user" | "model"
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}
