//! Prompt assembly for the extraction, chat and visual calls.
//!
//! Everything here is a pure string transformation; the prompts themselves
//! are in the product locale (French), like the rest of the user-facing
//! surface.

use shared::types::{ChatMessage, ExtractionResult, TranscriptChunk};

/// Upper bound on transcript chunks included in one extraction prompt,
/// bounding request size and cost for long videos.
pub const MAX_TRANSCRIPT_CHUNKS: usize = 500;

/// System prompt for the extraction call: the model must answer with one
/// JSON object in the `tools`/`stats` shape of [`ExtractionResult`].
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"Vous êtes un moteur d'analyse de transcripts de vidéos YouTube. Identifiez chaque outil, service ou technologie mentionné dans le transcript fourni.

Répondez UNIQUEMENT avec un objet JSON de la forme suivante, sans texte autour :
{
  "tools": [
    {
      "name": "nom exact de l'outil",
      "category": "catégorie courte (ex: CI/CD, Base de données, IA)",
      "notes": ["une phrase décrivant l'usage mentionné dans la vidéo"],
      "timestampLabel": "mm:ss de la première mention",
      "timestampOffset": 0,
      "githubUrl": "https://github.com/... si le projet y est hébergé",
      "officialUrl": "https://... site officiel",
      "mentionsCount": 1
    }
  ],
  "stats": { "totalTools": 0, "processingTimeMs": 0 }
}

Les timestamps [Ns] du transcript donnent la position en secondes ; reportez la première mention de chaque outil dans timestampOffset. Vérifiez les URLs officielles et GitHub avec l'outil Google Search et n'inventez jamais d'URL : omettez le champ en cas de doute."#;

/// System instruction for the stack chat.
pub const CHAT_SYSTEM_PROMPT: &str = "Soyez concis, professionnel et utile. Concentrez-vous uniquement sur les outils fournis dans la stack, sauf demande contraire.";

/// Render the bounded transcript excerpt: first [`MAX_TRANSCRIPT_CHUNKS`]
/// chunks as `[<offset>s] <text>` joined by single spaces. Offsets are
/// floored to whole seconds; a missing offset reads as 0 and missing text
/// as the empty string.
pub fn transcript_excerpt(chunks: &[TranscriptChunk]) -> String {
    chunks
        .iter()
        .take(MAX_TRANSCRIPT_CHUNKS)
        .map(|chunk| {
            let offset = chunk.offset.unwrap_or(0.0).floor() as i64;
            let text = chunk.text.as_deref().unwrap_or("");
            format!("[{offset}s] {text}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The user prompt of the extraction call.
pub fn extraction_prompt(chunks: &[TranscriptChunk]) -> String {
    format!(
        "Analysez ce transcript. Extrayez les outils techniques avec leurs timestamps. Vérifiez les URLs via l'outil Google Search. Transcript: {}",
        transcript_excerpt(chunks)
    )
}

/// One line per tool: `- name (category): first note`. Missing fields
/// render empty rather than being skipped, so the model sees every tool.
pub fn stack_summary(stack: &ExtractionResult) -> String {
    stack
        .tools
        .iter()
        .map(|tool| {
            let category = tool.category.as_deref().unwrap_or("");
            let note = tool
                .notes
                .as_ref()
                .and_then(|notes| notes.first())
                .map(String::as_str)
                .unwrap_or("");
            format!("- {} ({}): {}", tool.name, category, note)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The single user turn of the chat call: stack summary, full history as
/// `role: text` lines, and the instruction to answer the latest question.
pub fn chat_prompt(history: &[ChatMessage], stack: &ExtractionResult) -> String {
    let history_lines = history
        .iter()
        .map(|message| format!("{}: {}", message.role, message.text))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Vous êtes un assistant neural pour la stack technique suivante extraite d'une vidéo :\n{}\n\nHistorique:\n{}\n\nRépondez à la dernière question de l'utilisateur.",
        stack_summary(stack),
        history_lines
    )
}

/// Fixed style template for tool thumbnails.
pub fn visual_prompt(tool_name: &str, category: &str) -> String {
    format!(
        "Professional 3D isometric icon for \"{tool_name}\" in category \"{category}\". Aesthetic: sleek, silver, glass, soft blue glow, white background. Minimalist."
    )
}
