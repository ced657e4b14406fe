//! Error taxonomy for the extraction, chat and visual services.
//!
//! User-facing messages are in the product locale (French); callers render
//! them directly in the UI.

use thiserror::Error;

/// Failure reported by the Gemini transport.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-success HTTP response from the API, body truncated by the transport.
    #[error("gemini error: {status}\n{body}")]
    Status { status: u16, body: String },

    /// The request never produced a decodable response (connect, timeout, body).
    #[error("gemini request failed: {message}")]
    Transport { message: String },
}

impl ProviderError {
    /// Whether this failure looks server-side and worth retrying:
    /// HTTP 500/503, or the "Internal error" wording Gemini uses for
    /// transient backend failures.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Status { status, body } => {
                matches!(status, 500 | 503) || body.contains("Internal error")
            }
            ProviderError::Transport { message } => message.contains("Internal error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StackError {
    #[error("Clé API manquante dans l'environnement. Configurez GEMINI_API_KEY.")]
    MissingApiKey,

    /// Transient server errors survived every retry.
    #[error(
        "Le service d'IA est temporairement surchargé (Erreur 500). Veuillez réessayer dans quelques instants."
    )]
    ServiceOverloaded(#[source] ProviderError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model returned no text at all, usually a safety block.
    #[error("Le moteur neural n'a retourné aucun texte (blocage sécurité ou erreur modèle).")]
    EmptyResponse,

    /// Text came back but no JSON object could be recovered from it.
    #[error("Format JSON invalide reçu de l'IA.")]
    InvalidFormat,
}
