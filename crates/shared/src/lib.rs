pub mod error;
pub mod types;

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::env;

    use crate::error::StackError;

    /// Model selection and authentication for the Gemini API.
    ///
    /// The credential is threaded through this struct explicitly; the
    /// environment is only consulted when no key was configured.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ModelSettings {
        pub text_model: String,  // extraction + chat
        pub image_model: String, // tool thumbnails
        pub api_key: Option<String>,
    }

    impl Default for ModelSettings {
        fn default() -> Self {
            Self {
                text_model: "gemini-3-flash-preview".into(),
                image_model: "gemini-2.5-flash-image".into(),
                api_key: None,
            }
        }
    }

    impl ModelSettings {
        /// Resolve the API credential: configured key first, then the
        /// `API_KEY` / `GEMINI_API_KEY` environment variables.
        pub fn resolve_api_key(&self) -> Result<String, StackError> {
            if let Some(key) = self.api_key.as_deref() {
                if !key.is_empty() {
                    return Ok(key.to_string());
                }
            }
            env::var("API_KEY")
                .or_else(|_| env::var("GEMINI_API_KEY"))
                .map_err(|_| StackError::MissingApiKey)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_configured_key_wins_over_environment() {
            let settings = ModelSettings {
                api_key: Some("configured".into()),
                ..ModelSettings::default()
            };
            assert_eq!(settings.resolve_api_key().unwrap(), "configured");
        }

        #[test]
        fn test_empty_key_is_treated_as_missing() {
            env::remove_var("API_KEY");
            env::remove_var("GEMINI_API_KEY");
            let settings = ModelSettings {
                api_key: Some(String::new()),
                ..ModelSettings::default()
            };
            assert!(matches!(
                settings.resolve_api_key(),
                Err(StackError::MissingApiKey)
            ));
        }
    }
}
