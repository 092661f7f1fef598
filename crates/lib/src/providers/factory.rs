//! # AI Provider Factory
//!
//! Centralizes the creation of AI provider instances from configuration, so that
//! every consumer (the server, tests) builds providers the same way.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
};
use serde::Deserialize;
use tracing::info;

/// The configuration of a single AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider (`"gemini"` or `"local"`).
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Returns the Gemini `generateContent` endpoint for a model.
pub fn gemini_api_url(model_name: &str) -> String {
    format!("https://generativelanguage.googleapis.com/v1beta/models/{model_name}:generateContent")
}

/// Creates an AI provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    PromptError::AiApi(
                        "api_key is required for the gemini provider. Set GEMINI_API_KEY."
                            .to_string(),
                    )
                })?;
            let api_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| gemini_api_url(&config.model_name));
            info!("Configuring Gemini provider with URL: {}", api_url);
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                PromptError::AiApi("api_url is required for the local provider.".to_string())
            })?;
            info!("Configuring Local AI provider with URL: {}", api_url);
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                Some(config.model_name.clone()),
            )?)
        }
        other => {
            return Err(PromptError::AiApi(format!(
                "Unsupported AI provider type '{other}'"
            )))
        }
    };

    Ok(provider)
}
