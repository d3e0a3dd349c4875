//! Backend configuration read from the environment

use super::gemini::GeminiService;
use super::{LlmService, LoggingService};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Errors that make startup impossible
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set (or set LLM_GATEWAY)")]
    MissingApiKey,
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration for the Gemini backend
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Model name as the Gemini API spells it
    pub model: Option<String>,
    pub max_output_tokens: Option<u32>,
    /// Gateway base URL; the gateway handles authentication
    pub gateway: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: std::env::var("GEMINI_MODEL").ok(),
            max_output_tokens: parse_max_output_tokens(
                std::env::var("GEMINI_MAX_OUTPUT_TOKENS").ok(),
            )?,
            gateway: std::env::var("LLM_GATEWAY").ok(),
        })
    }

    /// The model to use, falling back to the default
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Resolve the key to send with each request.
    ///
    /// In gateway mode "implicit" stands in for the key.
    fn api_key(&self) -> Result<String, ConfigError> {
        if self.gateway.is_some() {
            return Ok("implicit".to_string());
        }
        match self.gemini_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Build the backend service, wrapped with request logging
    pub fn build_service(&self) -> Result<Arc<dyn LlmService>, ConfigError> {
        let api_key = self.api_key()?;
        let service = GeminiService::new(api_key, self.model_name(), self.gateway.as_deref())?;
        Ok(Arc::new(LoggingService::new(Arc::new(service))))
    }
}

/// An unset variable means no limit; anything else must be a `u32`
fn parse_max_output_tokens(raw: Option<String>) -> Result<Option<u32>, ConfigError> {
    raw.map(|value| {
        value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
            var: "GEMINI_MAX_OUTPUT_TOKENS",
            value,
        })
    })
    .transpose()
}
