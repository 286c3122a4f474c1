//! Environment-driven configuration for the language model collaborators

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Settings for one chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

/// Drafting and verifying are configured independently.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub narrator: ModelConfig,
    pub verifier: ModelConfig,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY must be set".to_string()))?;

        let base_url = lookup("OPENAI_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let verifier_model = lookup("VERIFIER_OPENAI_MODEL").unwrap_or_else(|| model.clone());

        let temperature = match lookup("LLM_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .map_err(|_| Error::Config(format!("LLM_TEMPERATURE is not a number: {}", raw)))?,
            None => DEFAULT_TEMPERATURE,
        };

        let timeout = match lookup("LLM_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("LLM_TIMEOUT_SECS is not a whole number: {}", raw))
            })?)),
            None => None,
        };

        let narrator = ModelConfig {
            api_key,
            base_url,
            model,
            temperature,
            timeout,
        };
        let verifier = ModelConfig {
            model: verifier_model,
            ..narrator.clone()
        };

        Ok(Self { narrator, verifier })
    }
}
