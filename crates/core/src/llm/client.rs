//! OpenAI-compatible chat-completions client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use super::types::*;
use super::TextGenerator;
use crate::config::ModelConfig;
use crate::error::{Error, Result};

pub struct OpenAiClient {
    client: Client,
    config: ModelConfig,
}

impl OpenAiClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|e| Error::Config(format!("Invalid API key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Llm(format!(
                "API error: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: ChatResponse = response.json().await?;
        if let Some(usage) = &body.usage {
            debug!(
                model = %self.config.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion received"
            );
        }

        body.first_content()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::Llm(format!("{} returned no content", self.config.model)))
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
