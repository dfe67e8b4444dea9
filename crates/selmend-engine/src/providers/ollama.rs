//! Ollama-backed suggestion provider for local models

use crate::config::ProviderSettings;
use crate::errors::ProviderError;
use crate::providers::{clean_reply, SuggestionProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MODEL: &str = "llama3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a local Ollama generate endpoint
#[derive(Debug)]
pub struct OllamaProvider {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OllamaProvider {
    /// Build from configuration; requires an endpoint
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let endpoint = settings
            .endpoint
            .clone()
            .ok_or_else(|| ProviderError::Configuration("missing Ollama endpoint".to_string()))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ProviderError::Request(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: settings.temperature.unwrap_or(0.0),
        })
    }
}

#[async_trait]
impl SuggestionProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_selector(
        &self,
        html_context: &str,
        original_selector: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/api/generate", self.endpoint.trim_end_matches('/'));
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: format!(
                "The CSS selector `{original_selector}` no longer matches anything in this \
                 page:\n\n{html_context}\n\nReply with one working CSS selector for the element \
                 it most likely targeted, and nothing else."
            ),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::Response(format!("ollama returned {status}")));
        }

        let response: GenerateResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Response(err.to_string()))?;

        Ok(clean_reply(&response.response))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}
