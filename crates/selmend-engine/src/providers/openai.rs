//! OpenAI-backed suggestion provider

use crate::config::ProviderSettings;
use crate::errors::ProviderError;
use crate::providers::{clean_reply, SuggestionProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You repair broken CSS selectors for UI test automation. \
Given a page snapshot and a selector that no longer matches, reply with a single \
working CSS selector for the element it most likely targeted, and nothing else.";

/// Chat-completions client for selector suggestions
#[derive(Debug)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    /// Build from configuration; requires an API key
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::Configuration("missing OpenAI api key".to_string()))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ProviderError::Request(err.to_string()))?;
        Ok(Self {
            client,
            api_key,
            api_base: settings
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: settings.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        })
    }

    fn user_prompt(html_context: &str, original_selector: &str) -> String {
        format!(
            "The selector `{original_selector}` no longer matches anything in this page:\n\n{html_context}"
        )
    }
}

#[async_trait]
impl SuggestionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate_selector(
        &self,
        html_context: &str,
        original_selector: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::user_prompt(html_context, original_selector),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(ProviderError::Response(format!(
                "openai returned {status}: {text}"
            )));
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Response(err.to_string()))?;

        let Some(content) = response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
        else {
            debug!("openai reply carried no choices");
            return Ok(None);
        };

        Ok(clean_reply(content))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}
