//! Asynchronous suggestion providers
//!
//! Providers are consulted after heuristics fail. The registry is built
//! once at engine construction: a configured provider is registered only
//! when its required credential or endpoint is present, and orchestration
//! invokes at most the single active provider per request.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::AiConfig;
use crate::errors::ProviderError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Abstraction over external suggestion sources so multiple vendors can
/// plug into the healing pipeline.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Registry name of this provider
    fn name(&self) -> &str;

    /// Propose a replacement selector from a bounded HTML context and the
    /// original failing selector. `Ok(None)` means "no suggestion".
    async fn generate_selector(
        &self,
        html_context: &str,
        original_selector: &str,
    ) -> Result<Option<String>, ProviderError>;
}

/// Name-keyed provider registry built once at startup
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn SuggestionProvider>>,
}

impl ProviderRegistry {
    /// Instantiate every configured provider whose credentials are
    /// present. Entries without credentials are silently absent.
    pub fn from_config(ai: &AiConfig) -> Self {
        let mut registry = Self::default();
        for (name, settings) in &ai.providers {
            let built: Result<Arc<dyn SuggestionProvider>, ProviderError> = match name.as_str() {
                "openai" => OpenAiProvider::from_settings(settings)
                    .map(|p| Arc::new(p) as Arc<dyn SuggestionProvider>),
                "ollama" => OllamaProvider::from_settings(settings)
                    .map(|p| Arc::new(p) as Arc<dyn SuggestionProvider>),
                other => {
                    debug!(provider = other, "ignoring unknown provider entry");
                    continue;
                }
            };
            match built {
                Ok(provider) => registry.register(provider),
                Err(ProviderError::Configuration(reason)) => {
                    debug!(provider = %name, %reason, "provider not registered");
                }
                Err(err) => {
                    warn!(provider = %name, error = %err, "failed to construct provider");
                }
            }
        }
        registry
    }

    /// Register a provider under its own name
    pub fn register(&mut self, provider: Arc<dyn SuggestionProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Plain lookup by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn SuggestionProvider>> {
        self.providers.get(name).cloned()
    }

    /// Registered provider names
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

/// Deterministic in-process provider for tests and offline development
pub struct StaticProvider {
    name: String,
    suggestion: Option<String>,
}

impl StaticProvider {
    /// Create a provider that always returns the given suggestion
    pub fn new(name: impl Into<String>, suggestion: Option<String>) -> Self {
        Self {
            name: name.into(),
            suggestion,
        }
    }
}

#[async_trait]
impl SuggestionProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_selector(
        &self,
        _html_context: &str,
        _original_selector: &str,
    ) -> Result<Option<String>, ProviderError> {
        Ok(self.suggestion.clone())
    }
}

/// Reduce a raw model reply to a single candidate selector: drop code
/// fences, take the first non-empty line, strip wrapping quotes and
/// backticks. An empty reply is no suggestion.
pub(crate) fn clean_reply(raw: &str) -> Option<String> {
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }
        let line = strip_wrapping(line.trim_matches('`').trim());
        if line.is_empty() {
            continue;
        }
        return Some(line.to_string());
    }
    None
}

fn strip_wrapping(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
