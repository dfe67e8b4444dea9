//! Engine configuration
//!
//! Loaded once from a YAML file at engine construction and shallow-merged
//! with per-call overrides (override wins key by key). A missing or
//! unreadable file falls back to built-in defaults with a warning, never
//! an error.

use selmend_core::RuleName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub heuristics: HeuristicsConfig,
    pub ai: AiConfig,
    pub healing: HealingConfig,
}

/// Heuristic resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Rule names in resolution order; unknown names are skipped at
    /// resolution time with a warning
    pub priority: Vec<String>,

    /// Regex source strings identifying unstable values
    pub exclude_patterns: Vec<String>,

    /// Gates per-rule debug chatter; warnings always log
    pub logging: bool,

    /// Lower bound for text-based candidates, in characters
    pub min_text_length: usize,

    /// Upper bound for text-based candidates, in characters
    pub max_text_length: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            priority: RuleName::default_priority()
                .iter()
                .map(|rule| rule.name().to_string())
                .collect(),
            exclude_patterns: vec![
                "^[0-9]+$".to_string(),
                "^ng-".to_string(),
                "^css-".to_string(),
            ],
            logging: true,
            min_text_length: 2,
            max_text_length: 60,
        }
    }
}

/// Suggestion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Master switch for the provider fallback step
    pub enabled: bool,

    /// Name of the single active provider
    pub provider: String,

    /// Provider settings keyed by provider name; entries without their
    /// required credential are never registered
    pub providers: HashMap<String, ProviderSettings>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            providers: HashMap::new(),
        }
    }
}

/// Per-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Healing orchestration flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealingConfig {
    /// Run the heuristic resolution step
    pub auto_heal: bool,

    /// Persist successful resolutions to the backing cache file
    pub save_healed: bool,
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            auto_heal: true,
            save_healed: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file, falling back to defaults on
    /// any read or parse failure
    pub fn load_from_path(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "no engine config file; using defaults");
            return Self::default();
        }
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read engine config; using defaults");
                return Self::default();
            }
        };
        match serde_yaml::from_str::<EngineConfig>(&raw) {
            Ok(config) => config.validated(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse engine config; using defaults");
                Self::default()
            }
        }
    }

    /// Enforce cross-field invariants, resetting offending values
    fn validated(mut self) -> Self {
        if self.heuristics.max_text_length < self.heuristics.min_text_length {
            let defaults = HeuristicsConfig::default();
            warn!(
                min = self.heuristics.min_text_length,
                max = self.heuristics.max_text_length,
                "max_text_length below min_text_length; resetting text bounds"
            );
            self.heuristics.min_text_length = defaults.min_text_length;
            self.heuristics.max_text_length = defaults.max_text_length;
        }
        self
    }
}

/// Per-call overrides for the heuristic configuration
///
/// Every field is optional; a set field replaces the corresponding
/// engine-level value for the duration of one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealOptions {
    pub priority: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub logging: Option<bool>,
    pub min_text_length: Option<usize>,
    pub max_text_length: Option<usize>,
}

impl HeuristicsConfig {
    /// Shallow-merge per-call overrides over the engine configuration
    pub fn merged(&self, overrides: Option<&HealOptions>) -> HeuristicsConfig {
        let mut merged = self.clone();
        let Some(overrides) = overrides else {
            return merged;
        };
        if let Some(priority) = &overrides.priority {
            merged.priority = priority.clone();
        }
        if let Some(patterns) = &overrides.exclude_patterns {
            merged.exclude_patterns = patterns.clone();
        }
        if let Some(logging) = overrides.logging {
            merged.logging = logging;
        }
        if let Some(min) = overrides.min_text_length {
            merged.min_text_length = min;
        }
        if let Some(max) = overrides.max_text_length {
            merged.max_text_length = max;
        }
        merged
    }
}
