//! Core types shared across the healing stack

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named heuristic rule
///
/// The fixed set of matchers the resolver knows about. `DataCy` and
/// `DataTestId` are two names over one matcher implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleName {
    /// `data-cy` test attribute
    DataCy,

    /// `data-testid` test attribute
    #[serde(rename = "data-testid")]
    DataTestId,

    /// `aria-label` attribute
    AriaLabel,

    /// `role` attribute
    Role,

    /// `<label for="...">` association
    Label,

    /// Visible text content
    Text,

    /// Class token
    Class,

    /// `id` attribute
    Id,
}

impl RuleName {
    /// Get rule name as string
    pub fn name(&self) -> &'static str {
        match self {
            RuleName::DataCy => "data-cy",
            RuleName::DataTestId => "data-testid",
            RuleName::AriaLabel => "aria-label",
            RuleName::Role => "role",
            RuleName::Label => "label",
            RuleName::Text => "text",
            RuleName::Class => "class",
            RuleName::Id => "id",
        }
    }

    /// Default priority order used when configuration is absent
    pub fn default_priority() -> Vec<RuleName> {
        vec![
            RuleName::DataCy,
            RuleName::DataTestId,
            RuleName::AriaLabel,
            RuleName::Role,
            RuleName::Text,
            RuleName::Label,
            RuleName::Class,
            RuleName::Id,
        ]
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a rule name is not in the known set
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown heuristic rule: {0}")]
pub struct UnknownRule(pub String);

impl FromStr for RuleName {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data-cy" => Ok(RuleName::DataCy),
            "data-testid" => Ok(RuleName::DataTestId),
            "aria-label" => Ok(RuleName::AriaLabel),
            "role" => Ok(RuleName::Role),
            "label" => Ok(RuleName::Label),
            "text" => Ok(RuleName::Text),
            "class" => Ok(RuleName::Class),
            "id" => Ok(RuleName::Id),
            other => Err(UnknownRule(other.to_string())),
        }
    }
}

/// How a healing result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealMethod {
    /// DOM heuristic matcher
    Heuristic,

    /// External suggestion provider
    Ai,

    /// Operator-maintained override table
    Manual,

    /// No resolution found
    Failed,
}

impl HealMethod {
    /// Get method name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            HealMethod::Heuristic => "heuristic",
            HealMethod::Ai => "ai",
            HealMethod::Manual => "manual",
            HealMethod::Failed => "failed",
        }
    }
}

impl fmt::Display for HealMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome record of one resolution attempt
///
/// Immutable once constructed; the sole externally observable output of a
/// heal call and the only value type stored in the healing cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingResult {
    /// The selector that failed to match
    pub original: String,

    /// Replacement selector, if one was found
    pub healed: Option<String>,

    /// How the replacement was produced
    pub method: HealMethod,

    /// When the resolution happened
    pub timestamp: DateTime<Utc>,
}

impl HealingResult {
    /// Create a new result stamped with the current time
    pub fn new(original: impl Into<String>, healed: Option<String>, method: HealMethod) -> Self {
        Self {
            original: original.into(),
            healed,
            method,
            timestamp: Utc::now(),
        }
    }

    /// Create a failed result for an original selector
    pub fn failed(original: impl Into<String>) -> Self {
        Self::new(original, None, HealMethod::Failed)
    }

    /// Check if the attempt produced a replacement
    pub fn is_healed(&self) -> bool {
        self.healed.is_some()
    }
}
