//! Error types for the healing engine
//!
//! None of these are fatal to a heal call: the orchestrator degrades every
//! failure into "no candidate from this source" and keeps going.

use selmend_dom::DomError;
use thiserror::Error;

/// Engine-internal error enumeration
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// A heuristic rule failed while scanning the document
    #[error("rule '{rule}' failed: {reason}")]
    RuleFailed { rule: String, reason: String },

    /// Document query error
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Suggestion provider error enumeration
#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    /// Provider is missing required configuration
    #[error("provider misconfigured: {0}")]
    Configuration(String),

    /// Transport-level failure
    #[error("provider request failed: {0}")]
    Request(String),

    /// Provider replied with something we could not interpret
    #[error("provider response invalid: {0}")]
    Response(String),
}

/// Cache persistence error enumeration
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backing file could not be read or decoded
    #[error("failed to read healing cache: {0}")]
    Read(String),

    /// Backing file could not be written
    #[error("failed to persist healing cache: {0}")]
    Write(String),
}
