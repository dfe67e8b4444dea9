//! Error types for document snapshots

use thiserror::Error;

/// Document snapshot error enumeration
#[derive(Debug, Error, Clone)]
pub enum DomError {
    /// Selector could not be parsed by the query grammar
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

impl DomError {
    /// Build a selector error from the parser's borrowed diagnostic
    pub fn selector(selector: &str, reason: impl ToString) -> Self {
        DomError::Selector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}
