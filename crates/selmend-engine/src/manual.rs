//! Operator-maintained override table
//!
//! A flat JSON object mapping original selector to healed selector,
//! consulted as the last resort. The file is read on demand so operators
//! can edit it between runs without restarting anything; a missing or
//! invalid file means no overrides.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// On-demand reader for the override file
pub struct ManualOverrides {
    path: Option<PathBuf>,
}

impl ManualOverrides {
    /// Create a table backed by the given file, if any
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Exact-key lookup against the current file contents
    pub fn lookup(&self, original: &str) -> Option<String> {
        self.read_table()?.remove(original)
    }

    fn read_table(&self) -> Option<HashMap<String, String>> {
        let path = self.path.as_deref()?;
        if !path.exists() {
            return None;
        }
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read manual overrides");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(table) => Some(table),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "manual overrides file is not a flat mapping");
                None
            }
        }
    }
}
