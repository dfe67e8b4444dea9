//! Persistent healing cache
//!
//! Write-through, read-through mapping from the original failing selector
//! to its last successful resolution. The backing file is a single JSON
//! object, read once at engine construction and rewritten in full on
//! every update. Persistence failures are logged, never propagated.

use crate::errors::CacheError;
use parking_lot::RwLock;
use selmend_core::HealingResult;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// In-memory cache with an optional file backing
pub struct HealingCache {
    entries: RwLock<HashMap<String, HealingResult>>,
    path: Option<PathBuf>,
    durable: bool,
}

impl HealingCache {
    /// Load the cache from its backing file; a missing file starts empty,
    /// an unreadable one starts empty with a warning
    pub fn load(path: Option<PathBuf>, durable: bool) -> Self {
        let entries = match path.as_deref() {
            Some(file) if file.exists() => match read_entries(file) {
                Ok(entries) => {
                    debug!(count = entries.len(), path = %file.display(), "loaded healing cache");
                    entries
                }
                Err(err) => {
                    warn!(path = %file.display(), error = %err, "starting with empty healing cache");
                    HashMap::new()
                }
            },
            _ => HashMap::new(),
        };
        Self {
            entries: RwLock::new(entries),
            path,
            durable,
        }
    }

    /// In-memory cache with no durable backing
    pub fn in_memory() -> Self {
        Self::load(None, false)
    }

    /// Look up the last resolution for an original selector
    pub fn get(&self, original: &str) -> Option<HealingResult> {
        self.entries.read().get(original).cloned()
    }

    /// Write-through insert keyed by the result's original selector
    pub fn put(&self, result: HealingResult) {
        let snapshot = {
            let mut entries = self.entries.write();
            entries.insert(result.original.clone(), result);
            entries.clone()
        };
        self.persist(&snapshot);
    }

    /// Drop every entry and rewrite the empty mapping
    pub fn clear(&self) {
        let snapshot = {
            let mut entries = self.entries.write();
            entries.clear();
            entries.clone()
        };
        self.persist(&snapshot);
    }

    /// Clone of the full mapping
    pub fn all(&self) -> HashMap<String, HealingResult> {
        self.entries.read().clone()
    }

    fn persist(&self, entries: &HashMap<String, HealingResult>) {
        if !self.durable {
            return;
        }
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Err(err) = write_entries(path, entries) {
            warn!(path = %path.display(), error = %err, "failed to persist healing cache");
        }
    }
}

fn read_entries(path: &Path) -> Result<HashMap<String, HealingResult>, CacheError> {
    let raw = fs::read_to_string(path).map_err(|err| CacheError::Read(err.to_string()))?;
    serde_json::from_str(&raw).map_err(|err| CacheError::Read(err.to_string()))
}

fn write_entries(path: &Path, entries: &HashMap<String, HealingResult>) -> Result<(), CacheError> {
    let data = serde_json::to_vec_pretty(entries).map_err(|err| CacheError::Write(err.to_string()))?;
    write_atomic(path, &data).map_err(|err| CacheError::Write(err.to_string()))
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use selmend_core::HealMethod;

    fn result(original: &str, healed: &str) -> HealingResult {
        HealingResult::new(original, Some(healed.to_string()), HealMethod::Heuristic)
    }

    #[test]
    fn test_put_get_round_trip() {
        let cache = HealingCache::in_memory();
        cache.put(result(".missing", "#found"));

        let hit = cache.get(".missing").unwrap();
        assert_eq!(hit.healed.as_deref(), Some("#found"));
    }

    #[test]
    fn test_keys_are_case_sensitive_and_exact() {
        let cache = HealingCache::in_memory();
        cache.put(result(".Missing", "#found"));
        assert!(cache.get(".missing").is_none());
        assert!(cache.get(".Missing ").is_none());
    }

    #[test]
    fn test_at_most_one_entry_per_key() {
        let cache = HealingCache::in_memory();
        cache.put(result(".missing", "#first"));
        cache.put(result(".missing", "#second"));

        assert_eq!(cache.all().len(), 1);
        assert_eq!(cache.get(".missing").unwrap().healed.as_deref(), Some("#second"));
    }

    #[test]
    fn test_durable_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healing-cache.json");

        let cache = HealingCache::load(Some(path.clone()), true);
        cache.put(result(".missing", r#"[data-cy="login"]"#));
        drop(cache);

        let reloaded = HealingCache::load(Some(path), true);
        let hit = reloaded.get(".missing").unwrap();
        assert_eq!(hit.healed.as_deref(), Some(r#"[data-cy="login"]"#));
        assert_eq!(hit.method, HealMethod::Heuristic);
    }

    #[test]
    fn test_clear_rewrites_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healing-cache.json");

        let cache = HealingCache::load(Some(path.clone()), true);
        cache.put(result(".a", "#a"));
        cache.clear();
        assert!(cache.all().is_empty());

        let reloaded = HealingCache::load(Some(path), true);
        assert!(reloaded.all().is_empty());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healing-cache.json");
        fs::write(&path, "{not json").unwrap();

        let cache = HealingCache::load(Some(path), true);
        assert!(cache.all().is_empty());
    }

    #[test]
    fn test_non_durable_skips_file_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healing-cache.json");

        let cache = HealingCache::load(Some(path.clone()), false);
        cache.put(result(".a", "#a"));
        assert!(!path.exists());
        // The in-memory write-through still serves reads.
        assert!(cache.get(".a").is_some());
    }
}
