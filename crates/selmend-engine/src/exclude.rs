//! Unstable-pattern exclusion
//!
//! Two independent predicates over one configured pattern list. The exact
//! test compiles each pattern as a regex and uses partial-match semantics
//! (patterns typically carry `^`/`$` anchors). The text test strips every
//! `^`, `$` and `-` character from the pattern (any literal hyphen too,
//! not just anchors) and checks for the stripped form as a substring.
//! The two gates different heuristics and are intentionally not unified.

use regex::Regex;
use tracing::warn;

/// Compiled exclusion predicate pair
#[derive(Debug)]
pub struct ExclusionFilter {
    compiled: Vec<Regex>,
    stripped: Vec<String>,
}

impl ExclusionFilter {
    /// Build a filter from regex source strings
    ///
    /// Patterns that fail to compile are dropped from the exact test with
    /// a warning; they still participate in the substring test, which
    /// never compiles them.
    pub fn new(patterns: &[String]) -> Self {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            match Regex::new(pattern) {
                Ok(regex) => compiled.push(regex),
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "skipping unparseable exclusion pattern");
                }
            }
        }

        let stripped = patterns
            .iter()
            .map(|pattern| {
                pattern
                    .chars()
                    .filter(|ch| !matches!(ch, '^' | '$' | '-'))
                    .collect()
            })
            .collect();

        Self { compiled, stripped }
    }

    /// Exact-match exclusion: any pattern matches the value as a regex
    pub fn is_excluded(&self, value: &str) -> bool {
        self.compiled.iter().any(|regex| regex.is_match(value))
    }

    /// Substring exclusion for free text: the text contains any
    /// anchor-and-hyphen-stripped pattern
    pub fn is_text_excluded(&self, text: &str) -> bool {
        self.stripped
            .iter()
            .any(|stripped| text.contains(stripped.as_str()))
    }

    /// Number of patterns active in the exact test
    pub fn pattern_count(&self) -> usize {
        self.compiled.len()
    }
}
