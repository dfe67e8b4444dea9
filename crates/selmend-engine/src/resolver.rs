//! Ordered heuristic resolution with candidate validation

use crate::config::HeuristicsConfig;
use crate::exclude::ExclusionFilter;
use crate::rules;
use selmend_core::RuleName;
use selmend_dom::DocumentSnapshot;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolver instrumentation counters
#[derive(Debug, Default)]
pub struct ResolverStats {
    matcher_invocations: AtomicU64,
}

impl ResolverStats {
    /// Total matcher invocations since engine construction
    pub fn matcher_invocations(&self) -> u64 {
        self.matcher_invocations.load(Ordering::Relaxed)
    }

    fn record_invocation(&self) {
        self.matcher_invocations.fetch_add(1, Ordering::Relaxed);
    }
}

/// Ordered registry of named matchers
///
/// Iterates the configured priority strictly in order; the first candidate
/// that survives validation wins. There is no cross-rule scoring.
pub struct HeuristicResolver {
    stats: Arc<ResolverStats>,
}

impl HeuristicResolver {
    /// Create a resolver with fresh counters
    pub fn new() -> Self {
        Self {
            stats: Arc::new(ResolverStats::default()),
        }
    }

    /// Shared handle to the invocation counters
    pub fn stats(&self) -> Arc<ResolverStats> {
        self.stats.clone()
    }

    /// Run the priority chain against a document snapshot
    pub fn resolve(
        &self,
        doc: &DocumentSnapshot,
        opts: &HeuristicsConfig,
        filter: &ExclusionFilter,
    ) -> Option<String> {
        for name in &opts.priority {
            let rule = match name.parse::<RuleName>() {
                Ok(rule) => rule,
                Err(err) => {
                    warn!(error = %err, "skipping unknown rule in priority list");
                    continue;
                }
            };

            if opts.logging {
                debug!(rule = %rule, "trying heuristic rule");
            }
            self.stats.record_invocation();

            let candidate = match rules::apply_rule(rule, doc, opts, filter) {
                Ok(Some(candidate)) => candidate,
                Ok(None) => {
                    if opts.logging {
                        debug!(rule = %rule, "no candidate from rule");
                    }
                    continue;
                }
                Err(err) => {
                    warn!(rule = %rule, error = %err, "heuristic rule failed; treating as no candidate");
                    continue;
                }
            };

            if self.validate(doc, rule, &candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Re-query the document with the candidate to confirm at least one
    /// match. Contains-text forms are accepted without re-validation; the
    /// query grammar does not support them. A failed validation moves on
    /// to the next rule, not the next match within the same rule.
    fn validate(&self, doc: &DocumentSnapshot, rule: RuleName, candidate: &str) -> bool {
        if candidate.contains(":contains(") {
            return true;
        }
        match doc.match_count(candidate) {
            Ok(count) if count >= 1 => true,
            Ok(_) => {
                warn!(rule = %rule, candidate = %candidate, "candidate matched nothing on re-query");
                false
            }
            Err(err) => {
                warn!(rule = %rule, candidate = %candidate, error = %err, "candidate failed to parse on re-query");
                false
            }
        }
    }
}

impl Default for HeuristicResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts_with_priority(priority: &[&str]) -> HeuristicsConfig {
        HeuristicsConfig {
            priority: priority.iter().map(|p| p.to_string()).collect(),
            ..HeuristicsConfig::default()
        }
    }

    fn empty_filter() -> ExclusionFilter {
        ExclusionFilter::new(&[])
    }

    const FORM: &str = r#"
        <body>
            <div id="panel" class="panel">
                <button data-cy="login" class="btn">Log in</button>
            </div>
        </body>
    "#;

    #[test]
    fn test_first_rule_wins() {
        let doc = DocumentSnapshot::parse(FORM);
        let resolver = HeuristicResolver::new();
        let opts = HeuristicsConfig::default();
        let healed = resolver.resolve(&doc, &opts, &empty_filter());
        assert_eq!(healed, Some(r#"[data-cy="login"]"#.to_string()));
    }

    #[test]
    fn test_reordered_priority_changes_winner() {
        let doc = DocumentSnapshot::parse(FORM);
        let resolver = HeuristicResolver::new();
        let opts = opts_with_priority(&["id", "data-cy"]);
        let healed = resolver.resolve(&doc, &opts, &empty_filter());
        assert_eq!(healed, Some("#panel".to_string()));
    }

    #[test]
    fn test_unknown_rule_skipped_not_fatal() {
        let doc = DocumentSnapshot::parse(FORM);
        let resolver = HeuristicResolver::new();
        let opts = opts_with_priority(&["xpath", "data-cy"]);
        let healed = resolver.resolve(&doc, &opts, &empty_filter());
        assert_eq!(healed, Some(r#"[data-cy="login"]"#.to_string()));
    }

    #[test]
    fn test_unknown_rule_not_counted_as_invocation() {
        let doc = DocumentSnapshot::parse(FORM);
        let resolver = HeuristicResolver::new();
        let opts = opts_with_priority(&["xpath", "data-cy"]);
        resolver.resolve(&doc, &opts, &empty_filter());
        assert_eq!(resolver.stats().matcher_invocations(), 1);
    }

    #[test]
    fn test_contains_candidate_skips_validation() {
        let doc = DocumentSnapshot::parse("<body><button>Submit Now</button></body>");
        let resolver = HeuristicResolver::new();
        let opts = opts_with_priority(&["text"]);
        let healed = resolver.resolve(&doc, &opts, &empty_filter());
        // The query grammar rejects :contains, so acceptance proves the
        // validation step was bypassed.
        assert_eq!(healed, Some(r#"button:contains("Submit Now")"#.to_string()));
    }

    #[test]
    fn test_no_rules_match() {
        let doc = DocumentSnapshot::parse("<body><input type=\"hidden\"></body>");
        let resolver = HeuristicResolver::new();
        let opts = HeuristicsConfig::default();
        assert_eq!(resolver.resolve(&doc, &opts, &empty_filter()), None);
    }

    #[test]
    fn test_invocation_counter_accumulates() {
        let doc = DocumentSnapshot::parse("<body><input type=\"hidden\"></body>");
        let resolver = HeuristicResolver::new();
        let opts = HeuristicsConfig::default();
        resolver.resolve(&doc, &opts, &empty_filter());
        // All eight configured rules ran and found nothing.
        assert_eq!(resolver.stats().matcher_invocations(), 8);
    }
}
