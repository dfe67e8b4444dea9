//! Healing orchestrator
//!
//! Sequences cache lookup, heuristic resolution, provider fallback and
//! manual lookup, short-circuiting at the first success. Every
//! non-cache-hit success is persisted; failures are returned but never
//! cached, so a later call against an improved document can still win.

use crate::cache::HealingCache;
use crate::config::{EngineConfig, HealOptions};
use crate::exclude::ExclusionFilter;
use crate::manual::ManualOverrides;
use crate::providers::{ProviderRegistry, SuggestionProvider};
use crate::resolver::{HeuristicResolver, ResolverStats};
use crate::rules;
use selmend_core::{HealMethod, HealingResult};
use selmend_dom::{DocumentSnapshot, ElementHandle};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Bound on the serialized document context handed to providers
pub const MAX_CONTEXT_CHARS: usize = 10_000;

/// Bound on a single provider call; expiry is "no suggestion", not an error
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// File locations for the engine's durable collaborators
#[derive(Debug, Clone, Default)]
pub struct EnginePaths {
    /// Healing cache backing file
    pub cache_path: Option<PathBuf>,

    /// Manual override table file
    pub manual_overrides_path: Option<PathBuf>,
}

/// Selector healing engine
///
/// Explicitly constructed; holds its own configuration, cache and
/// provider registry and is handed to callers by dependency injection.
pub struct HealingEngine {
    config: EngineConfig,
    cache: HealingCache,
    providers: ProviderRegistry,
    manual: ManualOverrides,
    resolver: HeuristicResolver,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl HealingEngine {
    /// Construct an engine: load the cache, build the provider registry
    /// from configured credentials, wire the override table
    pub fn new(config: EngineConfig, paths: EnginePaths) -> Self {
        let cache = HealingCache::load(paths.cache_path, config.healing.save_healed);
        let providers = ProviderRegistry::from_config(&config.ai);
        let manual = ManualOverrides::new(paths.manual_overrides_path);
        Self {
            config,
            cache,
            providers,
            manual,
            resolver: HeuristicResolver::new(),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Register an extra provider (used for in-process providers)
    pub fn with_provider(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.providers.register(provider);
        self
    }

    /// Resolve a failing selector against a document snapshot
    ///
    /// Never fails: every internal error degrades to the next fallback,
    /// and the worst outcome is a result with `method: Failed`.
    pub async fn heal(
        &self,
        original: &str,
        doc: &DocumentSnapshot,
        overrides: Option<HealOptions>,
    ) -> HealingResult {
        // At most one concurrent resolution per original selector; the
        // guard spans the whole read-modify-write-persist sequence.
        let lock = self.key_lock(original).await;
        let _guard = lock.lock().await;

        if let Some(hit) = self.cache.get(original) {
            if hit.healed.is_some() {
                debug!(original = %original, "healing cache hit");
                return hit;
            }
        }

        let opts = self.config.heuristics.merged(overrides.as_ref());
        let filter = ExclusionFilter::new(&opts.exclude_patterns);

        if self.config.healing.auto_heal {
            if let Some(healed) = self.resolver.resolve(doc, &opts, &filter) {
                info!(original = %original, healed = %healed, "healed selector via heuristics");
                let result = HealingResult::new(original, Some(healed), HealMethod::Heuristic);
                self.cache.put(result.clone());
                return result;
            }
        }

        if self.config.ai.enabled {
            if let Some(healed) = self.suggest_via_provider(original, doc).await {
                info!(original = %original, healed = %healed, "healed selector via provider");
                let result = HealingResult::new(original, Some(healed), HealMethod::Ai);
                self.cache.put(result.clone());
                return result;
            }
        }

        if let Some(healed) = self.manual.lookup(original) {
            info!(original = %original, healed = %healed, "healed selector via manual override");
            let result = HealingResult::new(original, Some(healed), HealMethod::Manual);
            self.cache.put(result.clone());
            return result;
        }

        debug!(original = %original, "selector healing exhausted all sources");
        HealingResult::failed(original)
    }

    /// Forward direction: best stable selector for a known element
    pub fn generate_selector_for(
        &self,
        element: &ElementHandle<'_>,
        overrides: Option<HealOptions>,
    ) -> Option<String> {
        let opts = self.config.heuristics.merged(overrides.as_ref());
        let filter = ExclusionFilter::new(&opts.exclude_patterns);
        rules::selector_for_element(element, &opts, &filter)
    }

    /// Clone of the full cache mapping
    pub fn cached_results(&self) -> HashMap<String, HealingResult> {
        self.cache.all()
    }

    /// Drop every cached resolution
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Resolver instrumentation counters
    pub fn resolver_stats(&self) -> Arc<ResolverStats> {
        self.resolver.stats()
    }

    async fn suggest_via_provider(&self, original: &str, doc: &DocumentSnapshot) -> Option<String> {
        let active = &self.config.ai.provider;
        let Some(provider) = self.providers.get(active) else {
            debug!(provider = %active, "active provider not registered; skipping fallback");
            return None;
        };

        // Built before the await: the snapshot is only touched
        // synchronously.
        let context = doc.root_html_bounded(MAX_CONTEXT_CHARS);

        match timeout(PROVIDER_TIMEOUT, provider.generate_selector(&context, original)).await {
            Ok(Ok(Some(suggestion))) if !suggestion.trim().is_empty() => Some(suggestion),
            Ok(Ok(_)) => {
                debug!(provider = %active, "provider had no suggestion");
                None
            }
            Ok(Err(err)) => {
                warn!(provider = %active, error = %err, "provider failed; treating as no suggestion");
                None
            }
            Err(_) => {
                warn!(provider = %active, "provider timed out; treating as no suggestion");
                None
            }
        }
    }

    async fn key_lock(&self, original: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks
            .entry(original.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
