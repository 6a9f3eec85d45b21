//! Bounded, deduplicated, most-recently-used list of prior queries.
//!
//! One [`RecentSearchStore`] owns the list for a single scope key. The
//! persisted record is a bare JSON array of strings under that key, with no
//! wrapper object, no version field. Malformed or type-inconsistent stored
//! data normalizes to an empty list; storage write refusal is logged and
//! swallowed. No operation here can fail from the caller's point of view.
//!
//! Scope keys isolate histories (per cluster, per view). Constructing the
//! store without one disables persistence entirely: every operation becomes
//! a no-op returning an empty list, and the surrounding controller degrades
//! to a plain debounced input.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::storage::StorageBackend;

/// Default cap on retained queries.
pub const DEFAULT_MAX_RECENT: usize = 5;

/// MRU query history under one scope key.
///
/// Writes are read-modify-write within a single call. Instances sharing a
/// scope key on the same backend are not coordinated: concurrent
/// controllers may interleave and the last writer wins. That is an accepted
/// limitation of the origin-wide storage model, not something this type
/// papers over.
pub struct RecentSearchStore {
    storage: Arc<dyn StorageBackend>,
    scope_key: Option<String>,
    max_recent: usize,
}

impl RecentSearchStore {
    pub fn new(storage: Arc<dyn StorageBackend>, scope_key: Option<String>) -> Self {
        Self {
            storage,
            scope_key,
            max_recent: DEFAULT_MAX_RECENT,
        }
    }

    /// Override the retention cap (default [`DEFAULT_MAX_RECENT`]).
    pub fn with_max_recent(mut self, max_recent: usize) -> Self {
        self.max_recent = max_recent;
        self
    }

    /// Whether persistence is active (a scope key was supplied).
    pub fn is_enabled(&self) -> bool {
        self.scope_key.is_some()
    }

    pub fn max_recent(&self) -> usize {
        self.max_recent
    }

    /// Read the persisted list. Absent, unreadable, or malformed data all
    /// degrade to an empty list; non-string array elements are dropped.
    pub fn load(&self) -> Vec<String> {
        let Some(key) = self.scope_key.as_deref() else {
            return Vec::new();
        };
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                debug!(scope = key, error = %e, "recent-search read failed; treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Ok(_) | Err(_) => {
                debug!(scope = key, "malformed recent-search record; treating as empty");
                Vec::new()
            }
        }
    }

    /// Explicit resync point for callers that cache the list independently.
    /// Identical to [`load`](Self::load).
    pub fn refresh(&self) -> Vec<String> {
        self.load()
    }

    /// Record `query` as the most recent search. Trims whitespace first; an
    /// empty trimmed query is a no-op returning the current list. Otherwise
    /// the trimmed query moves to the front, duplicates are dropped, and
    /// the list is truncated to the cap. This is the only place an old entry can
    /// be evicted.
    ///
    /// The returned list reflects the attempted state even when the write
    /// is refused (quota, disabled storage); persisted state is untouched
    /// in that case and the divergence heals on the next successful write.
    pub fn save(&self, query: &str) -> Vec<String> {
        if self.scope_key.is_none() {
            return Vec::new();
        }
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.load();
        }
        let mut next = self.load();
        next.retain(|s| s != trimmed);
        next.insert(0, trimmed.to_string());
        next.truncate(self.max_recent);
        self.write_back(&next);
        next
    }

    /// Drop all exact-match occurrences of `query`. Succeeds (and writes
    /// back unchanged content) when the query is absent.
    pub fn remove(&self, query: &str) -> Vec<String> {
        if self.scope_key.is_none() {
            return Vec::new();
        }
        let mut next = self.load();
        next.retain(|s| s != query);
        self.write_back(&next);
        next
    }

    /// Reset the scope to an empty history.
    pub fn clear(&self) -> Vec<String> {
        if self.scope_key.is_none() {
            return Vec::new();
        }
        self.write_back(&[]);
        Vec::new()
    }

    fn write_back(&self, list: &[String]) {
        let Some(key) = self.scope_key.as_deref() else {
            return;
        };
        // A Vec<String> always serializes.
        let record =
            serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string());
        if let Err(e) = self.storage.set(key, &record) {
            warn!(scope = key, error = %e, "recent-search write failed; keeping prior persisted state");
        }
    }
}
