//! Key/value storage collaborators for recent-search persistence.
//!
//! [`RecentSearchStore`](crate::recent::RecentSearchStore) never touches a
//! concrete backend directly; everything goes through [`StorageBackend`] so
//! absent keys, corruption, and quota refusal can be simulated
//! deterministically in tests.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStorage`]: in-process map with an optional byte quota, the
//!   default for tests and for callers that do their own persistence.
//! - [`FileStorage`]: one file per key under a root directory, written
//!   atomically (temp file + rename).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

/// Failure modes a backend may report. The store treats every variant the
/// same way: leave prior state untouched, log, carry on.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded writing '{key}' ({attempted} bytes)")]
    QuotaExceeded { key: String, attempted: usize },

    #[error("storage backend unavailable")]
    Unavailable,

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Synchronous key/value store with localStorage-like semantics: string
/// keys, string values, finite quota, no transactions.
///
/// Implementations must tolerate concurrent callers, but read-modify-write
/// sequences built on top of `get`/`set` are not atomic across callers;
/// the last writer wins.
pub trait StorageBackend: Send + Sync {
    /// Read the value under `key`. Absent keys are `Ok(None)`, not errors.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`. On error the previous value must remain
    /// readable.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend. Shareable across controllers via `Arc`, which is also
/// how the last-writer-wins race on a shared scope key is reproduced in
/// tests.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    map: HashMap<String, String>,
    /// Maximum total bytes (keys + values). `None` means unbounded.
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap total stored bytes, counting both keys and values. Writes that
    /// would exceed the cap fail with [`StorageError::QuotaExceeded`] and
    /// leave the previous value in place.
    pub fn with_quota(total_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                map: HashMap::new(),
                quota: Some(total_bytes),
            }),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.lock().map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        if let Some(quota) = inner.quota {
            let existing = inner.map.get(key).map_or(0, |v| key.len() + v.len());
            let used: usize = inner.map.iter().map(|(k, v)| k.len() + v.len()).sum();
            let attempted = key.len() + value.len();
            if used - existing + attempted > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    attempted,
                });
            }
        }
        inner.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.lock().map.remove(key);
        Ok(())
    }
}

/// File-per-key backend rooted at a directory. Writes go through a sibling
/// temp file and a rename so readers never observe a torn value.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root the storage under the conventional per-user data directory for
    /// `app` (e.g. `~/.local/share/<app>/recent` on Linux).
    pub fn in_default_location(app: &str) -> Result<Self, StorageError> {
        let dirs =
            directories::ProjectDirs::from("", "", app).ok_or(StorageError::Unavailable)?;
        Ok(Self::new(dirs.data_dir().join("recent")))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Map an arbitrary scope key to a safe file name. Alphanumerics, `.`, `-`,
/// and `_` pass through; everything else becomes `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_roundtrip_and_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").unwrap().is_none());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
        // Removing again is fine.
        storage.remove("k").unwrap();
    }

    #[test]
    fn memory_quota_refuses_write_and_keeps_old_value() {
        let storage = MemoryStorage::with_quota(10);
        storage.set("k", "old").unwrap();
        let err = storage.set("k", "way too long for the quota").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn memory_quota_allows_replacing_existing_value() {
        let storage = MemoryStorage::with_quota(8);
        storage.set("k", "1234567").unwrap();
        // Replacement is judged against the post-write total, not old + new.
        storage.set("k", "7654321").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("7654321"));
    }

    #[test]
    fn file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.get("scope").unwrap().is_none());
        storage.set("scope", "[\"a\"]").unwrap();
        assert_eq!(storage.get("scope").unwrap().as_deref(), Some("[\"a\"]"));
        storage.set("scope", "[]").unwrap();
        assert_eq!(storage.get("scope").unwrap().as_deref(), Some("[]"));
        storage.remove("scope").unwrap();
        assert!(storage.get("scope").unwrap().is_none());
    }

    #[test]
    fn file_storage_sanitizes_hostile_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("cluster/one:9092", "[]").unwrap();
        assert_eq!(storage.get("cluster/one:9092").unwrap().as_deref(), Some("[]"));
        // The file must land inside the root, not beside it.
        assert!(dir.path().join("cluster_one_9092.json").exists());
    }

    #[test]
    fn sanitize_passes_safe_chars_through() {
        assert_eq!(sanitize_key("abc-DEF_1.2"), "abc-DEF_1.2");
        assert_eq!(sanitize_key("a b/c"), "a_b_c");
    }
}
