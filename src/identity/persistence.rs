//! Key-value persistence behind the session store.
//!
//! Adapters are synchronous and local. A value is always a string; the store
//! decides what it encodes into it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encode: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait PersistenceAdapter: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local adapter; never fails. Used for ephemeral runs and tests.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    map: RwLock<BTreeMap<String, String>>,
}

impl MemoryAdapter {
    pub fn new() -> Self { Self::default() }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { map: RwLock::new(map) }
    }

    pub fn len(&self) -> usize { self.map.read().len() }

    pub fn is_empty(&self) -> bool { self.map.read().is_empty() }
}

impl PersistenceAdapter for MemoryAdapter {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.map.write().remove(key);
        Ok(())
    }
}

/// JSON-file adapter: one object of string keys to string values.
///
/// The whole map is held in memory and the file is rewritten on every
/// mutation via temp file + rename. The in-memory map only changes after the
/// file write succeeded.
#[derive(Debug)]
pub struct FileAdapter {
    path: PathBuf,
    map: RwLock<BTreeMap<String, String>>,
}

impl FileAdapter {
    /// Open (or lazily create) the state file. A missing file is an empty
    /// store; an unreadable or corrupt file is logged and treated as empty so
    /// startup never fails on bad local state.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let map = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(target: "expensedesk::storage", "state file '{}' is not a string map, starting empty: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(target: "expensedesk::storage", "state file '{}' unreadable, starting empty: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        tracing::debug!(target: "expensedesk::storage", "opened state file '{}' keys={}", path.display(), map.len());
        Self { path, map: RwLock::new(map) }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn flush(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() { std::fs::create_dir_all(dir)?; }
        }
        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl PersistenceAdapter for FileAdapter {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.map.write();
        let mut next = guard.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *guard = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.map.write();
        if !guard.contains_key(key) { return Ok(()); }
        let mut next = guard.clone();
        next.remove(key);
        self.flush(&next)?;
        *guard = next;
        Ok(())
    }
}
