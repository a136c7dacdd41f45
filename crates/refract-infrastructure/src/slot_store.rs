//! Single-slot key/value text storage.
//!
//! Provides a thin layer for durable, size-constrained storage of serialized
//! blocks under fixed keys. Writes that would exceed the configured quota are
//! rejected with `RefractError::CapacityExceeded` so the history store
//! adapter can run its degradation ladder.

use refract_core::{RefractError, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::PathBuf;
use std::sync::Mutex;

/// A key-addressed store holding one serialized text block per key.
pub trait SlotStore: Send + Sync {
    /// Reads the block stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: the stored block
    /// - `Ok(None)`: no block exists (or it is empty)
    /// - `Err(_)`: the block exists but could not be read
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous block.
    ///
    /// # Errors
    ///
    /// - `RefractError::CapacityExceeded` when the value does not fit the
    ///   store's quota
    /// - `RefractError::Io` for any other write failure
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the block stored under `key`. Removing a missing key is not
    /// an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed slot store: one file per key under a directory.
///
/// Writes are atomic (temporary file + fsync + rename), so a crash mid-write
/// never leaves a partial block behind.
pub struct FileSlotStore {
    dir: PathBuf,
    max_bytes: Option<usize>,
}

impl FileSlotStore {
    /// Creates a store rooted at `dir` with no size quota.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: None,
        }
    }

    /// Limits every stored block to at most `max_bytes` bytes.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(content))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if let Some(max_bytes) = self.max_bytes {
            if value.len() > max_bytes {
                return Err(RefractError::capacity_exceeded(value.len()));
            }
        }

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let path = self.slot_path(key);
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));

        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-memory slot store with the same quota behavior as `FileSlotStore`.
///
/// Used by tests to simulate a storage layer that rejects oversized writes,
/// and by embedders that do not want durable history.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
    max_bytes: Option<usize>,
}

impl MemorySlotStore {
    /// Creates an unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits every stored block to at most `max_bytes` bytes.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| RefractError::data_access("slot store mutex poisoned"))
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if let Some(max_bytes) = self.max_bytes {
            if value.len() > max_bytes {
                return Err(RefractError::capacity_exceeded(value.len()));
            }
        }

        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(dir.path());

        assert_eq!(store.read("history").unwrap(), None);

        store.write("history", r#"[{"id":"a"}]"#).unwrap();
        assert_eq!(store.read("history").unwrap().unwrap(), r#"[{"id":"a"}]"#);

        store.write("history", "[]").unwrap();
        assert_eq!(store.read("history").unwrap().unwrap(), "[]");
    }

    #[test]
    fn test_file_store_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(dir.path());

        store.write("history", "[]").unwrap();
        store.remove("history").unwrap();
        assert_eq!(store.read("history").unwrap(), None);

        // Removing a missing key is fine.
        store.remove("history").unwrap();
    }

    #[test]
    fn test_file_store_quota() {
        let dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(dir.path()).with_max_bytes(8);

        store.write("k", "12345678").unwrap();
        let err = store.write("k", "123456789").unwrap_err();
        assert!(err.is_capacity_exceeded());

        // The previous value is untouched by the rejected write.
        assert_eq!(store.read("k").unwrap().unwrap(), "12345678");
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(dir.path());
        store.write("history", "[]").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["history.json".to_string()]);
    }

    #[test]
    fn test_memory_store_quota() {
        let store = MemorySlotStore::new().with_max_bytes(4);

        store.write("k", "1234").unwrap();
        assert!(store.write("k", "12345").unwrap_err().is_capacity_exceeded());
        assert_eq!(store.read("k").unwrap().unwrap(), "1234");

        store.remove("k").unwrap();
        assert_eq!(store.read("k").unwrap(), None);
    }
}
