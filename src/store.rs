//! Durable key-value storage for user profiles.
//!
//! The repository only ever needs `get` and `set` on a single key, so the
//! store is a small trait with an in-memory implementation for tests and
//! embedding, and a directory-backed implementation for the CLI.

use crate::error::StoreError;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Key-value storage holding serialized profile maps.
pub trait ProfileStore {
    /// Stored value for `key`, or `None` when nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: ProfileStore + ?Sized> ProfileStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Process-local store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl ProfileStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store keeping each key in `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a reader never sees a partially written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ProfileStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!("read {} bytes from {}", text.len(), path.display());
                Ok(Some(text))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let written = write_synced(&tmp, value).and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            // Cleanup errors are ignored; the write failure is returned
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

// Contents are on disk before the rename makes them visible
fn write_synced(path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()
}
