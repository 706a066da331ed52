use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::ports::{SessionStorage, StorageError};

/// Key-value entries kept in a single JSON object file.
///
/// Every mutation rewrites the whole file through a temp file + rename, so a
/// crash never leaves a half-written session behind.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

type Entries = BTreeMap<String, String>;

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.to_string_lossy().to_string(),
            source,
        }
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(self.io_err(e)),
            };
        }

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.io_err(e))?;

        let body = serde_json::to_vec_pretty(entries).map_err(|e| StorageError::Corrupt {
            path: self.path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(&body).map_err(|e| self.io_err(e))?;
        tmp.flush().map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        debug!(path = %self.path.display(), keys = entries.len(), "Session file written");
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut Entries) -> bool) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        if f(&mut entries) {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        // A corrupt file cannot hold a usable session; drop it.
        match self.update(|entries| entries.remove(key).is_some()) {
            Err(StorageError::Corrupt { .. }) => {
                let _guard = self.lock.lock();
                self.write_entries(&Entries::new())
            }
            other => other,
        }
    }
}
