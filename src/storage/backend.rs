//! Storage backend trait and implementations.
//!
//! This module provides the backends behind the key-value store:
//! - `FileBackend` - One file per key in the data directory (default)
//! - `MemoryBackend` - Process-local map, used for dry runs and tests

use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Trait for backends that persist raw string values under string keys.
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any existing value.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Move the value under `key` aside so it is kept for inspection but no
    /// longer read. Returns the location it was moved to.
    fn quarantine(&mut self, key: &str) -> Result<Option<String>>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> &'static str;
}

/// Available storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// One JSON file per key under the data directory
    File,
    /// In-memory only, nothing survives the process
    Memory,
}

impl BackendType {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File-per-key backend.
///
/// Each key `k` is stored at `<root>/<k>.json`. Quarantined values are moved
/// to `<root>/<k>.corrupt`, then `<k>.corrupt.1`, `<k>.corrupt.2` and so on,
/// so earlier copies are never overwritten.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// First unused quarantine path for `key`.
    fn quarantine_path(&self, key: &str) -> PathBuf {
        let mut target = self.root.join(format!("{}.corrupt", key));
        let mut n = 0u32;
        while target.exists() {
            n += 1;
            target = self.root.join(format!("{}.corrupt.{}", key, n));
        }
        target
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        // Atomic replace: temp file + rename.
        let path = self.path_for(key);
        let tmp = self.root.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn quarantine(&mut self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let target = self.quarantine_path(key);
        fs::rename(&path, &target)?;
        Ok(Some(target.display().to_string()))
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> &'static str {
        BackendType::File.as_str()
    }
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
    /// Oldest first
    quarantined: HashMap<String, Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values moved aside by `quarantine`, oldest first.
    pub fn quarantined(&self, key: &str) -> &[String] {
        self.quarantined.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }

    fn quarantine(&mut self, key: &str) -> Result<Option<String>> {
        match self.values.remove(key) {
            Some(value) => {
                let kept = self.quarantined.entry(key.to_string()).or_default();
                kept.push(value);
                Ok(Some(format!("memory:{}.corrupt.{}", key, kept.len() - 1)))
            }
            None => Ok(None),
        }
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        BackendType::Memory.as_str()
    }
}
