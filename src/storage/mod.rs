//! Storage layer for AgriPulse data.
//!
//! The store is a flat key-value mapping from named slots to values. List
//! slots (fields, tasks, inventory, listings) hold JSON documents; scalar
//! slots (current field, login flag, user name and email, theme) hold plain
//! strings.
//!
//! ## Storage Backends
//!
//! - **File backend** (default): `~/.local/share/agripulse/<key>.json`,
//!   or `$AGRIPULSE_DATA_DIR/<key>.json` when the override is set
//! - **Memory backend**: nothing is written to disk
//!
//! ## Corrupt data
//!
//! A slot whose JSON no longer parses never aborts start-up. It is moved
//! aside (`<key>.corrupt` for the file backend), a warning is logged, and
//! the caller-supplied default is used instead.

pub mod backend;

pub use backend::{BackendType, FileBackend, MemoryBackend, StorageBackend};

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "AGRIPULSE_DATA_DIR";

/// Named storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    UserFields,
    CurrentFieldId,
    MarketplaceListings,
    FarmTasks,
    FarmInventory,
    LoggedIn,
    UserName,
    UserEmail,
    Theme,
}

impl StorageKey {
    /// Every known slot, in a stable order.
    pub fn all() -> &'static [StorageKey] {
        &[
            StorageKey::UserFields,
            StorageKey::CurrentFieldId,
            StorageKey::MarketplaceListings,
            StorageKey::FarmTasks,
            StorageKey::FarmInventory,
            StorageKey::LoggedIn,
            StorageKey::UserName,
            StorageKey::UserEmail,
            StorageKey::Theme,
        ]
    }

    /// Key name as written to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::UserFields => "agripulseUserFields",
            StorageKey::CurrentFieldId => "agripulseCurrentFieldId",
            StorageKey::MarketplaceListings => "agripulseMarketplaceListings",
            StorageKey::FarmTasks => "agripulseFarmTasks",
            StorageKey::FarmInventory => "agripulseFarmInventory",
            StorageKey::LoggedIn => "agripulseLoggedIn",
            StorageKey::UserName => "agripulseUserName",
            StorageKey::UserEmail => "agripulseUserEmail",
            StorageKey::Theme => "agripulseTheme",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key-value store over a pluggable backend.
pub struct Storage {
    backend: Box<dyn StorageBackend>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend.backend_type())
            .field("location", &self.backend.location())
            .finish()
    }
}

impl Storage {
    /// Wrap an arbitrary backend.
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Open file-backed storage in the default data directory.
    pub fn open() -> Result<Self> {
        let root = get_storage_dir()?;
        Self::open_with_data_dir(&root)
    }

    /// Open file-backed storage rooted at an explicit directory.
    pub fn open_with_data_dir(root: &Path) -> Result<Self> {
        Ok(Self::new(Box::new(FileBackend::new(root)?)))
    }

    /// Storage that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    pub fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }

    /// Load a JSON slot, falling back to `default` when the slot is absent,
    /// unreadable or malformed.
    pub fn load<T: DeserializeOwned>(&mut self, key: StorageKey, default: T) -> T {
        let raw = match self.backend.read(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}. Using defaults.", key, e);
                return default;
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => value,
            Err(e) => {
                match self.backend.quarantine(key.as_str()) {
                    Ok(Some(location)) => tracing::warn!(
                        "Stored {} is not valid JSON ({}). Moved to {} and using defaults.",
                        key,
                        e,
                        location
                    ),
                    Ok(None) => {
                        tracing::warn!("Stored {} is not valid JSON ({}). Using defaults.", key, e)
                    }
                    Err(qe) => tracing::warn!(
                        "Stored {} is not valid JSON ({}); quarantine failed ({}). Using defaults.",
                        key,
                        e,
                        qe
                    ),
                }
                default
            }
        }
    }

    /// Serialize `value` into a JSON slot.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: StorageKey, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.write(key.as_str(), &json)?;
        tracing::debug!("Saved {} ({} bytes)", key, json.len());
        Ok(())
    }

    /// Load a plain string slot.
    pub fn load_string(&self, key: StorageKey) -> Option<String> {
        match self.backend.read(key.as_str()) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Write a plain string slot.
    pub fn save_string(&mut self, key: StorageKey, value: &str) -> Result<()> {
        self.backend.write(key.as_str(), value)
    }

    /// Remove every known slot.
    pub fn clear(&mut self) -> Result<()> {
        for key in StorageKey::all() {
            self.backend.remove(key.as_str())?;
        }
        Ok(())
    }
}

/// Get the data directory.
///
/// `$AGRIPULSE_DATA_DIR` when set, otherwise `<XDG data dir>/agripulse`.
pub fn get_storage_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("agripulse"))
}

/// Generate a unique ID.
///
/// Format: `<prefix>-<8 hex chars>`
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..8])
}
