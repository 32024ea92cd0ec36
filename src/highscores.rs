//! High score persistence
//!
//! A single best score survives between sessions. Native builds keep it in
//! a small JSON file, wasm32 builds in LocalStorage. Every failure is
//! reported as a [`StoreError`] and treated by the session as "no score".

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Where the best score lives
pub trait HighScoreStore {
    /// Stored best score; 0 if nothing has been saved yet
    fn load_high_score(&self) -> Result<u64, StoreError>;
    /// Persist a new best score
    fn save_high_score(&mut self, score: u64) -> Result<(), StoreError>;
}

/// On-disk record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct HighScoreRecord {
    best: u64,
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&self) -> Result<u64, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let record: HighScoreRecord = serde_json::from_str(&json)?;
        Ok(record.best)
    }

    fn save_high_score(&mut self, score: u64) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&HighScoreRecord { best: score })?;
        std::fs::write(&self.path, json)?;
        log::info!("High score {} saved to {}", score, self.path.display());
        Ok(())
    }
}

/// In-memory store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    best: u64,
    saves: u32,
    broken: bool,
}

impl MemoryStore {
    /// Store pre-loaded with a best score
    pub fn with_score(best: u64) -> Self {
        let store = Self::default();
        if let Ok(mut slot) = store.inner.lock() {
            slot.best = best;
        }
        store
    }

    /// Store whose every call fails, like disabled browser storage
    pub fn broken() -> Self {
        let store = Self::default();
        if let Ok(mut slot) = store.inner.lock() {
            slot.broken = true;
        }
        store
    }

    /// Number of successful saves
    pub fn saves(&self) -> u32 {
        self.inner.lock().map(|slot| slot.saves).unwrap_or(0)
    }

    /// Current stored best
    pub fn best(&self) -> u64 {
        self.inner.lock().map(|slot| slot.best).unwrap_or(0)
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&self) -> Result<u64, StoreError> {
        let slot = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned"))?;
        if slot.broken {
            return Err(StoreError::Unavailable("memory store disabled"));
        }
        Ok(slot.best)
    }

    fn save_high_score(&mut self, score: u64) -> Result<(), StoreError> {
        let mut slot = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned"))?;
        if slot.broken {
            return Err(StoreError::Unavailable("memory store disabled"));
        }
        slot.best = score;
        slot.saves += 1;
        Ok(())
    }
}

/// Browser LocalStorage store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "bubbleShooterHighScore_v1";

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable("LocalStorage not accessible"))
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStorageStore {
    fn load_high_score(&self) -> Result<u64, StoreError> {
        let storage = Self::storage()?;
        let value = storage
            .get_item(Self::STORAGE_KEY)
            .map_err(|_| StoreError::Unavailable("LocalStorage read refused"))?;
        // Stored as a bare integer; anything else counts as no score
        Ok(value.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    fn save_high_score(&mut self, score: u64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage
            .set_item(Self::STORAGE_KEY, &score.to_string())
            .map_err(|_| StoreError::Unavailable("LocalStorage write refused"))?;
        log::info!("High score {} saved", score);
        Ok(())
    }
}
