//! High-score persistence.
//!
//! The record is a single non-negative integer under a fixed key. Stores are
//! opaque to the session: it reads once when it is created and writes when a
//! finished session beats the record.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;

use crate::error::{StoreError, StoreResult};

/// Key (file name) the record is kept under.
pub const HIGH_SCORE_KEY: &str = "neon_aim_strikers_high_score";

pub trait HighScoreStore: Send {
    /// Stored record, or 0 when nothing has been saved yet.
    fn load(&self) -> StoreResult<u32>;

    fn save(&self, score: u32) -> StoreResult<()>;
}

impl<S: HighScoreStore + Sync> HighScoreStore for Arc<S> {
    fn load(&self) -> StoreResult<u32> {
        (**self).load()
    }

    fn save(&self, score: u32) -> StoreResult<()> {
        (**self).save(score)
    }
}

// ── File-backed store ─────────────────────────────────────────────────────────

/// Plain-text integer in `{dir}/neon_aim_strikers_high_score`.
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        FileHighScoreStore {
            path: dir.as_ref().join(HIGH_SCORE_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> StoreResult<u32> {
        if !self.path.exists() {
            return Ok(0);
        }
        let raw = fs::read_to_string(&self.path)?;
        let trimmed = raw.trim();
        trimmed
            .parse()
            .map_err(|_| StoreError::Corrupted(trimmed.to_string()))
    }

    fn save(&self, score: u32) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, score.to_string())?;
        Ok(())
    }
}

/// Platform-specific directory for the record and the log file.
pub fn default_data_dir() -> StoreResult<PathBuf> {
    ProjectDirs::from("", "", "neon_aim")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StoreError::NoDataDir)
}

// ── In-memory store ───────────────────────────────────────────────────────────

/// Volatile store for tests and runs without usable storage.
#[derive(Default)]
pub struct MemoryHighScoreStore {
    value: Mutex<u32>,
}

impl MemoryHighScoreStore {
    pub fn new(initial: u32) -> Self {
        MemoryHighScoreStore {
            value: Mutex::new(initial),
        }
    }

    pub fn get(&self) -> u32 {
        self.value.lock().map(|v| *v).unwrap_or_else(|e| *e.into_inner())
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> StoreResult<u32> {
        Ok(self.get())
    }

    fn save(&self, score: u32) -> StoreResult<()> {
        match self.value.lock() {
            Ok(mut v) => *v = score,
            Err(e) => *e.into_inner() = score,
        }
        Ok(())
    }
}
