//! Local persistence of the progress record.
//!
//! This module provides:
//! - ProgressStore: the storage seam the session talks to
//! - FileStore: one JSON file in the platform data directory
//! - MemoryStore: in-process store for tests and embedding
//!
//! An unreadable record is treated as absent, so a damaged save degrades to a
//! fresh game instead of blocking startup.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::progress::{now_millis, ProgressState};

/// File name of the stored record.
pub const STATE_FILE: &str = "escape_em_state_v1.json";

/// Directory created under the platform data directory.
pub const APP_DIR: &str = "escape-em";

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Where the live progress record is kept between runs.
pub trait ProgressStore {
    /// Loads the stored record, or `None` when there is nothing usable.
    fn load(&self) -> StorageResult<Option<ProgressState>>;

    /// Replaces the stored record.
    fn save(&mut self, state: &ProgressState) -> StorageResult<()>;

    /// Removes the stored record.
    fn clear(&mut self) -> StorageResult<()>;
}

/// Parses a stored record, logging and discarding anything unusable.
fn parse_record(raw: &str, source: &str) -> Option<ProgressState> {
    match ProgressState::from_json(raw, now_millis()) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("Ignoring unreadable progress record in {source}: {e}");
            None
        },
    }
}

/// Stores the record as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Platform data directory for the game, falling back to the working
    /// directory when the platform has none.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Full path of the record file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!("{STATE_FILE}.tmp"))
    }

    /// Writes to a temp file, then renames over the record.
    fn atomic_write(&self, data: &[u8]) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;
        let temp_path = self.temp_path();

        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(data)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, self.path()).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::Io(e)
        })
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl ProgressStore for FileStore {
    fn load(&self) -> StorageResult<Option<ProgressState>> {
        let path = self.path();
        if !path.exists() {
            debug!("No progress record at {}", path.display());
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(parse_record(&raw, &path.display().to_string()))
    }

    fn save(&mut self, state: &ProgressState) -> StorageResult<()> {
        let json = serde_json::to_string(state)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.atomic_write(json.as_bytes())?;
        debug!("Saved {} bytes to {}", json.len(), self.path().display());
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path)?;
            info!("Removed progress record {}", path.display());
        }
        Ok(())
    }
}

/// Keeps the serialized record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `raw`, which need not be valid.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// The serialized record, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> StorageResult<Option<ProgressState>> {
        Ok(self.raw.as_deref().and_then(|raw| parse_record(raw, "memory")))
    }

    fn save(&mut self, state: &ProgressState) -> StorageResult<()> {
        let json = serde_json::to_string(state)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.raw = Some(json);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.raw = None;
        Ok(())
    }
}
