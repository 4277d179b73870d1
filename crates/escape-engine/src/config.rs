//! Engine configuration.
//!
//! Where progress is stored, the teacher bypass phrase and the default log
//! filter. Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use escape_gameplay::{FileStore, DEFAULT_TEACHER_CODE};

/// Configuration file name.
const CONFIG_FILE: &str = "escape.toml";

/// Log filter used when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_FILTER: &str = "escape_em=info,escape_gameplay=info";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the progress record (None = platform data dir)
    pub save_dir: Option<PathBuf>,
    /// Phrase that enables teacher mode when entered as a code
    pub teacher_code: String,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            teacher_code: DEFAULT_TEACHER_CODE.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Why a config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for this config.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl EngineConfig {
    /// Read configuration from `path` without logging.
    ///
    /// `Ok(None)` means there is no file. Callers that load config before
    /// logging is up report the outcome later through [`Self::from_loaded`].
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.validate();
        Ok(Some(config))
    }

    /// Log the outcome of [`Self::read_from`] and fall back to defaults when
    /// the file is missing or invalid.
    pub fn from_loaded(loaded: Result<Option<Self>, ConfigError>, path: &Path) -> Self {
        match loaded {
            Ok(Some(config)) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Ok(None) => {
                info!("Config file not found, using defaults");
                Self::default()
            },
            Err(e) => {
                warn!("{e} ({}); using defaults", path.display());
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from(CONFIG_FILE),
            |dir| dir.join("escape-em").join(CONFIG_FILE),
        )
    }

    /// Normalize values: blank strings fall back to their defaults.
    pub fn validate(&mut self) {
        let teacher_code = self.teacher_code.trim();
        self.teacher_code = if teacher_code.is_empty() {
            DEFAULT_TEACHER_CODE.to_string()
        } else {
            teacher_code.to_string()
        };

        if self.log_filter.trim().is_empty() {
            self.log_filter = DEFAULT_LOG_FILTER.to_string();
        }

        if self
            .save_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            self.save_dir = None;
        }
    }

    /// Directory the progress record lives in.
    #[must_use]
    pub fn resolved_save_dir(&self) -> PathBuf {
        self.save_dir.clone().unwrap_or_else(FileStore::default_dir)
    }
}
