//! Process configuration read from the environment.
//!
//! # Responsibility
//! - Resolve log level, log directory and database location once at startup.
//!
//! # Invariants
//! - `log_level` is always one of `trace|debug|info|warn|error`.
//! - `log_dir` is always absolute, as required by `init_logging`.
//! - Blank variables count as unset.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const LOG_LEVEL_VAR: &str = "OUTLINER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "OUTLINER_LOG_DIR";
pub const DB_PATH_VAR: &str = "OUTLINER_DB_PATH";

const DEFAULT_LOG_SUBDIR: &str = "outliner-logs";

/// Configuration errors surfaced before logging is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_VAR}: {message}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "{LOG_DIR_VAR} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: &'static str,
    pub log_dir: PathBuf,
    /// SQLite file; `None` keeps outlines in memory.
    pub db_path: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads `OUTLINER_LOG_LEVEL`, `OUTLINER_LOG_DIR` and `OUTLINER_DB_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let log_level = match value(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = match value(LOG_DIR_VAR).map(PathBuf::from) {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => return Err(ConfigError::RelativeLogDir(dir)),
            None => std::env::temp_dir().join(DEFAULT_LOG_SUBDIR),
        };

        Ok(Self {
            log_level,
            log_dir,
            db_path: value(DB_PATH_VAR).map(PathBuf::from),
        })
    }
}
