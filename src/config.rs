//! User configuration loaded from `~/.pomo/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timer::{SessionDurations, BREAK_SECS, WORK_SECS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the task store; defaults to `~/.pomo`.
    pub data_dir: Option<PathBuf>,
    /// Work phase length in seconds.
    pub work_secs: u32,
    /// Break phase length in seconds.
    pub break_secs: u32,
    /// Ring the terminal bell when a phase ends.
    pub bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            work_secs: WORK_SECS,
            break_secs: BREAK_SECS,
            bell: true,
        }
    }
}

impl Config {
    /// Load from `path` when given, else from the default location if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load_from(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.work_secs == 0 || self.break_secs == 0 {
            return Err(ConfigError::Invalid("work_secs and break_secs must be positive".into()));
        }
        Ok(())
    }

    /// `~/.pomo`, or `./.pomo` when no home directory is known.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".pomo")
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Directory for the task store, honouring an explicit override first.
    pub fn resolve_data_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(Self::home_dir)
    }

    pub fn durations(&self) -> SessionDurations {
        SessionDurations { work_secs: self.work_secs, break_secs: self.break_secs }
    }
}
