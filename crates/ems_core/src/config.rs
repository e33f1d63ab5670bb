//! Runtime configuration loading.
//!
//! # Invariants
//! - Every field has a default; an absent file yields `EmsConfig::default()`.
//! - `report.fixed_rate_ms` is always > 0 after a successful load.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_DATABASE_FILE: &str = "ems.sqlite3";
const DEFAULT_REPORT_FIXED_RATE_MS: u64 = 60_000;

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmsConfig {
    pub database_path: PathBuf,
    /// `None` means the build-mode default (`debug` or `info`).
    pub log_level: Option<String>,
    /// Absolute directory for rotating log files; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    pub report: ReportConfig,
}

impl Default for EmsConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: None,
            log_dir: None,
            report: ReportConfig::default(),
        }
    }
}

/// Scheduling knobs for the aggregate report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Interval between report runs, in milliseconds.
    pub fixed_rate_ms: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fixed_rate_ms: DEFAULT_REPORT_FIXED_RATE_MS,
        }
    }
}

impl ReportConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.fixed_rate_ms)
    }
}

/// Configuration load failure.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl EmsConfig {
    /// Parses TOML text; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.report.fixed_rate_ms == 0 {
            return Err(ConfigError::Invalid(
                "report.fixed_rate_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Loads configuration from `path`, or defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<EmsConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => EmsConfig::from_toml_str(&text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(EmsConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
