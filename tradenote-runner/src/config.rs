//! Serializable application configuration.
//!
//! Every field has a default, so an absent file or a partial file is valid:
//!
//! ```toml
//! [source]
//! history_path = "history.json"
//!
//! [ledger]
//! path = "tradenote.csv"
//! create_if_missing = false
//!
//! [terminal]
//! time_shift_hours = 9
//!
//! [display]
//! weekday_locale = "ja"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradenote_core::{Localization, TerminalClock, WeekdayLocale};

/// Largest accepted clock shift in either direction.
const MAX_SHIFT_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where deal history is read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub history_path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("history.json"),
        }
    }
}

/// Where trade rows are appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
    /// Start a fresh ledger (header row only) when the file does not exist.
    pub create_if_missing: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tradenote.csv"),
            create_if_missing: false,
        }
    }
}

/// Terminal clock settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerminalConfig {
    /// Hours the terminal clock runs ahead of the user's wall clock.
    ///
    /// The default of 9 assumes the wall clock is UTC. Times typed at the
    /// prompt are taken as-is, with no local timezone applied, so on a host
    /// whose local zone already matches the terminal (UTC+9 against a
    /// UTC+9 terminal) this should be 0. In general use the terminal's UTC
    /// offset minus the local one.
    pub time_shift_hours: i64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { time_shift_hours: 9 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub weekday_locale: WeekdayLocale,
}

/// Complete configuration for an export run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub ledger: LedgerConfig,
    pub terminal: TerminalConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terminal.time_shift_hours.abs() > MAX_SHIFT_HOURS {
            return Err(ConfigError::Invalid(format!(
                "terminal.time_shift_hours must be within ±{MAX_SHIFT_HOURS}, got {}",
                self.terminal.time_shift_hours
            )));
        }
        if self.ledger.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("ledger.path must not be empty".into()));
        }
        if self.source.history_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("source.history_path must not be empty".into()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Clock shift and weekday language derived from this config.
    pub fn localization(&self) -> Localization {
        Localization {
            clock: TerminalClock::from_hours(self.terminal.time_shift_hours),
            weekdays: self.display.weekday_locale,
        }
    }
}
