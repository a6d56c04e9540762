//! Core configuration.
//!
//! # Responsibility
//! - Hold domain constants that callers may override (`ShipRules`).
//! - Hold logging bootstrap settings (`LoggingConfig`).
//! - Load both from TOML with every field defaulted.
//!
//! # Invariants
//! - `min_production_year < reference_year`.
//! - `default_page_size >= 1`.
//! - The reference year is configuration, never read from the system clock.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_REFERENCE_YEAR: i32 = 3019;
const DEFAULT_MIN_PRODUCTION_YEAR: i32 = 2800;
const DEFAULT_PAGE_SIZE: u32 = 3;

/// Domain constants used by validation, rating and pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipRules {
    /// The "current" year of the domain. Upper bound (exclusive) for
    /// production years and the base of the rating formula.
    pub reference_year: i32,
    /// Earliest accepted production year (inclusive).
    pub min_production_year: i32,
    /// Page size used when a page request leaves it unset.
    pub default_page_size: u32,
}

impl Default for ShipRules {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            min_production_year: DEFAULT_MIN_PRODUCTION_YEAR,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ShipRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_production_year >= self.reference_year {
            return Err(ConfigError::Invalid(format!(
                "rules.min_production_year ({}) must be below rules.reference_year ({})",
                self.min_production_year, self.reference_year
            )));
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "rules.default_page_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging bootstrap settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub rules: ShipRules,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.rules.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Configuration loading failures.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::Invalid(message) => write!(f, "invalid config value: {message}"),
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
