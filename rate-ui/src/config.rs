//! Runtime configuration.
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. command-line flags ([`Overrides`]),
//! 2. an optional TOML file ([`FileConfig`]),
//! 3. built-in defaults.
//!
//! ```toml
//! source = "data/historical_rates.csv"
//! log_level = "info"
//! log_file = "rate-history.log"
//! export_dir = "exports"
//! chart_dir = "charts"
//! min_date = "2012-01-01"
//! ```

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::logging;

pub const DEFAULT_SOURCE: &str = "rates.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Earliest supply period offered by the date range input.
pub fn default_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2012, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error("export directory '{0}' does not exist")]
    MissingExportDir(PathBuf),

    #[error("chart directory '{0}' does not exist")]
    MissingChartDir(PathBuf),

    #[error("minimum date {min} is after today ({today})")]
    MinDateInFuture { min: NaiveDate, today: NaiveDate },
}

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub chart_dir: Option<PathBuf>,
    pub min_date: Option<NaiveDate>,
}

impl FileConfig {
    pub fn from_toml(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Where downloads are written.
    pub export_dir: PathBuf,
    /// Where charts are written; charts are summarised as text when unset.
    pub chart_dir: Option<PathBuf>,
    pub min_date: NaiveDate,
}

impl Settings {
    /// Merges the layers and validates the result.
    pub fn resolve(
        overrides: Overrides,
        file: FileConfig,
        today: NaiveDate,
    ) -> Result<Self, ConfigError> {
        let settings = Self {
            source: overrides
                .source
                .or(file.source)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE)),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: overrides.log_file.or(file.log_file),
            export_dir: file.export_dir.unwrap_or_else(|| PathBuf::from(".")),
            chart_dir: file.chart_dir,
            min_date: file.min_date.unwrap_or_else(default_min_date),
        };
        settings.validate(today)?;
        Ok(settings)
    }

    fn validate(
        &self,
        today: NaiveDate,
    ) -> Result<(), ConfigError> {
        if !logging::is_valid_level(&self.log_level) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        if !self.export_dir.is_dir() {
            return Err(ConfigError::MissingExportDir(self.export_dir.clone()));
        }
        if let Some(dir) = &self.chart_dir {
            if !dir.is_dir() {
                return Err(ConfigError::MissingChartDir(dir.clone()));
            }
        }
        if self.min_date > today {
            return Err(ConfigError::MinDateInFuture {
                min: self.min_date,
                today,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Settings {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Source:     {}", self.source.display())?;
        writeln!(f, "Log level:  {}", self.log_level)?;
        match &self.log_file {
            Some(path) => writeln!(f, "Log file:   {}", path.display())?,
            None => writeln!(f, "Log file:   —")?,
        }
        writeln!(f, "Exports:    {}", self.export_dir.display())?;
        match &self.chart_dir {
            Some(path) => writeln!(f, "Charts:     {}", path.display())?,
            None => writeln!(f, "Charts:     —")?,
        }
        writeln!(f, "Min date:   {}", self.min_date)
    }
}
