//! Serializable logger configuration
//!
//! ```
//! use rust_structured_logger::{LoggerConfig, LogLevel};
//!
//! let config = LoggerConfig::from_json(r#"{ "level": "warn", "output": "stderr" }"#).unwrap();
//! assert_eq!(config.level, LogLevel::Warn);
//! assert_eq!(config.layout, rust_structured_logger::DEFAULT_LAYOUT);
//! ```

use super::{
    error::{LoggerError, Result},
    layout::DEFAULT_LAYOUT,
    log_level::LogLevel,
    sink::Sink,
    timestamp::TimestampFormat,
};
use crate::sinks::{ConsoleSink, FileSink};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Where records go
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

impl OutputTarget {
    /// Open the sink this target describes
    pub fn open(&self) -> Result<Box<dyn Sink>> {
        match self {
            OutputTarget::Stdout => Ok(Box::new(ConsoleSink::stdout())),
            OutputTarget::Stderr => Ok(Box::new(ConsoleSink::stderr())),
            OutputTarget::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(LoggerError::config("output", "file path is empty"));
                }
                Ok(Box::new(FileSink::new(path.clone())?))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    #[serde(deserialize_with = "deserialize_level")]
    pub level: LogLevel,
    pub layout: String,
    pub include_caller: bool,
    pub timestamp_format: TimestampFormat,
    pub output: OutputTarget,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            layout: DEFAULT_LAYOUT.to_string(),
            include_caller: false,
            timestamp_format: TimestampFormat::default(),
            output: OutputTarget::default(),
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("reading logger config", path.display().to_string(), e)
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Levels in configuration are matched case-insensitively, with the same
/// aliases `LogLevel::from_str` accepts.
fn deserialize_level<'de, D>(deserializer: D) -> std::result::Result<LogLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}
