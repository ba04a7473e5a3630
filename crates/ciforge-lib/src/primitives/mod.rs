//! ciforge primitives - core types and errors
//!
//! Log settings read from `CIFORGE_LOG_*` drive the test logger; config
//! errors come out of environment loading.

use serde::Deserialize;
use thiserror::Error;

/// Log levels for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "err", alias = "fatal")]
    Error,
    #[serde(rename = "warn", alias = "warning")]
    Warning,
    Info,
    Debug,
    #[serde(alias = "verbose")]
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Output formats for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line text
    #[serde(alias = "txt", alias = "plain")]
    Text,

    /// One JSON object per event
    Json,

    /// Multi-line human readable output
    #[serde(alias = "yaml", alias = "yml")]
    Pretty,
}

/// Environment prefix of [`LoggerConfig`] fields
pub const LOGGER_ENV_PREFIX: &str = "CIFORGE_LOG_";

/// Logger configuration
///
/// Read from `CIFORGE_LOG_LEVEL` and `CIFORGE_LOG_FORMAT`; unset fields keep
/// their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Text,
        }
    }
}

impl LoggerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(LOGGER_ENV_PREFIX).from_iter(vars)?)
    }
}

// ============================================================================
// STRUCTURED ERROR TYPES
// ============================================================================

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load environment file '{file}': {source}")]
    EnvFileError {
        file: String,
        source: dotenvy::Error,
    },

    #[error("Failed to parse environment variables: {source}")]
    EnvironmentParsingFailed {
        #[from]
        source: envy::Error,
    },

    #[error("Could not determine the home directory of the current user")]
    HomeDirUnavailable,
}

/// Logger initialization errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to initialize tracing subscriber: {reason}")]
    InitializationFailed { reason: String },
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
