use crate::primitives::*;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable overriding the configured filter
pub const LOG_ENV_VAR: &str = "CIFORGE_LOG";

/// Configuration of the subscriber installed for this process
static TEST_LOGGER: OnceLock<LoggerConfig> = OnceLock::new();

/// Logger implementation using tracing
#[derive(Debug)]
pub struct Logger;

impl Logger {
    /// Install a subscriber whose output goes through libtest's capture.
    ///
    /// Level and format come from `CIFORGE_LOG_LEVEL` / `CIFORGE_LOG_FORMAT`.
    /// Safe to call from every test; only the first call installs anything,
    /// and a subscriber installed by someone else is left in place.
    pub fn init_for_tests() -> &'static LoggerConfig {
        TEST_LOGGER.get_or_init(|| {
            let (config, rejected) = match LoggerConfig::from_env() {
                Ok(config) => (config, None),
                Err(e) => (LoggerConfig::default(), Some(e)),
            };

            match Self::install(&config) {
                Ok(()) => tracing::debug!(
                    level = ?config.level,
                    format = ?config.format,
                    "Test logger initialized"
                ),
                Err(e) => tracing::debug!(error = %e, "Keeping the existing subscriber"),
            }
            if let Some(e) = rejected {
                tracing::warn!(error = %e, "Ignoring invalid logger settings");
            }

            config
        })
    }

    /// Configuration picked by [`init_for_tests`](Self::init_for_tests), if it ran
    pub fn config() -> Option<&'static LoggerConfig> {
        TEST_LOGGER.get()
    }

    /// Install the global subscriber described by `config`
    pub fn install(config: &LoggerConfig) -> Result<(), LoggerError> {
        let fmt_layer = match config.format {
            LogFormat::Text => fmt::layer()
                .with_test_writer()
                .with_ansi(false)
                .compact()
                .boxed(),
            LogFormat::Json => fmt::layer().with_test_writer().json().boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_test_writer()
                .with_ansi(false)
                .pretty()
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(env_filter(config.level))
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggerError::InitializationFailed {
                reason: e.to_string(),
            })
    }
}

/// ciforge crates at `level`, noisy HTTP dependencies at warn.
fn filter_directives(level: LogLevel) -> String {
    let level_str = level.as_directive();
    format!(
        "ciforge_lib={level_str},ciforge_tests={level_str},hyper_util=warn,reqwest=warn,h2=warn,{level_str}"
    )
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(filter_directives(level)))
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
