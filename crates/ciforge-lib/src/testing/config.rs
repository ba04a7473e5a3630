//! Per-service test configuration
//!
//! Integration tests that need real backing services (databases, object
//! stores, VCS servers) read their connection settings from
//! `<dir>/<service_type>.tests.cfg.json`, a flat JSON object of string values.
//! `<dir>` is `$CIFORGE_TEST_CONFIG_DIR` when set, `~/.ciforge` otherwise.

use crate::primitives::ConfigError;
use directories::BaseDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::TestReporter;

/// Prefix of the environment variables read by [`TestConfigEnvironment`]
pub const ENV_PREFIX: &str = "CIFORGE_TEST_";

/// Directory under the home directory used when no override is set
pub const DEFAULT_CONFIG_DIR: &str = ".ciforge";

const CONFIG_FILE_SUFFIX: &str = "tests.cfg.json";

/// Test configuration loading errors
#[derive(Debug, Error)]
pub enum TestConfigError {
    #[error("Error reading {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid test configuration {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Environment variables controlling where test configuration lives
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestConfigEnvironment {
    /// CIFORGE_TEST_CONFIG_DIR
    pub config_dir: Option<PathBuf>,
}

impl TestConfigEnvironment {
    /// Load from the process environment, completed by `.env.local` and
    /// `.env` in the working directory.
    ///
    /// The env files are only read; the process environment is never written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), std::env::vars())
    }

    /// Load from `vars`, completed by the env files found in `dir`.
    ///
    /// Precedence: `vars`, then `.env.local`, then `.env`.
    pub fn load_from<I>(dir: &Path, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = HashMap::new();
        for env_file in [".env", ".env.local"] {
            merged.extend(read_env_file(&dir.join(env_file))?);
        }
        merged.extend(vars);
        Self::from_vars(merged)
    }

    /// Load from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }
}

/// Pairs declared in `path`. A missing file declares nothing.
fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let env_file_error = |source: dotenvy::Error| ConfigError::EnvFileError {
        file: path.display().to_string(),
        source,
    };

    match dotenvy::from_path_iter(path) {
        Ok(pairs) => pairs
            .collect::<Result<Vec<_>, _>>()
            .map_err(env_file_error),
        Err(e) if e.not_found() => Ok(Vec::new()),
        Err(e) => Err(env_file_error(e)),
    }
}

/// Locates and parses per-service test configuration files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfigResolver {
    config_dir: PathBuf,
}

impl TestConfigResolver {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Resolver for the current process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(&TestConfigEnvironment::load()?)
    }

    pub fn from_environment(env: &TestConfigEnvironment) -> Result<Self, ConfigError> {
        match &env.config_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => {
                let base = BaseDirs::new().ok_or(ConfigError::HomeDirUnavailable)?;
                Ok(Self::new(base.home_dir().join(DEFAULT_CONFIG_DIR)))
            }
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the configuration file for `service_type`
    pub fn config_path(&self, service_type: &str) -> PathBuf {
        self.config_dir
            .join(format!("{}.{}", service_type, CONFIG_FILE_SUFFIX))
    }

    /// Read the configuration of `service_type`.
    ///
    /// A zero-byte file yields an empty mapping. Anything other than a JSON
    /// object of string values is an error; no partial mapping is returned.
    pub fn resolve(&self, service_type: &str) -> Result<HashMap<String, String>, TestConfigError> {
        let (path, content) = self.read(service_type)?;
        parse_config(path, &content)
    }

    /// Like [`resolve`](Self::resolve), but reports through the test handle
    /// and aborts the test on failure.
    pub fn load_or_fail<R>(&self, reporter: &R, service_type: &str) -> HashMap<String, String>
    where
        R: TestReporter + ?Sized,
    {
        let loaded = self.read(service_type).and_then(|(path, content)| {
            reporter.log(&format!("Tests configuration read from {}", path.display()));
            parse_config(path, &content)
        });

        match loaded {
            Ok(values) => {
                debug!(
                    test = reporter.name(),
                    service_type,
                    keys = values.len(),
                    "Loaded test configuration"
                );
                values
            }
            Err(e) => {
                reporter.log(&e.to_string());
                reporter.fail_now(&format!(
                    "unable to load test configuration for service '{}'",
                    service_type
                ))
            }
        }
    }

    fn read(&self, service_type: &str) -> Result<(PathBuf, String), TestConfigError> {
        let path = self.config_path(service_type);
        match fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(source) => Err(TestConfigError::Read { path, source }),
        }
    }
}

fn parse_config(path: PathBuf, content: &str) -> Result<HashMap<String, String>, TestConfigError> {
    if content.is_empty() {
        debug!(path = %path.display(), "Test configuration file is empty");
        return Ok(HashMap::new());
    }

    serde_json::from_str(content).map_err(|source| TestConfigError::Parse { path, source })
}

/// Load the test configuration of `service_type` for the running test.
///
/// Any failure (unresolvable directory, missing file, malformed content) is
/// logged through `reporter` and aborts the test via
/// [`TestReporter::fail_now`].
pub fn load_testing_conf<R>(reporter: &R, service_type: &str) -> HashMap<String, String>
where
    R: TestReporter + ?Sized,
{
    match TestConfigResolver::from_env() {
        Ok(resolver) => resolver.load_or_fail(reporter, service_type),
        Err(e) => {
            reporter.log(&e.to_string());
            reporter.fail_now("unable to locate the test configuration directory")
        }
    }
}

#[cfg(test)]
mod tests {
    include!("config.test.rs");
}
