//! Temporary test-configuration directories
//!
//! The directory is removed when the fixture drops, so every test gets its
//! own isolated set of `<service>.tests.cfg.json` files.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::config::TestConfigResolver;

/// Temporary configuration directory with automatic cleanup
pub struct ConfigDirFixture {
    temp_dir: TempDir,
}

impl ConfigDirFixture {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolver reading from this directory instead of the user's home
    pub fn resolver(&self) -> TestConfigResolver {
        TestConfigResolver::new(self.path())
    }

    /// Write raw content as the configuration file of `service_type`
    pub fn write_service_config(&self, service_type: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.resolver().config_path(service_type);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Serialize `values` as the configuration file of `service_type`
    pub fn write_service_map(
        &self,
        service_type: &str,
        values: &HashMap<String, String>,
    ) -> io::Result<PathBuf> {
        let content = serde_json::to_string_pretty(values)?;
        self.write_service_config(service_type, &content)
    }

    /// Write an arbitrary file relative to the fixture root, creating parents
    pub fn write_file(&self, relative: &str, content: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let full_path = self.path().join(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content)?;
        Ok(full_path)
    }
}

#[cfg(test)]
mod tests {
    include!("filesystem.test.rs");
}
