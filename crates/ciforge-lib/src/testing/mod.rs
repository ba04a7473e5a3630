//! Test support shared by ciforge test suites
//!
//! - Per-service test configuration files ([`config`])
//! - Temporary configuration directories with automatic cleanup ([`filesystem`])
//! - The [`TestReporter`] handle through which helpers log and abort a test

pub mod config;
pub mod filesystem;

pub use config::{TestConfigEnvironment, TestConfigError, TestConfigResolver, load_testing_conf};
pub use filesystem::ConfigDirFixture;

/// Handle to the running test, as seen by helpers
///
/// Helpers never decide how a test reports. They log through the handle and,
/// when they cannot continue, ask it to abort the test.
pub trait TestReporter {
    /// Name the test was registered under
    fn name(&self) -> &str;

    /// Record a diagnostic line for the test
    fn log(&self, message: &str);

    /// Abort the running test. Never returns.
    fn fail_now(&self, message: &str) -> !;
}
