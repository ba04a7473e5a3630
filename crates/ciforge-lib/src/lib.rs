//! # ciforge Library
//!
//! Shared plumbing for the ciforge build engine and its test suites.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Foundation types and errors
//! - [`logger`] - Structured logging on top of `tracing`
//! - [`networking`] - The [`HttpClient`] transport capability and its live implementation
//! - `testing` - Test configuration loading and fixtures (feature `test-utils`)

pub mod logger;
pub mod networking;
pub mod primitives;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use logger::Logger;
pub use networking::{
    HttpClient, HttpRequest, HttpResponse, LiveHttpClient, NetworkingConfig, RequestBody,
    TransportError,
};
pub use primitives::{ConfigError, LogFormat, LogLevel, LoggerConfig, LoggerError};
