//! Test helpers for ciforge services
//!
//! - [`TestKey`] - fixed, public private key for tests needing a credential
//! - [`load_testing_conf`] - per-service test configuration
//! - [`test_name`] / [`TestContext`] - the running test's handle
//! - [`FakeHttpClient`] - transport double returning a fixed outcome

pub mod conf;
pub mod context;
pub mod fake_http;
pub mod key;

// Re-export key testing utilities
pub use conf::load_testing_conf;
pub use context::{TestContext, test_name};
pub use fake_http::{FakeHttpClient, RecordedRequest};
pub use key::TestKey;
