//! Test execution handle
//!
//! [`TestContext`] is what helpers receive in place of "the running test":
//! it knows the test's name, collects its diagnostic lines and aborts it.

use ciforge_lib::Logger;
use ciforge_lib::testing::TestReporter;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Name used when the current thread carries none
pub const UNNAMED_TEST: &str = "unnamed";

/// Handle to one running test
///
/// Clones share the same log, so a handle given to a test double records
/// into the log the test itself inspects.
#[derive(Debug, Clone)]
pub struct TestContext {
    name: Arc<str>,
    logs: Arc<Mutex<Vec<String>>>,
}

impl TestContext {
    /// Context for a test registered as `name`
    pub fn new(name: impl Into<String>) -> Self {
        Logger::init_for_tests();
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            logs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Context for the test running on this thread.
    ///
    /// libtest runs each test on a thread named after the test's full path
    /// (`module::test_fn`).
    pub fn current() -> Self {
        let thread = std::thread::current();
        Self::new(thread.name().unwrap_or(UNNAMED_TEST))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a diagnostic line and emit it through `tracing`
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(test = %self.name, "{}", message);
        self.lock_logs().push(message);
    }

    /// Lines logged so far, oldest first
    pub fn logs(&self) -> Vec<String> {
        self.lock_logs().clone()
    }

    pub fn logs_contain(&self, needle: &str) -> bool {
        self.lock_logs().iter().any(|line| line.contains(needle))
    }

    // A test that panicked mid-log must not hide the lines of later ones
    fn lock_logs(&self) -> MutexGuard<'_, Vec<String>> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TestReporter for TestContext {
    fn name(&self) -> &str {
        TestContext::name(self)
    }

    fn log(&self, message: &str) {
        TestContext::log(self, message);
    }

    fn fail_now(&self, message: &str) -> ! {
        tracing::error!(test = %self.name, "{}", message);
        panic!("{}: {}", self.name, message)
    }
}

/// Name the test behind `ctx` was registered under, unchanged
pub fn test_name(ctx: &TestContext) -> &str {
    ctx.name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_returned_unchanged() {
        let ctx = TestContext::new("TestWorkerModelImport/with spaces & symbols");
        assert_eq!(test_name(&ctx), "TestWorkerModelImport/with spaces & symbols");
    }

    #[test]
    fn test_current_uses_libtest_thread_name() {
        let ctx = TestContext::current();
        assert_eq!(
            test_name(&ctx),
            "context::tests::test_current_uses_libtest_thread_name"
        );
    }

    #[test]
    fn test_unnamed_thread_falls_back() {
        let name = std::thread::Builder::new()
            .spawn(|| TestContext::current().name().to_string())
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(name, UNNAMED_TEST);
    }

    #[test]
    fn test_clones_share_logs() {
        let ctx = TestContext::new("shared");
        let double = ctx.clone();

        double.log("from the double");
        ctx.log(String::from("from the test"));

        assert_eq!(ctx.logs(), vec!["from the double", "from the test"]);
        assert!(ctx.logs_contain("double"));
        assert!(!ctx.logs_contain("missing"));
    }

    #[test]
    fn test_reporter_log_records_line() {
        let ctx = TestContext::new("reporter");
        TestReporter::log(&ctx, "through the trait");

        assert_eq!(TestReporter::name(&ctx), "reporter");
        assert_eq!(ctx.logs(), vec!["through the trait"]);
    }

    #[test]
    #[should_panic(expected = "aborting: configuration missing")]
    fn test_fail_now_aborts_the_test() {
        let ctx = TestContext::new("aborting");
        ctx.fail_now("configuration missing");
    }
}
