//! End-to-end loading of per-service test configuration through `TestContext`.
//!
//! Kept to a single test: it points `CIFORGE_TEST_CONFIG_DIR` at a temporary
//! directory, and the process environment is shared by every test in this binary.

use ciforge_lib::testing::ConfigDirFixture;
use ciforge_tests::{TestContext, load_testing_conf};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[test]
fn load_testing_conf_reads_service_file_and_aborts_on_bad_input() -> anyhow::Result<()> {
    let fixture = ConfigDirFixture::new()?;
    let expected = HashMap::from([
        ("dbHost".to_string(), "localhost".to_string()),
        ("dbPort".to_string(), "5432".to_string()),
        ("redisHost".to_string(), "localhost:6379".to_string()),
    ]);
    let api_path = fixture.write_service_map("api", &expected)?;
    fixture.write_service_config("hatchery", r#"{"maxWorkers": 4}"#)?;

    // SAFETY: this binary runs no other test that reads the environment
    unsafe {
        std::env::set_var("CIFORGE_TEST_CONFIG_DIR", fixture.path());
    }

    // Well-formed file: exact mapping, source path logged
    let ctx = TestContext::current();
    let values = load_testing_conf(&ctx, "api");
    assert_eq!(values, expected);
    assert!(ctx.logs_contain(&format!(
        "Tests configuration read from {}",
        api_path.display()
    )));

    // Non-string value: the test is aborted, no partial mapping comes back
    let ctx = TestContext::new("malformed");
    let outcome = catch_unwind(AssertUnwindSafe(|| load_testing_conf(&ctx, "hatchery")));
    assert!(outcome.is_err());
    assert!(ctx.logs_contain("Invalid test configuration"));

    // Missing file: same abort path
    let ctx = TestContext::new("missing");
    let outcome = catch_unwind(AssertUnwindSafe(|| load_testing_conf(&ctx, "vcs")));
    assert!(outcome.is_err());
    assert!(ctx.logs_contain("Error reading"));

    Ok(())
}
