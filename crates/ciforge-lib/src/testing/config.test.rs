use super::*;
use crate::testing::ConfigDirFixture;
use std::cell::RefCell;

/// Reporter that keeps log lines and aborts by panicking
#[derive(Default)]
struct RecordingReporter {
    lines: RefCell<Vec<String>>,
}

impl TestReporter for RecordingReporter {
    fn name(&self) -> &str {
        "recording"
    }

    fn log(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }

    fn fail_now(&self, message: &str) -> ! {
        panic!("test aborted: {}", message)
    }
}

#[test]
fn test_resolve_returns_exact_mapping() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture
        .write_service_config(
            "api",
            r#"{"dbHost": "localhost", "dbPort": "5432", "dbPassword": ""}"#,
        )
        .unwrap();

    let values = fixture.resolver().resolve("api").unwrap();

    assert_eq!(
        values,
        HashMap::from([
            ("dbHost".to_string(), "localhost".to_string()),
            ("dbPort".to_string(), "5432".to_string()),
            ("dbPassword".to_string(), String::new()),
        ])
    );
}

#[test]
fn test_resolve_is_keyed_by_service_type() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture
        .write_service_config("api", r#"{"role": "api"}"#)
        .unwrap();
    fixture
        .write_service_config("hatchery", r#"{"role": "hatchery"}"#)
        .unwrap();

    let resolver = fixture.resolver();
    assert_eq!(resolver.resolve("api").unwrap()["role"], "api");
    assert_eq!(resolver.resolve("hatchery").unwrap()["role"], "hatchery");
}

#[test]
fn test_resolve_empty_file_is_empty_mapping() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture.write_service_config("repositories", "").unwrap();

    let values = fixture.resolver().resolve("repositories").unwrap();
    assert!(values.is_empty());
}

#[test]
fn test_resolve_whitespace_only_file_is_parse_error() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture.write_service_config("repositories", "\n  \n").unwrap();

    let err = fixture.resolver().resolve("repositories").unwrap_err();
    assert!(matches!(err, TestConfigError::Parse { .. }));
}

#[test]
fn test_resolve_missing_file_is_read_error() {
    let fixture = ConfigDirFixture::new().unwrap();

    let err = fixture.resolver().resolve("vcs").unwrap_err();

    match &err {
        TestConfigError::Read { path, source } => {
            assert_eq!(path, &fixture.path().join("vcs.tests.cfg.json"));
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("Error reading "));
}

#[test]
fn test_resolve_rejects_malformed_json() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture
        .write_service_config("api", r#"{"dbHost": "localhost","#)
        .unwrap();

    let err = fixture.resolver().resolve("api").unwrap_err();
    assert!(matches!(err, TestConfigError::Parse { .. }));
}

#[test]
fn test_resolve_rejects_non_string_values() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture
        .write_service_config("api", r#"{"dbHost": "localhost", "dbPort": 5432}"#)
        .unwrap();

    let err = fixture.resolver().resolve("api").unwrap_err();
    assert!(matches!(err, TestConfigError::Parse { .. }));
}

#[test]
fn test_resolve_returns_fresh_mapping_per_call() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture
        .write_service_config("api", r#"{"key": "value"}"#)
        .unwrap();
    let resolver = fixture.resolver();

    let mut first = resolver.resolve("api").unwrap();
    first.insert("key".to_string(), "changed".to_string());

    assert_eq!(resolver.resolve("api").unwrap()["key"], "value");
}

#[test]
fn test_load_or_fail_logs_source_path() {
    let fixture = ConfigDirFixture::new().unwrap();
    let path = fixture
        .write_service_config("api", r#"{"key": "value"}"#)
        .unwrap();
    let reporter = RecordingReporter::default();

    let values = fixture.resolver().load_or_fail(&reporter, "api");

    assert_eq!(values["key"], "value");
    assert_eq!(
        reporter.lines.borrow().as_slice(),
        [format!("Tests configuration read from {}", path.display())]
    );
}

#[test]
#[should_panic(expected = "test aborted: unable to load test configuration for service 'api'")]
fn test_load_or_fail_aborts_on_malformed_file() {
    let fixture = ConfigDirFixture::new().unwrap();
    fixture.write_service_config("api", "[1, 2, 3]").unwrap();

    fixture
        .resolver()
        .load_or_fail(&RecordingReporter::default(), "api");
}

#[test]
fn test_load_or_fail_logs_source_path_before_parsing() {
    let fixture = ConfigDirFixture::new().unwrap();
    let path = fixture
        .write_service_config("api", r#"{"dbPort": 5432}"#)
        .unwrap();
    let resolver = fixture.resolver();
    let reporter = RecordingReporter::default();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        resolver.load_or_fail(&reporter, "api")
    }));

    assert!(outcome.is_err());
    let lines = reporter.lines.borrow();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!("Tests configuration read from {}", path.display())
    );
    assert!(lines[1].starts_with("Invalid test configuration "));
}

#[test]
fn test_load_or_fail_logs_reason_before_aborting() {
    let fixture = ConfigDirFixture::new().unwrap();
    let resolver = fixture.resolver();
    let reporter = RecordingReporter::default();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        resolver.load_or_fail(&reporter, "missing")
    }));

    assert!(outcome.is_err());
    let lines = reporter.lines.borrow();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Error reading "));
    assert!(lines[0].contains("missing.tests.cfg.json"));
}

#[test]
fn test_environment_override_selects_directory() {
    let env = TestConfigEnvironment::from_vars([
        (
            "CIFORGE_TEST_CONFIG_DIR".to_string(),
            "/srv/ci/test-config".to_string(),
        ),
        ("UNRELATED".to_string(), "ignored".to_string()),
    ])
    .unwrap();

    let resolver = TestConfigResolver::from_environment(&env).unwrap();

    assert_eq!(resolver.config_dir(), Path::new("/srv/ci/test-config"));
    assert_eq!(
        resolver.config_path("api"),
        PathBuf::from("/srv/ci/test-config/api.tests.cfg.json")
    );
}

#[test]
fn test_environment_default_is_home_directory() {
    let env = TestConfigEnvironment::from_vars(Vec::new()).unwrap();
    assert!(env.config_dir.is_none());

    if let Some(base) = BaseDirs::new() {
        let resolver = TestConfigResolver::from_environment(&env).unwrap();
        assert_eq!(resolver.config_dir(), base.home_dir().join(".ciforge"));
    }
}

#[test]
fn test_env_files_complete_the_environment_without_touching_it() {
    let env_dir = tempfile::TempDir::new().unwrap();
    fs::write(
        env_dir.path().join(".env"),
        "CIFORGE_TEST_CONFIG_DIR=/from/dotenv\nCIFORGE_TEST_DOTENV_MARKER=written\n",
    )
    .unwrap();

    let env = TestConfigEnvironment::load_from(env_dir.path(), Vec::new()).unwrap();

    assert_eq!(env.config_dir, Some(PathBuf::from("/from/dotenv")));
    assert!(std::env::var_os("CIFORGE_TEST_DOTENV_MARKER").is_none());
}

#[test]
fn test_env_file_precedence() {
    let env_dir = tempfile::TempDir::new().unwrap();
    fs::write(
        env_dir.path().join(".env"),
        "CIFORGE_TEST_CONFIG_DIR=/from/dotenv\n",
    )
    .unwrap();
    fs::write(
        env_dir.path().join(".env.local"),
        "CIFORGE_TEST_CONFIG_DIR=/from/dotenv-local\n",
    )
    .unwrap();

    let env = TestConfigEnvironment::load_from(env_dir.path(), Vec::new()).unwrap();
    assert_eq!(env.config_dir, Some(PathBuf::from("/from/dotenv-local")));

    let env = TestConfigEnvironment::load_from(
        env_dir.path(),
        [(
            "CIFORGE_TEST_CONFIG_DIR".to_string(),
            "/from/process".to_string(),
        )],
    )
    .unwrap();
    assert_eq!(env.config_dir, Some(PathBuf::from("/from/process")));
}

#[test]
fn test_missing_env_files_are_ignored() {
    let env_dir = tempfile::TempDir::new().unwrap();

    let env = TestConfigEnvironment::load_from(env_dir.path(), Vec::new()).unwrap();
    assert!(env.config_dir.is_none());
}

#[test]
fn test_malformed_env_file_is_reported() {
    let env_dir = tempfile::TempDir::new().unwrap();
    fs::write(env_dir.path().join(".env.local"), "NOT A PAIR\n").unwrap();

    let err = TestConfigEnvironment::load_from(env_dir.path(), Vec::new()).unwrap_err();

    match err {
        ConfigError::EnvFileError { file, .. } => assert!(file.ends_with(".env.local")),
        other => panic!("unexpected error: {other}"),
    }
}
