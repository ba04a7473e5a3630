use super::*;

#[test]
fn test_filter_directives_scope_crates_to_level() {
    let directives = filter_directives(LogLevel::Debug);
    assert!(directives.starts_with("ciforge_lib=debug,ciforge_tests=debug"));
    assert!(directives.contains("reqwest=warn"));
    assert!(directives.ends_with(",debug"));
}

#[test]
fn test_filter_directives_parse() {
    for level in [LogLevel::Error, LogLevel::Info, LogLevel::Trace] {
        let filter = EnvFilter::try_new(filter_directives(level));
        assert!(filter.is_ok(), "directives for {level:?} should parse");
    }
}

#[test]
fn test_init_for_tests_is_idempotent() {
    let first = Logger::init_for_tests();
    let second = Logger::init_for_tests();

    assert!(std::ptr::eq(first, second));
    assert_eq!(Logger::config(), Some(first));
    tracing::debug!("test subscriber still usable");
}

#[test]
fn test_install_fails_once_a_subscriber_is_set() {
    let config = Logger::init_for_tests().clone();

    let err = Logger::install(&config).unwrap_err();
    assert!(matches!(err, LoggerError::InitializationFailed { .. }));
    assert!(err.to_string().starts_with("Failed to initialize tracing subscriber"));
}
