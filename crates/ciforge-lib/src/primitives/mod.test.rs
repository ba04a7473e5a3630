use super::*;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_logger_config_defaults_when_unset() {
    let config = LoggerConfig::from_vars(vars(&[("RUST_LOG", "trace")])).unwrap();
    assert_eq!(config, LoggerConfig::default());
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.format, LogFormat::Text);
}

#[test]
fn test_logger_config_reads_prefixed_vars() {
    let config = LoggerConfig::from_vars(vars(&[
        ("CIFORGE_LOG_LEVEL", "warn"),
        ("CIFORGE_LOG_FORMAT", "json"),
    ]))
    .unwrap();

    assert_eq!(config.level, LogLevel::Warning);
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_log_level_aliases() {
    let cases = [
        ("error", LogLevel::Error),
        ("err", LogLevel::Error),
        ("fatal", LogLevel::Error),
        ("warn", LogLevel::Warning),
        ("warning", LogLevel::Warning),
        ("info", LogLevel::Info),
        ("debug", LogLevel::Debug),
        ("trace", LogLevel::Trace),
        ("verbose", LogLevel::Trace),
    ];

    for (input, expected) in cases {
        let config = LoggerConfig::from_vars(vars(&[("CIFORGE_LOG_LEVEL", input)])).unwrap();
        assert_eq!(config.level, expected, "Wrong level for input '{}'", input);
    }
}

#[test]
fn test_log_format_aliases() {
    let cases = [
        ("text", LogFormat::Text),
        ("plain", LogFormat::Text),
        ("json", LogFormat::Json),
        ("pretty", LogFormat::Pretty),
        ("yml", LogFormat::Pretty),
    ];

    for (input, expected) in cases {
        let config = LoggerConfig::from_vars(vars(&[("CIFORGE_LOG_FORMAT", input)])).unwrap();
        assert_eq!(config.format, expected, "Wrong format for input '{}'", input);
    }
}

#[test]
fn test_unknown_log_level_is_parsing_error() {
    let err = LoggerConfig::from_vars(vars(&[("CIFORGE_LOG_LEVEL", "loud")])).unwrap_err();
    assert!(matches!(err, ConfigError::EnvironmentParsingFailed { .. }));
    assert!(err.to_string().starts_with("Failed to parse environment variables"));
}

#[test]
fn test_log_level_ordering_and_directives() {
    assert!(LogLevel::Error < LogLevel::Warning);
    assert!(LogLevel::Debug < LogLevel::Trace);
    assert_eq!(LogLevel::Warning.as_directive(), "warn");
    assert_eq!(LogLevel::Trace.as_directive(), "trace");
}

#[test]
fn test_config_error_display() {
    let error = ConfigError::HomeDirUnavailable;
    assert_eq!(
        error.to_string(),
        "Could not determine the home directory of the current user"
    );
}
