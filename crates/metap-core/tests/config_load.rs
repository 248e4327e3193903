//! Loading pipeline configuration from disk.

use std::fs;

use metap_core::config::CONFIG_FILE_NAME;
use metap_core::{BreakStrategy, Config, ConfigError, OutputErrorCode, PassName};
use tempfile::TempDir;

#[test]
fn load_from_project_reads_metap_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[metap]\npasses = [\"log_breaks\", \"log_continues\"]\nbreak_strategy = \"wrap\"\n",
    )
    .unwrap();

    let config = Config::load_from_project(dir.path()).unwrap();
    assert_eq!(
        config.metap.passes,
        vec![PassName::LogBreaks, PassName::LogContinues]
    );
    assert_eq!(config.metap.break_strategy, BreakStrategy::Wrap);
}

#[test]
fn missing_project_config_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from_project(dir.path()).unwrap();
    assert!(config.metap.passes.is_empty());
    assert!(config.metap.range.is_empty());
}

#[test]
fn malformed_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[metap\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"), "{}", err);
    assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InvalidArguments);
}

#[test]
fn unreadable_file_is_internal() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InternalError);
}
