use abook_kernel::config::{ConfigError, load_config, load_optional_config};
use abook_kernel::domain::config::AppConfig;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

#[test]
#[serial]
fn file_settings_are_loaded() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("abook.toml");
    fs::write(
        &path,
        r#"
[database]
url = "rocksdb://data/abook"
namespace = "tests"

[logger]
level = "debug"
"#,
    )?;

    let cfg: AppConfig = load_config(Some(&path))?;
    assert_eq!(cfg.database.url, "rocksdb://data/abook");
    assert_eq!(cfg.database.namespace, "tests");
    assert_eq!(cfg.database.database, "addresses");
    assert_eq!(cfg.logger.level, "debug");
    Ok(())
}

#[test]
#[serial]
fn missing_required_file_fails() {
    let dir = tempdir().expect("temp dir");
    let err = load_config::<AppConfig>(Some(dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Config { .. }));
}

#[test]
#[serial]
fn missing_optional_file_uses_defaults() {
    let dir = tempdir().expect("temp dir");
    let cfg: AppConfig =
        load_optional_config(Some(dir.path().join("absent.toml"))).expect("optional config");

    assert_eq!(cfg.database.url, "mem://");
    assert_eq!(cfg.database.namespace, "abook");
    assert!(cfg.logger.console);
}
