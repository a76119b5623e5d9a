use mailfilter::OutputFormat;
use mailfilter::config::{ConfigError, load_config, load_config_from_path};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_no_path_gives_defaults() {
    let config = load_config(None).expect("defaults");
    assert_eq!(config.output.format, OutputFormat::Text);
    assert!(config.archive.unescape_from);
    assert!(config.fields.aliases.is_empty());
}

#[test]
fn test_partial_config_keeps_other_defaults() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("mailfilter.toml");
    fs::write(&path, "[archive]\nunescape_from = false\n").expect("write config");

    let config = load_config_from_path(&path).expect("valid config");
    assert!(!config.archive.unescape_from);
    assert_eq!(config.output.format, OutputFormat::Text);
}

#[test]
fn test_aliases_resolve_case_insensitively() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("mailfilter.toml");
    fs::write(&path, "[fields.aliases]\nSender = \"From\"\nwhen = \"date\"\n")
        .expect("write config");

    let config = load_config_from_path(&path).expect("valid config");
    assert_eq!(config.fields.resolve("sender"), "from");
    assert_eq!(config.fields.resolve("WHEN"), "date");
    assert_eq!(config.fields.resolve("subject"), "subject");
}

#[test]
fn test_invalid_toml_reports_path() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[output\nformat = 1").expect("write config");

    let err = load_config_from_path(&path).expect_err("broken config");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_unknown_format_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("format.toml");
    fs::write(&path, "[output]\nformat = \"yaml\"\n").expect("write config");

    assert!(matches!(
        load_config_from_path(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = tempdir().expect("temp dir");
    let err = load_config_from_path(&dir.path().join("absent.toml")).expect_err("missing");
    assert!(matches!(err, ConfigError::Read { .. }));
}
