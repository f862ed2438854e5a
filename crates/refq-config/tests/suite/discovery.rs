use std::path::Path;

use pretty_assertions::assert_eq;
use refq_config::{
    discover_config_path, load_for_workspace, load_for_workspace_with_diagnostics,
    CompatibilityMode, ConfigError, ConfigWarning, RefqConfig,
};
use tempfile::tempdir;

fn canonical(path: &Path) -> std::path::PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[test]
fn discovers_refq_toml_in_project_root() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("refq.toml");
    std::fs::write(&config_path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let discovered = discover_config_path(dir.path()).expect("refq.toml is discovered");
    assert_eq!(discovered, canonical(&config_path));
}

#[test]
fn falls_back_to_hidden_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join(".refq.toml");
    std::fs::write(&config_path, "").unwrap();

    assert_eq!(
        discover_config_path(dir.path()),
        Some(canonical(&config_path))
    );
}

#[test]
fn refq_toml_wins_over_hidden_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".refq.toml"), "").unwrap();
    std::fs::write(dir.path().join("refq.toml"), "").unwrap();

    assert_eq!(
        discover_config_path(dir.path()),
        Some(canonical(&dir.path().join("refq.toml")))
    );
}

#[test]
fn directory_named_like_config_is_ignored() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("refq.toml")).unwrap();
    assert_eq!(discover_config_path(dir.path()), None);
}

#[test]
fn missing_config_yields_defaults() {
    let dir = tempdir().unwrap();
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(config, RefqConfig::default());
    assert_eq!(path, None);
}

#[test]
fn loads_compatibility_table_with_diagnostics() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("refq.toml"),
        r#"
[compatibility]
mode = "table"

[[compatibility.rules]]
actual = "java.lang.Integer"
declared = "short"

[[compatibility.rules]]
actual = "java.lang.Integer"
declared = "short"
note = "copied"
"#,
    )
    .unwrap();

    let (config, path, diagnostics) = load_for_workspace_with_diagnostics(dir.path()).unwrap();
    assert!(path.is_some());
    assert_eq!(config.compatibility.mode, CompatibilityMode::Table);
    assert_eq!(config.compatibility.rules.len(), 2);
    assert_eq!(diagnostics.unknown_keys, vec!["compatibility.rules[1].note"]);
    assert_eq!(
        diagnostics.warnings,
        vec![ConfigWarning::DuplicateCompatibilityRule {
            toml_path: "compatibility.rules[1]".into()
        }]
    );
    assert!(diagnostics.is_ok());
}

#[test]
fn unreadable_config_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = RefqConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err:?}");
}

#[test]
fn toml_errors_do_not_echo_the_source_line() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("refq.toml"),
        "[logging]\nlevel = \"debug\"\njson = \"not-a-bool\"\n",
    )
    .unwrap();

    let err = load_for_workspace(dir.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("failed to parse toml config"), "{message}");
    assert!(!message.contains("level = "), "{message}");
}
