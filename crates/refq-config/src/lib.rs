use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};

use refq_core::TypeRef;
use thiserror::Error;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

mod diagnostics;
mod schema;
mod validation;

pub use diagnostics::{
    ConfigDiagnostics, ConfigValidationError, ConfigWarning, ValidationDiagnostics,
};
pub use schema::json_schema;

/// File names probed by [`discover_config_path`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["refq.toml", ".refq.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
/// Project configuration (`refq.toml`).
///
/// ```toml
/// [logging]
/// level = "debug"
/// json = true
///
/// [compatibility]
/// mode = "table"
/// rules = [
///   { actual = "java.lang.Integer", declared = "short" },
/// ]
/// ```
pub struct RefqConfig {
    /// Logging settings for the `refq` binary.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Type-compatibility policy used when rewriting parameter lists.
    #[serde(default)]
    pub compatibility: CompatibilityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level, or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to the given file path.
    ///
    /// If the file cannot be opened, file logging is disabled while stderr logging
    /// remains active.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            "off" | "none" => "off".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        })
    }

    /// Create the effective `EnvFilter`.
    ///
    /// `level` may be either a simple level (`info`, `debug`, ...) or a full
    /// `tracing_subscriber::EnvFilter` directive string. If `RUST_LOG` is set, it is merged
    /// into the resulting filter.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityMode {
    /// A slot is kept only when its type equals the requested type.
    #[default]
    Exact,
    /// Equal types plus every configured `(actual, declared)` rule.
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct CompatibilityRule {
    /// Type of the existing argument or parameter, e.g. `java.lang.Integer` or `int[]`.
    pub actual: String,
    /// Requested declared type that `actual` is accepted for.
    pub declared: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct CompatibilityConfig {
    #[serde(default)]
    pub mode: CompatibilityMode,

    /// Extra verdicts consulted in `table` mode.
    #[serde(default)]
    pub rules: Vec<CompatibilityRule>,
}

impl CompatibilityRule {
    /// Parse both sides; `idx` is the rule's position, used in error paths.
    pub(crate) fn type_pair(&self, idx: usize) -> Result<(TypeRef, TypeRef), ConfigError> {
        let parse = |field: &str, value: &str| {
            value
                .parse::<TypeRef>()
                .map_err(|err| ConfigError::InvalidType {
                    toml_path: format!("compatibility.rules[{idx}].{field}"),
                    message: err.to_string(),
                })
        };
        Ok((parse("actual", &self.actual)?, parse("declared", &self.declared)?))
    }
}

impl CompatibilityConfig {
    /// Parse every rule into a `(actual, declared)` type pair.
    pub fn type_pairs(&self) -> Result<Vec<(TypeRef, TypeRef)>, ConfigError> {
        self.rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| rule.type_pair(idx))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid type at {toml_path}: {message}")]
    InvalidType { toml_path: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // `Display` includes a source snippet; keep just the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl RefqConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let (config, _) = Self::load_from_path_with_diagnostics(path)?;
        Ok(config)
    }

    /// Load a config file from TOML and return diagnostics (unknown keys and semantic
    /// validation failures).
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str_with_diagnostics(&text)
    }

    /// Load a config from a TOML string and return diagnostics.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<RefqConfig>(text)?;

        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        diagnostics.extend_validation(config.validate());

        Ok((config, diagnostics))
    }
}

/// Discover the configuration file for a project root.
///
/// Probes [`CONFIG_FILE_NAMES`] in `project_root`; the first regular file wins.
pub fn discover_config_path(project_root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .into_iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a project root.
///
/// If no config is present, returns [`RefqConfig::default`] and `None`.
pub fn load_for_workspace(
    project_root: &Path,
) -> Result<(RefqConfig, Option<PathBuf>), ConfigError> {
    let (config, path, _) = load_for_workspace_with_diagnostics(project_root)?;
    Ok((config, path))
}

/// Like [`load_for_workspace`] but also returns diagnostics.
pub fn load_for_workspace_with_diagnostics(
    project_root: &Path,
) -> Result<(RefqConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(project_root) else {
        return Ok((RefqConfig::default(), None, ConfigDiagnostics::default()));
    };

    let (config, diagnostics) = RefqConfig::load_from_path_with_diagnostics(&path)?;
    Ok((config, Some(path), diagnostics))
}

struct MutexFileMakeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl<'a> MakeWriter<'a> for MutexFileMakeWriter {
    type Writer = MutexFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        // A poisoned lock only means another thread panicked mid-write.
        let guard = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        MutexFileWriter { guard }
    }
}

struct MutexFileWriter<'a> {
    guard: std::sync::MutexGuard<'a, std::fs::File>,
}

impl Write for MutexFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.guard.flush()
    }
}

static TRACING_INIT: Once = Once::new();

/// Initializes structured `tracing` logging.
///
/// This function is safe to call multiple times; only the first call installs a global
/// subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file_path = config.file.as_ref();
        let file = file_path
            .and_then(|path| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()
            })
            .map(|file| Arc::new(Mutex::new(file)));
        let file_open_failed = file_path.is_some() && file.is_none();

        let mut make_writer = BoxMakeWriter::new(io::sink);
        if config.stderr {
            // `cargo test` output capture only sees `eprint!`; `TestWriter` keeps unit tests
            // quiet in debug builds.
            if cfg!(debug_assertions) {
                make_writer = BoxMakeWriter::new(
                    make_writer.and(tracing_subscriber::fmt::writer::TestWriter::with_stderr),
                );
            } else {
                make_writer = BoxMakeWriter::new(make_writer.and(io::stderr));
            }
        }
        if let Some(file) = file {
            make_writer = BoxMakeWriter::new(make_writer.and(MutexFileMakeWriter { file }));
        }

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .with_target(true)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() && file_open_failed {
            if let Some(path) = file_path {
                tracing::warn!(
                    target: "refq.config",
                    path = %path.display(),
                    "failed to open log file; file logging disabled"
                );
            }
        }
    });
}

#[cfg(test)]
mod toml_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_yields_defaults() {
        let (config, diagnostics) = RefqConfig::load_from_str_with_diagnostics("").unwrap();
        assert_eq!(config, RefqConfig::default());
        assert!(diagnostics.is_empty());
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.stderr);
        assert_eq!(config.compatibility.mode, CompatibilityMode::Exact);
    }

    #[test]
    fn parses_both_sections() {
        let text = r#"
[logging]
level = "debug"
json = true
stderr = false
file = "refq.log"

[compatibility]
mode = "table"
rules = [
  { actual = "java.lang.Integer", declared = "short" },
  { actual = "int[]", declared = "java.lang.Object" },
]
"#;
        let (config, diagnostics) = RefqConfig::load_from_str_with_diagnostics(text).unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(
            config.logging,
            LoggingConfig {
                level: "debug".into(),
                json: true,
                stderr: false,
                file: Some(PathBuf::from("refq.log")),
            }
        );
        assert_eq!(config.compatibility.mode, CompatibilityMode::Table);
        assert_eq!(
            config.compatibility.type_pairs().unwrap(),
            vec![
                (TypeRef::scalar("java.lang.Integer"), TypeRef::scalar("short")),
                (TypeRef::new("int", 1), TypeRef::scalar("java.lang.Object")),
            ]
        );
    }

    #[test]
    fn bad_rule_type_names_its_path() {
        let config = CompatibilityConfig {
            mode: CompatibilityMode::Table,
            rules: vec![CompatibilityRule {
                actual: "int".into(),
                declared: "int[".into(),
            }],
        };
        let err = config.type_pairs().unwrap_err();
        match err {
            ConfigError::InvalidType { toml_path, .. } => {
                assert_eq!(toml_path, "compatibility.rules[0].declared");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_value_type_is_a_toml_error() {
        let err = RefqConfig::load_from_str_with_diagnostics("[logging]\njson = \"yes\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = RefqConfig::load_from_str_with_diagnostics("[compatibility]\nmode = \"loose\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
    }

    #[test]
    fn level_synonyms_are_normalized() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives("none"), "off");
        assert_eq!(
            LoggingConfig::normalize_level_directives("refq.refactor=trace"),
            "refq.refactor=trace"
        );
    }
}
