use std::collections::HashSet;

use crate::diagnostics::{ConfigValidationError, ConfigWarning, ValidationDiagnostics};
use crate::{CompatibilityMode, ConfigError, LoggingConfig, RefqConfig};

impl RefqConfig {
    /// Validate semantic invariants for a configuration.
    ///
    /// Validation is best-effort: it reports as many problems as possible in one pass.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();

        validate_logging(self, &mut out);
        validate_compatibility(self, &mut out);

        out
    }
}

fn validate_logging(config: &RefqConfig, out: &mut ValidationDiagnostics) {
    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }
}

fn validate_compatibility(config: &RefqConfig, out: &mut ValidationDiagnostics) {
    let compat = &config.compatibility;
    match compat.mode {
        CompatibilityMode::Table if compat.rules.is_empty() => {
            out.warnings.push(ConfigWarning::CompatibilityTableEmpty);
        }
        CompatibilityMode::Exact if !compat.rules.is_empty() => {
            out.warnings.push(ConfigWarning::CompatibilityRulesIgnored {
                count: compat.rules.len(),
            });
        }
        _ => {}
    }

    // Report every malformed type, not only the first one `type_pairs` stops at.
    let mut seen = HashSet::new();
    for (idx, rule) in compat.rules.iter().enumerate() {
        match rule.type_pair(idx) {
            Ok(pair) => {
                if !seen.insert(pair) {
                    out.warnings.push(ConfigWarning::DuplicateCompatibilityRule {
                        toml_path: format!("compatibility.rules[{idx}]"),
                    });
                }
            }
            Err(ConfigError::InvalidType { toml_path, message }) => {
                out.errors
                    .push(ConfigValidationError::InvalidType { toml_path, message });
            }
            Err(err) => out.errors.push(ConfigValidationError::InvalidType {
                toml_path: format!("compatibility.rules[{idx}]"),
                message: err.to_string(),
            }),
        }
    }
}
