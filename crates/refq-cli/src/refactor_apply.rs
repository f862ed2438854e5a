use anyhow::{Context, Result};
use refq_config::{CompatibilityMode, RefqConfig};
use refq_refactor::{
    apply_edits, unified_diff, ApplyReport, CompatibilityOracle, CompatibilityTable,
    ComputedEdits, DiskStore, ExactMatch, FileId, LinePreview, RefactorPlan,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

fn canonicalize_best_effort(path: &Path, context: &'static str) -> PathBuf {
    match path.canonicalize() {
        Ok(path) => path,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
        Err(err) => {
            tracing::debug!(
                target: "refq.cli",
                context,
                path = %path.display(),
                error = %err,
                "failed to canonicalize path"
            );
            path.to_path_buf()
        }
    }
}

/// Load the explicit config file, or discover one in `root`.
fn load_config(root: &Path, explicit: Option<&Path>) -> Result<(RefqConfig, Option<PathBuf>)> {
    match explicit {
        Some(path) => {
            let config = RefqConfig::load_from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, Some(path.to_path_buf())))
        }
        None => refq_config::load_for_workspace(root)
            .with_context(|| format!("failed to load config for {}", root.display())),
    }
}

fn oracle_for(config: &RefqConfig) -> Result<Box<dyn CompatibilityOracle>> {
    let compat = &config.compatibility;
    match compat.mode {
        CompatibilityMode::Exact => Ok(Box::new(ExactMatch)),
        CompatibilityMode::Table => {
            let table: CompatibilityTable = compat
                .type_pairs()
                .context("invalid [compatibility] rules")?
                .into_iter()
                .collect();
            tracing::debug!(target: "refq.cli", rules = table.len(), "using compatibility table");
            Ok(Box::new(table))
        }
    }
}

/// Everything a plan run needs: project root, configuration and the compatibility oracle.
pub(crate) struct Session {
    root: PathBuf,
    oracle: Box<dyn CompatibilityOracle>,
}

impl Session {
    pub(crate) fn open(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let root = canonicalize_best_effort(root, "session.root");
        let (config, path) = load_config(&root, config_path)?;
        refq_config::init_tracing(&config.logging);
        if let Some(path) = &path {
            tracing::debug!(target: "refq.cli", path = %path.display(), "loaded config");
        }
        let oracle = oracle_for(&config)?;
        Ok(Self { root, oracle })
    }

    fn compute(&self, plan_path: &Path) -> Result<(RefactorPlan, ComputedEdits)> {
        let plan = RefactorPlan::load(plan_path)
            .with_context(|| format!("failed to load plan {}", plan_path.display()))?;
        let computed = plan.compute(self.oracle.as_ref());
        tracing::info!(
            target: "refq.cli",
            directive = plan.directive.name(),
            targets = plan.targets.len(),
            edits = computed.edit_count(),
            "computed edits"
        );
        Ok((plan, computed))
    }

    pub(crate) fn apply(&self, plan_path: &Path, dry_run: bool) -> Result<ApplySummary> {
        let (plan, computed) = self.compute(plan_path)?;
        let mut store = DiskStore::new(&self.root).dry_run(dry_run);
        let report = apply_edits(&mut store, &computed.targets);

        Ok(ApplySummary {
            directive: plan.directive.name(),
            dry_run,
            targets: plan.targets.len(),
            edits: computed.edit_count(),
            files_changed: report.changes.iter().map(|c| c.file.clone()).collect(),
            previews: report.previews.clone(),
            failures: failures(&computed, &report),
        })
    }

    pub(crate) fn preview(&self, plan_path: &Path) -> Result<PreviewSummary> {
        let (_plan, computed) = self.compute(plan_path)?;
        let mut store = DiskStore::new(&self.root).dry_run(true);
        let report = apply_edits(&mut store, &computed.targets);

        Ok(PreviewSummary {
            files: report
                .changes
                .iter()
                .map(|change| FileDiff {
                    file: change.file.clone(),
                    diff: unified_diff(change),
                })
                .collect(),
            failures: failures(&computed, &report),
        })
    }
}

fn failures(computed: &ComputedEdits, report: &ApplyReport) -> Vec<FailureReport> {
    let targets = computed.failures.iter().map(|failure| FailureReport {
        file: failure.file.clone(),
        line: Some(failure.line),
        target: Some(failure.index),
        error: failure.error.to_string(),
    });
    let files = report.failures.iter().map(|failure| FailureReport {
        file: failure.file.clone(),
        line: None,
        target: None,
        error: failure.error.to_string(),
    });
    targets.chain(files).collect()
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FailureReport {
    pub(crate) file: FileId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) line: Option<u32>,
    /// Index of the failing target in the plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) target: Option<usize>,
    pub(crate) error: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApplySummary {
    pub(crate) directive: &'static str,
    pub(crate) dry_run: bool,
    pub(crate) targets: usize,
    pub(crate) edits: usize,
    pub(crate) files_changed: Vec<FileId>,
    pub(crate) previews: Vec<LinePreview>,
    pub(crate) failures: Vec<FailureReport>,
}

impl ApplySummary {
    pub(crate) fn exit_code(&self) -> i32 {
        if self.failures.is_empty() {
            0
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FileDiff {
    pub(crate) file: FileId,
    pub(crate) diff: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PreviewSummary {
    pub(crate) files: Vec<FileDiff>,
    pub(crate) failures: Vec<FailureReport>,
}

impl PreviewSummary {
    pub(crate) fn exit_code(&self) -> i32 {
        if self.failures.is_empty() {
            0
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ConfigCheck {
    pub(crate) path: Option<PathBuf>,
    pub(crate) unknown_keys: Vec<String>,
    pub(crate) warnings: Vec<String>,
    pub(crate) errors: Vec<String>,
}

pub(crate) fn check_config(root: &Path, explicit: Option<&Path>) -> Result<ConfigCheck> {
    let (diagnostics, path) = match explicit {
        Some(path) => {
            let (_, diagnostics) = RefqConfig::load_from_path_with_diagnostics(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            (diagnostics, Some(path.to_path_buf()))
        }
        None => {
            let (_, path, diagnostics) = refq_config::load_for_workspace_with_diagnostics(root)
                .with_context(|| format!("failed to load config for {}", root.display()))?;
            (diagnostics, path)
        }
    };

    Ok(ConfigCheck {
        path,
        unknown_keys: diagnostics.unknown_keys,
        warnings: diagnostics.warnings.iter().map(ToString::to_string).collect(),
        errors: diagnostics.errors.iter().map(ToString::to_string).collect(),
    })
}
