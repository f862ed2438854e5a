use refq_core::{FileId, ParameterSpec, RefactorEdit};
use serde::{Deserialize, Serialize};

use crate::change_parameters::change_parameters;
use crate::compat::CompatibilityOracle;
use crate::rename::rename;
use crate::{RefactorError, RefactorTarget};

/// The transformation attached to a query result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefactorDirective {
    Rename { new_name: String },
    ChangeParameters { parameters: Vec<ParameterSpec> },
}

impl RefactorDirective {
    pub fn name(&self) -> &'static str {
        match self {
            RefactorDirective::Rename { .. } => "rename",
            RefactorDirective::ChangeParameters { .. } => "change parameters",
        }
    }

    /// Edits for a single target.
    pub fn edits_for(
        &self,
        target: &RefactorTarget,
        oracle: &dyn CompatibilityOracle,
    ) -> Result<Vec<RefactorEdit>, RefactorError> {
        match self {
            RefactorDirective::Rename { new_name } => Ok(vec![rename(target, new_name)?]),
            RefactorDirective::ChangeParameters { parameters } => {
                change_parameters(target, parameters, oracle)
            }
        }
    }
}

/// Edits computed for one matched target, in a safe left-to-right order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEdits {
    /// Index of the target in the input list.
    pub index: usize,
    pub file: FileId,
    pub line: u32,
    pub edits: Vec<RefactorEdit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub index: usize,
    pub file: FileId,
    pub line: u32,
    pub error: RefactorError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedEdits {
    pub targets: Vec<TargetEdits>,
    pub failures: Vec<TargetFailure>,
}

impl ComputedEdits {
    pub fn edit_count(&self) -> usize {
        self.targets.iter().map(|t| t.edits.len()).sum()
    }
}

/// Run `directive` over every target. A failing target is reported and skipped; the
/// remaining targets are still processed.
pub fn compute_edits(
    directive: &RefactorDirective,
    targets: &[RefactorTarget],
    oracle: &dyn CompatibilityOracle,
) -> ComputedEdits {
    let mut out = ComputedEdits::default();
    for (index, target) in targets.iter().enumerate() {
        let file = target.file().clone();
        let line = target.line();
        match directive.edits_for(target, oracle) {
            Ok(edits) => out.targets.push(TargetEdits {
                index,
                file,
                line,
                edits,
            }),
            Err(error) => {
                tracing::warn!(
                    target: "refq.refactor",
                    directive = directive.name(),
                    file = %file,
                    line,
                    error = %error,
                    "skipping target"
                );
                out.failures.push(TargetFailure {
                    index,
                    file,
                    line,
                    error,
                });
            }
        }
    }
    out
}
