//! Refactor plans handed over by the query engine as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compat::CompatibilityOracle;
use crate::directive::{compute_edits, ComputedEdits, RefactorDirective};
use crate::RefactorTarget;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefactorPlan {
    pub directive: RefactorDirective,
    #[serde(default)]
    pub targets: Vec<RefactorTarget>,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read refactor plan {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid refactor plan: {0}")]
    Json(#[from] serde_json::Error),
}

impl RefactorPlan {
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn compute(&self, oracle: &dyn CompatibilityOracle) -> ComputedEdits {
        compute_edits(&self.directive, &self.targets, oracle)
    }
}
