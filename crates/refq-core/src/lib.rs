//! Core shared types for refq.
//!
//! Everything here is a plain value: file identifiers, source positions, single-line
//! text edits, and the resolved type references the compatibility oracle compares.

mod edit;
mod position;
mod types;

pub use edit::RefactorEdit;
pub use position::SourcePosition;
pub use types::{ParameterSpec, TypeRef, TypeRefError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a source file.
///
/// Usually a path relative to the project root the refactor plan was produced for.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
