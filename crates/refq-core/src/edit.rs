//! Single-line text substitutions.

use serde::{Deserialize, Serialize};

use crate::{FileId, SourcePosition};

/// On `line`, replace the half-open column range `[start_column, end_column)` with
/// `replacement`.
///
/// `start_column == end_column` is a pure insertion. Coordinates refer to the original
/// file text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RefactorEdit {
    pub file: FileId,
    pub line: u32,
    pub start_column: u32,
    pub end_column: u32,
    pub replacement: String,
}

impl RefactorEdit {
    pub fn replace(
        file: FileId,
        line: u32,
        start_column: u32,
        end_column: u32,
        replacement: impl Into<String>,
    ) -> Self {
        debug_assert!(
            start_column <= end_column,
            "invalid column range: {start_column}..{end_column}"
        );
        Self {
            file,
            line,
            start_column,
            end_column,
            replacement: replacement.into(),
        }
    }

    pub fn insert(file: FileId, line: u32, column: u32, text: impl Into<String>) -> Self {
        Self::replace(file, line, column, column, text)
    }

    pub fn delete(file: FileId, line: u32, start_column: u32, end_column: u32) -> Self {
        Self::replace(file, line, start_column, end_column, String::new())
    }

    pub fn is_insertion(&self) -> bool {
        self.start_column == self.end_column
    }

    pub fn is_deletion(&self) -> bool {
        self.replacement.is_empty() && !self.is_insertion()
    }

    pub fn start(&self) -> SourcePosition {
        SourcePosition::new(self.file.clone(), self.line, self.start_column)
    }

    pub fn end(&self) -> SourcePosition {
        SourcePosition::new(self.file.clone(), self.line, self.end_column)
    }
}
