use serde::{Deserialize, Serialize};
use std::fmt;

use crate::FileId;

/// A location in a source file.
///
/// `line` is one-based, exactly as the parser reports it. `column` is a zero-based UTF-8
/// byte offset into that line. Both always refer to the original, unmodified text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(file: impl Into<FileId>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Same file and line, different column.
    pub fn with_column(&self, column: u32) -> Self {
        Self {
            file: self.file.clone(),
            line: self.line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
