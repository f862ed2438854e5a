use refq_core::FileId;
use thiserror::Error;

/// Failures while computing edits for a single target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefactorError {
    /// The directive does not apply to this kind of site (e.g. renaming a constructor).
    #[error("cannot {directive} a {kind}")]
    UnsupportedTarget {
        directive: &'static str,
        kind: &'static str,
    },
    /// Punctuation columns violate the parameter-list invariants. This is an upstream bug.
    #[error("malformed target at {file}:{line}: {reason}")]
    MalformedTarget {
        file: FileId,
        line: u32,
        reason: String,
    },
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),
}
