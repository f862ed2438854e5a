//! Refactor change computation and application.
//!
//! Given sites matched by a query and a refactor directive, this crate computes the minimal
//! character-exact edits and applies them to source files without disturbing unrelated
//! formatting:
//! - identifier renames for method declarations and call sites (`rename`)
//! - parameter-list changes at declarations and call sites (`change_parameters`)
//! - line-buffer splicing and per-file edit application (`splice`, `apply`)

mod apply;
mod buffer;
mod change_parameters;
mod compat;
mod directive;
mod error;
mod plan;
mod preview;
mod rename;
mod splice;
mod target;

pub use apply::{
    apply_edits, group_by_file, ApplyError, ApplyReport, DiskStore, FileChange, FileFailure,
    LinePreview, SourceStore,
};
pub use buffer::{EditError, FileBuffer, LineMap, TextChange};
pub use change_parameters::change_parameters;
pub use compat::{CompatibilityOracle, CompatibilityTable, ExactMatch};
pub use directive::{
    compute_edits, ComputedEdits, RefactorDirective, TargetEdits, TargetFailure,
};
pub use error::RefactorError;
pub use plan::{PlanError, RefactorPlan};
pub use preview::unified_diff;
pub use rename::rename;
pub use splice::{splice, SpliceError};
pub use target::{Identifier, Parameter, ParameterList, RefactorTarget, SiteKind};

pub use refq_core::{FileId, ParameterSpec, RefactorEdit, SourcePosition, TypeRef};
