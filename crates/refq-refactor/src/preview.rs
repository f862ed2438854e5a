use similar::TextDiff;

use crate::apply::FileChange;

/// Unified diff of one rewritten file with `a/` and `b/` headers.
pub fn unified_diff(change: &FileChange) -> String {
    let header_from = format!("a/{}", change.file);
    let header_to = format!("b/{}", change.file);
    TextDiff::from_lines(&change.original, &change.modified)
        .unified_diff()
        .context_radius(3)
        .header(&header_from, &header_to)
        .to_string()
}
