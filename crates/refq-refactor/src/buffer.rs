//! Exclusive, line-oriented view of one file while its edits are applied.

use std::collections::BTreeSet;

use refq_core::{FileId, RefactorEdit, SourcePosition};
use thiserror::Error;

use crate::splice::{splice, SpliceError};

/// A replacement between two positions of the original text, possibly spanning lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub start: SourcePosition,
    pub end: SourcePosition,
    pub replacement: String,
}

impl TextChange {
    pub fn new(start: SourcePosition, end: SourcePosition, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

impl From<&RefactorEdit> for TextChange {
    fn from(edit: &RefactorEdit) -> Self {
        Self::new(edit.start(), edit.end(), edit.replacement.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit for {found} cannot be applied to {expected}")]
    WrongFile { expected: FileId, found: FileId },
    #[error("overlapping edits: {first_start}..{first_end} overlaps {second_start}..{second_end}")]
    Overlapping {
        first_start: SourcePosition,
        first_end: SourcePosition,
        second_start: SourcePosition,
        second_end: SourcePosition,
    },
    #[error(transparent)]
    Splice(#[from] SpliceError),
}

/// Where each original line ended up after a batch of changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    targets: Vec<u32>,
}

impl LineMap {
    fn identity(len: usize) -> Self {
        Self {
            targets: (1..=len as u32).collect(),
        }
    }

    /// Current line holding the text of original `line`.
    ///
    /// A line that was merged into an earlier one maps to the line it was merged into.
    pub fn current_line(&self, line: u32) -> Option<u32> {
        let idx = (line as usize).checked_sub(1)?;
        self.targets.get(idx).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBuffer {
    file: FileId,
    lines: Vec<String>,
    /// Terminator of each line: `"\r\n"`, `"\n"`, or `""` for an unterminated last line.
    endings: Vec<&'static str>,
}

impl FileBuffer {
    pub fn from_text(file: FileId, text: &str) -> Self {
        let mut lines = Vec::new();
        let mut endings = Vec::new();
        for segment in text.split_inclusive('\n') {
            let (line, ending) = if let Some(line) = segment.strip_suffix("\r\n") {
                (line, "\r\n")
            } else if let Some(line) = segment.strip_suffix('\n') {
                (line, "\n")
            } else {
                (segment, "")
            };
            lines.push(line.to_owned());
            endings.push(ending);
        }
        if lines.is_empty() {
            lines.push(String::new());
            endings.push("");
        }
        Self {
            file,
            lines,
            endings,
        }
    }

    pub fn file(&self) -> &FileId {
        &self.file
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Text of one-based `line`.
    pub fn line(&self, line: u32) -> Option<&str> {
        let idx = (line as usize).checked_sub(1)?;
        self.lines.get(idx).map(String::as_str)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            out.push_str(line);
            out.push_str(ending);
        }
        out
    }

    /// Apply every change, all positions referring to the text before this call.
    ///
    /// Changes are validated and then applied back to front, so earlier coordinates stay
    /// valid. Lines vacated by cross-line merges are blanked while the batch runs and
    /// removed in one pass at the end; a merged line keeps the terminator of the last line
    /// it absorbed. Exact duplicate changes are applied once. Either every change is applied or the buffer is left
    /// untouched.
    pub fn apply(&mut self, changes: &[TextChange]) -> Result<LineMap, EditError> {
        if changes.is_empty() {
            return Ok(LineMap::identity(self.lines.len()));
        }

        for change in changes {
            for pos in [&change.start, &change.end] {
                if pos.file != self.file {
                    return Err(EditError::WrongFile {
                        expected: self.file.clone(),
                        found: pos.file.clone(),
                    });
                }
            }
        }

        let mut ordered: Vec<&TextChange> = changes.iter().collect();
        // Stable: insertions at one point keep their input order.
        ordered.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));
        // The same site may be matched more than once; exact duplicates are redundant.
        let mut unique: Vec<&TextChange> = Vec::with_capacity(ordered.len());
        for change in ordered {
            let seen = unique
                .iter()
                .rev()
                .take_while(|prev| prev.start == change.start)
                .any(|prev| *prev == change);
            if !seen {
                unique.push(change);
            }
        }
        let ordered = unique;
        for pair in ordered.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            let overlaps = second.start < first.end
                || (second.start == first.start
                    && !first.is_insertion()
                    && !second.is_insertion());
            if overlaps {
                return Err(EditError::Overlapping {
                    first_start: first.start.clone(),
                    first_end: first.end.clone(),
                    second_start: second.start.clone(),
                    second_end: second.end.clone(),
                });
            }
        }

        let mut lines = self.lines.clone();
        let mut endings = self.endings.clone();
        let mut merged_into: Vec<Option<u32>> = vec![None; lines.len()];
        for change in ordered.into_iter().rev() {
            splice(
                &mut lines,
                &change.start,
                &change.end,
                &change.replacement,
                true,
            )?;
            if change.end.line > change.start.line {
                endings[change.start.line as usize - 1] = endings[change.end.line as usize - 1];
            }
            for line in change.start.line + 1..=change.end.line {
                merged_into[line as usize - 1] = Some(change.start.line);
            }
        }

        let vacated: BTreeSet<usize> = merged_into
            .iter()
            .enumerate()
            .filter_map(|(idx, target)| target.map(|_| idx))
            .collect();

        let mut targets = Vec::with_capacity(lines.len());
        let mut removed = 0u32;
        for (idx, target) in merged_into.iter().enumerate() {
            let original = idx as u32 + 1;
            match target {
                Some(_) => {
                    removed += 1;
                    targets.push(0);
                }
                None => targets.push(original - removed),
            }
        }
        // A merge target always precedes the merged line, so one forward pass follows chains.
        for (idx, merged) in merged_into.iter().enumerate() {
            if let Some(start) = merged {
                targets[idx] = targets[*start as usize - 1];
            }
        }

        let mut idx = 0;
        lines.retain(|_| {
            let keep = !vacated.contains(&idx);
            idx += 1;
            keep
        });
        let mut idx = 0;
        endings.retain(|_| {
            let keep = !vacated.contains(&idx);
            idx += 1;
            keep
        });

        tracing::debug!(
            target: "refq.refactor",
            file = %self.file,
            changes = changes.len(),
            removed_lines = removed,
            "applied changes to buffer"
        );

        self.lines = lines;
        self.endings = endings;
        Ok(LineMap { targets })
    }

    pub fn apply_edits(&mut self, edits: &[RefactorEdit]) -> Result<LineMap, EditError> {
        let changes: Vec<TextChange> = edits.iter().map(TextChange::from).collect();
        self.apply(&changes)
    }
}
