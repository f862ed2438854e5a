//! In-place splicing of a file's line buffer.

use refq_core::SourcePosition;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    #[error("line {line} is outside the buffer (1..={len})")]
    LineOutOfRange { line: u32, len: usize },
    #[error("column {column} is outside line {line} (len={len})")]
    ColumnOutOfRange { line: u32, column: u32, len: usize },
    #[error("column {column} on line {line} is not a UTF-8 character boundary")]
    NotCharBoundary { line: u32, column: u32 },
    #[error("splice end {end} precedes start {start}")]
    Reversed {
        start: SourcePosition,
        end: SourcePosition,
    },
    #[error("replacement text must not contain line breaks")]
    MultilineContent,
}

/// Replace the text between `start` and `end` with `content`.
///
/// Positions use one-based lines and zero-based byte columns; `lines[0]` is line 1. When
/// the range spans several lines, the text before `start` and after `end` is joined onto
/// `start.line`. The vacated lines are removed, or blanked in place when
/// `collapse_blank_lines` is set so that positions of later lines stay valid.
///
/// Nothing is modified when an error is returned.
pub fn splice(
    lines: &mut Vec<String>,
    start: &SourcePosition,
    end: &SourcePosition,
    content: &str,
    collapse_blank_lines: bool,
) -> Result<(), SpliceError> {
    if content.contains(['\n', '\r']) {
        return Err(SpliceError::MultilineContent);
    }
    if (end.line, end.column) < (start.line, start.column) {
        return Err(SpliceError::Reversed {
            start: start.clone(),
            end: end.clone(),
        });
    }

    let start_idx = line_index(lines, start.line)?;
    let end_idx = line_index(lines, end.line)?;
    let start_col = column_index(&lines[start_idx], start)?;
    let end_col = column_index(&lines[end_idx], end)?;

    if start_idx == end_idx {
        lines[start_idx].replace_range(start_col..end_col, content);
        return Ok(());
    }

    let suffix = lines[end_idx][end_col..].to_owned();
    let merged = &mut lines[start_idx];
    merged.truncate(start_col);
    merged.push_str(content);
    merged.push_str(&suffix);

    if collapse_blank_lines {
        for line in &mut lines[start_idx + 1..=end_idx] {
            line.clear();
        }
    } else {
        lines.drain(start_idx + 1..=end_idx);
    }
    Ok(())
}

fn line_index(lines: &[String], line: u32) -> Result<usize, SpliceError> {
    let idx = (line as usize).wrapping_sub(1);
    if line == 0 || idx >= lines.len() {
        return Err(SpliceError::LineOutOfRange {
            line,
            len: lines.len(),
        });
    }
    Ok(idx)
}

fn column_index(text: &str, pos: &SourcePosition) -> Result<usize, SpliceError> {
    let col = pos.column as usize;
    if col > text.len() {
        return Err(SpliceError::ColumnOutOfRange {
            line: pos.line,
            column: pos.column,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(col) {
        return Err(SpliceError::NotCharBoundary {
            line: pos.line,
            column: pos.column,
        });
    }
    Ok(col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(line: u32, column: u32) -> SourcePosition {
        SourcePosition::new("A.java", line, column)
    }

    fn buffer(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn same_line_replacement() {
        let mut lines = buffer(&["foo(int a);"]);
        splice(&mut lines, &pos(1, 4), &pos(1, 9), "long b", false).unwrap();
        assert_eq!(lines, buffer(&["foo(long b);"]));
    }

    #[test]
    fn same_line_insertion_at_end() {
        let mut lines = buffer(&["foo()"]);
        splice(&mut lines, &pos(1, 5), &pos(1, 5), ";", false).unwrap();
        assert_eq!(lines, buffer(&["foo();"]));
    }

    #[test]
    fn cross_line_merge_removes_vacated_lines() {
        let mut lines = buffer(&["this is a line", "this is another line!"]);
        splice(&mut lines, &pos(1, 10), &pos(2, 1), "", false).unwrap();
        assert_eq!(lines, buffer(&["this is a his is another line!"]));
    }

    #[test]
    fn cross_line_merge_can_keep_line_count() {
        let mut lines = buffer(&["call(a,", "  b,", "  c);", "next();"]);
        splice(&mut lines, &pos(1, 5), &pos(3, 3), "x", true).unwrap();
        assert_eq!(lines, buffer(&["call(x);", "", "", "next();"]));
    }

    #[test]
    fn errors_leave_buffer_untouched() {
        let original = buffer(&["abc", "def"]);
        let mut lines = original.clone();

        assert!(matches!(
            splice(&mut lines, &pos(0, 0), &pos(1, 0), "", false),
            Err(SpliceError::LineOutOfRange { line: 0, .. })
        ));
        assert!(matches!(
            splice(&mut lines, &pos(1, 0), &pos(3, 0), "", false),
            Err(SpliceError::LineOutOfRange { line: 3, len: 2 })
        ));
        assert!(matches!(
            splice(&mut lines, &pos(1, 4), &pos(1, 4), "", false),
            Err(SpliceError::ColumnOutOfRange { .. })
        ));
        assert!(matches!(
            splice(&mut lines, &pos(2, 1), &pos(1, 1), "", false),
            Err(SpliceError::Reversed { .. })
        ));
        assert_eq!(
            splice(&mut lines, &pos(1, 1), &pos(1, 1), "x\ny", false),
            Err(SpliceError::MultilineContent)
        );
        assert_eq!(lines, original);
    }

    #[test]
    fn rejects_columns_inside_multibyte_chars() {
        let mut lines = buffer(&["é"]);
        assert_eq!(
            splice(&mut lines, &pos(1, 1), &pos(1, 2), "", false),
            Err(SpliceError::NotCharBoundary { line: 1, column: 1 })
        );
    }
}
