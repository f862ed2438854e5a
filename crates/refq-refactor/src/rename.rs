use refq_core::RefactorEdit;

use crate::{RefactorError, RefactorTarget};

/// Rewrite the identifier of a method declaration or call site to `new_name`.
///
/// Produces exactly one edit spanning the current identifier. Constructors are rejected
/// with [`RefactorError::UnsupportedTarget`].
pub fn rename(target: &RefactorTarget, new_name: &str) -> Result<RefactorEdit, RefactorError> {
    let Some(identifier) = target.renameable_identifier() else {
        return Err(RefactorError::UnsupportedTarget {
            directive: "rename",
            kind: target.kind_name(),
        });
    };
    if !is_identifier(new_name) {
        return Err(RefactorError::InvalidIdentifier(new_name.to_owned()));
    }

    let pos = &identifier.position;
    let end_column = identifier
        .end_column()
        .ok_or_else(|| RefactorError::MalformedTarget {
            file: pos.file.clone(),
            line: pos.line,
            reason: format!("identifier `{}` at column {} overflows", identifier.name, pos.column),
        })?;
    Ok(RefactorEdit::replace(
        pos.file.clone(),
        pos.line,
        pos.column,
        end_column,
        new_name,
    ))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
