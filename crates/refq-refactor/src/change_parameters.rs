//! Parameter-list rewriting for declarations and call sites.
//!
//! Each existing parameter occupies a *slot* bounded by punctuation:
//!
//! ```text
//! foo(int a, long b, char c)
//!    ^     ^       ^       ^
//!    |     commas[0]       right_paren
//!    left_paren    commas[1]
//! ```
//!
//! Kept slots are rewritten after their leading comma, surplus slots are removed together
//! with their leading comma, and new trailing parameters are inserted before the closing
//! paren. Edits are never merged, so each one can be checked against the punctuation it
//! was derived from.

use refq_core::{ParameterSpec, RefactorEdit};

use crate::compat::CompatibilityOracle;
use crate::{RefactorError, RefactorTarget};

/// Compute the edits that turn the target's parameter list into `new_parameters`.
///
/// Slots whose existing type the `oracle` judges compatible with the requested type are
/// left untouched. Edits come back in production order: replacements and removals by
/// ascending slot, then at most one trailing insertion.
pub fn change_parameters(
    target: &RefactorTarget,
    new_parameters: &[ParameterSpec],
    oracle: &dyn CompatibilityOracle,
) -> Result<Vec<RefactorEdit>, RefactorError> {
    let params = target.validate()?;
    let site = target.site_kind();
    let file = target.file();
    let line = target.line();

    let existing = &params.parameters;
    let n = existing.len();
    let m = new_parameters.len();
    let mut edits = Vec::new();

    for (i, (old, new)) in existing.iter().zip(new_parameters).enumerate() {
        if oracle.is_compatible(&old.ty, &new.declared_type) {
            continue;
        }
        tracing::trace!(
            target: "refq.refactor",
            slot = i,
            actual = %old.ty,
            declared = %new.declared_type,
            "parameter slot needs rewriting"
        );
        edits.push(RefactorEdit::replace(
            file.clone(),
            line,
            params.replace_start(i),
            params.slice_end(i),
            site.render(new),
        ));
    }

    for i in m..n {
        edits.push(RefactorEdit::delete(
            file.clone(),
            line,
            params.remove_start(i),
            params.slice_end(i),
        ));
    }

    if m > n {
        let rendered: Vec<String> = new_parameters[n..]
            .iter()
            .map(|p| site.render(p))
            .collect();
        let mut text = rendered.join(", ");
        if n > 0 {
            text.insert_str(0, ", ");
        }
        edits.push(RefactorEdit::insert(
            file.clone(),
            line,
            params.right_paren,
            text,
        ));
    }

    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::ExactMatch;
    use crate::{Identifier, Parameter, ParameterList};
    use pretty_assertions::assert_eq;
    use refq_core::{FileId, SourcePosition, TypeRef};

    fn method(params: ParameterList) -> RefactorTarget {
        RefactorTarget::MethodDeclaration {
            identifier: Identifier::new(SourcePosition::new("A.java", 3, 1), "run"),
            parameters: params,
        }
    }

    #[test]
    fn unchanged_list_produces_no_edits() {
        let target = method(ParameterList::new(
            4,
            18,
            vec![10],
            vec![
                Parameter::new("a", TypeRef::scalar("int")),
                Parameter::new("b", TypeRef::scalar("long")),
            ],
        ));
        let same: Vec<ParameterSpec> = target
            .parameters()
            .parameters
            .iter()
            .map(Parameter::to_spec)
            .collect();
        assert!(change_parameters(&target, &same, &ExactMatch).unwrap().is_empty());
    }

    #[test]
    fn incompatible_slot_is_replaced_after_comma() {
        // ` run(int a, long b)`
        let target = method(ParameterList::new(
            4,
            18,
            vec![10],
            vec![
                Parameter::new("a", TypeRef::scalar("int")),
                Parameter::new("b", TypeRef::scalar("long")),
            ],
        ));
        let new = [
            ParameterSpec::new("a", TypeRef::scalar("int")),
            ParameterSpec::new("b", TypeRef::scalar("String")),
        ];
        assert_eq!(
            change_parameters(&target, &new, &ExactMatch).unwrap(),
            vec![RefactorEdit::replace(
                FileId::new("A.java"),
                3,
                11,
                18,
                "String b"
            )]
        );
    }

    #[test]
    fn malformed_target_is_reported() {
        let target = method(ParameterList::new(
            4,
            18,
            vec![],
            vec![
                Parameter::new("a", TypeRef::scalar("int")),
                Parameter::new("b", TypeRef::scalar("long")),
            ],
        ));
        let err = change_parameters(&target, &[], &ExactMatch).unwrap_err();
        assert!(matches!(err, RefactorError::MalformedTarget { line: 3, .. }), "{err:?}");
    }
}
