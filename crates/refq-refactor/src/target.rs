//! Matched refactor sites handed over by the query engine.
//!
//! Targets are immutable snapshots: every column has already been resolved against the
//! original source, and the engine only reads them.

use refq_core::{FileId, ParameterSpec, SourcePosition, TypeRef};
use serde::{Deserialize, Serialize};

use crate::RefactorError;

/// Which rendering a parameter slot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    /// Method or constructor header: `Type name`.
    Declaration,
    /// Invocation expression: bare `name`.
    CallSite,
}

impl SiteKind {
    pub fn render(self, param: &ParameterSpec) -> String {
        match self {
            SiteKind::Declaration => param.declaration(),
            SiteKind::CallSite => param.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub position: SourcePosition,
    pub name: String,
}

impl Identifier {
    pub fn new(position: SourcePosition, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }

    /// Column just past the identifier, or `None` if it does not fit in a `u32`.
    pub fn end_column(&self) -> Option<u32> {
        u32::try_from(self.name.len())
            .ok()
            .and_then(|len| self.position.column.checked_add(len))
    }
}

/// One existing parameter slot.
///
/// At a declaration `name`/`ty` are the declared name and type. At a call site `name` is
/// the argument expression text and `ty` the resolved type of that expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn to_spec(&self) -> ParameterSpec {
        ParameterSpec::new(self.name.clone(), self.ty.clone())
    }
}

/// A parenthesised, comma-delimited list with the exact columns of its punctuation.
///
/// All columns are on the line of the owning target's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterList {
    pub left_paren: u32,
    pub right_paren: u32,
    #[serde(default)]
    pub commas: Vec<u32>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl ParameterList {
    pub fn new(
        left_paren: u32,
        right_paren: u32,
        commas: Vec<u32>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            left_paren,
            right_paren,
            commas,
            parameters,
        }
    }

    pub fn empty(left_paren: u32, right_paren: u32) -> Self {
        Self::new(left_paren, right_paren, Vec::new(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Check the punctuation invariants; `Err` carries a human-readable reason.
    pub fn check(&self) -> Result<(), String> {
        if self.left_paren >= self.right_paren {
            return Err(format!(
                "left paren at column {} is not before right paren at column {}",
                self.left_paren, self.right_paren
            ));
        }

        let expected_commas = self.parameters.len().saturating_sub(1);
        if self.commas.len() != expected_commas {
            return Err(format!(
                "{} parameters need {expected_commas} commas, found {}",
                self.parameters.len(),
                self.commas.len()
            ));
        }

        let mut prev = self.left_paren;
        for &comma in &self.commas {
            if comma <= prev {
                return Err(format!("comma at column {comma} is out of order"));
            }
            prev = comma;
        }
        if prev >= self.right_paren {
            return Err(format!(
                "comma at column {prev} is not before right paren at column {}",
                self.right_paren
            ));
        }

        Ok(())
    }

    /// End of slot `i` (exclusive): the comma that follows it, or the closing paren.
    pub fn slice_end(&self, i: usize) -> u32 {
        if i + 1 < self.parameters.len() {
            self.commas[i]
        } else {
            self.right_paren
        }
    }

    /// Start of slot `i` when its content is replaced; the separating comma stays.
    pub fn replace_start(&self, i: usize) -> u32 {
        if i == 0 {
            self.left_paren + 1
        } else {
            self.commas[i - 1] + 1
        }
    }

    /// Start of slot `i` when it is removed; the separating comma goes with it.
    pub fn remove_start(&self, i: usize) -> u32 {
        if i == 0 {
            self.left_paren + 1
        } else {
            self.commas[i - 1]
        }
    }
}

/// A matched site.
///
/// Constructors have no independent identifier to rename, so only methods and call sites
/// are renameable. Every variant carries a parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefactorTarget {
    MethodDeclaration {
        identifier: Identifier,
        parameters: ParameterList,
    },
    ConstructorDeclaration {
        identifier: Identifier,
        parameters: ParameterList,
    },
    CallSite {
        identifier: Identifier,
        #[serde(alias = "arguments")]
        parameters: ParameterList,
    },
}

impl RefactorTarget {
    pub fn kind_name(&self) -> &'static str {
        match self {
            RefactorTarget::MethodDeclaration { .. } => "method declaration",
            RefactorTarget::ConstructorDeclaration { .. } => "constructor declaration",
            RefactorTarget::CallSite { .. } => "call site",
        }
    }

    pub fn identifier(&self) -> &Identifier {
        match self {
            RefactorTarget::MethodDeclaration { identifier, .. }
            | RefactorTarget::ConstructorDeclaration { identifier, .. }
            | RefactorTarget::CallSite { identifier, .. } => identifier,
        }
    }

    pub fn parameters(&self) -> &ParameterList {
        match self {
            RefactorTarget::MethodDeclaration { parameters, .. }
            | RefactorTarget::ConstructorDeclaration { parameters, .. }
            | RefactorTarget::CallSite { parameters, .. } => parameters,
        }
    }

    pub fn site_kind(&self) -> SiteKind {
        match self {
            RefactorTarget::MethodDeclaration { .. }
            | RefactorTarget::ConstructorDeclaration { .. } => SiteKind::Declaration,
            RefactorTarget::CallSite { .. } => SiteKind::CallSite,
        }
    }

    /// The identifier that a rename rewrites, or `None` for constructors.
    pub fn renameable_identifier(&self) -> Option<&Identifier> {
        match self {
            RefactorTarget::MethodDeclaration { identifier, .. }
            | RefactorTarget::CallSite { identifier, .. } => Some(identifier),
            RefactorTarget::ConstructorDeclaration { .. } => None,
        }
    }

    pub fn file(&self) -> &FileId {
        &self.identifier().position.file
    }

    pub fn line(&self) -> u32 {
        self.identifier().position.line
    }

    pub(crate) fn validate(&self) -> Result<&ParameterList, RefactorError> {
        let params = self.parameters();
        params
            .check()
            .map_err(|reason| RefactorError::MalformedTarget {
                file: self.file().clone(),
                line: self.line(),
                reason,
            })?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_params() -> ParameterList {
        ParameterList::new(
            4,
            8,
            vec![6],
            vec![
                Parameter::new("z", TypeRef::scalar("Class")),
                Parameter::new("b", TypeRef::scalar("Runnable")),
            ],
        )
    }

    #[test]
    fn slot_boundaries_follow_punctuation() {
        let params = two_params();
        assert_eq!(params.replace_start(0), 5);
        assert_eq!(params.remove_start(0), 5);
        assert_eq!(params.slice_end(0), 6);
        assert_eq!(params.replace_start(1), 7);
        assert_eq!(params.remove_start(1), 6);
        assert_eq!(params.slice_end(1), 8);
    }

    #[test]
    fn check_rejects_bad_punctuation() {
        assert!(two_params().check().is_ok());
        assert!(ParameterList::empty(5, 6).check().is_ok());

        let mut reversed = two_params();
        reversed.left_paren = 8;
        assert!(reversed.check().is_err());

        let mut missing_comma = two_params();
        missing_comma.commas.clear();
        assert!(missing_comma.check().is_err());

        let mut comma_outside = two_params();
        comma_outside.commas = vec![9];
        assert!(comma_outside.check().is_err());

        let mut three = two_params();
        three.parameters.push(Parameter::new("c", TypeRef::scalar("int")));
        three.commas = vec![7, 6];
        three.right_paren = 12;
        assert!(three.check().is_err());
    }

    #[test]
    fn constructors_are_not_renameable() {
        let identifier = Identifier::new(SourcePosition::new("A.java", 1, 2), "A");
        let ctor = RefactorTarget::ConstructorDeclaration {
            identifier: identifier.clone(),
            parameters: ParameterList::empty(3, 4),
        };
        let method = RefactorTarget::MethodDeclaration {
            identifier,
            parameters: ParameterList::empty(3, 4),
        };
        assert!(ctor.renameable_identifier().is_none());
        assert!(method.renameable_identifier().is_some());
        assert_eq!(ctor.site_kind(), SiteKind::Declaration);
    }

    #[test]
    fn call_site_json_accepts_arguments_alias() {
        let json = r#"{
            "kind": "call_site",
            "identifier": {
                "position": { "file": "Main.java", "line": 3, "column": 8 },
                "name": "foo"
            },
            "arguments": {
                "left_paren": 11,
                "right_paren": 13,
                "parameters": [ { "name": "x", "type": "java.lang.Integer" } ]
            }
        }"#;
        let target: RefactorTarget = serde_json::from_str(json).unwrap();
        assert_eq!(target.site_kind(), SiteKind::CallSite);
        assert_eq!(target.parameters().len(), 1);
        assert_eq!(
            target.parameters().parameters[0].ty,
            TypeRef::scalar("java.lang.Integer")
        );
    }
}
