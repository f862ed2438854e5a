//! Resolved type references and requested parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A resolved type: a (possibly qualified) type name plus an array-dimension count.
///
/// Serialized as its source rendering, e.g. `"java.lang.String[][]"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    pub name: String,
    pub dimensions: u32,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, dimensions: u32) -> Self {
        Self {
            name: name.into(),
            dimensions,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeRefError {
    #[error("type name is empty")]
    Empty,
    #[error("unbalanced array brackets in type `{0}`")]
    UnbalancedBrackets(String),
}

impl FromStr for TypeRef {
    type Err = TypeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim();
        let mut dimensions = 0u32;
        loop {
            let trimmed = rest.trim_end();
            let Some(without_close) = trimmed.strip_suffix(']') else {
                rest = trimmed;
                break;
            };
            let Some(without_open) = without_close.trim_end().strip_suffix('[') else {
                return Err(TypeRefError::UnbalancedBrackets(s.to_owned()));
            };
            dimensions += 1;
            rest = without_open;
        }

        if rest.contains(['[', ']']) {
            return Err(TypeRefError::UnbalancedBrackets(s.to_owned()));
        }
        if rest.is_empty() {
            return Err(TypeRefError::Empty);
        }
        Ok(Self::new(rest, dimensions))
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// A parameter requested by a change-parameters directive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: TypeRef,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, declared_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }

    /// The `Type name` rendering used at declaration sites.
    pub fn declaration(&self) -> String {
        format!("{} {}", self.declared_type, self.name)
    }
}
