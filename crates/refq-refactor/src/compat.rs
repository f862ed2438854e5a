//! Parameter compatibility judgments.
//!
//! The diff engine never decides on its own whether an existing argument already satisfies
//! a requested parameter type. It asks a [`CompatibilityOracle`], which normally wraps the
//! type-hierarchy resolver. The verdicts are taken literally.

use std::collections::HashSet;

use refq_core::TypeRef;

pub trait CompatibilityOracle {
    /// Does a parameter of type `actual` already satisfy a parameter declared as `declared`?
    fn is_compatible(&self, actual: &TypeRef, declared: &TypeRef) -> bool;
}

impl<F> CompatibilityOracle for F
where
    F: Fn(&TypeRef, &TypeRef) -> bool,
{
    fn is_compatible(&self, actual: &TypeRef, declared: &TypeRef) -> bool {
        self(actual, declared)
    }
}

/// Compatible only when name and dimensions are identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl CompatibilityOracle for ExactMatch {
    fn is_compatible(&self, actual: &TypeRef, declared: &TypeRef) -> bool {
        actual == declared
    }
}

/// Identical pairs plus an explicit set of `(actual, declared)` verdicts.
///
/// The table is directional: `Integer -> short` does not imply `short -> Integer`.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityTable {
    rules: HashSet<(TypeRef, TypeRef)>,
}

impl CompatibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(&mut self, actual: TypeRef, declared: TypeRef) -> &mut Self {
        self.rules.insert((actual, declared));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<(TypeRef, TypeRef)> for CompatibilityTable {
    fn from_iter<I: IntoIterator<Item = (TypeRef, TypeRef)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl CompatibilityOracle for CompatibilityTable {
    fn is_compatible(&self, actual: &TypeRef, declared: &TypeRef) -> bool {
        actual == declared || self.rules.contains(&(actual.clone(), declared.clone()))
    }
}
