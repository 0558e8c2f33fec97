#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Model;
use rustc_hash::FxHashMap;
use std::ops::Index;

/// The ordered sequence of committed literals along one branch.
///
/// Insertion order is decision/propagation order. A variable appears at most
/// once; `values` mirrors `steps` for constant-time lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    steps: Vec<Literal>,
    values: FxHashMap<Variable, bool>,
}

impl Index<usize> for Trail {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.steps.iter()
    }

    #[must_use]
    pub fn value_of(&self, var: Variable) -> Option<bool> {
        self.values.get(&var).copied()
    }

    /// The committed literal for `lit`'s variable, if any.
    #[must_use]
    pub fn committed(&self, lit: Literal) -> Option<Literal> {
        self.value_of(lit.variable())
            .map(|polarity| Literal::new(lit.variable(), polarity))
    }

    /// Appends `lit`. Returns `false`, leaving the trail untouched, if its
    /// variable is already present.
    pub fn push(&mut self, lit: Literal) -> bool {
        if self.values.contains_key(&lit.variable()) {
            return false;
        }

        self.values.insert(lit.variable(), lit.polarity());
        self.steps.push(lit);
        true
    }

    #[must_use]
    pub fn to_model(&self) -> Model {
        Model::from_literals(self.steps.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut trail = Trail::new();
        assert!(trail.push(Literal::from_i32(3)));
        assert!(trail.push(Literal::from_i32(-1)));

        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0], Literal::from_i32(3));
        assert_eq!(trail[1], Literal::from_i32(-1));
    }

    #[test]
    fn test_push_rejects_second_commit_of_variable() {
        let mut trail = Trail::new();
        assert!(trail.push(Literal::from_i32(2)));
        assert!(!trail.push(Literal::from_i32(-2)));
        assert!(!trail.push(Literal::from_i32(2)));
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.value_of(2), Some(true));
    }

    #[test]
    fn test_committed() {
        let mut trail = Trail::new();
        trail.push(Literal::from_i32(-5));
        assert_eq!(
            trail.committed(Literal::from_i32(5)),
            Some(Literal::from_i32(-5))
        );
        assert_eq!(trail.committed(Literal::from_i32(6)), None);
    }
}
