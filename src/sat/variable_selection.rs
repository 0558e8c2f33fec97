#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Decision literal selection.
//!
//! The engine asks a [`LiteralSelection`] for the literal to branch on when
//! no unit clause remains. Implementations pick from the live clauses of the
//! formula, so every pick is a literal of a still-unsatisfied clause.

use crate::sat::formula::Formula;
use crate::sat::literal::Literal;
use clap::ValueEnum;
use std::fmt::{Debug, Display};

pub trait LiteralSelection: Debug + Send {
    /// Picks a literal from some live clause, or `None` if no live clause has
    /// a literal left.
    fn pick(&mut self, formula: &Formula) -> Option<Literal>;

    /// A selector for a newly forked branch. Derived from `self` so a fixed
    /// seed reproduces the whole search tree.
    #[must_use]
    fn split(&mut self) -> Self
    where
        Self: Sized;
}

/// Uniformly random clause, then uniformly random literal within it.
#[derive(Debug, Clone)]
pub struct RandomPick {
    rng: fastrand::Rng,
}

impl RandomPick {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl LiteralSelection for RandomPick {
    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        if formula.is_empty() {
            return None;
        }

        let start = self.rng.usize(..formula.len());
        (0..formula.len())
            .map(|offset| (start + offset) % formula.len())
            .filter_map(|position| formula.live_clause(position))
            .find(|clause| !clause.is_empty())
            .map(|clause| clause[self.rng.usize(..clause.len())])
    }

    fn split(&mut self) -> Self {
        Self::new(self.rng.u64(..))
    }
}

/// The first literal of the first live clause. Deterministic, for tests and
/// benchmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLiteral;

impl LiteralSelection for FirstLiteral {
    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        formula
            .clauses()
            .find(|clause| !clause.is_empty())
            .map(|clause| clause[0])
    }

    fn split(&mut self) -> Self {
        Self
    }
}

/// Either selection strategy, chosen at runtime.
#[derive(Debug, Clone)]
pub enum SelectionImpls {
    Random(RandomPick),
    First(FirstLiteral),
}

impl LiteralSelection for SelectionImpls {
    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        match self {
            Self::Random(s) => s.pick(formula),
            Self::First(s) => s.pick(formula),
        }
    }

    fn split(&mut self) -> Self {
        match self {
            Self::Random(s) => Self::Random(s.split()),
            Self::First(s) => Self::First(s.split()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum SelectionType {
    /// Random clause, random literal.
    #[default]
    Random,
    /// First literal of the first live clause.
    First,
}

impl Display for SelectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::First => write!(f, "first"),
        }
    }
}

impl SelectionType {
    #[must_use]
    pub fn to_impl(self, seed: u64) -> SelectionImpls {
        match self {
            Self::Random => SelectionImpls::Random(RandomPick::new(seed)),
            Self::First => SelectionImpls::First(FirstLiteral),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;

    fn formula() -> Formula {
        Formula::new([
            Clause::from(vec![1, 2]),
            Clause::from(vec![-3, 4, 5]),
            Clause::from(vec![6]),
        ])
    }

    #[test]
    fn test_random_pick_comes_from_live_clause() {
        let f = formula();
        let mut selector = RandomPick::new(7);
        for _ in 0..50 {
            let lit = selector.pick(&f).unwrap();
            assert!(f.clauses().any(|c| c.iter().any(|&l| l == lit)));
        }
    }

    #[test]
    fn test_random_pick_reproducible() {
        let f = formula();
        let mut a = RandomPick::new(42);
        let mut b = RandomPick::new(42);
        for _ in 0..20 {
            assert_eq!(a.pick(&f), b.pick(&f));
        }
        assert_eq!(a.split().pick(&f), b.split().pick(&f));
    }

    #[test]
    fn test_pick_on_empty_formula() {
        let f = Formula::default();
        assert_eq!(RandomPick::new(1).pick(&f), None);
        assert_eq!(FirstLiteral.pick(&f), None);
    }

    #[test]
    fn test_first_literal() {
        assert_eq!(FirstLiteral.pick(&formula()), Some(Literal::from_i32(1)));
    }

    #[test]
    fn test_selection_type_to_impl() {
        assert!(matches!(
            SelectionType::First.to_impl(0),
            SelectionImpls::First(_)
        ));
        assert_eq!(SelectionType::default().to_string(), "random");
    }
}
