//! Shared result types and the `Solver` trait.
//!
//! A solver consumes a [`Cnf`] and produces a [`Verdict`]. Both the sequential
//! [`Dpll`](crate::sat::dpll::Dpll) engine and the
//! [`Portfolio`](crate::sat::portfolio::Portfolio) coordinator implement it.

use crate::sat::cnf::Cnf;
use crate::sat::error::SolveError;
use crate::sat::literal::{Literal, Variable};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// A satisfying assignment, one literal per assigned variable, sorted by
/// variable id. Variables the search never had to touch are absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Model(Vec<Literal>);

impl Model {
    /// Builds a model from literals naming distinct variables.
    pub fn from_literals(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self(
            literals
                .into_iter()
                .sorted_by_key(|lit| lit.variable())
                .collect(),
        )
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.0
            .binary_search_by_key(&var, |lit| lit.variable())
            .ok()
            .map(|i| self.0[i].polarity())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One `<variable> : <bool>` line per assigned variable.
impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for lit in &self.0 {
            writeln!(f, "{} : {}", lit.variable(), lit.polarity())?;
        }
        Ok(())
    }
}

/// The answer for a whole formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Sat(Model),
    Unsat,
}

impl Verdict {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    #[must_use]
    pub const fn model(&self) -> Option<&Model> {
        match self {
            Self::Sat(model) => Some(model),
            Self::Unsat => None,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sat(_) => write!(f, "SATISFIABLE"),
            Self::Unsat => write!(f, "UNSATISFIABLE"),
        }
    }
}

/// Counters describing the work one search performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    pub decisions: usize,
    pub propagations: usize,
    /// Failed commits.
    pub conflicts: usize,
    pub backtracks: usize,
    pub restarts: usize,
    /// Decisions explored by two concurrent branches.
    pub forks: usize,
}

impl SolutionStats {
    /// Folds a child branch's counters into these.
    pub fn merge(&mut self, other: &Self) {
        self.decisions += other.decisions;
        self.propagations += other.propagations;
        self.conflicts += other.conflicts;
        self.backtracks += other.backtracks;
        self.restarts += other.restarts;
        self.forks += other.forks;
    }
}

pub trait Solver {
    /// Creates a solver for `cnf`.
    fn new(cnf: &Cnf) -> Self
    where
        Self: Sized;

    /// Runs the search to a verdict.
    ///
    /// # Errors
    ///
    /// [`SolveError`] when the search machinery fails to reach a verdict.
    fn solve(&mut self) -> Result<Verdict, SolveError>;

    fn stats(&self) -> SolutionStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_sorted_and_queryable() {
        let model = Model::from_literals([3, -1, 2].map(Literal::from_i32));
        assert_eq!(
            model.iter().map(|lit| lit.to_i32()).collect::<Vec<_>>(),
            vec![-1, 2, 3]
        );
        assert_eq!(model.value(1), Some(false));
        assert_eq!(model.value(3), Some(true));
        assert_eq!(model.value(4), None);
    }

    #[test]
    fn test_model_display() {
        let model = Model::from_literals([2, -1].map(Literal::from_i32));
        assert_eq!(model.to_string(), "1 : false\n2 : true\n");
    }

    #[test]
    fn test_stats_merge() {
        let mut a = SolutionStats {
            decisions: 1,
            forks: 1,
            ..SolutionStats::default()
        };
        a.merge(&SolutionStats {
            decisions: 2,
            conflicts: 3,
            ..SolutionStats::default()
        });
        assert_eq!(a.decisions, 3);
        assert_eq!(a.conflicts, 3);
        assert_eq!(a.forks, 1);
    }
}
