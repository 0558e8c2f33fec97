#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The loaded problem: a list of normalised clauses.
//!
//! `Cnf` is immutable input. Search works on a [`Formula`] built from it with
//! [`Cnf::to_formula`], and every portfolio worker builds its own.

use crate::sat::clause::Clause;
use crate::sat::formula::Formula;
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Model;
use std::fmt::{Display, Formatter};

/// Counts taken from a `p cnf <vars> <clauses>` header. Informational only;
/// never checked against the clauses actually read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub num_vars: usize,
    pub num_clauses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    /// Largest variable id mentioned by any clause.
    pub num_vars: usize,
    pub header: Option<Header>,
    /// Tautological clauses discarded during normalisation.
    pub tautologies: usize,
}

impl Cnf {
    /// Normalises raw clauses: repeated literals collapse, tautologies are
    /// dropped and counted.
    pub fn new<I, J>(clauses: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = Literal>,
    {
        let mut cnf = Self::default();

        for raw in clauses {
            match Clause::normalised(raw) {
                Some(clause) => cnf.push(clause),
                None => cnf.tautologies += 1,
            }
        }

        cnf
    }

    fn push(&mut self, clause: Clause) {
        let max = clause.variables().max().unwrap_or(0) as usize;
        self.num_vars = self.num_vars.max(max);
        self.clauses.push(clause);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Total literal occurrences over all clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    /// A fresh formula index over these clauses.
    #[must_use]
    pub fn to_formula(&self) -> Formula {
        Formula::new(self.clauses.iter().cloned())
    }

    /// `true` iff every clause has a literal agreeing with `model`.
    #[must_use]
    pub fn verify(&self, model: &Model) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.is_satisfied_by(|var: Variable| model.value(var)))
    }
}

impl From<Vec<Vec<i32>>> for Cnf {
    fn from(clauses: Vec<Vec<i32>>) -> Self {
        Self::new(
            clauses
                .into_iter()
                .map(|c| c.into_iter().map(Literal::from_i32)),
        )
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}
