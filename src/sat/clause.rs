//! Clauses: ordered disjunctions of literals.
//!
//! At steady state a clause mentions each variable at most once. Input is
//! normalised on the way in by [`Clause::normalised`]: repeated literals are
//! collapsed and a clause holding both a literal and its complement is a
//! tautology and is discarded altogether.

use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    pub literals: SmallVec<[Literal; 8]>,
}

impl Clause {
    /// Builds a clause verbatim, without normalising. Prefer
    /// [`Clause::normalised`] for anything read from input.
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    /// Normalises a raw literal sequence.
    ///
    /// Returns `None` for a tautology. Otherwise the first occurrence of each
    /// literal is kept, in input order.
    pub fn normalised(literals: impl IntoIterator<Item = Literal>) -> Option<Self> {
        let mut clause = Self::default();

        for lit in literals {
            match clause.find_variable(lit.variable()) {
                Some(existing) if existing.same_sign(lit) => {}
                Some(_) => return None,
                None => clause.literals.push(lit),
            }
        }

        Some(clause)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// The remaining literal of a unit clause.
    pub fn unit_literal(&self) -> Option<Literal> {
        if self.is_unit() {
            Some(self.literals[0])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.literals.iter().map(|lit| lit.variable())
    }

    /// The literal this clause holds for `var`, in whichever polarity.
    pub fn find_variable(&self, var: Variable) -> Option<Literal> {
        self.literals.iter().copied().find(|lit| lit.variable() == var)
    }

    /// Removes the literal mentioning `var`, returning it.
    pub fn remove_variable(&mut self, var: Variable) -> Option<Literal> {
        let pos = self.literals.iter().position(|lit| lit.variable() == var)?;
        Some(self.literals.remove(pos))
    }

    /// `true` if some literal agrees with the assignment `value`.
    pub fn is_satisfied_by(&self, value: impl Fn(Variable) -> Option<bool>) -> bool {
        self.literals
            .iter()
            .any(|lit| value(lit.variable()) == Some(lit.polarity()))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        Self::new(literals.into_iter().map(Literal::from_i32))
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for lit in &self.literals {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}
