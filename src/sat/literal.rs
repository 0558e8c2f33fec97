#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literals: a variable identifier paired with a truth polarity.
//!
//! Two notions of "sameness" matter during search:
//!
//! - [`Literal::same_variable`] compares identifiers only. The trail uses it to
//!   find whether a variable has already been committed.
//! - [`Literal::same_sign`] compares polarities only. Callers combine it with
//!   `same_variable` to tell a duplicate (same variable, same sign) from a
//!   contradiction (same variable, opposite sign).
//!
//! The derived `PartialEq` is full value equality (identifier *and* polarity).

use core::ops::{Neg, Not};
use std::fmt::{Display, Formatter};

/// A propositional variable identifier. Always strictly positive for literals
/// built from DIMACS input.
pub type Variable = u32;

/// A literal: `variable` if `polarity` is `true`, `¬variable` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal {
    variable: Variable,
    polarity: bool,
}

impl Literal {
    #[must_use]
    pub const fn new(variable: Variable, polarity: bool) -> Self {
        Self { variable, polarity }
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.variable
    }

    #[must_use]
    pub const fn polarity(self) -> bool {
        self.polarity
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity
    }

    /// The complementary literal.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self {
            variable: self.variable,
            polarity: !self.polarity,
        }
    }

    /// Identity by variable: `true` iff both literals name the same variable,
    /// whatever their polarity.
    #[must_use]
    pub const fn same_variable(self, other: Self) -> bool {
        self.variable == other.variable
    }

    /// `true` iff both literals carry the same polarity. Says nothing about the
    /// variables involved.
    #[must_use]
    pub const fn same_sign(self, other: Self) -> bool {
        self.polarity == other.polarity
    }

    /// Same variable, opposite polarity.
    #[must_use]
    pub const fn is_complement_of(self, other: Self) -> bool {
        self.same_variable(other) && !self.same_sign(other)
    }

    /// Builds a literal from a signed DIMACS integer. The caller guarantees
    /// `value != 0`; zero is a clause terminator, never a literal.
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        Self::new(value.unsigned_abs(), value.is_positive())
    }

    /// The signed DIMACS representation.
    ///
    /// # Panics
    ///
    /// If the variable does not fit in an `i32`. The only such literal
    /// [`Literal::from_i32`] can build is `from_i32(i32::MIN)`; the DIMACS
    /// reader rejects that token.
    #[must_use]
    pub fn to_i32(self) -> i32 {
        let var = i32::try_from(self.variable).expect("literal variable overflowed i32");
        if self.polarity { var } else { -var }
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.polarity {
            write!(f, "{}", self.variable)
        } else {
            write!(f, "-{}", self.variable)
        }
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Neg for &Literal {
    type Output = Literal;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negated()
    }
}
