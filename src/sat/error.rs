//! Error types for loading and solving.
//!
//! Unsatisfiability is a verdict, not an error; see
//! [`Verdict`](crate::sat::solver::Verdict).

use crate::sat::literal::Literal;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading DIMACS input.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input could not be opened or read.
    #[error("could not read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A token on a clause line is not a signed integer.
    #[error("malformed literal '{token}' on line {line}")]
    MalformedLiteral { line: usize, token: String },
}

/// Committing a literal would contradict the trail or a forced unit clause.
///
/// Recovered by the engine, which tries the other polarity or backtracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("committing {literal} conflicts with the current assignment")]
pub struct Conflict {
    pub literal: Literal,
}

/// Failures of the solving machinery itself.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every worker exited without publishing a verdict.
    #[error("all workers finished without a verdict")]
    NoVerdict,
}
