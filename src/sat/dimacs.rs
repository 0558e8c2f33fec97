#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A loader for the DIMACS CNF (Conjunctive Normal Form) file format.
//!
//! The format typically includes:
//! - Comment lines starting with 'c'.
//! - A problem line 'p cnf <`num_variables`> <`num_clauses`>'. Its counts are
//!   recorded in [`Header`] but never checked against the clauses read.
//! - Clause lines: whitespace separated non-zero signed integers terminated by
//!   a '0'. Each line is one clause; anything after the terminator is ignored.
//! - An optional '%' line marking end-of-data (SATLIB benchmark files end this
//!   way).
//!
//! Blank lines contribute nothing. A line holding only the terminator is an
//! explicit empty clause and makes the formula unsatisfiable. Clauses are
//! normalised on load (see [`Cnf::new`]).

use crate::sat::cnf::{Cnf, Header};
use crate::sat::error::ParseError;
use crate::sat::literal::Literal;
use log::debug;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

/// Parses DIMACS data from a `BufRead` source.
///
/// # Errors
///
/// - [`ParseError::MalformedLiteral`] if a clause line holds a token that is
///   not an `i32`.
/// - [`ParseError::FileUnreadable`] if reading from `reader` fails; `origin`
///   names the source in the message.
pub fn parse_dimacs<R: BufRead>(reader: R, origin: &Path) -> Result<Cnf, ParseError> {
    let mut header = None;
    let mut clauses: Vec<Vec<Literal>> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ParseError::FileUnreadable {
            path: origin.to_path_buf(),
            source,
        })?;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None => {}
            Some(first) if first.starts_with('c') => {}
            Some(first) if first.starts_with('p') => header = parse_header(&line).or(header),
            Some(_) => clauses.push(parse_clause(parts, number + 1)?),
        }
    }

    let mut cnf = Cnf::new(clauses);
    cnf.header = header;
    debug!(
        "loaded {} clauses over {} variables ({} tautologies dropped)",
        cnf.len(),
        cnf.num_vars,
        cnf.tautologies
    );
    Ok(cnf)
}

fn parse_header(line: &str) -> Option<Header> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("p"), Some("cnf"), Some(vars), Some(clauses)) => Some(Header {
            num_vars: vars.parse().ok()?,
            num_clauses: clauses.parse().ok()?,
        }),
        _ => None,
    }
}

fn parse_clause<'a>(
    parts: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec<Literal>, ParseError> {
    let mut literals = Vec::new();

    for token in parts {
        // `i32::MIN` has no positive counterpart, so its variable has no
        // signed form.
        let value = token
            .parse::<i32>()
            .ok()
            .filter(|&value| value != i32::MIN)
            .ok_or_else(|| ParseError::MalformedLiteral {
                line,
                token: token.to_string(),
            })?;
        if value == 0 {
            break;
        }
        literals.push(Literal::from_i32(value));
    }

    Ok(literals)
}

/// Parses a DIMACS CNF file.
///
/// # Errors
///
/// [`ParseError::FileUnreadable`] if the file cannot be opened or read, and
/// any error of [`parse_dimacs`].
pub fn parse_file(file_path: impl AsRef<Path>) -> Result<Cnf, ParseError> {
    let path = file_path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| ParseError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dimacs(io::BufReader::new(file), path)
}

/// Parses DIMACS text held in memory.
///
/// # Errors
///
/// See [`parse_dimacs`].
pub fn parse_str(text: &str) -> Result<Cnf, ParseError> {
    parse_dimacs(io::Cursor::new(text), &PathBuf::from("<text>"))
}
