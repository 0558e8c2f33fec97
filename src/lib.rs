//! A parallel DPLL SAT solver.
//!
//! Formulas in DIMACS CNF are decided by a classic DPLL search (unit
//! propagation, decisions, chronological backtracking) with two layers of
//! parallelism on top: a portfolio of independent workers racing with
//! different seeds and restart schedules, and in-branch forking that explores
//! both polarities of a decision on separate threads.
//!
//! ```
//! use ppsat::sat::config::Config;
//! use ppsat::sat::dimacs::parse_str;
//! use ppsat::sat::portfolio::Portfolio;
//!
//! let cnf = parse_str("p cnf 2 2\n1 2 0\n-1 -2 0\n").unwrap();
//! let config = Config { workers: 2, ..Config::default() };
//! let result = Portfolio::new(cnf.clone(), config).run().unwrap();
//! assert!(cnf.verify(result.verdict.model().unwrap()));
//! ```

/// The `sat` module holds the formula representation, the DPLL engine, and
/// the portfolio coordinator.
pub mod sat;
