//! # ppsat
//!
//! Command-line front end of the parallel DPLL solver. It reads a DIMACS CNF
//! formula, races a portfolio of solver workers on it, and prints
//! `SATISFIABLE` with one `<variable> : <bool>` line per assigned variable, or
//! `UNSATISFIABLE`.
//!
//! ## Usage
//!
//! ```sh
//! ppsat [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! Without a path or subcommand the path is read from stdin.
//!
//! ### Subcommands
//!
//! -   `file --path <cnf>`: solve a DIMACS file.
//! -   `text --input "<dimacs>"`: solve DIMACS text given inline.
//! -   `dir --path <dir>`: solve every `.cnf` file under a directory.
//! -   `generate [--vars N] [--clauses M] [--width K] [--random-width]`:
//!     print a random formula.
//! -   `completions <shell>`: print a shell completion script.
//!
//! ### Common Options
//!
//! -   `-t, --threads <N>`: portfolio workers (default 1).
//! -   `--decision-threads, --dt <N>`: decisions that may be forked onto two
//!     new threads (default 0).
//! -   `--seed <N>`: master seed, for reproducible runs.
//! -   `--restart-budget-ms <MS>`, `--restart-backoff <K>`,
//!     `--restart-strategy <geometric|never>`: restart schedule.
//! -   `--selection <random|first>`: decision literal selection.
//! -   `-d, --debug`, `-v, --verify`, `-s, --stats`,
//!     `-p, --print-solution <BOOL>`.
//!
//! The exit status is 10 for SAT, 20 for UNSAT, and 1 on error.

use clap::Parser;
use command_line::cli::{self, Cli};
use std::process::ExitCode;

mod command_line;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging(cli.options().debug);

    match cli::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
