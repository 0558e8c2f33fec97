#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use ppsat::sat::cnf::Cnf;
use ppsat::sat::config::Config;
use ppsat::sat::dimacs::{parse_file, parse_str};
use ppsat::sat::error::{ParseError, SolveError};
use ppsat::sat::generator::RandomCnf;
use ppsat::sat::portfolio::{Portfolio, PortfolioResult};
use ppsat::sat::restarter::RestarterType;
use ppsat::sat::solver::Verdict;
use ppsat::sat::variable_selection::SelectionType;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use thiserror::Error;
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the solver.
#[derive(Parser, Debug)]
#[command(name = "ppsat", version, about = "A parallel portfolio DPLL SAT solver")]
pub(crate) struct Cli {
    /// Path to a DIMACS .cnf file. Used when no subcommand is given; prompted
    /// for on stdin when missing.
    pub path: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// DIMACS text, e.g. "1 -2 0\n2 3 0".
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf file under a directory.
    Dir {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Print a random CNF formula in DIMACS format.
    Generate {
        #[arg(long, default_value_t = 81)]
        vars: u32,

        #[arg(long, default_value_t = 350)]
        clauses: usize,

        /// Literals per clause, or the maximum with --random-width.
        #[arg(long, default_value_t = 3)]
        width: usize,

        /// Draw each clause's width uniformly from 1..=width.
        #[arg(long, default_value_t = false)]
        random_width: bool,

        #[arg(long)]
        seed: Option<u64>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a found model against the input clauses.
    #[arg(short, long, default_value_t = false)]
    pub(crate) verify: bool,

    /// Print search and memory statistics after solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment, one "<id> : <bool>" line per variable.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) print_solution: bool,

    /// Number of portfolio workers.
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    pub(crate) threads: usize,

    /// Number of decisions that may be forked onto two new threads.
    #[arg(long, visible_alias = "dt", default_value_t = 0)]
    pub(crate) decision_threads: usize,

    /// Master seed for decision picks. Random when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Initial restart budget of the first worker, in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub(crate) restart_budget_ms: u64,

    /// Factor the restart budget grows by after each restart.
    #[arg(long, default_value_t = 3)]
    pub(crate) restart_backoff: u32,

    #[arg(long, default_value_t = RestarterType::Geometric)]
    pub(crate) restart_strategy: RestarterType,

    #[arg(long, default_value_t = SelectionType::Random)]
    pub(crate) selection: SelectionType,
}

impl CommonOptions {
    pub(crate) const fn to_config(&self) -> Config {
        Config {
            workers: self.threads,
            decision_threads: self.decision_threads,
            seed: self.seed,
            restart_budget: Duration::from_millis(self.restart_budget_ms),
            restart_backoff: self.restart_backoff,
            restart: self.restart_strategy,
            selection: self.selection,
        }
    }
}

impl Cli {
    /// The options of the subcommand if one was given, the top-level ones
    /// otherwise.
    pub(crate) fn options(&self) -> &CommonOptions {
        match &self.command {
            Some(
                Commands::File { common, .. }
                | Commands::Text { common, .. }
                | Commands::Dir { common, .. },
            ) => common,
            _ => &self.common,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("model failed verification")]
    VerificationFailed,
}

/// Sets up `env_logger`. `RUST_LOG` wins over `--debug`.
pub(crate) fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// Dispatches the parsed command line. The exit code follows the SAT
/// competition convention: 10 for SAT, 20 for UNSAT.
pub(crate) fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_path(&path, &common),
        Some(Commands::Text { input, common }) => {
            let time = Instant::now();
            let cnf = parse_str(&input)?;
            solve_and_report(&cnf, &common, None, time.elapsed()).map(exit_code)
        }
        Some(Commands::Dir { path, common }) => {
            solve_dir(&path, &common)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Generate {
            vars,
            clauses,
            width,
            random_width,
            seed,
            output,
        }) => {
            let cnf = RandomCnf {
                num_vars: vars,
                num_clauses: clauses,
                max_width: width,
                fixed_width: !random_width,
                seed: seed.unwrap_or_else(|| fastrand::u64(..)),
            }
            .generate();
            match output {
                Some(path) => std::fs::write(path, cnf.to_string())?,
                None => print!("{cnf}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let path = match cli.path {
                Some(path) => path,
                None => prompt_for_path()?,
            };
            solve_path(&path, &cli.common)
        }
    }
}

fn exit_code(verdict: Verdict) -> ExitCode {
    match verdict {
        Verdict::Sat(_) => ExitCode::from(10),
        Verdict::Unsat => ExitCode::from(20),
    }
}

fn prompt_for_path() -> io::Result<PathBuf> {
    print!("Path to a DIMACS .cnf file: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

fn solve_path(path: &Path, common: &CommonOptions) -> Result<ExitCode, CliError> {
    let time = Instant::now();
    let cnf = parse_file(path)?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, Some(path), parse_time).map(exit_code)
}

/// Solves every `.cnf` file below `path`, stopping at the first error.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), CliError> {
    if !path.is_dir() {
        return Err(CliError::NotADirectory(path.to_path_buf()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() || file_path.extension().is_none_or(|ext| ext != "cnf") {
            continue;
        }

        println!("Solving: {}", file_path.display());
        let time = Instant::now();
        let cnf = parse_file(file_path)?;
        solve_and_report(&cnf, common, Some(file_path), time.elapsed())?;
    }

    Ok(())
}

/// Runs the portfolio on `cnf` and prints the verdict, the model, and, if
/// asked for, the statistics table.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<Verdict, CliError> {
    if let Some(name) = label {
        log::debug!("solving {}", name.display());
    }

    let config = common.to_config();
    let result = Portfolio::new(cnf.clone(), config).run()?;

    println!("{}", result.verdict);
    if let Some(model) = result.verdict.model() {
        if common.print_solution {
            print!("{model}");
        }
        if common.verify {
            let ok = cnf.verify(model);
            println!("Verified: {ok}");
            if !ok {
                return Err(CliError::VerificationFailed);
            }
        }
    }
    println!("Number of threads: {}", common.threads);

    if common.stats {
        print_stats(parse_time, cnf, &result, memory_mib());
    }

    Ok(result.verdict)
}

/// Allocated and resident memory in MiB as reported by jemalloc.
fn memory_mib() -> Option<(f64, f64)> {
    const MIB: f64 = 1024.0 * 1024.0;

    epoch::advance().ok()?;
    let allocated = stats::allocated::read().ok()?;
    let resident = stats::resident::read().ok()?;
    Some((allocated as f64 / MIB, resident as f64 / MIB))
}

pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

pub(crate) fn print_stats(
    parse_time: Duration,
    cnf: &Cnf,
    result: &PortfolioResult,
    memory: Option<(f64, f64)>,
) {
    let elapsed_secs = result.elapsed.as_secs_f64();
    let s = &result.stats;

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals());
    stat_line("Tautologies dropped", cnf.tautologies);

    println!("========================[ Search Statistics ]========================");
    stat_line("Workers", result.workers.len());
    stat_line("Winning worker", result.winner);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Backtracks", s.backtracks, elapsed_secs);
    stat_line_with_rate("Restarts", s.restarts, elapsed_secs);
    stat_line("Forks", s.forks);
    if let Some((allocated, resident)) = memory {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("Wall time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["ppsat", "problem.cnf"]);
        assert_eq!(cli.path, Some(PathBuf::from("problem.cnf")));
        assert!(cli.command.is_none());

        let config = cli.options().to_config();
        assert_eq!(config, Config::default());
        assert!(cli.common.print_solution);
    }

    #[test]
    fn test_cli_thread_flags() {
        let cli = Cli::parse_from(["ppsat", "-t", "4", "--dt", "2", "--seed", "7", "x.cnf"]);
        let config = cli.options().to_config();
        assert_eq!(config.workers, 4);
        assert_eq!(config.decision_threads, 2);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_cli_subcommand_options() {
        let cli = Cli::parse_from([
            "ppsat",
            "file",
            "--path",
            "a.cnf",
            "--restart-strategy",
            "never",
            "--selection",
            "first",
            "--print-solution",
            "false",
        ]);
        let options = cli.options();
        assert_eq!(options.restart_strategy, RestarterType::Never);
        assert_eq!(options.selection, SelectionType::First);
        assert!(!options.print_solution);
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_solve_and_report_unsat() {
        let cnf = parse_str("p cnf 1 2\n1 0\n-1 0\n").unwrap();
        let common = Cli::parse_from(["ppsat"]).common;
        let verdict = solve_and_report(&cnf, &common, None, Duration::ZERO).unwrap();
        assert_eq!(verdict, Verdict::Unsat);
    }

    #[test]
    fn test_solve_dir_rejects_file() {
        let common = Cli::parse_from(["ppsat"]).common;
        assert!(matches!(
            solve_dir(Path::new("Cargo.toml"), &common),
            Err(CliError::NotADirectory(_))
        ));
    }
}
