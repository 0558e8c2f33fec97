//! Portfolio solving.
//!
//! Runs several independent root engines on their own threads and returns the
//! first verdict any of them publishes. Workers share nothing but the
//! [`SearchContext`]: each builds its own formula from the input, and gets its
//! own selector seed and restart budget so the searches diverge.
//!
//! The coordinator sleeps on the context's signal channel rather than polling
//! the result cell. Once the cell is set it cancels every outstanding worker,
//! forked branches included, and joins them.

use crate::sat::cnf::Cnf;
use crate::sat::config::Config;
use crate::sat::context::{SearchContext, Signal};
use crate::sat::dpll::Dpll;
use crate::sat::error::SolveError;
use crate::sat::solver::{SolutionStats, Solver, Verdict};
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of one portfolio run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioResult {
    pub verdict: Verdict,
    /// Worker whose branch published the verdict.
    pub winner: usize,
    /// Counters of the winning worker, forked children included.
    pub stats: SolutionStats,
    /// Counters of every worker that ran, indexed by worker id.
    pub workers: Vec<SolutionStats>,
    /// Wall-clock time from spawning the first worker to the verdict.
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    cnf: Cnf,
    config: Config,
    last: Option<PortfolioResult>,
}

impl Portfolio {
    #[must_use]
    pub const fn new(cnf: Cnf, config: Config) -> Self {
        Self {
            cnf,
            config,
            last: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Races `config.workers` engines to a verdict.
    ///
    /// # Errors
    ///
    /// - [`SolveError::InvalidConfig`] if the configuration is rejected.
    /// - [`SolveError::NoVerdict`] if every worker ended without publishing.
    pub fn run(&mut self) -> Result<PortfolioResult, SolveError> {
        self.config.validate()?;

        let (ctx, signals) = SearchContext::new(self.config.decision_threads);
        let ctx = Arc::new(ctx);
        let master = self.config.master_seed();
        let seeds = self.config.worker_seeds(master);
        debug!(
            "portfolio of {} workers, master seed {master}",
            self.config.workers
        );

        let started = Instant::now();
        let (workers, elapsed) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(seeds.len());

            for (worker, &seed) in seeds.iter().enumerate() {
                let mut engine = Dpll::root(
                    &self.cnf,
                    self.config.selector(seed),
                    self.config.restarter(worker),
                    Arc::clone(&ctx),
                    worker,
                );
                let ctx = Arc::clone(&ctx);

                let handle = thread::Builder::new()
                    .name(format!("worker {worker}"))
                    .spawn_scoped(scope, move || {
                        info!("worker {worker} started with seed {seed}");
                        let outcome = engine.run();
                        info!("worker {worker} finished: {outcome}");
                        ctx.signal(Signal::WorkerExited(worker));
                        engine.stats()
                    });

                match handle {
                    Ok(handle) => handles.push((worker, handle)),
                    Err(err) => warn!("could not spawn worker {worker}: {err}"),
                }
            }

            let mut running = handles.len();
            while running > 0 && !ctx.result.is_published() {
                match signals.recv() {
                    Ok(Signal::WorkerExited(_)) => running -= 1,
                    Ok(Signal::Published) => {}
                    Err(_) => break,
                }
            }
            let elapsed = started.elapsed();
            ctx.cancel();

            let mut workers = vec![SolutionStats::default(); seeds.len()];
            for (worker, handle) in handles {
                workers[worker] = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            }
            (workers, elapsed)
        });

        let published = ctx.result.get().ok_or(SolveError::NoVerdict)?;
        info!(
            "worker {} won with {} after {elapsed:?}",
            published.worker, published.verdict
        );

        let result = PortfolioResult {
            verdict: published.verdict.clone(),
            winner: published.worker,
            stats: workers[published.worker],
            workers,
            elapsed,
        };
        self.last = Some(result.clone());
        Ok(result)
    }
}

impl Solver for Portfolio {
    fn new(cnf: &Cnf) -> Self {
        Self::new(cnf.clone(), Config::default())
    }

    fn solve(&mut self) -> Result<Verdict, SolveError> {
        self.run().map(|result| result.verdict)
    }

    fn stats(&self) -> SolutionStats {
        self.last
            .as_ref()
            .map(|result| result.stats)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize, decision_threads: usize) -> Config {
        Config {
            workers,
            decision_threads,
            seed: Some(17),
            ..Config::default()
        }
    }

    #[test]
    fn test_single_worker_sat() {
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1, -2]]);
        let mut portfolio = Portfolio::new(cnf.clone(), config(1, 0));

        let result = portfolio.run().unwrap();
        assert_eq!(result.winner, 0);
        assert!(cnf.verify(result.verdict.model().unwrap()));
        assert_eq!(result.workers.len(), 1);
    }

    #[test]
    fn test_many_workers_unsat() {
        let cnf = Cnf::from(vec![vec![1], vec![-1]]);
        let mut portfolio = Portfolio::new(cnf, config(4, 0));

        let result = portfolio.run().unwrap();
        assert_eq!(result.verdict, Verdict::Unsat);
        assert!(result.winner < 4);
        assert_eq!(result.workers.len(), 4);
    }

    #[test]
    fn test_workers_with_forks() {
        let cnf = Cnf::from(vec![
            vec![1, 2, 3],
            vec![-1, -2],
            vec![-2, -3],
            vec![-1, -3],
            vec![4, -1],
            vec![-4, 5],
        ]);
        let mut portfolio = Portfolio::new(cnf.clone(), config(3, 2));

        let result = portfolio.run().unwrap();
        assert!(cnf.verify(result.verdict.model().unwrap()));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut portfolio = Portfolio::new(Cnf::default(), config(0, 0));
        assert!(matches!(
            portfolio.run(),
            Err(SolveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_solver_trait() {
        let cnf = Cnf::from(vec![vec![1, -2], vec![2]]);
        let mut portfolio = <Portfolio as Solver>::new(&cnf);
        assert!(portfolio.solve().unwrap().is_sat());
        assert_eq!(portfolio.stats(), portfolio.last.unwrap().stats);
    }
}
