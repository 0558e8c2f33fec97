//! Solver configuration.

use crate::sat::error::SolveError;
use crate::sat::restarter::{RestarterImpls, RestarterType};
use crate::sat::variable_selection::{SelectionImpls, SelectionType};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Independent portfolio workers.
    pub workers: usize,
    /// Decisions that may be forked onto two fresh threads. 0 keeps every
    /// branch sequential.
    pub decision_threads: usize,
    /// Master seed. Drawn at random when absent.
    pub seed: Option<u64>,
    /// Restart budget of worker 0; worker `i` gets `(i + 1)` times this.
    pub restart_budget: Duration,
    pub restart_backoff: u32,
    pub restart: RestarterType,
    pub selection: SelectionType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 1,
            decision_threads: 0,
            seed: None,
            restart_budget: Duration::from_millis(100),
            restart_backoff: 3,
            restart: RestarterType::default(),
            selection: SelectionType::default(),
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// [`SolveError::InvalidConfig`] for zero workers. With geometric
    /// restarts, also for a zero budget or a backoff below 2, since either
    /// keeps the budget from growing.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.workers == 0 {
            return Err(SolveError::InvalidConfig(
                "at least one worker is required".to_string(),
            ));
        }
        if self.restart == RestarterType::Geometric {
            if self.restart_budget.is_zero() {
                return Err(SolveError::InvalidConfig(
                    "restart budget must be greater than zero".to_string(),
                ));
            }
            if self.restart_backoff < 2 {
                return Err(SolveError::InvalidConfig(format!(
                    "restart backoff must be at least 2, got {}",
                    self.restart_backoff
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn master_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| fastrand::u64(..))
    }

    /// One selector seed per worker, derived from `master`.
    #[must_use]
    pub fn worker_seeds(&self, master: u64) -> Vec<u64> {
        let mut rng = fastrand::Rng::with_seed(master);
        (0..self.workers).map(|_| rng.u64(..)).collect()
    }

    #[must_use]
    pub fn worker_budget(&self, worker: usize) -> Duration {
        let factor = u32::try_from(worker.saturating_add(1)).unwrap_or(u32::MAX);
        self.restart_budget.saturating_mul(factor)
    }

    #[must_use]
    pub fn selector(&self, seed: u64) -> SelectionImpls {
        self.selection.to_impl(seed)
    }

    #[must_use]
    pub fn restarter(&self, worker: usize) -> RestarterImpls {
        self.restart
            .to_impl(self.worker_budget(worker), self.restart_backoff)
    }
}
