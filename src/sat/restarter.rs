//! Restart strategies.
//!
//! A restart discards a branch's progress and resumes from the branch's start
//! frame. Restarts here are driven by wall-clock time rather than conflict
//! counts: a branch that runs past its budget starts over with a larger one.
//!
//! This module provides:
//! - The `Restarter` trait, the interface the engine polls once per step.
//! - `TimedGeometric`: restart when the elapsed time since the last (re)start
//!   exceeds the budget, then multiply the budget by a constant backoff factor.
//! - `Never`: a strategy that never triggers a restart.

use clap::ValueEnum;
use std::fmt::{Debug, Display};
use std::time::{Duration, Instant};

pub trait Restarter: Debug + Send {
    /// Returns `true`, and advances to the next budget, if the branch should
    /// restart now.
    fn should_restart(&mut self) -> bool;

    /// Total number of restarts triggered so far.
    fn num_restarts(&self) -> usize;

    /// A restarter for a newly forked branch: same schedule, its clock
    /// starting now.
    #[must_use]
    fn fresh(&self) -> Self
    where
        Self: Sized;
}

/// Wall-clock restarts with a geometrically growing budget.
#[derive(Debug, Clone)]
pub struct TimedGeometric {
    initial: Duration,
    budget: Duration,
    backoff: u32,
    started: Instant,
    restarts: usize,
}

impl TimedGeometric {
    #[must_use]
    pub fn new(budget: Duration, backoff: u32) -> Self {
        Self {
            initial: budget,
            budget,
            backoff,
            started: Instant::now(),
            restarts: 0,
        }
    }

    /// The budget the current attempt runs under.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }
}

impl Restarter for TimedGeometric {
    fn should_restart(&mut self) -> bool {
        if self.started.elapsed() <= self.budget {
            return false;
        }

        self.restarts = self.restarts.wrapping_add(1);
        self.budget = self.budget.saturating_mul(self.backoff);
        self.started = Instant::now();
        true
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }

    fn fresh(&self) -> Self {
        Self::new(self.initial, self.backoff)
    }
}

/// A strategy that never triggers a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Never;

impl Restarter for Never {
    fn should_restart(&mut self) -> bool {
        false
    }

    fn num_restarts(&self) -> usize {
        0
    }

    fn fresh(&self) -> Self {
        Self
    }
}

#[derive(Debug, Clone)]
pub enum RestarterImpls {
    TimedGeometric(TimedGeometric),
    Never(Never),
}

impl Restarter for RestarterImpls {
    fn should_restart(&mut self) -> bool {
        match self {
            Self::TimedGeometric(r) => r.should_restart(),
            Self::Never(r) => r.should_restart(),
        }
    }

    fn num_restarts(&self) -> usize {
        match self {
            Self::TimedGeometric(r) => r.num_restarts(),
            Self::Never(r) => r.num_restarts(),
        }
    }

    fn fresh(&self) -> Self {
        match self {
            Self::TimedGeometric(r) => Self::TimedGeometric(r.fresh()),
            Self::Never(r) => Self::Never(r.fresh()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum RestarterType {
    /// Restart on a wall-clock budget that grows by the backoff factor.
    #[default]
    Geometric,
    /// Never restart.
    Never,
}

impl Display for RestarterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geometric => write!(f, "geometric"),
            Self::Never => write!(f, "never"),
        }
    }
}

impl RestarterType {
    #[must_use]
    pub fn to_impl(self, budget: Duration, backoff: u32) -> RestarterImpls {
        match self {
            Self::Geometric => RestarterImpls::TimedGeometric(TimedGeometric::new(budget, backoff)),
            Self::Never => RestarterImpls::Never(Never),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_geometric_waits_for_budget() {
        let mut r = TimedGeometric::new(Duration::from_secs(3600), 3);
        assert!(!r.should_restart());
        assert_eq!(r.num_restarts(), 0);
    }

    #[test]
    fn test_timed_geometric_backs_off() {
        let mut r = TimedGeometric::new(Duration::ZERO, 3);
        std::thread::sleep(Duration::from_millis(2));
        assert!(r.should_restart());
        assert_eq!(r.num_restarts(), 1);
        assert_eq!(r.budget(), Duration::ZERO);

        let mut r = TimedGeometric::new(Duration::from_nanos(1), 3);
        std::thread::sleep(Duration::from_millis(2));
        assert!(r.should_restart());
        assert_eq!(r.budget(), Duration::from_nanos(3));
    }

    #[test]
    fn test_fresh_resets_schedule() {
        let mut r = TimedGeometric::new(Duration::from_nanos(1), 2);
        std::thread::sleep(Duration::from_millis(1));
        assert!(r.should_restart());
        let child = r.fresh();
        assert_eq!(child.num_restarts(), 0);
        assert_eq!(child.budget(), Duration::from_nanos(1));
    }

    #[test]
    fn test_never() {
        let mut r = RestarterType::Never.to_impl(Duration::ZERO, 3);
        std::thread::sleep(Duration::from_millis(1));
        assert!(!r.should_restart());
        assert_eq!(r.num_restarts(), 0);
    }
}
