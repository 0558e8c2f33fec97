//! State shared by every engine working on one formula.
//!
//! Engines own their formula and trail outright. The only things they share
//! are collected here: the publish-once result cell, the decision-thread
//! budget, and the cancellation token. A crossbeam channel carries wake-ups to
//! the coordinator so it never has to spin on the cell.

use crate::sat::solver::Verdict;
use crossbeam::channel::{self, Receiver, Sender};
use log::info;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A verdict together with the portfolio worker that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub worker: usize,
    pub verdict: Verdict,
}

/// Holds the first verdict published and ignores every later one.
#[derive(Debug, Default)]
pub struct ResultCell(OnceLock<Published>);

impl ResultCell {
    /// Returns `true` if this call set the cell.
    pub fn publish(&self, worker: usize, verdict: Verdict) -> bool {
        self.0.set(Published { worker, verdict }).is_ok()
    }

    #[must_use]
    pub fn get(&self) -> Option<&Published> {
        self.0.get()
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Number of decisions that may still be forked onto fresh threads.
#[derive(Debug, Default)]
pub struct DecisionBudget(AtomicUsize);

impl DecisionBudget {
    #[must_use]
    pub const fn new(forks: usize) -> Self {
        Self(AtomicUsize::new(forks))
    }

    /// Takes one unit of budget if any is left.
    pub fn try_acquire(&self) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }

    pub fn release(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The result cell was set.
    Published,
    /// A portfolio worker's root engine returned.
    WorkerExited(usize),
}

#[derive(Debug)]
pub struct SearchContext {
    pub result: ResultCell,
    pub budget: DecisionBudget,
    cancelled: AtomicBool,
    signals: Sender<Signal>,
}

impl SearchContext {
    /// A context plus the receiving end of its wake-up channel.
    #[must_use]
    pub fn new(decision_threads: usize) -> (Self, Receiver<Signal>) {
        let (signals, receiver) = channel::unbounded();
        let ctx = Self {
            result: ResultCell::default(),
            budget: DecisionBudget::new(decision_threads),
            cancelled: AtomicBool::new(false),
            signals,
        };
        (ctx, receiver)
    }

    /// A context nobody listens to, for a single engine run on its own.
    #[must_use]
    pub fn detached(decision_threads: usize) -> Self {
        Self::new(decision_threads).0
    }

    /// Publishes `verdict` unless another one got there first.
    pub fn publish(&self, worker: usize, verdict: Verdict) -> bool {
        let label = verdict.to_string();
        if !self.result.publish(worker, verdict) {
            return false;
        }
        info!("worker {worker} published {label}");
        self.signal(Signal::Published);
        true
    }

    /// Sends a wake-up. Nobody listening is not an error.
    pub fn signal(&self, signal: Signal) {
        let _ = self.signals.send(signal);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// `true` once a verdict exists or the run was cancelled; engines poll
    /// this at every step and give up when it flips.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.cancelled.load(Ordering::Acquire) || self.result.is_published()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::solver::Model;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_result_cell_publishes_once() {
        let (ctx, signals) = SearchContext::new(0);
        assert!(!ctx.should_stop());

        assert!(ctx.publish(2, Verdict::Unsat));
        assert!(!ctx.publish(0, Verdict::Sat(Model::default())));

        let published = ctx.result.get().unwrap();
        assert_eq!(published.worker, 2);
        assert_eq!(published.verdict, Verdict::Unsat);
        assert!(ctx.should_stop());
        assert_eq!(signals.try_recv(), Ok(Signal::Published));
        assert!(signals.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_publish_has_single_winner() {
        let ctx = Arc::new(SearchContext::detached(0));
        let wins: usize = (0..8)
            .map(|worker| {
                let ctx = Arc::clone(&ctx);
                thread::spawn(move || ctx.publish(worker, Verdict::Unsat))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| usize::from(handle.join().unwrap()))
            .sum();
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_budget_never_goes_negative() {
        let budget = DecisionBudget::new(2);
        assert!(budget.try_acquire());
        assert!(budget.try_acquire());
        assert!(!budget.try_acquire());
        assert_eq!(budget.available(), 0);
        budget.release();
        assert!(budget.try_acquire());
    }

    #[test]
    fn test_cancel() {
        let ctx = SearchContext::detached(0);
        ctx.cancel();
        assert!(ctx.should_stop());
        assert!(!ctx.result.is_published());
    }
}
