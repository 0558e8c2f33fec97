//! The DPLL (Davis-Putnam-Logemann-Loveland) search engine.
//!
//! One [`Dpll`] owns one branch of the search: a formula, a trail, and a stack
//! of [`Frame`] checkpoints. It runs an explicit state machine:
//!
//! 1.  **Propagating:** commit the literal of some unit clause, repeatedly,
//!     until the formula is complete (SAT) or no unit clause is left.
//! 2.  **Deciding:** pick a literal from a live clause, checkpoint the
//!     pre-commit state, and commit the literal. If the shared decision budget
//!     allows, the decision is forked instead: two child engines explore the
//!     literal and its complement on their own threads.
//! 3.  **Backtracking:** pop checkpoints until committing the complement of a
//!     checkpoint's decision succeeds. An empty stack means this branch is
//!     UNSAT. The walk is a loop, so depth is bounded by heap, not stack.
//!
//! Between any two steps the engine checks the shared cancellation token and
//! its restarter. A restart throws away all progress and resumes from the
//! branch's start frame.
//!
//! Only an engine that owns the whole formula (a root) may report UNSAT as a
//! verdict. A forked child's UNSAT covers just its half of a decision; the
//! parent turns two of them into a backtrack.

use crate::sat::cnf::Cnf;
use crate::sat::config::Config;
use crate::sat::context::SearchContext;
use crate::sat::error::SolveError;
use crate::sat::formula::Formula;
use crate::sat::frame::Frame;
use crate::sat::literal::Literal;
use crate::sat::restarter::{Restarter, RestarterImpls};
use crate::sat::solver::{Model, SolutionStats, Solver, Verdict};
use crate::sat::trail::Trail;
use crate::sat::variable_selection::{LiteralSelection, SelectionImpls};
use log::{debug, info, trace, warn};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::thread;

/// How one branch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sat(Model),
    /// No assignment extends this branch's start state.
    Unsat,
    /// Stopped because a verdict was published elsewhere or the run was
    /// cancelled.
    Cancelled,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sat(_) => write!(f, "SAT"),
            Self::Unsat => write!(f, "UNSAT"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug)]
enum State {
    Propagating,
    Deciding,
    Backtracking,
    Done(Outcome),
}

#[derive(Debug)]
pub struct Dpll<S: LiteralSelection = SelectionImpls, R: Restarter = RestarterImpls> {
    formula: Formula,
    trail: Trail,
    /// Checkpoints, most recent decision last.
    frames: Vec<Frame>,
    /// State a restart returns to.
    start: Frame,
    selector: S,
    restarter: R,
    ctx: Arc<SearchContext>,
    /// Portfolio worker this branch belongs to.
    worker: usize,
    /// Owns the whole formula, so its UNSAT is a verdict.
    is_root: bool,
    stats: SolutionStats,
}

impl<S: LiteralSelection, R: Restarter> Dpll<S, R> {
    /// A root engine over the whole of `cnf`.
    pub fn root(cnf: &Cnf, selector: S, restarter: R, ctx: Arc<SearchContext>, worker: usize) -> Self {
        let formula = cnf.to_formula();
        let trail = Trail::new();
        let start = Frame::capture(&formula, &trail, None);

        Self {
            formula,
            trail,
            frames: Vec::new(),
            start,
            selector,
            restarter,
            ctx,
            worker,
            is_root: true,
            stats: SolutionStats::default(),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> SolutionStats {
        self.stats
    }

    /// Searches this branch to an outcome and publishes it if it is a
    /// verdict for the whole formula.
    pub fn run(&mut self) -> Outcome {
        let outcome = self.search();

        match &outcome {
            Outcome::Sat(model) => {
                self.ctx.publish(self.worker, Verdict::Sat(model.clone()));
            }
            Outcome::Unsat if self.is_root => {
                self.ctx.publish(self.worker, Verdict::Unsat);
            }
            Outcome::Unsat | Outcome::Cancelled => {}
        }

        outcome
    }

    fn search(&mut self) -> Outcome {
        if self.formula.has_empty_clause() {
            return Outcome::Unsat;
        }

        let mut state = State::Propagating;
        loop {
            state = match state {
                State::Done(outcome) => return outcome,
                _ if self.ctx.should_stop() => State::Done(Outcome::Cancelled),
                _ if self.restarter.should_restart() => self.restart(),
                State::Propagating => self.propagate(),
                State::Deciding => self.decide(),
                State::Backtracking => self.backtrack(),
            };
        }
    }

    fn commit(&mut self, lit: Literal) -> bool {
        match self.formula.commit(&mut self.trail, lit) {
            Ok(()) => true,
            Err(conflict) => {
                trace!("{conflict}");
                self.stats.conflicts += 1;
                false
            }
        }
    }

    fn propagate(&mut self) -> State {
        if self.formula.is_complete() {
            return State::Done(Outcome::Sat(self.trail.to_model()));
        }

        let Some(lit) = self.formula.propagate_candidate() else {
            return State::Deciding;
        };

        self.stats.propagations += 1;
        trace!("propagating {lit}");
        if self.commit(lit) || self.commit(!lit) {
            State::Propagating
        } else {
            State::Backtracking
        }
    }

    fn decide(&mut self) -> State {
        let Some(lit) = self.selector.pick(&self.formula) else {
            if self.formula.is_complete() {
                return State::Done(Outcome::Sat(self.trail.to_model()));
            }
            return State::Backtracking;
        };

        self.stats.decisions += 1;
        if self.ctx.budget.try_acquire() {
            return self.fork(lit);
        }

        debug!("deciding {lit} at depth {}", self.frames.len());
        self.frames
            .push(Frame::capture(&self.formula, &self.trail, Some(lit)));
        if self.commit(lit) {
            return State::Propagating;
        }

        self.frames.pop();
        if self.commit(!lit) {
            State::Propagating
        } else {
            State::Backtracking
        }
    }

    fn backtrack(&mut self) -> State {
        while let Some(frame) = self.frames.pop() {
            self.stats.backtracks += 1;
            let (formula, trail, decision) = frame.into_parts();
            self.formula = formula;
            self.trail = trail;

            let Some(decision) = decision else {
                continue;
            };
            debug!("backtracking to {} at depth {}", !decision, self.frames.len());
            if self.commit(!decision) {
                return State::Propagating;
            }
        }

        State::Done(Outcome::Unsat)
    }

    fn restart(&mut self) -> State {
        self.stats.restarts += 1;
        info!(
            "worker {} restarting (restart {})",
            self.worker,
            self.restarter.num_restarts()
        );

        self.formula = self.start.formula.clone();
        self.trail = self.start.trail.clone();
        self.frames.clear();
        State::Propagating
    }

    /// A child branch that will explore `decision` from the current state.
    fn child(&mut self, decision: Literal) -> Self {
        let (formula, trail, _) =
            Frame::capture(&self.formula, &self.trail, Some(decision)).into_parts();

        Self {
            formula,
            trail,
            frames: Vec::new(),
            start: Frame::default(),
            selector: self.selector.split(),
            restarter: self.restarter.fresh(),
            ctx: Arc::clone(&self.ctx),
            worker: self.worker,
            is_root: false,
            stats: SolutionStats::default(),
        }
    }

    /// Commits `decision` and searches. The post-commit state is where this
    /// branch's restarts return to.
    fn explore(mut self, decision: Literal) -> (Outcome, SolutionStats) {
        if !self.commit(decision) {
            return (Outcome::Unsat, self.stats);
        }
        self.start = Frame::capture(&self.formula, &self.trail, None);

        let outcome = self.run();
        (outcome, self.stats)
    }

    /// Explores `lit` and `!lit` on two threads and blocks until both end.
    /// Holds one unit of the decision budget, acquired by the caller.
    fn fork(&mut self, lit: Literal) -> State {
        self.stats.forks += 1;
        debug!("forking on {lit} at depth {}", self.frames.len());

        let children = [lit, !lit].map(|decision| (decision, self.child(decision)));
        let results: Vec<(Outcome, SolutionStats)> = thread::scope(|scope| {
            let handles: Vec<_> = children
                .into_iter()
                .map(|(decision, child)| {
                    let handle = thread::Builder::new()
                        .name(format!("fork {decision}"))
                        .spawn_scoped(scope, move || child.explore(decision));
                    (decision, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(decision, handle)| match handle {
                    Ok(handle) => handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
                    Err(err) => {
                        warn!("could not spawn a thread for {decision} ({err}), exploring inline");
                        self.child(decision).explore(decision)
                    }
                })
                .collect()
        });
        self.ctx.budget.release();

        let mut model = None;
        let mut cancelled = false;
        for (outcome, stats) in results {
            self.stats.merge(&stats);
            match outcome {
                Outcome::Sat(found) => model = model.or(Some(found)),
                Outcome::Cancelled => cancelled = true,
                Outcome::Unsat => {}
            }
        }
        debug!("fork on {lit} joined");

        match model {
            Some(model) => State::Done(Outcome::Sat(model)),
            None if cancelled => State::Done(Outcome::Cancelled),
            None => State::Backtracking,
        }
    }
}

impl Dpll {
    /// A standalone root engine. Its decision budget comes from
    /// `config.decision_threads`; `config.workers` is ignored.
    ///
    /// # Errors
    ///
    /// [`SolveError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(cnf: &Cnf, config: &Config) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(Self::from_parts(cnf, config))
    }

    fn from_parts(cnf: &Cnf, config: &Config) -> Self {
        let seed = config.master_seed();
        Self::root(
            cnf,
            config.selector(seed),
            config.restarter(0),
            Arc::new(SearchContext::detached(config.decision_threads)),
            0,
        )
    }
}

impl Solver for Dpll {
    fn new(cnf: &Cnf) -> Self {
        Self::from_parts(cnf, &Config::default())
    }

    fn solve(&mut self) -> Result<Verdict, SolveError> {
        if let Some(published) = self.ctx.result.get() {
            return Ok(published.verdict.clone());
        }

        match self.run() {
            Outcome::Sat(model) => Ok(Verdict::Sat(model)),
            Outcome::Unsat => Ok(Verdict::Unsat),
            Outcome::Cancelled => Err(SolveError::NoVerdict),
        }
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}
