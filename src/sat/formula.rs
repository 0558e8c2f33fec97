//! The formula index: live clauses plus a variable → clause map.
//!
//! Clauses live in an arena addressed by [`ClauseId`]. Ids are stable for the
//! lifetime of a formula and mean nothing across formulas, so a deep copy
//! (`Clone`) yields a fully independent index with no shared clause storage.
//!
//! Invariant, checked by [`Formula::check_consistency`]: for every live clause
//! `c` and every literal `l` in `c`, `c ∈ index[l.variable()]`, and every id in
//! the index names a live clause that mentions that variable.

use crate::sat::clause::Clause;
use crate::sat::error::Conflict;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::Trail;
use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

/// Stable handle of a clause inside one [`Formula`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClauseId(usize);

impl ClauseId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Formula {
    /// `None` once a clause is satisfied and removed.
    arena: Vec<Option<Clause>>,
    /// Live clause ids in arbitrary order; `slots[id]` is the position here.
    live: Vec<ClauseId>,
    slots: Vec<Option<usize>>,
    /// Live clauses with exactly one literal left.
    units: FxHashSet<ClauseId>,
    /// Live clauses with no literal left. Only the input can produce these.
    empty: usize,
    index: FxHashMap<Variable, FxHashSet<ClauseId>>,
}

impl Formula {
    /// Builds the index over already normalised clauses.
    pub fn new(clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut formula = Self::default();

        for clause in clauses {
            let id = ClauseId(formula.arena.len());

            for var in clause.variables() {
                formula.index.entry(var).or_default().insert(id);
            }
            if clause.is_unit() {
                formula.units.insert(id);
            }
            if clause.is_empty() {
                formula.empty += 1;
            }

            formula.slots.push(Some(formula.live.len()));
            formula.live.push(id);
            formula.arena.push(Some(clause));
        }

        formula
    }

    /// Number of live clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// `true` iff every clause has been satisfied and removed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.live.is_empty()
    }

    /// `true` if some live clause has no literals, i.e. the formula is false
    /// under any extension of the current assignment.
    #[must_use]
    pub const fn has_empty_clause(&self) -> bool {
        self.empty > 0
    }

    #[must_use]
    pub fn clause(&self, id: ClauseId) -> Option<&Clause> {
        self.arena.get(id.0).and_then(Option::as_ref)
    }

    /// The live clause at `position` in the live list, `0 <= position < len()`.
    #[must_use]
    pub fn live_clause(&self, position: usize) -> Option<&Clause> {
        self.live.get(position).and_then(|&id| self.clause(id))
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.live.iter().filter_map(|&id| self.clause(id))
    }

    /// The ids of live clauses mentioning `var`.
    pub fn occurrences(&self, var: Variable) -> impl Iterator<Item = ClauseId> + '_ {
        self.index.get(&var).into_iter().flatten().copied()
    }

    /// The literal of some unit clause, if any exists.
    #[must_use]
    pub fn propagate_candidate(&self) -> Option<Literal> {
        self.units
            .iter()
            .find_map(|&id| self.clause(id).and_then(Clause::unit_literal))
    }

    /// Commits `lit` to `trail`, simplifying every clause that mentions its
    /// variable.
    ///
    /// Re-committing a literal already on the trail is a no-op. All conflict
    /// checks run before anything is mutated, so on `Err` both the formula and
    /// the trail are exactly as they were.
    ///
    /// # Errors
    ///
    /// [`Conflict`] if the trail holds the complement of `lit`, or if some unit
    /// clause consists solely of the complement of `lit`.
    pub fn commit(&mut self, trail: &mut Trail, lit: Literal) -> Result<(), Conflict> {
        match trail.committed(lit) {
            Some(existing) if existing.same_sign(lit) => return Ok(()),
            Some(_) => return Err(Conflict { literal: lit }),
            None => {}
        }

        let var = lit.variable();
        let occurrences: Vec<ClauseId> = self.occurrences(var).collect();

        let forced_against = occurrences.iter().any(|&id| {
            self.clause(id)
                .and_then(Clause::unit_literal)
                .is_some_and(|unit| unit.is_complement_of(lit))
        });
        if forced_against {
            return Err(Conflict { literal: lit });
        }

        for id in occurrences {
            let satisfied = self
                .clause(id)
                .and_then(|clause| clause.find_variable(var))
                .is_some_and(|found| found.same_sign(lit));

            if satisfied {
                self.remove_clause(id);
            } else {
                self.shrink_clause(id, var);
            }
        }

        trail.push(lit);
        trace!("committed {lit}, {} clauses live", self.len());
        Ok(())
    }

    /// Drops a satisfied clause from the arena, the live list, and the index
    /// entry of every variable it mentions.
    fn remove_clause(&mut self, id: ClauseId) {
        let Some(clause) = self.arena[id.0].take() else {
            return;
        };

        for var in clause.variables() {
            if let Some(ids) = self.index.get_mut(&var) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.index.remove(&var);
                }
            }
        }

        self.units.remove(&id);
        if clause.is_empty() {
            self.empty -= 1;
        }

        if let Some(position) = self.slots[id.0].take() {
            self.live.swap_remove(position);
            if let Some(&moved) = self.live.get(position) {
                self.slots[moved.0] = Some(position);
            }
        }
    }

    /// Removes `var`'s literal from a clause and unlinks the clause from
    /// `index[var]`. Membership under its other variables is untouched.
    fn shrink_clause(&mut self, id: ClauseId, var: Variable) {
        let Some(clause) = self.arena[id.0].as_mut() else {
            return;
        };
        clause.remove_variable(var);

        match clause.len() {
            0 => {
                self.units.remove(&id);
                self.empty += 1;
            }
            1 => {
                self.units.insert(id);
            }
            _ => {}
        }

        if let Some(ids) = self.index.get_mut(&var) {
            ids.remove(&id);
            if ids.is_empty() {
                self.index.remove(&var);
            }
        }
    }

    /// Verifies the clause/index bidirectional invariant and the bookkeeping
    /// of the live list and unit set. Returns a description of the first
    /// violation found.
    ///
    /// # Errors
    ///
    /// A human readable description of the broken invariant.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (position, &id) in self.live.iter().enumerate() {
            if self.slots[id.0] != Some(position) {
                return Err(format!("clause {id:?} has a stale live slot"));
            }
            let clause = self
                .clause(id)
                .ok_or_else(|| format!("live clause {id:?} missing from arena"))?;
            for var in clause.variables() {
                if !self.index.get(&var).is_some_and(|ids| ids.contains(&id)) {
                    return Err(format!("clause {id:?} missing from index of {var}"));
                }
            }
            if clause.is_unit() != self.units.contains(&id) {
                return Err(format!("unit set disagrees with clause {id:?}"));
            }
        }

        for (&var, ids) in &self.index {
            for &id in ids {
                let clause = self
                    .clause(id)
                    .ok_or_else(|| format!("index of {var} names dead clause {id:?}"))?;
                if clause.find_variable(var).is_none() {
                    return Err(format!("index of {var} names clause {id:?} without it"));
                }
            }
        }

        let empty = self.clauses().filter(|clause| clause.is_empty()).count();
        if empty != self.empty {
            return Err(format!("empty clause count {} != {empty}", self.empty));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(clauses: &[&[i32]]) -> Formula {
        Formula::new(clauses.iter().map(|c| Clause::from(c.to_vec())))
    }

    fn lit(value: i32) -> Literal {
        Literal::from_i32(value)
    }

    #[test]
    fn test_new_builds_index() {
        let f = formula(&[&[1, 2], &[-1, 3], &[2]]);
        assert_eq!(f.len(), 3);
        assert_eq!(f.occurrences(1).count(), 2);
        assert_eq!(f.occurrences(2).count(), 2);
        assert_eq!(f.occurrences(4).count(), 0);
        assert_eq!(f.propagate_candidate(), Some(lit(2)));
        assert!(f.check_consistency().is_ok());
    }

    #[test]
    fn test_commit_satisfies_and_shrinks() {
        let mut f = formula(&[&[1, 2], &[-1, 3], &[2, 3]]);
        let mut trail = Trail::new();

        f.commit(&mut trail, lit(1)).unwrap();

        assert_eq!(f.len(), 2);
        assert_eq!(f.occurrences(1).count(), 0);
        assert_eq!(f.occurrences(2).count(), 1);
        assert_eq!(f.occurrences(3).count(), 2);
        assert_eq!(f.propagate_candidate(), Some(lit(3)));
        assert_eq!(trail.len(), 1);
        assert!(f.check_consistency().is_ok());
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut f = formula(&[&[1, 2], &[-1, 2]]);
        let mut trail = Trail::new();

        f.commit(&mut trail, lit(-1)).unwrap();
        let (before, len) = (f.len(), trail.len());
        f.commit(&mut trail, lit(-1)).unwrap();

        assert_eq!(f.len(), before);
        assert_eq!(trail.len(), len);
    }

    #[test]
    fn test_commit_conflicts_with_trail() {
        let mut f = formula(&[&[1, 2], &[-1, 2]]);
        let mut trail = Trail::new();

        f.commit(&mut trail, lit(1)).unwrap();
        assert_eq!(
            f.commit(&mut trail, lit(-1)),
            Err(Conflict { literal: lit(-1) })
        );
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn test_commit_conflicts_with_unit_clause_without_mutation() {
        let mut f = formula(&[&[1], &[-1, 2], &[1, 3]]);
        let mut trail = Trail::new();
        let snapshot = f.clone();

        assert!(f.commit(&mut trail, lit(-1)).is_err());
        assert!(trail.is_empty());
        assert_eq!(f.len(), snapshot.len());
        assert_eq!(
            f.clauses().cloned().collect::<Vec<_>>(),
            snapshot.clauses().cloned().collect::<Vec<_>>()
        );
        assert!(f.check_consistency().is_ok());
    }

    #[test]
    fn test_commit_completes_formula() {
        let mut f = formula(&[&[1, 2], &[1, -3]]);
        let mut trail = Trail::new();

        f.commit(&mut trail, lit(1)).unwrap();
        assert!(f.is_complete());
        assert!(f.check_consistency().is_ok());
    }

    #[test]
    fn test_commit_unmentioned_variable() {
        let mut f = formula(&[&[1, 2]]);
        let mut trail = Trail::new();

        f.commit(&mut trail, lit(9)).unwrap();
        assert_eq!(f.len(), 1);
        assert_eq!(trail.value_of(9), Some(true));
    }

    #[test]
    fn test_clone_is_independent() {
        let f = formula(&[&[1, 2], &[-2, 3]]);
        let mut copy = f.clone();
        let mut trail = Trail::new();

        copy.commit(&mut trail, lit(2)).unwrap();

        assert_eq!(f.len(), 2);
        assert_eq!(copy.len(), 1);
        assert!(f.check_consistency().is_ok());
        assert!(copy.check_consistency().is_ok());
    }

    #[test]
    fn test_empty_clause_tracked() {
        let f = formula(&[&[], &[1]]);
        assert!(f.has_empty_clause());
        assert!(!f.is_complete());
        assert!(f.check_consistency().is_ok());
    }
}
