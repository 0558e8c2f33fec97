//! Exhaustive reference solver for small formulas.
//!
//! Enumerates every assignment of the variables `1..=num_vars`. Used as the
//! oracle in differential tests; it refuses formulas over [`MAX_VARS`]
//! variables.

use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Model;

pub const MAX_VARS: usize = 20;

/// Some model of `cnf`, or `None` if it is unsatisfiable or too large.
#[must_use]
pub fn solve(cnf: &Cnf) -> Option<Model> {
    if cnf.num_vars > MAX_VARS {
        return None;
    }

    let vars = Variable::try_from(cnf.num_vars).ok()?;
    (0u32..1 << vars)
        .map(|bits| {
            Model::from_literals(
                (1..=vars).map(|var| Literal::new(var, (bits >> (var - 1)) & 1 == 1)),
            )
        })
        .find(|model| cnf.verify(model))
}

/// `true` if some assignment satisfies `cnf`.
///
/// # Panics
///
/// If `cnf` mentions more than [`MAX_VARS`] variables.
#[must_use]
pub fn is_satisfiable(cnf: &Cnf) -> bool {
    assert!(
        cnf.num_vars <= MAX_VARS,
        "brute force limited to {MAX_VARS} variables"
    );
    solve(cnf).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brute_force_sat() {
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1, -2], vec![-1]]);
        let model = solve(&cnf).unwrap();
        assert!(cnf.verify(&model));
        assert_eq!(model.value(2), Some(true));
    }

    #[test]
    fn test_brute_force_unsat() {
        assert!(!is_satisfiable(&Cnf::from(vec![vec![1], vec![-1]])));
        assert!(!is_satisfiable(&Cnf::from(vec![vec![]])));
    }

    #[test]
    fn test_brute_force_empty() {
        assert!(is_satisfiable(&Cnf::default()));
    }
}
