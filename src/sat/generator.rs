//! Random CNF instances for differential testing and benchmarks.
//!
//! Every clause draws its literals from `1..=num_vars` with random signs.
//! With `fixed_width` every clause has exactly `max_width` literals, otherwise
//! each clause's width is uniform in `1..=max_width`. Clauses then go through
//! the usual normalisation, so tautologies are dropped and repeats collapse.

use crate::sat::cnf::{Cnf, Header};
use crate::sat::literal::{Literal, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomCnf {
    pub num_vars: u32,
    pub num_clauses: usize,
    pub max_width: usize,
    pub fixed_width: bool,
    pub seed: u64,
}

impl Default for RandomCnf {
    fn default() -> Self {
        Self {
            num_vars: 81,
            num_clauses: 350,
            max_width: 3,
            fixed_width: true,
            seed: 0,
        }
    }
}

impl RandomCnf {
    #[must_use]
    pub fn generate(&self) -> Cnf {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        if self.num_vars == 0 || self.max_width == 0 {
            return Cnf::default();
        }

        let clauses: Vec<Vec<Literal>> = (0..self.num_clauses)
            .map(|_| {
                let width = if self.fixed_width {
                    self.max_width
                } else {
                    rng.usize(1..=self.max_width)
                };
                (0..width)
                    .map(|_| {
                        let var: Variable = rng.u32(1..=self.num_vars);
                        Literal::new(var, rng.bool())
                    })
                    .collect()
            })
            .collect();

        let mut cnf = Cnf::new(clauses);
        cnf.header = Some(Header {
            num_vars: self.num_vars as usize,
            num_clauses: self.num_clauses,
        });
        cnf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_reproducible() {
        let spec = RandomCnf {
            seed: 99,
            ..RandomCnf::default()
        };
        assert_eq!(spec.generate(), spec.generate());
    }

    #[test]
    fn test_generate_respects_bounds() {
        let cnf = RandomCnf {
            num_vars: 10,
            num_clauses: 40,
            max_width: 4,
            fixed_width: false,
            seed: 3,
        }
        .generate();

        assert_eq!(cnf.len() + cnf.tautologies, 40);
        assert!(cnf.num_vars <= 10);
        assert!(cnf.iter().all(|c| (1..=4).contains(&c.len())));
    }

    #[test]
    fn test_generate_degenerate() {
        let cnf = RandomCnf {
            num_vars: 0,
            ..RandomCnf::default()
        }
        .generate();
        assert!(cnf.is_empty());
    }
}
