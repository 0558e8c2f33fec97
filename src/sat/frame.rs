use crate::sat::formula::Formula;
use crate::sat::literal::Literal;
use crate::sat::trail::Trail;

/// A deep snapshot of one branch's search state.
///
/// Captured before `decision` is committed. A frame has exactly one consumer:
/// either the checkpoint stack that may later restore it, or a freshly forked
/// branch that adopts its copies as live state. A branch's start frame has no
/// decision.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub formula: Formula,
    pub trail: Trail,
    pub decision: Option<Literal>,
}

impl Frame {
    #[must_use]
    pub fn capture(formula: &Formula, trail: &Trail, decision: Option<Literal>) -> Self {
        Self {
            formula: formula.clone(),
            trail: trail.clone(),
            decision,
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (Formula, Trail, Option<Literal>) {
        (self.formula, self.trail, self.decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;

    #[test]
    fn test_capture_is_deep() {
        let mut formula = Formula::new([Clause::from(vec![1, 2]), Clause::from(vec![-1, 3])]);
        let mut trail = Trail::new();
        let frame = Frame::capture(&formula, &trail, Some(Literal::from_i32(1)));

        formula.commit(&mut trail, Literal::from_i32(1)).unwrap();

        let (saved, saved_trail, decision) = frame.into_parts();
        assert_eq!(saved.len(), 2);
        assert!(saved_trail.is_empty());
        assert_eq!(decision, Some(Literal::from_i32(1)));
        assert_eq!(formula.len(), 1);
    }
}
