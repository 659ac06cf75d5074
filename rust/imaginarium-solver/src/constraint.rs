//! Cardinality constraints, the one constraint shape the engine knows.
//!
//! A clause is "at least one of these literals", a uniqueness constraint is
//! "exactly one", and an at-most-K constraint is "between 0 and K". All of
//! them are the same [`Constraint`] with different bounds, which keeps the
//! propagation code in one place.

use crate::literal::Literal;

/// Between `low` and `high` of `literals` must be true, provided the guard
/// (when present) is true. A false guard makes the constraint vacuous.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub guard: Option<Literal>,
    pub literals: Vec<Literal>,
    pub low: usize,
    pub high: usize,
}

/// What propagation concluded about a single constraint.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Propagation {
    /// Nothing can be inferred yet.
    Open,
    /// Satisfied or vacuous no matter how the rest is assigned.
    Settled,
    /// These literals must be made true.
    Force(Vec<Literal>),
    /// The constraint is violated.
    Conflict,
}

impl Constraint {
    pub fn clause(literals: Vec<Literal>) -> Self {
        let high = literals.len();
        Constraint {
            guard: None,
            literals,
            low: 1,
            high,
        }
    }

    pub fn between(low: usize, high: usize, literals: Vec<Literal>) -> Self {
        Constraint {
            guard: None,
            literals,
            low,
            high,
        }
    }

    pub fn guarded(mut self, guard: Literal) -> Self {
        self.guard = Some(guard);
        self
    }

    /// True when the bounds can never be met regardless of assignment.
    pub fn is_infeasible(&self) -> bool {
        self.low > self.high || self.low > self.literals.len()
    }

    /// Check the constraint against a complete assignment.
    pub fn is_satisfied_by(&self, value: impl Fn(Literal) -> bool) -> bool {
        if let Some(guard) = self.guard
            && !value(guard)
        {
            return true;
        }
        let count = self.literals.iter().filter(|l| value(**l)).count();
        self.low <= count && count <= self.high
    }

    pub(crate) fn propagate(&self, value: impl Fn(Literal) -> Option<bool>) -> Propagation {
        let mut truths = 0;
        let mut open = Vec::new();
        for literal in &self.literals {
            match value(*literal) {
                Some(true) => truths += 1,
                Some(false) => {}
                None => open.push(*literal),
            }
        }
        let violated = truths > self.high || truths + open.len() < self.low;

        match self.guard.map(|g| (g, value(g))) {
            Some((_, Some(false))) => Propagation::Settled,
            Some((guard, None)) => {
                if violated {
                    Propagation::Force(vec![!guard])
                } else {
                    Propagation::Open
                }
            }
            _ => {
                if violated {
                    Propagation::Conflict
                } else if open.is_empty() {
                    Propagation::Settled
                } else if truths == self.high {
                    Propagation::Force(open.into_iter().map(|l| !l).collect())
                } else if truths + open.len() == self.low {
                    Propagation::Force(open)
                } else {
                    Propagation::Open
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Proposition;
    use pretty_assertions::assert_eq;

    fn lits(n: u32) -> Vec<Literal> {
        (0..n).map(|i| Proposition(i).positive()).collect()
    }

    #[test]
    fn clause_forces_last_open_literal() {
        let clause = Constraint::clause(lits(3));
        let result = clause.propagate(|l| match l.proposition.0 {
            0 | 1 => Some(false),
            _ => None,
        });
        assert_eq!(result, Propagation::Force(vec![Proposition(2).positive()]));
    }

    #[test]
    fn unique_clears_others_once_one_is_true() {
        let unique = Constraint::between(1, 1, lits(3));
        let result = unique.propagate(|l| if l.proposition.0 == 1 { Some(true) } else { None });
        assert_eq!(
            result,
            Propagation::Force(vec![Proposition(0).negative(), Proposition(2).negative()])
        );
    }

    #[test]
    fn open_guard_is_forced_false_on_violation() {
        let guard = Proposition(9).positive();
        let constraint = Constraint::between(1, 1, lits(2)).guarded(guard);
        let result = constraint.propagate(|l| if l.proposition.0 == 9 { None } else { Some(false) });
        assert_eq!(result, Propagation::Force(vec![!guard]));
    }

    #[test]
    fn false_guard_settles() {
        let guard = Proposition(9).positive();
        let constraint = Constraint::between(5, 5, lits(2)).guarded(guard);
        let result = constraint.propagate(|l| if l.proposition.0 == 9 { Some(false) } else { None });
        assert_eq!(result, Propagation::Settled);
    }
}
