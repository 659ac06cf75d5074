//! Propositions and literals.

use std::fmt;
use std::ops::Not;

/// Handle to a Boolean proposition inside one [`crate::Problem`].
///
/// Handles are dense indices; they are only meaningful for the problem
/// that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Proposition(pub(crate) u32);

impl Proposition {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn positive(self) -> Literal {
        Literal::new(self, true)
    }

    pub fn negative(self) -> Literal {
        Literal::new(self, false)
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A proposition or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub proposition: Proposition,
    pub positive: bool,
}

impl Literal {
    pub fn new(proposition: Proposition, positive: bool) -> Self {
        Literal {
            proposition,
            positive,
        }
    }

    /// Truth value of this literal under a (partial) assignment of its
    /// proposition.
    pub fn evaluate(self, value: Option<bool>) -> Option<bool> {
        value.map(|v| v == self.positive)
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal::new(self.proposition, !self.positive)
    }
}

impl From<Proposition> for Literal {
    fn from(proposition: Proposition) -> Self {
        proposition.positive()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}", self.proposition)
        } else {
            write!(f, "!{}", self.proposition)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_flips_polarity() {
        let p = Proposition(3);
        assert_eq!(!p.positive(), p.negative());
        assert_eq!(!!p.positive(), p.positive());
    }

    #[test]
    fn evaluate_respects_polarity() {
        let p = Proposition(0);
        assert_eq!(p.positive().evaluate(Some(true)), Some(true));
        assert_eq!(p.negative().evaluate(Some(true)), Some(false));
        assert_eq!(p.negative().evaluate(None), None);
    }
}
