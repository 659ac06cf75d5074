//! A satisfying assignment returned by an engine.

use crate::literal::{Literal, Proposition};
use crate::variable::{Value, VariableId};

#[derive(Debug, Clone)]
pub struct Solution {
    assignment: Vec<bool>,
    values: Vec<Option<Value>>,
    steps: usize,
}

impl Solution {
    pub fn new(assignment: Vec<bool>, values: Vec<Option<Value>>, steps: usize) -> Self {
        Solution {
            assignment,
            values,
            steps,
        }
    }

    /// Truth value of a proposition. Propositions from another problem
    /// read as false.
    pub fn holds(&self, proposition: Proposition) -> bool {
        self.assignment
            .get(proposition.index())
            .copied()
            .unwrap_or(false)
    }

    pub fn literal(&self, literal: Literal) -> bool {
        self.holds(literal.proposition) == literal.positive
    }

    /// Value of a typed variable, `None` when its guard is false.
    pub fn value(&self, variable: VariableId) -> Option<&Value> {
        self.values.get(variable.index()).and_then(Option::as_ref)
    }

    /// Search steps spent producing this solution.
    pub fn steps(&self) -> usize {
        self.steps
    }
}
