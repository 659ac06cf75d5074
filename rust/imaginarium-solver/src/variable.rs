//! Typed variables scoped to a guard proposition.
//!
//! A variable only receives a value when its guard is true. Numeric ranges
//! are drawn after the Boolean search succeeds; menu variables are encoded
//! as one proposition per candidate value so that restrictions on them take
//! part in the search like any other clause.

use std::fmt;

use crate::literal::{Literal, Proposition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub(crate) u32);

impl VariableId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// A closed numeric interval.
    Float { low: f64, high: f64 },
    /// A finite list of strings; `choices[i]` is true iff the value is
    /// `values[i]`.
    Menu {
        values: Vec<String>,
        choices: Vec<Proposition>,
    },
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub guard: Literal,
    pub domain: Domain,
}

/// A solved variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(value) => write!(f, "{}", value.round() as i64),
            Value::Text(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_display_rounded() {
        assert_eq!(Value::Float(3.6).to_string(), "4");
        assert_eq!(Value::Float(19.2).to_string(), "19");
        assert_eq!(Value::Text("grey".into()).to_string(), "grey");
    }
}
