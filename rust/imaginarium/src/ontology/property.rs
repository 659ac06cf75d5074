//! Properties and parts of kinds.

use crate::ontology::literal::{KindId, MonadicLiteral};
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct Property {
    pub name: Vec<Token>,
    pub owner: KindId,
    pub domain: PropertyType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    /// A number in `[low, high]`, shown rounded.
    Range { low: f64, high: f64 },
    /// One string from a word list.
    Menu {
        /// Name of the word list file the values came from.
        source: String,
        values: Vec<String>,
        restrictions: Vec<MenuRestriction>,
    },
    /// A free value, only ever set on named individuals.
    Text,
}

/// When every condition holds, the menu value must be one of `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRestriction {
    pub conditions: Vec<MonadicLiteral>,
    pub values: Vec<String>,
}

/// A named attribute whose value is a whole individual: "a cat has a color
/// called its favorite color".
#[derive(Debug, Clone)]
pub struct Part {
    pub name: Vec<Token>,
    pub owner: KindId,
    pub kind: KindId,
    pub modifiers: Vec<MonadicLiteral>,
}
