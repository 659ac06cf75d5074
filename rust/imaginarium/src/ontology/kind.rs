//! Kinds (common nouns) and the constraints attached to them.

use crate::ontology::literal::{AdjectiveId, KindId, MonadicLiteral, PartId, PropertyId};
use crate::ontology::template::Template;
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct Kind {
    pub singular: Vec<Token>,
    pub plural: Vec<Token>,
    /// Immediate superkinds. Kinds form a DAG.
    pub superkinds: Vec<KindId>,
    pub subkinds: Vec<KindId>,
    pub relevant_adjectives: Vec<AdjectiveId>,
    pub alternative_sets: Vec<AlternativeSet>,
    pub implications: Vec<Implication>,
    pub properties: Vec<PropertyId>,
    pub parts: Vec<PartId>,
    pub name_template: Option<Template>,
    pub description_template: Option<Template>,
}

impl Kind {
    pub fn new(singular: Vec<Token>, plural: Vec<Token>) -> Self {
        Kind {
            singular,
            plural,
            superkinds: Vec::new(),
            subkinds: Vec::new(),
            relevant_adjectives: Vec::new(),
            alternative_sets: Vec::new(),
            implications: Vec::new(),
            properties: Vec::new(),
            parts: Vec::new(),
            name_template: None,
            description_template: None,
        }
    }
}

/// Between `low` and `high` of the alternatives hold for every member of
/// the kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeSet {
    pub alternatives: Vec<MonadicLiteral>,
    pub low: usize,
    pub high: usize,
}

/// Members of the kind satisfying every condition also satisfy the
/// consequent.
#[derive(Debug, Clone, PartialEq)]
pub struct Implication {
    pub conditions: Vec<MonadicLiteral>,
    pub consequent: MonadicLiteral,
}
