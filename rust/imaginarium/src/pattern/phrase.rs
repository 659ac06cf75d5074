//! Constituents extracted by segments.
//!
//! A phrase may mention a concept that did not exist when matching began.
//! Such mentions are [`Ref::Coined`] indices into the scanner's pending
//! coinages, which only become real concepts when the winning sentence is
//! committed.

use crate::ontology::Concept;
use crate::token::Token;

/// A concept named by a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ref {
    Known(Concept),
    /// Index into the pending coinages of the parse.
    Coined(usize),
}

/// A concept to create if the sentence that mentions it is accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum Coinage {
    Kind {
        singular: Vec<Token>,
        plural: Vec<Token>,
    },
    Adjective {
        name: Vec<Token>,
    },
    Verb {
        base: Vec<Token>,
    },
    Individual {
        name: Vec<Token>,
    },
}

impl Coinage {
    /// True when `name` is one of the surface forms this coinage will
    /// register.
    pub fn is_named(&self, name: &[Token]) -> bool {
        match self {
            Coinage::Kind { singular, plural } => singular == name || plural == name,
            Coinage::Adjective { name: own }
            | Coinage::Verb { base: own }
            | Coinage::Individual { name: own } => own == name,
        }
    }

    pub fn is_kind(&self) -> bool {
        matches!(self, Coinage::Kind { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    Singular,
    Plural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conjunction {
    And,
    Or,
}

/// An adjective or kind used as a modifier, possibly negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier {
    pub concept: Ref,
    pub positive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NounPhrase {
    /// A kind, or a permanent individual for proper nouns.
    pub head: Ref,
    pub modifiers: Vec<Modifier>,
    /// `None` when the head's surface form is the same in both numbers and
    /// no determiner settled it.
    pub number: Option<Number>,
    /// Explicit count from a determiner or numeral.
    pub count: Option<usize>,
    /// The tokens the phrase was read from.
    pub text: Vec<Token>,
}

impl NounPhrase {
    /// Agreement passes when the phrase's number is unknown.
    pub fn agrees(&self, number: Number) -> bool {
        self.number.is_none_or(|n| n == number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjectiveList {
    pub items: Vec<Modifier>,
    /// `None` for a single item.
    pub conjunction: Option<Conjunction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NounList {
    pub items: Vec<NounPhrase>,
    pub conjunction: Option<Conjunction>,
}

/// Whatever a segment extracted, in template order.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Noun(NounPhrase),
    Nouns(NounList),
    Adjective(Modifier),
    Adjectives(AdjectiveList),
    Verb(Ref),
    Count(usize),
    Text(Vec<Token>),
    /// The phrase a closed-class segment matched, as written in its
    /// candidate list.
    Choice(&'static str),
}
