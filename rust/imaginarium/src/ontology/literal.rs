//! Handles into the ontology arenas, and monadic literals.

use std::fmt;

macro_rules! id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id!(
    /// A common noun.
    KindId,
    "k"
);
id!(AdjectiveId, "a");
id!(
    /// A binary relation.
    VerbId,
    "v"
);
id!(PropertyId, "p");
id!(PartId, "part");
id!(
    /// A permanent, named individual.
    IndividualId,
    "n"
);

/// Anything stored in the concept registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    Kind(KindId),
    Adjective(AdjectiveId),
    Verb(VerbId),
    /// A proper noun naming a permanent individual.
    Individual(IndividualId),
}

impl Concept {
    pub fn describe(self) -> &'static str {
        match self {
            Concept::Kind(_) => "kind",
            Concept::Adjective(_) => "adjective",
            Concept::Verb(_) => "verb",
            Concept::Individual(_) => "proper noun",
        }
    }
}

/// A unary predicate: kind membership or an adjective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Monadic {
    Kind(KindId),
    Adjective(AdjectiveId),
}

/// A monadic concept or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonadicLiteral {
    pub concept: Monadic,
    pub positive: bool,
}

impl MonadicLiteral {
    pub fn positive(concept: Monadic) -> Self {
        MonadicLiteral {
            concept,
            positive: true,
        }
    }

    pub fn negative(concept: Monadic) -> Self {
        MonadicLiteral {
            concept,
            positive: false,
        }
    }

    pub fn negated(self) -> Self {
        MonadicLiteral {
            positive: !self.positive,
            ..self
        }
    }
}

impl From<KindId> for Monadic {
    fn from(kind: KindId) -> Self {
        Monadic::Kind(kind)
    }
}

impl From<AdjectiveId> for Monadic {
    fn from(adjective: AdjectiveId) -> Self {
        Monadic::Adjective(adjective)
    }
}
