//! Verbs: binary relations between members of two kinds.

use crate::ontology::literal::{KindId, MonadicLiteral, VerbId};
use crate::token::Token;

pub const DEFAULT_DENSITY: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Verb {
    /// Base form, used after modals and with plural subjects: "love".
    pub base: Vec<Token>,
    /// Third person singular: "loves".
    pub third_person: Vec<Token>,
    /// "-ing" form: "loving".
    pub gerund: Vec<Token>,
    pub subject_kind: Option<KindId>,
    pub object_kind: Option<KindId>,
    pub subject_modifiers: Vec<MonadicLiteral>,
    pub object_modifiers: Vec<MonadicLiteral>,
    /// Minimum number of objects per eligible subject.
    pub lower_bound: Option<usize>,
    /// Maximum number of objects per eligible subject.
    pub upper_bound: Option<usize>,
    pub reflexive: bool,
    pub anti_reflexive: bool,
    pub symmetric: bool,
    pub anti_symmetric: bool,
    /// Prior probability that the relation holds between an eligible pair.
    pub density: f64,
    pub mutual_exclusions: Vec<VerbId>,
    /// Relations implied by this one.
    pub generalizations: Vec<VerbId>,
    /// Relations this one is a way of.
    pub superspecies: Vec<VerbId>,
    /// Ways of doing this relation; at most one holds per pair.
    pub subspecies: Vec<VerbId>,
}

impl Verb {
    pub fn new(base: Vec<Token>, third_person: Vec<Token>, gerund: Vec<Token>) -> Self {
        Verb {
            base,
            third_person,
            gerund,
            subject_kind: None,
            object_kind: None,
            subject_modifiers: Vec::new(),
            object_modifiers: Vec::new(),
            lower_bound: None,
            upper_bound: None,
            reflexive: false,
            anti_reflexive: false,
            symmetric: false,
            anti_symmetric: false,
            density: DEFAULT_DENSITY,
            mutual_exclusions: Vec::new(),
            generalizations: Vec::new(),
            superspecies: Vec::new(),
            subspecies: Vec::new(),
        }
    }

    /// At most one object per subject.
    pub fn is_functional(&self) -> bool {
        self.upper_bound == Some(1)
    }

    /// At least one object per subject.
    pub fn is_total(&self) -> bool {
        self.lower_bound.is_some_and(|low| low >= 1)
    }
}
