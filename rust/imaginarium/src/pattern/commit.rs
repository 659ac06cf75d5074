//! Committing a matched declaration: materializing coinages and resolving
//! phrase references against the ontology.

use std::fs;
use std::io::ErrorKind;

use tracing::debug;

use crate::config::{Config, MENU_EXTENSION};
use crate::error::{GrammarError, ImaginariumError, ResourceError, Result};
use crate::ontology::{
    Concept, IndividualId, KindId, Monadic, MonadicLiteral, Ontology, VerbId,
};
use crate::pattern::phrase::{AdjectiveList, Coinage, Modifier, NounPhrase, Ref};
use crate::token::untokenize;

pub struct Commit<'a> {
    pub ontology: &'a mut Ontology,
    config: &'a Config,
    /// The statement as typed.
    input: &'a str,
    coined: Vec<Concept>,
}

impl<'a> Commit<'a> {
    /// Create every pending coinage, in the order it was recorded.
    pub fn new(
        ontology: &'a mut Ontology,
        config: &'a Config,
        input: &'a str,
        coinages: &[Coinage],
    ) -> Result<Self> {
        let mut coined = Vec::with_capacity(coinages.len());
        for coinage in coinages {
            let concept = match coinage {
                Coinage::Kind { singular, plural } => {
                    Concept::Kind(ontology.add_kind(Some(singular.clone()), Some(plural.clone()))?)
                }
                Coinage::Adjective { name } => {
                    Concept::Adjective(ontology.add_adjective(name.clone())?)
                }
                Coinage::Verb { base } => Concept::Verb(ontology.add_verb(base.clone())?),
                Coinage::Individual { name } => {
                    Concept::Individual(ontology.add_individual(name.clone())?)
                }
            };
            coined.push(concept);
        }
        Ok(Commit {
            ontology,
            config,
            input,
            coined,
        })
    }

    pub fn input(&self) -> &str {
        self.input
    }

    /// Kinds created by this statement.
    pub fn new_kinds(&self) -> Vec<KindId> {
        self.coined
            .iter()
            .filter_map(|c| match c {
                Concept::Kind(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn concept(&self, reference: Ref) -> Result<Concept> {
        match reference {
            Ref::Known(concept) => Ok(concept),
            Ref::Coined(index) => self.coined.get(index).copied().ok_or_else(|| {
                ImaginariumError::Command(format!("no pending concept #{index}"))
            }),
        }
    }

    pub fn kind(&self, phrase: &NounPhrase) -> Result<KindId> {
        match self.concept(phrase.head)? {
            Concept::Kind(kind) => Ok(kind),
            other => Err(self.rejected(phrase, other, "a kind")),
        }
    }

    pub fn individual(&self, phrase: &NounPhrase) -> Result<IndividualId> {
        match self.concept(phrase.head)? {
            Concept::Individual(individual) => Ok(individual),
            other => Err(self.rejected(phrase, other, "a proper noun")),
        }
    }

    pub fn verb(&self, reference: Ref) -> Result<VerbId> {
        match self.concept(reference)? {
            Concept::Verb(verb) => Ok(verb),
            other => Err(GrammarError::Rejected {
                input: self.input.to_string(),
                reason: format!("expected a verb, found a {}", other.describe()),
            }
            .into()),
        }
    }

    pub fn literal(&self, modifier: &Modifier) -> Result<MonadicLiteral> {
        let concept = match self.concept(modifier.concept)? {
            Concept::Kind(kind) => Monadic::Kind(kind),
            Concept::Adjective(adjective) => Monadic::Adjective(adjective),
            other => {
                return Err(GrammarError::Rejected {
                    input: self.input.to_string(),
                    reason: format!("a {} can't be used as a modifier", other.describe()),
                }
                .into());
            }
        };
        Ok(MonadicLiteral {
            concept,
            positive: modifier.positive,
        })
    }

    pub fn modifiers(&self, phrase: &NounPhrase) -> Result<Vec<MonadicLiteral>> {
        phrase.modifiers.iter().map(|m| self.literal(m)).collect()
    }

    pub fn literals(&self, list: &AdjectiveList) -> Result<Vec<MonadicLiteral>> {
        list.items.iter().map(|m| self.literal(m)).collect()
    }

    /// Read a menu word list: one value per line, blank lines skipped.
    pub fn load_menu(&self, name: &str) -> Result<Vec<String>> {
        let path = self.config.file(name, MENU_EXTENSION);
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ResourceError::FileNotFound(path.clone()),
            _ => ResourceError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let values: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        debug!(menu = name, values = values.len(), "loaded menu");
        Ok(values)
    }

    fn rejected(&self, phrase: &NounPhrase, found: Concept, expected: &str) -> ImaginariumError {
        GrammarError::Rejected {
            input: self.input.to_string(),
            reason: format!(
                "\"{}\" is a {}, not {expected}",
                untokenize(&phrase.text),
                found.describe()
            ),
        }
        .into()
    }
}
