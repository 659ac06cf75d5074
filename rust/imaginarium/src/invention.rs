//! # Model Interpreter
//!
//! An [`Invention`] is a solved model together with the generator that
//! compiled it. Queries answer in terms of the ontology: which kinds an
//! individual turned out to be, which adjectives hold, which relations link
//! which individuals, and what each property came out as.
//!
//! Rendering names and descriptions lives in [`describe`].

pub mod describe;

use std::collections::HashSet;
use std::fmt;

use imaginarium_solver::Solution;

use crate::generator::{Generator, Individual, Relation};
use crate::ontology::{AdjectiveId, KindId, Monadic, MonadicLiteral, Ontology, PropertyId, VerbId};
use crate::token::untokenize;

#[derive(Debug, Clone)]
pub struct Invention {
    generator: Generator,
    solution: Solution,
}

impl Invention {
    pub fn new(generator: Generator, solution: Solution) -> Self {
        Invention {
            generator,
            solution,
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn ontology(&self) -> &Ontology {
        self.generator.ontology()
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn individuals(&self) -> &[Individual] {
        self.generator.individuals()
    }

    pub fn requested(&self) -> &[usize] {
        self.generator.requested()
    }

    /// Membership needs structural eligibility as well as the model's say.
    pub fn is_a(&self, individual: usize, kind: KindId) -> bool {
        self.generator.could_be(individual, kind)
            && self
                .generator
                .kind_proposition(individual, kind)
                .is_some_and(|p| self.solution.holds(p))
    }

    pub fn is(&self, individual: usize, adjective: AdjectiveId) -> bool {
        self.generator
            .adjective_proposition(individual, adjective)
            .is_some_and(|p| self.solution.holds(p))
    }

    pub fn holds(&self, individual: usize, literal: MonadicLiteral) -> bool {
        let value = match literal.concept {
            Monadic::Kind(kind) => self.is_a(individual, kind),
            Monadic::Adjective(adjective) => self.is(individual, adjective),
        };
        value == literal.positive
    }

    pub fn related(&self, verb: VerbId, subject: usize, object: usize) -> bool {
        self.generator
            .relation(verb, subject, object)
            .is_some_and(|p| self.solution.holds(p))
    }

    /// Every relation that holds, listing a symmetric pair once.
    pub fn relationships(&self) -> Vec<Relation> {
        let mut seen = HashSet::new();
        self.generator
            .relations()
            .filter(|r| self.solution.holds(r.proposition))
            .filter(|r| seen.insert(r.proposition))
            .collect()
    }

    /// Kinds that hold of the individual, searching down from its declared
    /// kinds and then up from everything found.
    pub fn kinds(&self, individual: usize) -> Vec<KindId> {
        let ontology = self.ontology();
        let mut found: Vec<KindId> = Vec::new();
        for declared in &self.individuals()[individual].kinds {
            for kind in ontology.descendants(*declared) {
                if !found.contains(&kind) && self.is_a(individual, kind) {
                    found.push(kind);
                }
            }
        }
        let mut index = 0;
        while index < found.len() {
            for kind in ontology.ancestors(found[index]) {
                if !found.contains(&kind) && self.is_a(individual, kind) {
                    found.push(kind);
                }
            }
            index += 1;
        }
        found
    }

    /// True kinds minus those implied by a more specific true kind.
    pub fn most_specific_kinds(&self, individual: usize) -> Vec<KindId> {
        self.ontology().most_specific(&self.kinds(individual))
    }

    /// Relevant adjectives that hold and aren't silent.
    pub fn adjectives(&self, individual: usize) -> Vec<AdjectiveId> {
        let ontology = self.ontology();
        let mut adjectives = Vec::new();
        for kind in self.kinds(individual) {
            for adjective in &ontology.kind(kind).relevant_adjectives {
                if !adjectives.contains(adjective)
                    && !ontology.adjective(*adjective).silent
                    && self.is(individual, *adjective)
                {
                    adjectives.push(*adjective);
                }
            }
        }
        adjectives
    }

    /// The property's value: fixed on a permanent individual, or solved.
    pub fn value(&self, individual: usize, property: PropertyId) -> Option<String> {
        let entry = &self.individuals()[individual];
        if let Some(permanent) = entry.permanent
            && let Some((_, value)) = self
                .ontology()
                .individual(permanent)
                .properties
                .iter()
                .find(|(p, _)| *p == property)
        {
            return Some(value.clone());
        }
        let (_, variable) = entry.properties.iter().find(|(p, _)| *p == property)?;
        self.solution.value(*variable).map(|value| value.to_string())
    }
}

impl fmt::Display for Invention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self
            .requested()
            .iter()
            .map(|i| self.description(*i))
            .collect();
        let labels = self.labels();
        for relation in self.relationships() {
            lines.push(format!(
                "{} {} {}",
                labels[relation.subject],
                untokenize(&self.ontology().verb(relation.verb).third_person),
                labels[relation.object]
            ));
        }
        write!(f, "{}", lines.join("\n"))
    }
}
