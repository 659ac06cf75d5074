//! The problem builder: everything the generator sends to an engine.

use indexmap::IndexMap;

use crate::constraint::Constraint;
use crate::literal::{Literal, Proposition};
use crate::solution::Solution;
use crate::variable::{Domain, Variable, VariableId};

/// Probability a proposition is tried as true when nothing else decides it.
pub const DEFAULT_PRIOR: f64 = 0.5;

/// A Boolean constraint problem with guarded typed variables.
///
/// Propositions are identified by unique names; asking for the same name
/// twice returns the same handle. That is how symmetric binary propositions
/// become a single solver object: both argument orders map to one name.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    names: IndexMap<String, Proposition>,
    priors: Vec<f64>,
    constraints: Vec<Constraint>,
    variables: Vec<Variable>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the proposition with the given name.
    pub fn proposition(&mut self, name: impl Into<String>) -> Proposition {
        let name = name.into();
        if let Some(existing) = self.names.get(&name) {
            return *existing;
        }
        let proposition = Proposition(self.names.len() as u32);
        self.names.insert(name, proposition);
        self.priors.push(DEFAULT_PRIOR);
        proposition
    }

    /// `predicate(argument)`.
    pub fn unary(&mut self, predicate: &str, argument: &str) -> Proposition {
        self.proposition(format!("{predicate}({argument})"))
    }

    /// `predicate(first, second)`. A symmetric proposition orders its
    /// arguments canonically so that `p(a, b)` and `p(b, a)` coincide.
    pub fn binary(
        &mut self,
        predicate: &str,
        first: &str,
        second: &str,
        symmetric: bool,
    ) -> Proposition {
        let (first, second) = if symmetric && second < first {
            (second, first)
        } else {
            (first, second)
        };
        self.proposition(format!("{predicate}({first}, {second})"))
    }

    pub fn lookup(&self, name: &str) -> Option<Proposition> {
        self.names.get(name).copied()
    }

    /// The existing `predicate(argument)`, without creating it.
    pub fn find_unary(&self, predicate: &str, argument: &str) -> Option<Proposition> {
        self.lookup(&format!("{predicate}({argument})"))
    }

    pub fn name(&self, proposition: Proposition) -> Option<&str> {
        self.names
            .get_index(proposition.index())
            .map(|(name, _)| name.as_str())
    }

    pub fn proposition_count(&self) -> usize {
        self.names.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn prior(&self, proposition: Proposition) -> f64 {
        self.priors
            .get(proposition.index())
            .copied()
            .unwrap_or(DEFAULT_PRIOR)
    }

    /// Initial probability hint used when the search decides `proposition`.
    pub fn set_prior(&mut self, proposition: Proposition, probability: f64) {
        if let Some(prior) = self.priors.get_mut(proposition.index()) {
            *prior = probability.clamp(0.0, 1.0);
        }
    }

    /// The literal must hold.
    pub fn assert(&mut self, literal: Literal) {
        self.clause([literal]);
    }

    /// At least one of the literals must hold.
    pub fn clause(&mut self, literals: impl IntoIterator<Item = Literal>) {
        self.add(Constraint::clause(dedup(literals)));
    }

    /// `premise` implies `conclusion`.
    pub fn implies(&mut self, premise: Literal, conclusion: Literal) {
        self.clause([!premise, conclusion]);
    }

    pub fn at_most(&mut self, count: usize, literals: impl IntoIterator<Item = Literal>) {
        self.add(Constraint::between(0, count, dedup(literals)));
    }

    /// Exactly one of the literals holds.
    pub fn unique(&mut self, literals: impl IntoIterator<Item = Literal>) {
        self.add(Constraint::between(1, 1, dedup(literals)));
    }

    /// Between `low` and `high` of the literals hold.
    pub fn quantify(
        &mut self,
        low: usize,
        high: usize,
        literals: impl IntoIterator<Item = Literal>,
    ) {
        self.add(Constraint::between(low, high, dedup(literals)));
    }

    /// Between `low` and `high` of the literals hold whenever `guard` does.
    pub fn quantify_if(
        &mut self,
        guard: Literal,
        low: usize,
        high: usize,
        literals: impl IntoIterator<Item = Literal>,
    ) {
        self.add(Constraint::between(low, high, dedup(literals)).guarded(guard));
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// A number drawn from `[low, high]` whenever `guard` holds.
    pub fn float_variable(
        &mut self,
        name: impl Into<String>,
        low: f64,
        high: f64,
        guard: Literal,
    ) -> VariableId {
        let (low, high) = if high < low { (high, low) } else { (low, high) };
        self.push_variable(Variable {
            name: name.into(),
            guard,
            domain: Domain::Float { low, high },
        })
    }

    /// One of `values` whenever `guard` holds, none otherwise.
    pub fn menu_variable(
        &mut self,
        name: impl Into<String>,
        values: Vec<String>,
        guard: Literal,
    ) -> VariableId {
        let name = name.into();
        let choices: Vec<Proposition> = values
            .iter()
            .map(|value| self.proposition(format!("{name}={value}")))
            .collect();
        let prior = 1.0 / choices.len().max(1) as f64;
        for choice in &choices {
            self.set_prior(*choice, prior);
            self.implies(choice.positive(), guard);
        }
        self.quantify_if(guard, 1, 1, choices.iter().map(|c| c.positive()));
        self.push_variable(Variable {
            name,
            guard,
            domain: Domain::Menu { values, choices },
        })
    }

    /// When every condition holds, the menu variable takes one of `allowed`.
    /// Values not on the menu are ignored.
    pub fn restrict_menu(
        &mut self,
        variable: VariableId,
        conditions: &[Literal],
        allowed: &[String],
    ) {
        let Some(Variable {
            guard,
            domain: Domain::Menu { values, choices },
            ..
        }) = self.variables.get(variable.index())
        else {
            return;
        };
        let mut clause: Vec<Literal> = vec![!*guard];
        clause.extend(conditions.iter().map(|c| !*c));
        clause.extend(
            values
                .iter()
                .zip(choices)
                .filter(|(value, _)| allowed.iter().any(|a| a.eq_ignore_ascii_case(value)))
                .map(|(_, choice)| choice.positive()),
        );
        self.clause(clause);
    }

    pub fn variable(&self, variable: VariableId) -> Option<&Variable> {
        self.variables.get(variable.index())
    }

    /// The proposition that is true when a menu variable takes `value`.
    /// Values compare without case.
    pub fn menu_choice(&self, variable: VariableId, value: &str) -> Option<Proposition> {
        let Some(Variable {
            domain: Domain::Menu { values, choices },
            ..
        }) = self.variables.get(variable.index())
        else {
            return None;
        };
        values
            .iter()
            .zip(choices)
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(value))
            .map(|(_, choice)| *choice)
    }

    /// The first constraint the solution breaks, if any.
    pub fn violated(&self, solution: &Solution) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|constraint| !constraint.is_satisfied_by(|literal| solution.literal(literal)))
    }

    fn push_variable(&mut self, variable: Variable) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(variable);
        id
    }
}

fn dedup(literals: impl IntoIterator<Item = Literal>) -> Vec<Literal> {
    let mut result: Vec<Literal> = Vec::new();
    for literal in literals {
        if !result.contains(&literal) {
            result.push(literal);
        }
    }
    result
}
