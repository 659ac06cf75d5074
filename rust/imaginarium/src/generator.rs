//! # Constraint Compiler
//!
//! A [`Generator`] turns "imagine N things of this kind" into a
//! [`Problem`]. It creates the requested individuals, every permanent
//! individual, and the parts of all of them, asserts what the ontology says
//! about each, then relates every eligible ordered pair under every verb.
//!
//! The generator keeps its own copy of the ontology, so the
//! [`Invention`] it produces stays readable after the session moves on.

use std::collections::HashSet;

use imaginarium_solver::{Engine, Literal, Problem, Proposition, VariableId};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::invention::Invention;
use crate::ontology::{
    AdjectiveId, IndividualId, KindId, Monadic, MonadicLiteral, Ontology, PartId, PropertyId,
    PropertyType, VerbId,
};
use crate::token::untokenize;

/// How deep parts of parts are instantiated.
pub const MAX_PART_DEPTH: usize = 2;

/// What to imagine.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub kind: KindId,
    pub modifiers: Vec<MonadicLiteral>,
    pub count: usize,
}

impl Request {
    pub fn new(kind: KindId, count: usize) -> Self {
        Request {
            kind,
            modifiers: Vec::new(),
            count,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Vec<MonadicLiteral>) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// An individual of one generated model.
#[derive(Debug, Clone)]
pub struct Individual {
    /// Unique name used inside solver propositions.
    pub name: String,
    /// The kinds it was declared with. Anything it can turn out to be lies
    /// above or below one of these.
    pub kinds: Vec<KindId>,
    pub modifiers: Vec<MonadicLiteral>,
    pub permanent: Option<IndividualId>,
    /// Owning individual and the part this individual fills.
    pub container: Option<(usize, PartId)>,
    pub parts: Vec<(PartId, usize)>,
    pub properties: Vec<(PropertyId, VariableId)>,
    depth: usize,
}

/// One relation proposition between two generated individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub verb: VerbId,
    pub subject: usize,
    pub object: usize,
    pub proposition: Proposition,
}

#[derive(Debug, Clone)]
pub struct Generator {
    ontology: Ontology,
    problem: Problem,
    individuals: Vec<Individual>,
    requested: Vec<usize>,
    asserted: HashSet<(usize, KindId)>,
    expanded: HashSet<(usize, KindId)>,
    excluded: HashSet<(usize, KindId)>,
    relations: IndexMap<(VerbId, usize, usize), Proposition>,
    counters: IndexMap<String, usize>,
}

impl Generator {
    pub fn new(ontology: &Ontology, request: &Request) -> Self {
        let mut generator = Generator {
            ontology: ontology.clone(),
            problem: Problem::new(),
            individuals: Vec::new(),
            requested: Vec::new(),
            asserted: HashSet::new(),
            expanded: HashSet::new(),
            excluded: HashSet::new(),
            relations: IndexMap::new(),
            counters: IndexMap::new(),
        };

        let permanent: Vec<IndividualId> = ontology.individuals().map(|(id, _)| id).collect();
        for id in permanent {
            generator.add_permanent(id);
        }
        for _ in 0..request.count {
            let index = generator.add_individual(
                vec![request.kind],
                request.modifiers.clone(),
                None,
                0,
            );
            generator.requested.push(index);
        }
        generator.add_relations();

        debug!(
            kind = %ontology.kind_name(request.kind),
            count = request.count,
            individuals = generator.individuals.len(),
            propositions = generator.problem.proposition_count(),
            constraints = generator.problem.constraints().len(),
            "compiled request"
        );
        generator
    }

    /// Solve the compiled problem and wrap the model.
    pub fn solve(self, engine: &mut impl Engine) -> Result<Invention> {
        let solution = engine.solve(&self.problem)?;
        Ok(Invention::new(self, solution))
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individual(&self, index: usize) -> &Individual {
        &self.individuals[index]
    }

    /// Indices of the individuals the request asked for.
    pub fn requested(&self) -> &[usize] {
        &self.requested
    }

    pub fn relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.relations
            .iter()
            .map(|(&(verb, subject, object), &proposition)| Relation {
                verb,
                subject,
                object,
                proposition,
            })
    }

    pub fn relation(&self, verb: VerbId, subject: usize, object: usize) -> Option<Proposition> {
        self.relations.get(&(verb, subject, object)).copied()
    }

    /// Could the individual be a member of `kind` in some model?
    pub fn could_be(&self, index: usize, kind: KindId) -> bool {
        self.ontology.could_be(&self.individuals[index].kinds, kind)
    }

    /// The existing membership proposition, if the problem mentions it.
    pub fn kind_proposition(&self, index: usize, kind: KindId) -> Option<Proposition> {
        self.problem
            .find_unary(&self.ontology.kind_name(kind), &self.individuals[index].name)
    }

    pub fn adjective_proposition(&self, index: usize, adjective: AdjectiveId) -> Option<Proposition> {
        self.problem.find_unary(
            &untokenize(&self.ontology.adjective(adjective).name),
            &self.individuals[index].name,
        )
    }

    // --- Individuals ---

    fn fresh_name(&mut self, kind: KindId) -> String {
        let base = self.ontology.kind_name(kind).replace(' ', "_");
        let counter = self.counters.entry(base.clone()).or_insert(0);
        *counter += 1;
        format!("{base}{counter}")
    }

    fn add_permanent(&mut self, id: IndividualId) {
        let permanent = self.ontology.individual(id).clone();
        let index = self.individuals.len();
        self.individuals.push(Individual {
            name: untokenize(&permanent.name),
            kinds: permanent.kinds.clone(),
            modifiers: permanent.modifiers.clone(),
            permanent: Some(id),
            container: None,
            parts: Vec::new(),
            properties: Vec::new(),
            depth: 0,
        });
        self.declare(index, &permanent.kinds, &permanent.modifiers);
    }

    /// Positive kind modifiers join the declared kinds, keeping only the
    /// most specific ones.
    fn add_individual(
        &mut self,
        kinds: Vec<KindId>,
        modifiers: Vec<MonadicLiteral>,
        container: Option<(usize, PartId)>,
        depth: usize,
    ) -> usize {
        let mut declared = kinds;
        for modifier in &modifiers {
            if let Monadic::Kind(kind) = modifier.concept
                && modifier.positive
                && !declared.contains(&kind)
            {
                declared.push(kind);
            }
        }
        let declared = self.ontology.most_specific(&declared);
        let name = match declared.first() {
            Some(kind) => self.fresh_name(*kind),
            None => format!("thing{}", self.individuals.len() + 1),
        };
        let index = self.individuals.len();
        self.individuals.push(Individual {
            name,
            kinds: declared.clone(),
            modifiers: modifiers.clone(),
            permanent: None,
            container,
            parts: Vec::new(),
            properties: Vec::new(),
            depth,
        });
        self.declare(index, &declared, &modifiers);
        index
    }

    fn declare(&mut self, index: usize, kinds: &[KindId], modifiers: &[MonadicLiteral]) {
        for kind in kinds {
            self.assert_kind(index, *kind);
        }
        for modifier in modifiers {
            let literal = self.literal(index, *modifier);
            self.problem.assert(literal);
        }
    }

    // --- Propositions ---

    fn is(&mut self, index: usize, kind: KindId) -> Proposition {
        let name = self.ontology.kind_name(kind);
        let proposition = self.problem.unary(&name, &self.individuals[index].name);
        if !self.could_be(index, kind) && self.excluded.insert((index, kind)) {
            self.problem.assert(proposition.negative());
        }
        proposition
    }

    fn adjective(&mut self, index: usize, adjective: AdjectiveId) -> Proposition {
        let name = untokenize(&self.ontology.adjective(adjective).name);
        self.problem.unary(&name, &self.individuals[index].name)
    }

    fn literal(&mut self, index: usize, literal: MonadicLiteral) -> Literal {
        let proposition = match literal.concept {
            Monadic::Kind(kind) => self.is(index, kind),
            Monadic::Adjective(adjective) => self.adjective(index, adjective),
        };
        Literal::new(proposition, literal.positive)
    }

    // --- Kinds ---

    /// Assert membership in `kind` and, once each, in every superkind.
    fn assert_kind(&mut self, index: usize, kind: KindId) {
        if !self.asserted.insert((index, kind)) {
            return;
        }
        let member = self.is(index, kind);
        self.problem.assert(member.positive());
        let superkinds = self.ontology.kind(kind).superkinds.clone();
        for parent in superkinds {
            self.assert_kind(index, parent);
        }
        self.expand(index, kind);
    }

    /// Everything membership in `kind` entails, conditioned on membership.
    fn expand(&mut self, index: usize, kind: KindId) {
        if !self.expanded.insert((index, kind)) {
            return;
        }
        let definition = self.ontology.kind(kind).clone();
        let member = self.is(index, kind).positive();

        // Members of a kind with subkinds belong to exactly one of them.
        if !definition.subkinds.is_empty() {
            let mut choice = vec![!member];
            for sub in &definition.subkinds {
                choice.push(self.is(index, *sub).positive());
            }
            self.problem.unique(choice);
            for sub in &definition.subkinds {
                if self.could_be(index, *sub) {
                    self.expand(index, *sub);
                }
            }
        }

        // A subkind reached from above may have other parents.
        for parent in &definition.superkinds {
            let parent_is = self.is(index, *parent).positive();
            self.problem.implies(member, parent_is);
            self.expand(index, *parent);
        }

        for adjective in &definition.relevant_adjectives {
            self.adjective(index, *adjective);
        }

        for implication in &definition.implications {
            let mut clause = vec![!member];
            for condition in &implication.conditions {
                let literal = self.literal(index, *condition);
                clause.push(!literal);
            }
            clause.push(self.literal(index, implication.consequent));
            self.problem.clause(clause);
        }

        for set in &definition.alternative_sets {
            let alternatives: Vec<Literal> = set
                .alternatives
                .iter()
                .map(|alternative| self.literal(index, *alternative))
                .collect();
            self.problem
                .quantify_if(member, set.low, set.high, alternatives);
        }

        for property in &definition.properties {
            self.add_property(index, *property, member);
        }

        if self.individuals[index].depth < MAX_PART_DEPTH {
            for part in &definition.parts {
                self.add_part(index, *part);
            }
        }
    }

    fn add_property(&mut self, index: usize, id: PropertyId, guard: Literal) {
        if self.individuals[index]
            .properties
            .iter()
            .any(|(property, _)| *property == id)
        {
            return;
        }
        let property = self.ontology.property(id).clone();
        let fixed = self.individuals[index].permanent.and_then(|permanent| {
            self.ontology
                .individual(permanent)
                .properties
                .iter()
                .find(|(property, _)| *property == id)
                .map(|(_, value)| value.clone())
        });
        let name = format!(
            "{}({})",
            untokenize(&property.name),
            self.individuals[index].name
        );

        let variable = match &property.domain {
            PropertyType::Range { low, high } => {
                if fixed.is_some() {
                    return;
                }
                self.problem.float_variable(name, *low, *high, guard)
            }
            PropertyType::Menu {
                values,
                restrictions,
                ..
            } => {
                let variable = self.problem.menu_variable(name, values.clone(), guard);
                for restriction in restrictions {
                    let conditions: Vec<Literal> = restriction
                        .conditions
                        .iter()
                        .map(|condition| self.literal(index, *condition))
                        .collect();
                    self.problem
                        .restrict_menu(variable, &conditions, &restriction.values);
                }
                if let Some(fixed) = &fixed
                    && let Some(choice) = self.problem.menu_choice(variable, fixed)
                {
                    self.problem.assert(choice.positive());
                }
                variable
            }
            PropertyType::Text => return,
        };
        self.individuals[index].properties.push((id, variable));
    }

    fn add_part(&mut self, index: usize, id: PartId) {
        if self.individuals[index]
            .parts
            .iter()
            .any(|(part, _)| *part == id)
        {
            return;
        }
        let part = self.ontology.part(id).clone();
        let depth = self.individuals[index].depth + 1;
        let child = self.add_individual(vec![part.kind], part.modifiers, Some((index, id)), depth);
        self.individuals[index].parts.push((id, child));
    }

    // --- Relations ---

    fn add_relations(&mut self) {
        let verbs: Vec<VerbId> = self.ontology.verbs().map(|(id, _)| id).collect();
        for verb in &verbs {
            self.add_verb(*verb);
        }
        for verb in &verbs {
            self.relate_verbs(*verb);
        }
    }

    fn add_verb(&mut self, id: VerbId) {
        let verb = self.ontology.verb(id).clone();
        let (Some(subject_kind), Some(object_kind)) = (verb.subject_kind, verb.object_kind) else {
            return;
        };
        let name = untokenize(&verb.base);
        let subjects: Vec<usize> = (0..self.individuals.len())
            .filter(|i| self.could_be(*i, subject_kind))
            .collect();
        let objects: Vec<usize> = (0..self.individuals.len())
            .filter(|i| self.could_be(*i, object_kind))
            .collect();

        for &subject in &subjects {
            for &object in &objects {
                let proposition = self.problem.binary(
                    &name,
                    &self.individuals[subject].name,
                    &self.individuals[object].name,
                    verb.symmetric,
                );
                self.relations.insert((id, subject, object), proposition);
                self.problem.set_prior(proposition, verb.density);

                let holds = proposition.positive();
                let subject_is = self.is(subject, subject_kind).positive();
                let object_is = self.is(object, object_kind).positive();
                self.problem.implies(holds, subject_is);
                self.problem.implies(holds, object_is);
                if verb.symmetric {
                    let reverse_subject = self.is(object, subject_kind).positive();
                    let reverse_object = self.is(subject, object_kind).positive();
                    self.problem.implies(holds, reverse_subject);
                    self.problem.implies(holds, reverse_object);
                }
                for modifier in &verb.subject_modifiers {
                    let literal = self.literal(subject, *modifier);
                    self.problem.implies(holds, literal);
                }
                for modifier in &verb.object_modifiers {
                    let literal = self.literal(object, *modifier);
                    self.problem.implies(holds, literal);
                }
            }
        }

        for &individual in subjects.iter().filter(|i| objects.contains(i)) {
            let Some(loop_) = self.relation(id, individual, individual) else {
                continue;
            };
            if verb.anti_reflexive {
                self.problem.assert(loop_.negative());
            } else if verb.reflexive {
                let subject_is = self.is(individual, subject_kind).negative();
                let object_is = self.is(individual, object_kind).negative();
                self.problem
                    .clause([subject_is, object_is, loop_.positive()]);
            }
        }

        if verb.anti_symmetric {
            for &a in &subjects {
                for &b in &subjects {
                    if a < b
                        && let (Some(forward), Some(backward)) =
                            (self.relation(id, a, b), self.relation(id, b, a))
                    {
                        self.problem
                            .at_most(1, [forward.positive(), backward.positive()]);
                    }
                }
            }
        }

        let low = verb.lower_bound.unwrap_or(0);
        for &subject in &subjects {
            let high = verb.upper_bound.unwrap_or(objects.len());
            if low == 0 && high >= objects.len() {
                continue;
            }
            let related: Vec<Literal> = objects
                .iter()
                .filter_map(|object| self.relation(id, subject, *object))
                .map(Proposition::positive)
                .collect();
            let guard = self.is(subject, subject_kind).positive();
            self.problem.quantify_if(guard, low, high, related);
        }
    }

    /// Generalizations, ways-of and exclusions between verbs, per pair.
    fn relate_verbs(&mut self, id: VerbId) {
        let verb = self.ontology.verb(id).clone();
        let pairs: Vec<((usize, usize), Proposition)> = self
            .relations
            .iter()
            .filter(|((v, _, _), _)| *v == id)
            .map(|(&(_, subject, object), &proposition)| ((subject, object), proposition))
            .collect();

        for ((subject, object), proposition) in pairs {
            for general in verb.generalizations.iter().chain(&verb.superspecies) {
                match self.relation(*general, subject, object) {
                    Some(implied) => self
                        .problem
                        .implies(proposition.positive(), implied.positive()),
                    None => self.problem.assert(proposition.negative()),
                }
            }
            for other in &verb.mutual_exclusions {
                if *other > id
                    && let Some(excluded) = self.relation(*other, subject, object)
                {
                    self.problem
                        .at_most(1, [proposition.positive(), excluded.positive()]);
                }
            }
            let ways: Vec<Literal> = verb
                .subspecies
                .iter()
                .filter_map(|way| self.relation(*way, subject, object))
                .map(Proposition::positive)
                .collect();
            if ways.len() > 1 {
                self.problem.at_most(1, ways);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::Implication;
    use crate::token::words;
    use imaginarium_solver::Backtracking;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn animals() -> Result<(Ontology, KindId, KindId, KindId)> {
        let mut ontology = Ontology::new();
        let animal = ontology.add_kind(Some(words("animal")), Some(words("animals")))?;
        let cat = ontology.add_kind(Some(words("cat")), Some(words("cats")))?;
        let dog = ontology.add_kind(Some(words("dog")), Some(words("dogs")))?;
        ontology.declare_superkind(cat, animal)?;
        ontology.declare_superkind(dog, animal)?;
        Ok((ontology, animal, cat, dog))
    }

    #[test]
    fn requested_individuals_get_fresh_names() -> TestResult {
        let (ontology, _, cat, _) = animals()?;
        let generator = Generator::new(&ontology, &Request::new(cat, 2));
        let names: Vec<&str> = generator
            .individuals()
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["cat1", "cat2"]);
        assert_eq!(generator.requested(), &[0, 1]);
        Ok(())
    }

    #[test]
    fn members_of_a_parent_kind_pick_one_subkind() -> TestResult {
        let (ontology, animal, cat, dog) = animals()?;
        let generator = Generator::new(&ontology, &Request::new(animal, 1));
        let mut engine = Backtracking::seeded(3);
        for _ in 0..10 {
            let solution = engine.solve(generator.problem())?;
            let is_cat = generator.kind_proposition(0, cat).ok_or("no cat proposition")?;
            let is_dog = generator.kind_proposition(0, dog).ok_or("no dog proposition")?;
            assert_ne!(solution.holds(is_cat), solution.holds(is_dog));
        }
        Ok(())
    }

    #[test]
    fn unrelated_kinds_are_ruled_out() -> TestResult {
        let (mut ontology, _, cat, dog) = animals()?;
        ontology.kind_mut(cat).implications.push(Implication {
            conditions: Vec::new(),
            consequent: MonadicLiteral::negative(Monadic::Kind(dog)),
        });
        let generator = Generator::new(&ontology, &Request::new(cat, 1));
        let solution = Backtracking::seeded(1).solve(generator.problem())?;
        let is_dog = generator.kind_proposition(0, dog).ok_or("no dog proposition")?;
        assert!(!generator.could_be(0, dog));
        assert!(!solution.holds(is_dog));
        Ok(())
    }

    #[test]
    fn functional_relations_have_one_object() -> TestResult {
        let (mut ontology, _, cat, dog) = animals()?;
        let chase = ontology.add_verb(words("chase"))?;
        ontology.declare_signature(chase, cat, dog)?;
        ontology.verb_mut(chase).lower_bound = Some(1);
        ontology.verb_mut(chase).upper_bound = Some(1);
        let rex = ontology.add_individual(words("Rex"))?;
        ontology.individual_mut(rex).kinds.push(dog);
        let generator = Generator::new(&ontology, &Request::new(cat, 2));
        let solution = Backtracking::seeded(5).solve(generator.problem())?;
        for &cat_index in generator.requested() {
            let chased = generator
                .relations()
                .filter(|r| r.verb == chase && r.subject == cat_index)
                .filter(|r| solution.holds(r.proposition))
                .count();
            assert_eq!(chased, 1);
        }
        Ok(())
    }
}
