//! The ontology graph — kinds, adjectives, verbs, properties, parts and
//! named individuals, plus the registry that maps their names to them.
//!
//! Concepts live in arenas addressed by typed ids, and every edge that is
//! walked in both directions (superkind/subkind, generalization/way-of) is
//! stored on both ends. Nothing is ever removed short of
//! [`Ontology::clear`]; retraction happens by replaying a shorter
//! transcript into a fresh ontology.

pub mod individual;
pub mod kind;
pub mod literal;
pub mod property;
pub mod template;
pub mod verb;

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ContradictionError, ImaginariumError, Result};
use crate::inflection::{gerund_name, plural_name, plural_of, singular_name};
use crate::token::{Token, untokenize};
use crate::trie::{Entry, Form, Trie};

pub use individual::{PermanentIndividual, TestCase};
pub use kind::{AlternativeSet, Implication, Kind};
pub use literal::{
    AdjectiveId, Concept, IndividualId, KindId, Monadic, MonadicLiteral, PartId, PropertyId,
    VerbId,
};
pub use property::{MenuRestriction, Part, Property, PropertyType};
pub use template::Template;
pub use verb::Verb;

#[derive(Debug, Clone)]
pub struct Adjective {
    pub name: Vec<Token>,
    /// True but never mentioned in descriptions.
    pub silent: bool,
    /// Kinds this adjective was declared relevant to.
    pub relevant_to: Vec<KindId>,
}

#[derive(Debug, Clone, Default)]
pub struct Ontology {
    kinds: Vec<Kind>,
    adjectives: Vec<Adjective>,
    verbs: Vec<Verb>,
    properties: Vec<Property>,
    parts: Vec<Part>,
    individuals: Vec<PermanentIndividual>,
    tests: Vec<TestCase>,
    registry: Trie<Concept>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        *self = Ontology::default();
    }

    pub fn registry(&self) -> &Trie<Concept> {
        &self.registry
    }

    pub fn lookup(&self, name: &[Token]) -> Option<&Entry<Concept>> {
        self.registry.get(name)
    }

    // --- Arena access ---

    pub fn kind(&self, id: KindId) -> &Kind {
        &self.kinds[id.index()]
    }

    pub fn kind_mut(&mut self, id: KindId) -> &mut Kind {
        &mut self.kinds[id.index()]
    }

    pub fn kinds(&self) -> impl Iterator<Item = (KindId, &Kind)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(i, k)| (KindId(i as u32), k))
    }

    pub fn adjective(&self, id: AdjectiveId) -> &Adjective {
        &self.adjectives[id.index()]
    }

    pub fn adjective_mut(&mut self, id: AdjectiveId) -> &mut Adjective {
        &mut self.adjectives[id.index()]
    }

    pub fn adjectives(&self) -> impl Iterator<Item = (AdjectiveId, &Adjective)> {
        self.adjectives
            .iter()
            .enumerate()
            .map(|(i, a)| (AdjectiveId(i as u32), a))
    }

    pub fn verb(&self, id: VerbId) -> &Verb {
        &self.verbs[id.index()]
    }

    pub fn verb_mut(&mut self, id: VerbId) -> &mut Verb {
        &mut self.verbs[id.index()]
    }

    pub fn verbs(&self) -> impl Iterator<Item = (VerbId, &Verb)> {
        self.verbs
            .iter()
            .enumerate()
            .map(|(i, v)| (VerbId(i as u32), v))
    }

    pub fn property(&self, id: PropertyId) -> &Property {
        &self.properties[id.index()]
    }

    pub fn property_mut(&mut self, id: PropertyId) -> &mut Property {
        &mut self.properties[id.index()]
    }

    pub fn part(&self, id: PartId) -> &Part {
        &self.parts[id.index()]
    }

    pub fn individual(&self, id: IndividualId) -> &PermanentIndividual {
        &self.individuals[id.index()]
    }

    pub fn individual_mut(&mut self, id: IndividualId) -> &mut PermanentIndividual {
        &mut self.individuals[id.index()]
    }

    pub fn individuals(&self) -> impl Iterator<Item = (IndividualId, &PermanentIndividual)> {
        self.individuals
            .iter()
            .enumerate()
            .map(|(i, n)| (IndividualId(i as u32), n))
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    // --- Names ---

    pub fn kind_name(&self, id: KindId) -> String {
        untokenize(&self.kind(id).singular)
    }

    pub fn verb_name(&self, id: VerbId) -> String {
        untokenize(&self.verb(id).base)
    }

    pub fn monadic_name(&self, concept: Monadic) -> String {
        match concept {
            Monadic::Kind(kind) => self.kind_name(kind),
            Monadic::Adjective(adjective) => untokenize(&self.adjective(adjective).name),
        }
    }

    pub fn literal_name(&self, literal: MonadicLiteral) -> String {
        let name = self.monadic_name(literal.concept);
        if literal.positive {
            name
        } else {
            format!("not {name}")
        }
    }

    fn register(&mut self, name: &[Token], concept: Concept, form: Form) -> Result<()> {
        if let Some(existing) = self.registry.get(name)
            && std::mem::discriminant(&existing.value) != std::mem::discriminant(&concept)
        {
            return Err(ContradictionError::NameClash {
                name: untokenize(name),
                existing: existing.value.describe(),
            }
            .into());
        }
        self.registry.store(
            name,
            Some(Entry {
                value: concept,
                form,
            }),
        );
        Ok(())
    }

    // --- Creation ---

    /// Create a kind from whichever forms are known, deriving the other.
    pub fn add_kind(
        &mut self,
        singular: Option<Vec<Token>>,
        plural: Option<Vec<Token>>,
    ) -> Result<KindId> {
        let (singular, plural) = match (singular, plural) {
            (Some(s), Some(p)) => (s, p),
            (Some(s), None) => {
                let p = plural_name(&s)?;
                (s, p)
            }
            (None, Some(p)) => (singular_name(&p)?, p),
            (None, None) => {
                return Err(ImaginariumError::Command("a kind needs a name".into()));
            }
        };
        let id = KindId(self.kinds.len() as u32);
        if singular == plural {
            self.register(&singular, Concept::Kind(id), Form::Either)?;
        } else {
            self.register(&singular, Concept::Kind(id), Form::Singular)?;
            self.register(&plural, Concept::Kind(id), Form::Plural)?;
        }
        debug!(kind = %untokenize(&singular), plural = %untokenize(&plural), "new kind");
        self.kinds.push(Kind::new(singular, plural));
        Ok(id)
    }

    /// Rename one number of a kind, unbinding the old surface form.
    pub fn set_kind_form(&mut self, id: KindId, name: Vec<Token>, plural: bool) -> Result<()> {
        let kind = self.kind(id);
        let (old, other, this_form, other_form) = if plural {
            (kind.plural.clone(), kind.singular.clone(), Form::Plural, Form::Singular)
        } else {
            (kind.singular.clone(), kind.plural.clone(), Form::Singular, Form::Plural)
        };
        self.registry.store(&old, None);
        if name == other {
            self.register(&name, Concept::Kind(id), Form::Either)?;
        } else {
            self.registry.store(
                &other,
                Some(Entry {
                    value: Concept::Kind(id),
                    form: other_form,
                }),
            );
            self.register(&name, Concept::Kind(id), this_form)?;
        }
        let kind = self.kind_mut(id);
        if plural {
            kind.plural = name;
        } else {
            kind.singular = name;
        }
        Ok(())
    }

    pub fn add_adjective(&mut self, name: Vec<Token>) -> Result<AdjectiveId> {
        let id = AdjectiveId(self.adjectives.len() as u32);
        self.register(&name, Concept::Adjective(id), Form::Either)?;
        debug!(adjective = %untokenize(&name), "new adjective");
        self.adjectives.push(Adjective {
            name,
            silent: false,
            relevant_to: Vec::new(),
        });
        Ok(id)
    }

    /// Create a verb from its base form. The third person form inflects the
    /// first word: "play with" becomes "plays with".
    pub fn add_verb(&mut self, base: Vec<Token>) -> Result<VerbId> {
        let mut third_person = base.clone();
        if let Some(first) = third_person.first_mut() {
            first.text = plural_of(&first.text)?;
        }
        let gerund = gerund_name(&base);
        let id = VerbId(self.verbs.len() as u32);
        self.register(&base, Concept::Verb(id), Form::Plural)?;
        self.register(&third_person, Concept::Verb(id), Form::Singular)?;
        self.register(&gerund, Concept::Verb(id), Form::Gerund)?;
        debug!(verb = %untokenize(&base), "new verb");
        self.verbs.push(Verb::new(base, third_person, gerund));
        Ok(id)
    }

    pub fn add_property(
        &mut self,
        owner: KindId,
        name: Vec<Token>,
        domain: PropertyType,
    ) -> PropertyId {
        if let Some(existing) = self.find_property(owner, &name) {
            self.property_mut(existing).domain = domain;
            return existing;
        }
        let id = PropertyId(self.properties.len() as u32);
        self.properties.push(Property {
            name,
            owner,
            domain,
        });
        self.kind_mut(owner).properties.push(id);
        id
    }

    pub fn add_part(
        &mut self,
        owner: KindId,
        name: Vec<Token>,
        kind: KindId,
        modifiers: Vec<MonadicLiteral>,
    ) -> PartId {
        let id = PartId(self.parts.len() as u32);
        self.parts.push(Part {
            name,
            owner,
            kind,
            modifiers,
        });
        self.kind_mut(owner).parts.push(id);
        id
    }

    pub fn add_individual(&mut self, name: Vec<Token>) -> Result<IndividualId> {
        let id = IndividualId(self.individuals.len() as u32);
        self.register(&name, Concept::Individual(id), Form::Singular)?;
        debug!(individual = %untokenize(&name), "new proper noun");
        self.individuals.push(PermanentIndividual {
            name,
            kinds: Vec::new(),
            modifiers: Vec::new(),
            properties: Vec::new(),
        });
        Ok(id)
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    // --- Kind hierarchy ---

    /// Record that `sub` is a kind of `parent`.
    pub fn declare_superkind(&mut self, sub: KindId, parent: KindId) -> Result<()> {
        if self.is_a(parent, sub) {
            return Err(ContradictionError::CyclicKinds {
                sub: self.kind_name(sub),
                parent: self.kind_name(parent),
            }
            .into());
        }
        if self.kind(sub).superkinds.contains(&parent) {
            return Ok(());
        }
        self.kind_mut(sub).superkinds.push(parent);
        self.kind_mut(parent).subkinds.push(sub);
        Ok(())
    }

    /// `kind` is `ancestor` or one of its (transitive) subkinds.
    pub fn is_a(&self, kind: KindId, ancestor: KindId) -> bool {
        kind == ancestor
            || self
                .kind(kind)
                .superkinds
                .iter()
                .any(|s| self.is_a(*s, ancestor))
    }

    /// `kind` and all its transitive superkinds, nearest first.
    pub fn ancestors(&self, kind: KindId) -> Vec<KindId> {
        self.closure(kind, |k| &k.superkinds)
    }

    /// `kind` and all its transitive subkinds, nearest first.
    pub fn descendants(&self, kind: KindId) -> Vec<KindId> {
        self.closure(kind, |k| &k.subkinds)
    }

    fn closure(&self, start: KindId, edges: impl Fn(&Kind) -> &Vec<KindId>) -> Vec<KindId> {
        let mut seen = HashSet::new();
        let mut order = vec![start];
        seen.insert(start);
        let mut next = 0;
        while next < order.len() {
            let kind = order[next];
            next += 1;
            for edge in edges(self.kind(kind)) {
                if seen.insert(*edge) {
                    order.push(*edge);
                }
            }
        }
        order
    }

    /// Could something declared as each of `declared` also be a `kind`?
    /// Only if `kind` is at or above some kind at or below a declared one.
    /// Kinds form a DAG, so that reaches the other parents of subkinds too.
    pub fn could_be(&self, declared: &[KindId], kind: KindId) -> bool {
        declared.iter().any(|d| {
            self.descendants(*d)
                .into_iter()
                .any(|below| self.is_a(below, kind))
        })
    }

    /// Drop kinds implied by a more specific kind in the same list.
    pub fn most_specific(&self, kinds: &[KindId]) -> Vec<KindId> {
        let mut result: Vec<KindId> = Vec::new();
        for kind in kinds {
            if result.contains(kind) {
                continue;
            }
            let implied = kinds.iter().any(|other| other != kind && self.is_a(*other, *kind));
            if !implied {
                result.push(*kind);
            }
        }
        result
    }

    /// The least common superkind of `a` and `b`, if there is exactly one.
    pub fn least_upper_bound(&self, a: KindId, b: KindId) -> Option<KindId> {
        if self.is_a(a, b) {
            return Some(b);
        }
        if self.is_a(b, a) {
            return Some(a);
        }
        let above_b = self.ancestors(b);
        let common: Vec<KindId> = self
            .ancestors(a)
            .into_iter()
            .filter(|k| above_b.contains(k))
            .collect();
        let minimal: Vec<KindId> = common
            .iter()
            .copied()
            .filter(|k| !common.iter().any(|o| o != k && self.is_a(*o, *k)))
            .collect();
        match minimal.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    // --- Adjectives ---

    pub fn make_relevant(&mut self, kind: KindId, adjective: AdjectiveId) {
        if !self.kind(kind).relevant_adjectives.contains(&adjective) {
            self.kind_mut(kind).relevant_adjectives.push(adjective);
        }
        let adjective = self.adjective_mut(adjective);
        if !adjective.relevant_to.contains(&kind) {
            adjective.relevant_to.push(kind);
        }
    }

    /// An adjective is relevant to a kind when it was declared relevant to
    /// the kind or any of its superkinds.
    pub fn is_relevant(&self, adjective: AdjectiveId, kind: KindId) -> bool {
        self.ancestors(kind)
            .iter()
            .any(|k| self.adjective(adjective).relevant_to.contains(k))
    }

    /// Make every adjective mentioned by a literal relevant to `kind`.
    pub fn make_literals_relevant(&mut self, kind: KindId, literals: &[MonadicLiteral]) {
        for literal in literals {
            if let Monadic::Adjective(adjective) = literal.concept
                && !self.is_relevant(adjective, kind)
            {
                self.make_relevant(kind, adjective);
            }
        }
    }

    // --- Verbs ---

    /// Declare (or widen) a verb's subject and object kinds. Redeclaring
    /// with a related kind generalizes to their least upper bound; an
    /// unrelated kind is a contradiction.
    pub fn declare_signature(&mut self, verb: VerbId, subject: KindId, object: KindId) -> Result<()> {
        let subject = self.widen(verb, self.verb(verb).subject_kind, subject)?;
        let object = self.widen(verb, self.verb(verb).object_kind, object)?;
        let verb = self.verb_mut(verb);
        verb.subject_kind = Some(subject);
        verb.object_kind = Some(object);
        Ok(())
    }

    fn widen(&self, verb: VerbId, existing: Option<KindId>, proposed: KindId) -> Result<KindId> {
        match existing {
            None => Ok(proposed),
            Some(existing) => self.least_upper_bound(existing, proposed).ok_or_else(|| {
                ContradictionError::IncompatibleSignature {
                    verb: self.verb_name(verb),
                    existing: self.kind_name(existing),
                    proposed: self.kind_name(proposed),
                }
                .into()
            }),
        }
    }

    pub fn add_generalization(&mut self, verb: VerbId, general: VerbId) {
        if !self.verb(verb).generalizations.contains(&general) {
            self.verb_mut(verb).generalizations.push(general);
        }
    }

    pub fn add_way_of(&mut self, specific: VerbId, general: VerbId) {
        if !self.verb(specific).superspecies.contains(&general) {
            self.verb_mut(specific).superspecies.push(general);
            self.verb_mut(general).subspecies.push(specific);
        }
    }

    pub fn add_mutual_exclusion(&mut self, a: VerbId, b: VerbId) {
        if !self.verb(a).mutual_exclusions.contains(&b) {
            self.verb_mut(a).mutual_exclusions.push(b);
        }
        if !self.verb(b).mutual_exclusions.contains(&a) {
            self.verb_mut(b).mutual_exclusions.push(a);
        }
    }

    // --- Properties and parts ---

    /// A property of `kind` or one of its superkinds with this name.
    pub fn find_property(&self, kind: KindId, name: &[Token]) -> Option<PropertyId> {
        self.ancestors(kind).into_iter().find_map(|k| {
            self.kind(k)
                .properties
                .iter()
                .copied()
                .find(|p| self.property(*p).name == name)
        })
    }

    pub fn find_part(&self, kind: KindId, name: &[Token]) -> Option<PartId> {
        self.ancestors(kind).into_iter().find_map(|k| {
            self.kind(k)
                .parts
                .iter()
                .copied()
                .find(|p| self.part(*p).name == name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::words;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn adding_a_kind_registers_both_numbers() -> TestResult {
        let mut ontology = Ontology::new();
        let cat = ontology.add_kind(Some(words("cat")), None)?;
        assert_eq!(ontology.kind(cat).plural, words("cats"));
        assert_eq!(
            ontology.lookup(&words("cats")),
            Some(&Entry {
                value: Concept::Kind(cat),
                form: Form::Plural
            })
        );
        let person = ontology.add_kind(None, Some(words("people")))?;
        assert_eq!(ontology.kind(person).singular, words("person"));
        Ok(())
    }

    #[test]
    fn identical_forms_are_either_number() -> TestResult {
        let mut ontology = Ontology::new();
        let sheep = ontology.add_kind(Some(words("sheep")), None)?;
        assert_eq!(ontology.lookup(&words("sheep")).map(|e| e.form), Some(Form::Either));
        assert_eq!(ontology.kind(sheep).plural, words("sheep"));
        Ok(())
    }

    #[test]
    fn renaming_a_form_unbinds_the_old_one() -> TestResult {
        let mut ontology = Ontology::new();
        let octopus = ontology.add_kind(Some(words("octopus")), None)?;
        ontology.set_kind_form(octopus, words("octopuses"), true)?;
        assert_eq!(ontology.lookup(&words("octopi")), None);
        assert_eq!(
            ontology.lookup(&words("octopuses")).map(|e| e.form),
            Some(Form::Plural)
        );
        Ok(())
    }

    #[test]
    fn kind_hierarchy_queries() -> TestResult {
        let mut ontology = Ontology::new();
        let animal = ontology.add_kind(Some(words("animal")), None)?;
        let cat = ontology.add_kind(Some(words("cat")), None)?;
        let dog = ontology.add_kind(Some(words("dog")), None)?;
        let persian = ontology.add_kind(Some(words("persian")), None)?;
        ontology.declare_superkind(cat, animal)?;
        ontology.declare_superkind(dog, animal)?;
        ontology.declare_superkind(persian, cat)?;

        assert!(ontology.is_a(persian, animal));
        assert!(!ontology.is_a(animal, persian));
        assert_eq!(ontology.ancestors(persian), vec![persian, cat, animal]);
        assert_eq!(ontology.most_specific(&[animal, persian, cat]), vec![persian]);
        assert!(ontology.could_be(&[cat], animal));
        assert!(ontology.could_be(&[cat], persian));
        assert!(!ontology.could_be(&[cat], dog));
        assert_eq!(ontology.least_upper_bound(persian, dog), Some(animal));
        Ok(())
    }

    #[test]
    fn could_be_reaches_other_parents_of_subkinds() -> TestResult {
        let mut ontology = Ontology::new();
        let animal = ontology.add_kind(Some(words("animal")), None)?;
        let pet = ontology.add_kind(Some(words("pet")), None)?;
        let robot = ontology.add_kind(Some(words("robot")), None)?;
        let cat = ontology.add_kind(Some(words("cat")), None)?;
        ontology.declare_superkind(cat, animal)?;
        ontology.declare_superkind(cat, pet)?;
        ontology.declare_superkind(robot, pet)?;

        assert!(ontology.could_be(&[animal], pet));
        assert!(ontology.could_be(&[pet], animal));
        assert!(!ontology.could_be(&[animal], robot));
        assert!(!ontology.could_be(&[robot], animal));
        Ok(())
    }

    #[test]
    fn cycles_are_contradictions() -> TestResult {
        let mut ontology = Ontology::new();
        let a = ontology.add_kind(Some(words("cat")), None)?;
        let b = ontology.add_kind(Some(words("animal")), None)?;
        ontology.declare_superkind(a, b)?;
        let result = ontology.declare_superkind(b, a);
        assert!(matches!(
            result,
            Err(ImaginariumError::Contradiction(ContradictionError::CyclicKinds { .. }))
        ));
        Ok(())
    }

    #[test]
    fn unrelated_signatures_are_contradictions() -> TestResult {
        let mut ontology = Ontology::new();
        let cat = ontology.add_kind(Some(words("cat")), None)?;
        let rock = ontology.add_kind(Some(words("rock")), None)?;
        let love = ontology.add_verb(words("love"))?;
        ontology.declare_signature(love, cat, cat)?;
        assert!(ontology.declare_signature(love, rock, cat).is_err());
        assert_eq!(ontology.verb(love).subject_kind, Some(cat));
        Ok(())
    }

    #[test]
    fn verb_forms_are_registered() -> TestResult {
        let mut ontology = Ontology::new();
        let love = ontology.add_verb(words("love"))?;
        for (name, form) in [
            ("love", Form::Plural),
            ("loves", Form::Singular),
            ("loving", Form::Gerund),
        ] {
            assert_eq!(
                ontology.lookup(&words(name)),
                Some(&Entry {
                    value: Concept::Verb(love),
                    form
                })
            );
        }
        Ok(())
    }

    #[test]
    fn adjective_relevance_is_inherited() -> TestResult {
        let mut ontology = Ontology::new();
        let animal = ontology.add_kind(Some(words("animal")), None)?;
        let cat = ontology.add_kind(Some(words("cat")), None)?;
        ontology.declare_superkind(cat, animal)?;
        let fuzzy = ontology.add_adjective(words("fuzzy"))?;
        ontology.make_relevant(animal, fuzzy);
        assert!(ontology.is_relevant(fuzzy, cat));
        Ok(())
    }

    #[test]
    fn names_clash_across_concept_types() -> TestResult {
        let mut ontology = Ontology::new();
        ontology.add_adjective(words("orange"))?;
        assert!(matches!(
            ontology.add_kind(Some(words("orange")), None),
            Err(ImaginariumError::Contradiction(ContradictionError::NameClash { .. }))
        ));
        Ok(())
    }
}
