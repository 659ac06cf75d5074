//! Regenerate source statements from an ontology.
//!
//! The output reads back through the sentence library: replaying it in a
//! fresh context rebuilds an equivalent ontology. Statements come out
//! grouped by concern rather than in the order they were typed.

use itertools::Itertools;

use crate::inflection::plural_name;
use crate::ontology::{
    AlternativeSet, Implication, KindId, Monadic, MonadicLiteral, Ontology, PropertyType, VerbId,
};
use crate::token::untokenize;

pub fn decompile(ontology: &Ontology) -> Vec<String> {
    let mut lines = Vec::new();
    let kinds: Vec<KindId> = ontology.kinds().map(|(id, _)| id).collect();
    let verbs: Vec<VerbId> = ontology.verbs().map(|(id, _)| id).collect();

    for &kind in &kinds {
        let definition = ontology.kind(kind);
        let regular = plural_name(&definition.singular)
            .map(|plural| untokenize(&plural))
            .ok();
        let plural = untokenize(&definition.plural);
        if regular.as_deref() != Some(plural.as_str()) {
            lines.push(format!(
                "the plural of {} is {plural}",
                untokenize(&definition.singular)
            ));
        }
    }

    for &kind in &kinds {
        for parent in &ontology.kind(kind).superkinds {
            lines.push(format!(
                "{} are kinds of {}",
                plural(ontology, kind),
                plural(ontology, *parent)
            ));
        }
    }

    for &kind in &kinds {
        kind_statements(ontology, kind, &mut lines);
    }

    for (_, adjective) in ontology.adjectives() {
        if adjective.silent {
            lines.push(format!("{} is silent", untokenize(&adjective.name)));
        }
    }

    for &verb in &verbs {
        verb_statements(ontology, verb, &mut lines);
    }

    for (_, individual) in ontology.individuals() {
        let name = untokenize(&individual.name);
        for kind in &individual.kinds {
            let singular = ontology.kind_name(*kind);
            lines.push(format!("{name} is {} {singular}", article(&singular)));
        }
        for modifier in &individual.modifiers {
            lines.push(format!("{name} is {}", ontology.literal_name(*modifier)));
        }
        for (property, value) in &individual.properties {
            lines.push(format!(
                "{name}'s {} is {value}",
                untokenize(&ontology.property(*property).name)
            ));
        }
    }

    for test in ontology.tests() {
        lines.push(test.text.clone());
    }
    lines
}

fn kind_statements(ontology: &Ontology, kind: KindId, lines: &mut Vec<String>) {
    let definition = ontology.kind(kind);
    let noun = plural(ontology, kind);

    let alternatives_of: Vec<MonadicLiteral> = definition
        .alternative_sets
        .iter()
        .flat_map(|set| set.alternatives.iter().copied())
        .collect();
    for adjective in &definition.relevant_adjectives {
        let literal = MonadicLiteral::positive(Monadic::Adjective(*adjective));
        if !alternatives_of.contains(&literal) && !alternatives_of.contains(&literal.negated()) {
            lines.push(format!("{noun} can be {}", ontology.literal_name(literal)));
        }
    }

    for set in &definition.alternative_sets {
        lines.push(alternatives(ontology, &noun, set));
    }

    for Implication {
        conditions,
        consequent,
    } in &definition.implications
    {
        lines.push(format!(
            "{} are {}",
            phrase(ontology, conditions, &noun),
            ontology.literal_name(*consequent)
        ));
    }

    for property in &definition.properties {
        let property = ontology.property(*property);
        let name = untokenize(&property.name);
        match &property.domain {
            PropertyType::Range { low, high } => {
                lines.push(format!(
                    "{noun} have {} {name} between {low} and {high}",
                    article(&name)
                ));
            }
            PropertyType::Menu {
                source,
                restrictions,
                ..
            } => {
                lines.push(format!("{noun} have {} {name} from {source}", article(&name)));
                for restriction in restrictions {
                    let (subject, modifiers): (Vec<MonadicLiteral>, Vec<MonadicLiteral>) =
                        restriction.conditions.iter().copied().partition(|c| {
                            c.positive && matches!(c.concept, Monadic::Kind(_))
                        });
                    let subject = match subject.first().map(|c| c.concept) {
                        Some(Monadic::Kind(kind)) => plural(ontology, kind),
                        _ => noun.clone(),
                    };
                    lines.push(format!(
                        "{}' {name} is {}",
                        phrase(ontology, &modifiers, &subject),
                        restriction.values.join(" or ")
                    ));
                }
            }
            PropertyType::Text => lines.push(format!("{noun} have {} {name}", article(&name))),
        }
    }

    for part in &definition.parts {
        let part = ontology.part(*part);
        let kind = ontology.kind_name(part.kind);
        let described = phrase(ontology, &part.modifiers, &kind);
        lines.push(format!(
            "{noun} have {} {described} called their {}",
            article(&described),
            untokenize(&part.name)
        ));
    }

    if let Some(template) = &definition.name_template {
        lines.push(format!("{noun} are named \"{}\"", template.source()));
    }
    if let Some(template) = &definition.description_template {
        lines.push(format!("{noun} are described as \"{}\"", template.source()));
    }
}

fn alternatives(ontology: &Ontology, noun: &str, set: &AlternativeSet) -> String {
    let names = || {
        set.alternatives
            .iter()
            .map(|literal| ontology.literal_name(*literal))
    };
    match (set.low, set.high) {
        (0, 1) => format!("{noun} can be {}", names().join(" or ")),
        (1, 1) => format!("{noun} are {}", names().join(" or ")),
        (0, high) => format!("{noun} can be up to {high} of {}", names().join(", ")),
        (low, high) => format!(
            "{noun} are between {low} and {high} of {}",
            names().join(", ")
        ),
    }
}

fn verb_statements(ontology: &Ontology, id: VerbId, lines: &mut Vec<String>) {
    let verb = ontology.verb(id);
    let base = untokenize(&verb.base);
    let gerund = untokenize(&verb.gerund);

    if let (Some(subject_kind), Some(object_kind)) = (verb.subject_kind, verb.object_kind) {
        let subject = phrase(ontology, &verb.subject_modifiers, &plural(ontology, subject_kind));
        let objects = phrase(ontology, &verb.object_modifiers, &plural(ontology, object_kind));
        let object = phrase(
            ontology,
            &verb.object_modifiers,
            &ontology.kind_name(object_kind),
        );

        if verb.symmetric {
            lines.push(format!("{subject} can {base} each other"));
        }
        let bounded = match (verb.lower_bound, verb.upper_bound) {
            (None, None) if verb.symmetric => None,
            (None, None) => Some(format!("{subject} can {base} {objects}")),
            (Some(1), None) => Some(format!("{subject} must {base} {objects}")),
            (Some(1), Some(1)) => Some(format!("{subject} must {base} exactly one {object}")),
            (None | Some(0), Some(1)) => Some(format!("{subject} can {base} one {object}")),
            (None | Some(0), Some(high)) => Some(format!("{subject} can {base} up to {high} {objects}")),
            (None | Some(0), None) => Some(format!("{subject} can {base} {objects}")),
            (Some(1), Some(high)) => Some(format!("{subject} must {base} up to {high} {objects}")),
            (Some(low), None) => Some(format!("{subject} must {base} at least {low} {objects}")),
            (Some(low), Some(high)) => Some(format!(
                "{subject} must {base} between {low} and {high} {objects}"
            )),
        };
        lines.extend(bounded);
        if verb.anti_symmetric {
            lines.push(format!("{subject} cannot {base} each other"));
        }
        if verb.anti_reflexive {
            lines.push(format!("{subject} cannot {base} themselves"));
        }
        if verb.reflexive {
            lines.push(format!("{subject} must {base} themselves"));
        }
    }

    let frequency = [
        (0.03, "very rare"),
        (0.1, "rare"),
        (0.9, "common"),
        (0.97, "very common"),
    ]
    .into_iter()
    .find(|(density, _)| (verb.density - density).abs() < f64::EPSILON);
    if let Some((_, word)) = frequency {
        lines.push(format!("{gerund} is {word}"));
    }

    for general in &verb.generalizations {
        lines.push(format!(
            "{gerund} implies {}",
            untokenize(&ontology.verb(*general).gerund)
        ));
    }
    for general in &verb.superspecies {
        lines.push(format!(
            "{gerund} is a way of {}",
            untokenize(&ontology.verb(*general).gerund)
        ));
    }
    for other in &verb.mutual_exclusions {
        if *other > id {
            lines.push(format!(
                "{gerund} and {} are mutually exclusive",
                untokenize(&ontology.verb(*other).gerund)
            ));
        }
    }
}

fn plural(ontology: &Ontology, kind: KindId) -> String {
    untokenize(&ontology.kind(kind).plural)
}

/// Modifiers in front of a noun: "fuzzy not big cats".
fn phrase(ontology: &Ontology, modifiers: &[MonadicLiteral], noun: &str) -> String {
    modifiers
        .iter()
        .map(|modifier| ontology.literal_name(*modifier))
        .chain([noun.to_string()])
        .join(" ")
}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some(first) if "aeiouAEIOU".contains(first) => "an",
        _ => "a",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::words;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn hierarchy_and_relations_read_back_as_statements() -> TestResult {
        let mut ontology = Ontology::new();
        let animal = ontology.add_kind(Some(words("animal")), Some(words("animals")))?;
        let cat = ontology.add_kind(Some(words("cat")), Some(words("cats")))?;
        ontology.declare_superkind(cat, animal)?;
        let fuzzy = ontology.add_adjective(words("fuzzy"))?;
        ontology.make_relevant(cat, fuzzy);
        let love = ontology.add_verb(words("love"))?;
        ontology.declare_signature(love, cat, cat)?;
        ontology.verb_mut(love).lower_bound = Some(1);
        ontology.verb_mut(love).upper_bound = Some(1);
        ontology.verb_mut(love).density = 0.1;

        assert_eq!(
            decompile(&ontology),
            vec![
                "cats are kinds of animals",
                "cats can be fuzzy",
                "cats must love exactly one cat",
                "loving is rare",
            ]
        );
        Ok(())
    }

    #[test]
    fn irregular_plurals_are_restated() -> TestResult {
        let mut ontology = Ontology::new();
        ontology.add_kind(Some(words("octopus")), Some(words("octopodes")))?;
        assert_eq!(
            decompile(&ontology),
            vec!["the plural of octopus is octopodes"]
        );
        Ok(())
    }
}
