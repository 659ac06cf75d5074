//! The sentence library and what each declaration does.
//!
//! Order matters: the first template that matches wins, so templates with
//! more literal structure come before the looser ones they overlap with
//! ("NPS can VP each other" before "NPS MODAL VP NPS"), and plural readings
//! of a bare noun before singular ones.

use tracing::debug;

use crate::error::{ContradictionError, GrammarError, Result};
use crate::ontology::{
    AlternativeSet, Concept, Implication, MenuRestriction, Monadic, MonadicLiteral, PropertyType,
    TestCase, Template, VerbId,
};
use crate::pattern::commit::Commit;
use crate::pattern::phrase::Conjunction;
use crate::pattern::{Command, Feature, Parse, Sentence};
use crate::token::{Token, untokenize};

pub const MODALS: &[&str] = &["can", "must"];
pub const FREQUENCIES: &[&str] = &["very rare", "very common", "rare", "common"];

pub fn sentences() -> Vec<Sentence> {
    use Feature::*;
    vec![
        // Commands
        Sentence::command("imagine NP", Command::Imagine).check(Common(0)),
        Sentence::command("undo", Command::Undo),
        Sentence::command("start over", Command::StartOver),
        Sentence::command("save TEXT", Command::Save),
        Sentence::command("test", Command::Test),
        Sentence::command("decompile", Command::Decompile),
        Sentence::command("stats", Command::Stats),
        Sentence::command("help", Command::Help),
        // Kinds
        Sentence::declare("NPLIST are kinds of NPS", kinds_of).check(Common(0)),
        Sentence::declare("NP is a kind of NP", kind_of)
            .check(Singular(0))
            .check(Common(0))
            .check(Common(1)),
        Sentence::declare("the plural of NP is TEXT", plural_is).check(Common(0)),
        Sentence::declare("the singular of NPS is TEXT", singular_is).check(Common(0)),
        // Permanent individuals
        Sentence::declare("PN is a NP", instance).check(Common(1)),
        // Templates
        Sentence::declare("NPS are described as \"TEMPLATE\"", described_as).check(Common(0)),
        Sentence::declare("NP is described as \"TEMPLATE\"", described_as).check(Common(0)),
        Sentence::declare("NPS are named \"TEMPLATE\"", named).check(Common(0)),
        Sentence::declare("NP is named \"TEMPLATE\"", named).check(Common(0)),
        // Adjectives
        Sentence::declare("AP is silent", silent),
        Sentence::declare("PN is APLIST", individual_is).check(NotAlternatives(0)),
        Sentence::declare("NPS are between N and N of APLIST", between)
            .check(Plural(0))
            .check(Unmodified(0)),
        Sentence::declare("NP is between N and N of APLIST", between).check(Unmodified(0)),
        Sentence::declare("NPS can be up to N of APLIST", up_to).check(Unmodified(0)),
        Sentence::declare("NPS can be APLIST", can_be)
            .check(Common(0))
            .check(Unmodified(0)),
        Sentence::declare("NPS are APLIST", are)
            .check(Plural(0))
            .check(Common(0)),
        Sentence::declare("NP is APLIST", are)
            .check(Singular(0))
            .check(Common(0)),
        // Verb features
        Sentence::declare("VERB is a way of VERB", way_of),
        Sentence::declare("VERB is FREQUENCY", frequency),
        Sentence::declare("VERB implies VERB", implies),
        Sentence::declare("VERB and VERB are mutually exclusive", mutually_exclusive),
        // Relations
        Sentence::declare("NPS can VP each other", symmetric).check(Common(0)),
        Sentence::declare("NPS cannot VP each other", anti_symmetric).check(Common(0)),
        Sentence::declare("NPS cannot VP themselves", anti_reflexive).check(Common(0)),
        Sentence::declare("NPS must VP themselves", reflexive).check(Common(0)),
        Sentence::declare("NPS MODAL VP exactly one NP", exactly_one).check(Common(1)),
        Sentence::declare("NPS MODAL VP one NP", exactly_one).check(Common(1)),
        Sentence::declare("NPS MODAL VP up to N NPS", up_to_n).check(Common(1)),
        Sentence::declare("NPS MODAL VP at least N NPS", at_least_n).check(Common(1)),
        Sentence::declare("NPS MODAL VP between N and N NPS", between_n).check(Common(1)),
        Sentence::declare("NPS MODAL VP NPS", relation)
            .check(Common(0))
            .check(Common(1)),
        // Properties and parts
        Sentence::declare("NPS have a PROPERTY between N and N", range).check(Common(0)),
        Sentence::declare("NP has a PROPERTY between N and N", range).check(Common(0)),
        Sentence::declare("NPS have a PROPERTY from MENU", menu).check(Common(0)),
        Sentence::declare("NP has a PROPERTY from MENU", menu).check(Common(0)),
        Sentence::declare("NPS have a NP called their PART", part)
            .check(Common(0))
            .check(Common(1)),
        Sentence::declare("NP has a NP called its PART", part)
            .check(Common(0))
            .check(Common(1)),
        Sentence::declare("NPS have a PROPERTY", text_property).check(Common(0)),
        Sentence::declare("NP has a PROPERTY", text_property).check(Common(0)),
        Sentence::declare("NP's PROPERTY is VALUE", property_value),
        Sentence::declare("NPS' PROPERTY is VALUE", property_value).check(Common(0)),
        Sentence::declare("NPS' PROPERTY are VALUE", property_value).check(Common(0)),
        // Tests
        Sentence::declare("NPS should exist", should_exist).check(Common(0)),
        Sentence::declare("NPS should not exist", should_not_exist).check(Common(0)),
    ]
}

fn kinds_of(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let parent = c.kind(p.noun(0)?)?;
    for item in &p.nouns(0)?.items {
        let sub = c.kind(item)?;
        c.ontology.declare_superkind(sub, parent)?;
    }
    Ok(())
}

fn kind_of(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let sub = c.kind(p.noun(0)?)?;
    let parent = c.kind(p.noun(1)?)?;
    c.ontology.declare_superkind(sub, parent)
}

fn plural_is(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let kind = c.kind(p.noun(0)?)?;
    c.ontology.set_kind_form(kind, p.text(0)?.to_vec(), true)
}

fn singular_is(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let kind = c.kind(p.noun(0)?)?;
    c.ontology.set_kind_form(kind, p.text(0)?.to_vec(), false)
}

fn instance(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let individual = c.individual(p.noun(0)?)?;
    let np = p.noun(1)?;
    let kind = c.kind(np)?;
    let modifiers = c.modifiers(np)?;
    c.ontology.make_literals_relevant(kind, &modifiers);

    let mut kinds = c.ontology.individual(individual).kinds.clone();
    kinds.push(kind);
    let kinds = c.ontology.most_specific(&kinds);
    let permanent = c.ontology.individual_mut(individual);
    permanent.kinds = kinds;
    for modifier in modifiers {
        if !permanent.modifiers.contains(&modifier) {
            permanent.modifiers.push(modifier);
        }
    }
    Ok(())
}

fn described_as(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let kind = c.kind(p.noun(0)?)?;
    let template = Template::compile(p.text(0)?)?;
    c.ontology.kind_mut(kind).description_template = Some(template);
    Ok(())
}

fn named(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let kind = c.kind(p.noun(0)?)?;
    let template = Template::compile(p.text(0)?)?;
    c.ontology.kind_mut(kind).name_template = Some(template);
    Ok(())
}

fn silent(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    match c.literal(p.adjective(0)?)? {
        MonadicLiteral {
            concept: Monadic::Adjective(adjective),
            positive: true,
        } => {
            c.ontology.adjective_mut(adjective).silent = true;
            Ok(())
        }
        _ => Err(rejected(c, "only an adjective can be silent")),
    }
}

fn individual_is(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let individual = c.individual(p.noun(0)?)?;
    let literals = c.literals(p.adjectives(0)?)?;
    for kind in c.ontology.individual(individual).kinds.clone() {
        c.ontology.make_literals_relevant(kind, &literals);
    }
    let permanent = c.ontology.individual_mut(individual);
    for literal in literals {
        permanent.modifiers.retain(|m| *m != literal.negated());
        if !permanent.modifiers.contains(&literal) {
            permanent.modifiers.push(literal);
        }
    }
    Ok(())
}

fn add_alternatives(c: &mut Commit<'_>, p: &Parse, low: usize, high: usize) -> Result<()> {
    if low > high {
        return Err(rejected(c, "the lower bound is above the upper bound"));
    }
    let kind = c.kind(p.noun(0)?)?;
    let alternatives = c.literals(p.adjectives(0)?)?;
    c.ontology.make_literals_relevant(kind, &alternatives);
    c.ontology
        .kind_mut(kind)
        .alternative_sets
        .push(AlternativeSet {
            alternatives,
            low,
            high,
        });
    Ok(())
}

fn between(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    add_alternatives(c, p, p.count(0)?, p.count(1)?)
}

fn up_to(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    add_alternatives(c, p, 0, p.count(0)?)
}

fn can_be(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let list = p.adjectives(0)?;
    if list.conjunction == Some(Conjunction::Or) {
        return add_alternatives(c, p, 0, 1);
    }
    let kind = c.kind(p.noun(0)?)?;
    let literals = c.literals(list)?;
    c.ontology.make_literals_relevant(kind, &literals);
    Ok(())
}

fn are(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let np = p.noun(0)?;
    let list = p.adjectives(0)?;
    let conditions = c.modifiers(np)?;
    if list.conjunction == Some(Conjunction::Or) {
        if !conditions.is_empty() {
            return Err(rejected(c, "alternatives can't depend on modifiers"));
        }
        return add_alternatives(c, p, 1, 1);
    }
    let kind = c.kind(np)?;
    let consequents = c.literals(list)?;
    c.ontology.make_literals_relevant(kind, &conditions);
    c.ontology.make_literals_relevant(kind, &consequents);
    for consequent in consequents {
        let implication = Implication {
            conditions: conditions.clone(),
            consequent,
        };
        let implications = &mut c.ontology.kind_mut(kind).implications;
        if !implications.contains(&implication) {
            implications.push(implication);
        }
    }
    Ok(())
}

fn way_of(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let specific = c.verb(p.verb(0)?)?;
    let general = c.verb(p.verb(1)?)?;
    if specific == general {
        return Err(rejected(c, "a verb can't be a way of itself"));
    }
    c.ontology.add_way_of(specific, general);
    Ok(())
}

fn frequency(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = c.verb(p.verb(0)?)?;
    let density = match p.choice(0)? {
        "very rare" => 0.03,
        "rare" => 0.1,
        "common" => 0.9,
        "very common" => 0.97,
        other => return Err(rejected(c, &format!("unknown frequency \"{other}\""))),
    };
    c.ontology.verb_mut(verb).density = density;
    Ok(())
}

fn implies(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let specific = c.verb(p.verb(0)?)?;
    let general = c.verb(p.verb(1)?)?;
    c.ontology.add_generalization(specific, general);
    Ok(())
}

fn mutually_exclusive(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let a = c.verb(p.verb(0)?)?;
    let b = c.verb(p.verb(1)?)?;
    if a == b {
        return Err(rejected(c, "a verb can't exclude itself"));
    }
    c.ontology.add_mutual_exclusion(a, b);
    Ok(())
}

/// Declare the verb's signature from the subject and object phrases. When
/// the sentence has a single noun phrase, the object kind is the subject
/// kind.
fn relate(c: &mut Commit<'_>, p: &Parse) -> Result<VerbId> {
    let verb = c.verb(p.verb(0)?)?;
    let subject = p.noun(0)?;
    let object = if p.noun_count() > 1 {
        p.noun(1)?
    } else {
        subject
    };
    let subject_kind = c.kind(subject)?;
    let object_kind = c.kind(object)?;
    let subject_modifiers = c.modifiers(subject)?;
    let object_modifiers = c.modifiers(object)?;
    c.ontology
        .declare_signature(verb, subject_kind, object_kind)?;
    c.ontology
        .make_literals_relevant(subject_kind, &subject_modifiers);
    c.ontology
        .make_literals_relevant(object_kind, &object_modifiers);

    let entry = c.ontology.verb_mut(verb);
    for modifier in subject_modifiers {
        if !entry.subject_modifiers.contains(&modifier) {
            entry.subject_modifiers.push(modifier);
        }
    }
    for modifier in object_modifiers {
        if !entry.object_modifiers.contains(&modifier) {
            entry.object_modifiers.push(modifier);
        }
    }
    debug!(verb = %c.ontology.verb_name(verb), "relation declared");
    Ok(verb)
}

fn is_must(p: &Parse) -> Result<bool> {
    Ok(p.choice(0)? == "must")
}

fn symmetric(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    c.ontology.verb_mut(verb).symmetric = true;
    Ok(())
}

fn anti_symmetric(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    if c.ontology.verb(verb).symmetric {
        return Err(ContradictionError::Other(format!(
            "{} is already symmetric",
            c.ontology.verb_name(verb)
        ))
        .into());
    }
    c.ontology.verb_mut(verb).anti_symmetric = true;
    Ok(())
}

fn anti_reflexive(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    if c.ontology.verb(verb).reflexive {
        return Err(ContradictionError::Other(format!(
            "{} is already reflexive",
            c.ontology.verb_name(verb)
        ))
        .into());
    }
    c.ontology.verb_mut(verb).anti_reflexive = true;
    Ok(())
}

fn reflexive(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    if c.ontology.verb(verb).anti_reflexive {
        return Err(ContradictionError::Other(format!(
            "{} is already anti-reflexive",
            c.ontology.verb_name(verb)
        ))
        .into());
    }
    c.ontology.verb_mut(verb).reflexive = true;
    Ok(())
}

fn set_bounds(
    c: &mut Commit<'_>,
    verb: VerbId,
    lower: Option<usize>,
    upper: Option<usize>,
) -> Result<()> {
    if let (Some(lower), Some(upper)) = (lower, upper)
        && lower > upper
    {
        return Err(rejected(c, "the lower bound is above the upper bound"));
    }
    let entry = c.ontology.verb_mut(verb);
    if lower.is_some() {
        entry.lower_bound = lower;
    }
    if upper.is_some() {
        entry.upper_bound = upper;
    }
    Ok(())
}

fn exactly_one(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    let lower = is_must(p)?.then_some(1);
    set_bounds(c, verb, lower, Some(1))
}

fn up_to_n(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    let lower = is_must(p)?.then_some(1);
    set_bounds(c, verb, lower, Some(p.count(0)?))
}

fn at_least_n(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    set_bounds(c, verb, Some(p.count(0)?), None)
}

fn between_n(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    set_bounds(c, verb, Some(p.count(0)?), Some(p.count(1)?))
}

fn relation(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let verb = relate(c, p)?;
    if is_must(p)? && !c.ontology.verb(verb).is_total() {
        set_bounds(c, verb, Some(1), None)?;
    }
    Ok(())
}

fn range(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let kind = c.kind(p.noun(0)?)?;
    let (low, high) = (p.count(0)?, p.count(1)?);
    if low > high {
        return Err(rejected(c, "the lower bound is above the upper bound"));
    }
    c.ontology.add_property(
        kind,
        p.text(0)?.to_vec(),
        PropertyType::Range {
            low: low as f64,
            high: high as f64,
        },
    );
    Ok(())
}

fn menu(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let kind = c.kind(p.noun(0)?)?;
    let source = untokenize(p.text(1)?);
    let values = c.load_menu(&source)?;
    if values.is_empty() {
        return Err(rejected(c, &format!("the menu \"{source}\" is empty")));
    }
    c.ontology.add_property(
        kind,
        p.text(0)?.to_vec(),
        PropertyType::Menu {
            source,
            values,
            restrictions: Vec::new(),
        },
    );
    Ok(())
}

fn part(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let owner = c.kind(p.noun(0)?)?;
    let np = p.noun(1)?;
    let kind = c.kind(np)?;
    let modifiers = c.modifiers(np)?;
    let name = p.text(0)?.to_vec();
    if c.ontology.find_part(owner, &name).is_some() {
        return Err(rejected(c, "that part already exists"));
    }
    c.ontology.make_literals_relevant(kind, &modifiers);
    c.ontology.add_part(owner, name, kind, modifiers);
    Ok(())
}

fn text_property(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let kind = c.kind(p.noun(0)?)?;
    c.ontology
        .add_property(kind, p.text(0)?.to_vec(), PropertyType::Text);
    Ok(())
}

/// Split "grey, white or black" into its values.
fn values(text: &[Token]) -> Vec<String> {
    text.split(|t| t.is(",") || t.is("or"))
        .filter(|words| !words.is_empty())
        .map(untokenize)
        .collect()
}

fn property_value(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    let np = p.noun(0)?;
    let name = p.text(0)?;
    let value = p.text(1)?;
    let property_error = |owner: &str| ContradictionError::PropertyValue {
        name: owner.to_string(),
        property: untokenize(name),
        value: untokenize(value),
    };

    match c.concept(np.head)? {
        Concept::Individual(individual) => {
            let owner = untokenize(&c.ontology.individual(individual).name);
            let property = c
                .ontology
                .individual(individual)
                .kinds
                .iter()
                .find_map(|kind| c.ontology.find_property(*kind, name))
                .ok_or_else(|| property_error(&owner))?;
            let value = untokenize(value);
            if let PropertyType::Menu { values, .. } = &c.ontology.property(property).domain
                && !values.iter().any(|v| v.eq_ignore_ascii_case(&value))
            {
                return Err(property_error(&owner).into());
            }
            let permanent = c.ontology.individual_mut(individual);
            permanent.properties.retain(|(p, _)| *p != property);
            permanent.properties.push((property, value));
            Ok(())
        }
        Concept::Kind(kind) => {
            let owner = c.ontology.kind_name(kind);
            let property = c
                .ontology
                .find_property(kind, name)
                .ok_or_else(|| property_error(&owner))?;
            let allowed = values(value);
            let mut conditions = vec![MonadicLiteral::positive(Monadic::Kind(kind))];
            conditions.extend(c.modifiers(np)?);
            match &mut c.ontology.property_mut(property).domain {
                PropertyType::Menu {
                    values,
                    restrictions,
                    ..
                } => {
                    if !allowed
                        .iter()
                        .all(|a| values.iter().any(|v| v.eq_ignore_ascii_case(a)))
                    {
                        return Err(property_error(&owner).into());
                    }
                    restrictions.push(MenuRestriction {
                        conditions,
                        values: allowed,
                    });
                    Ok(())
                }
                _ => Err(property_error(&owner).into()),
            }
        }
        _ => Err(rejected(c, "only kinds and proper nouns have properties")),
    }
}

fn add_test(c: &mut Commit<'_>, p: &Parse, should_exist: bool) -> Result<()> {
    let np = p.noun(0)?;
    let kind = c.kind(np)?;
    let modifiers = c.modifiers(np)?;
    let text = c.input().to_string();
    c.ontology.add_test(TestCase {
        kind,
        modifiers,
        should_exist,
        text,
    });
    Ok(())
}

fn should_exist(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    add_test(c, p, true)
}

fn should_not_exist(c: &mut Commit<'_>, p: &Parse) -> Result<()> {
    add_test(c, p, false)
}

fn rejected(c: &Commit<'_>, reason: &str) -> crate::error::ImaginariumError {
    GrammarError::Rejected {
        input: c.input().to_string(),
        reason: reason.to_string(),
    }
    .into()
}
