use std::fs;

use anyhow::{Result, anyhow, bail};
use imaginarium::ontology::{AdjectiveId, Concept, KindId, PropertyId, VerbId};
use imaginarium::token::words;
use imaginarium::{
    Config, ImaginariumError, Invention, OntologyContext, Output, ResourceError,
};
use pretty_assertions::assert_eq;
use testresult::TestResult;

fn context(statements: &[&str]) -> Result<OntologyContext> {
    let mut context = OntologyContext::new(Config::default().with_seed(17));
    for statement in statements {
        context.execute(statement)?;
    }
    Ok(context)
}

fn imagine(context: &mut OntologyContext, line: &str) -> Result<Invention> {
    match context.execute(line)? {
        Output::Invention(invention) => Ok(*invention),
        other => bail!("expected an invention, got {other:?}"),
    }
}

fn concept(context: &OntologyContext, name: &str) -> Result<Concept> {
    context
        .ontology()
        .lookup(&words(name))
        .map(|entry| entry.value)
        .ok_or_else(|| anyhow!("\"{name}\" is not registered"))
}

fn kind(context: &OntologyContext, name: &str) -> Result<KindId> {
    match concept(context, name)? {
        Concept::Kind(kind) => Ok(kind),
        other => bail!("\"{name}\" is a {}", other.describe()),
    }
}

fn adjective(context: &OntologyContext, name: &str) -> Result<AdjectiveId> {
    match concept(context, name)? {
        Concept::Adjective(adjective) => Ok(adjective),
        other => bail!("\"{name}\" is a {}", other.describe()),
    }
}

fn verb(context: &OntologyContext, name: &str) -> Result<VerbId> {
    match concept(context, name)? {
        Concept::Verb(verb) => Ok(verb),
        other => bail!("\"{name}\" is a {}", other.describe()),
    }
}

fn property(context: &OntologyContext, owner: &str, name: &str) -> Result<PropertyId> {
    context
        .ontology()
        .find_property(kind(context, owner)?, &words(name))
        .ok_or_else(|| anyhow!("{owner} has no {name}"))
}

#[test]
fn imagined_things_belong_to_every_superkind() -> TestResult {
    let mut context = context(&[
        "a persian is a kind of cat",
        "a cat is a kind of animal",
        "a cat is a kind of pet",
    ])?;
    let (persian, cat, animal, pet) = (
        kind(&context, "persian")?,
        kind(&context, "cat")?,
        kind(&context, "animal")?,
        kind(&context, "pet")?,
    );
    let invention = imagine(&mut context, "imagine a persian")?;
    for kind in [persian, cat, animal, pet] {
        assert!(invention.is_a(0, kind));
    }
    assert_eq!(invention.to_string(), "persian");
    Ok(())
}

#[test]
fn parent_kinds_resolve_to_one_subkind() -> TestResult {
    let mut context = context(&["cats, dogs and ferrets are kinds of animals"])?;
    let subkinds = [
        kind(&context, "cat")?,
        kind(&context, "dog")?,
        kind(&context, "ferret")?,
    ];
    let invention = imagine(&mut context, "imagine five animals")?;
    assert_eq!(invention.requested().len(), 5);
    for &individual in invention.requested() {
        let count = subkinds
            .iter()
            .filter(|kind| invention.is_a(individual, **kind))
            .count();
        assert_eq!(count, 1);
    }
    Ok(())
}

#[test]
fn alternatives_are_exclusive() -> TestResult {
    let mut context = context(&["cats are black, white or ginger"])?;
    let colors = [
        adjective(&context, "black")?,
        adjective(&context, "white")?,
        adjective(&context, "ginger")?,
    ];
    for _ in 0..10 {
        let invention = imagine(&mut context, "imagine a cat")?;
        let count = colors.iter().filter(|c| invention.is(0, **c)).count();
        assert_eq!(count, 1);
    }
    Ok(())
}

#[test]
fn modifiers_condition_implications() -> TestResult {
    let mut context = context(&["cats can be fuzzy", "fuzzy cats are cute"])?;
    let (fuzzy, cute) = (adjective(&context, "fuzzy")?, adjective(&context, "cute")?);
    let invention = imagine(&mut context, "imagine a fuzzy cat")?;
    assert!(invention.is(0, fuzzy));
    assert!(invention.is(0, cute));
    assert_eq!(invention.to_string(), "fuzzy cute cat");

    for _ in 0..10 {
        let invention = imagine(&mut context, "imagine a cat")?;
        assert!(!invention.is(0, fuzzy) || invention.is(0, cute));
    }
    Ok(())
}

#[test]
fn bounded_relations_respect_their_cardinality() -> TestResult {
    let mut context = context(&[
        "cats must love exactly one dog",
        "Rex is a dog",
        "Fido is a dog",
    ])?;
    let love = verb(&context, "love")?;
    let invention = imagine(&mut context, "imagine three cats")?;
    for &cat in invention.requested() {
        let loved = (0..invention.individuals().len())
            .filter(|other| invention.related(love, cat, *other))
            .count();
        assert_eq!(loved, 1);
    }
    Ok(())
}

#[test]
fn anti_reflexive_relations_never_loop() -> TestResult {
    let mut context = context(&["cats can chase cats", "cats cannot chase themselves"])?;
    let chase = verb(&context, "chase")?;
    for _ in 0..5 {
        let invention = imagine(&mut context, "imagine four cats")?;
        for &cat in invention.requested() {
            assert!(!invention.related(chase, cat, cat));
        }
    }
    Ok(())
}

#[test]
fn symmetric_relations_hold_both_ways() -> TestResult {
    let mut context = context(&["cats can befriend each other"])?;
    let befriend = verb(&context, "befriend")?;
    let invention = imagine(&mut context, "imagine four cats")?;
    for &a in invention.requested() {
        for &b in invention.requested() {
            assert_eq!(
                invention.related(befriend, a, b),
                invention.related(befriend, b, a)
            );
        }
    }
    Ok(())
}

#[test]
fn generalized_relations_follow_their_specializations() -> TestResult {
    let mut context = context(&[
        "cats can love cats",
        "cats can like cats",
        "loving implies liking",
    ])?;
    let (love, like) = (verb(&context, "love")?, verb(&context, "like")?);
    for _ in 0..5 {
        let invention = imagine(&mut context, "imagine three cats")?;
        for relation in invention.relationships() {
            if relation.verb == love {
                assert!(invention.related(like, relation.subject, relation.object));
            }
        }
    }
    Ok(())
}

#[test]
fn range_properties_stay_in_range() -> TestResult {
    let mut context = context(&["cats have an age between 1 and 20"])?;
    let age = property(&context, "cat", "age")?;
    for _ in 0..10 {
        let invention = imagine(&mut context, "imagine a cat")?;
        let value: i64 = invention.value(0, age).ok_or("no age")?.parse()?;
        assert!((1..=20).contains(&value));
        assert_eq!(invention.to_string(), format!("cat, age: {value}"));
    }
    Ok(())
}

#[test]
fn menus_load_from_the_definitions_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("colors.txt"), "grey\nwhite\n\nginger\n")?;
    let mut context = OntologyContext::new(
        Config::default()
            .with_seed(5)
            .with_definitions_dir(dir.path()),
    );
    context.execute("cats have a color from colors")?;
    context.execute("cats can be fuzzy")?;
    context.execute("fuzzy cats' color is grey")?;
    let color = property(&context, "cat", "color")?;

    for _ in 0..10 {
        let invention = imagine(&mut context, "imagine a fuzzy cat")?;
        assert_eq!(invention.value(0, color).as_deref(), Some("grey"));
    }
    Ok(())
}

#[test]
fn missing_menus_reject_the_statement() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut context = OntologyContext::new(Config::default().with_definitions_dir(dir.path()));
    let error = context.execute("cats have a color from colors");
    assert!(matches!(
        error,
        Err(ImaginariumError::Resource(ResourceError::FileNotFound(_)))
    ));
    assert!(context.ontology().lookup(&words("cats")).is_none());
    assert!(context.transcript().is_empty());
    Ok(())
}

#[test]
fn definition_files_load_once_and_are_not_logged() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("dog.gen"),
        "# dogs\ndogs can be loud\ndogs are kinds of animals\n",
    )?;
    let mut context = OntologyContext::new(
        Config::default()
            .with_seed(2)
            .with_definitions_dir(dir.path()),
    );
    context.execute("Rex is a dog")?;
    assert_eq!(context.transcript(), &["Rex is a dog".to_string()]);
    let (dog, animal) = (kind(&context, "dog")?, kind(&context, "animal")?);
    assert!(context.ontology().is_a(dog, animal));
    adjective(&context, "loud")?;

    context.undo()?;
    assert!(context.ontology().lookup(&words("loud")).is_none());
    Ok(())
}

#[test]
fn save_writes_the_transcript() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut context = OntologyContext::new(Config::default().with_definitions_dir(dir.path()));
    context.execute("a cat is a kind of animal")?;
    context.execute("cats can be fuzzy")?;
    context.execute("save world")?;
    let saved = fs::read_to_string(dir.path().join("world.gen"))?;
    assert_eq!(saved, "a cat is a kind of animal\ncats can be fuzzy\n");

    let mut replay = OntologyContext::new(Config::default().with_definitions_dir(dir.path()));
    replay.run_file(dir.path().join("world.gen"))?;
    assert_eq!(replay.decompile(), context.decompile());
    Ok(())
}

#[test]
fn decompiled_statements_rebuild_the_ontology() -> TestResult {
    let context = context(&[
        "cats are kinds of animals",
        "cats can be fuzzy",
        "cats are black or white",
        "fuzzy cats are cute",
        "cats have an age between 1 and 20",
        "cats must love exactly one dog",
        "loving is rare",
        "Rex is a dog",
    ])?;
    let statements = context.decompile();
    assert!(statements.contains(&"cats must love exactly one dog".to_string()));
    assert!(statements.contains(&"loving is rare".to_string()));

    let mut rebuilt = OntologyContext::new(Config::default());
    for statement in &statements {
        rebuilt.execute(statement)?;
    }
    assert_eq!(rebuilt.decompile(), statements);
    Ok(())
}

#[test]
fn tests_report_passes_and_failures() -> TestResult {
    let mut context = context(&[
        "cats are black or white",
        "cats should exist",
        "black cats should exist",
        "black white cats should not exist",
        "white black cats should exist",
    ])?;
    let report = context.test();
    assert_eq!(report.passed(), 3);
    assert_eq!(report.failed(), 1);
    assert!(!report.outcomes[3].passed);
    Ok(())
}

#[test]
fn stats_repeat_the_last_request() -> TestResult {
    let mut context = OntologyContext::new(
        Config::default().with_seed(8).with_stats_trials(20),
    );
    context.execute("cats are black or white")?;
    context.execute("imagine a cat")?;
    let report = context.stats()?;
    assert_eq!(report.trials, 20);
    assert_eq!(report.failures, 0);
    let black = report.frequency("black").ok_or("no black row")?;
    let white = report.frequency("white").ok_or("no white row")?;
    assert!((black + white - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn unsatisfiable_requests_find_no_example() -> TestResult {
    let mut context = context(&["cats are fuzzy", "cats can be fuzzy or bald"])?;
    context.execute("cats are bald")?;
    let error = context.execute("imagine a cat");
    assert!(matches!(error, Err(ImaginariumError::NoExample(_))));
    Ok(())
}

#[test]
fn irregular_and_unchanging_plurals() -> TestResult {
    let mut context = context(&["the plural of octopus is octopodes", "sheep are kinds of animals"])?;
    let octopus = kind(&context, "octopodes")?;
    assert_eq!(kind(&context, "octopus")?, octopus);
    let sheep = kind(&context, "sheep")?;
    let invention = imagine(&mut context, "imagine a sheep")?;
    assert!(invention.is_a(0, sheep));
    Ok(())
}

#[test]
fn every_solve_satisfies_the_compiled_problem() -> TestResult {
    let mut context = context(&[
        "cats and dogs are kinds of animals",
        "animals are black, white or ginger",
        "cats can be fuzzy",
        "fuzzy cats are cute",
        "cats must love exactly one dog",
        "dogs can chase cats",
        "dogs cannot chase themselves",
    ])?;
    for _ in 0..10 {
        let invention = imagine(&mut context, "imagine four animals")?;
        let problem = invention.generator().problem();
        assert_eq!(problem.violated(invention.solution()), None);
    }
    Ok(())
}

#[test]
fn unconditional_implications_hold_on_every_solve() -> TestResult {
    let mut context = context(&["a cat is a kind of animal", "cats are fuzzy"])?;
    let fuzzy = adjective(&context, "fuzzy")?;
    for _ in 0..10 {
        let invention = imagine(&mut context, "imagine a cat")?;
        assert!(invention.is(0, fuzzy));
    }
    Ok(())
}

#[test]
fn subkinds_reached_from_a_parent_keep_their_other_parents() -> TestResult {
    let mut context = context(&[
        "cats are kinds of animals",
        "cats are kinds of pets",
        "pets are tame",
    ])?;
    let (cat, pet) = (kind(&context, "cat")?, kind(&context, "pet")?);
    let tame = adjective(&context, "tame")?;
    for _ in 0..10 {
        let invention = imagine(&mut context, "imagine an animal")?;
        assert!(invention.is_a(0, cat));
        assert!(invention.is_a(0, pet));
        assert!(invention.is(0, tame));
    }
    Ok(())
}

#[test]
fn kind_modifiers_collapse_into_the_most_specific_kind() -> TestResult {
    let mut context = context(&["a persian is a kind of cat"])?;
    let (persian, cat) = (kind(&context, "persian")?, kind(&context, "cat")?);
    let invention = imagine(&mut context, "imagine a persian cat")?;
    assert_eq!(invention.individuals()[0].kinds, vec![persian]);
    assert!(invention.is_a(0, cat));
    Ok(())
}

#[test]
fn failed_undo_keeps_every_statement() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("colors.txt"), "grey\nwhite\n")?;
    let mut context = OntologyContext::new(
        Config::default()
            .with_seed(3)
            .with_definitions_dir(dir.path()),
    );
    for statement in [
        "a cat is a kind of animal",
        "cats have a color from colors",
        "cats can be fuzzy",
    ] {
        context.execute(statement)?;
    }
    let transcript = context.transcript().to_vec();
    fs::remove_file(dir.path().join("colors.txt"))?;

    assert!(context.execute("undo").is_err());
    assert_eq!(context.transcript(), transcript.as_slice());
    adjective(&context, "fuzzy")?;
    property(&context, "cat", "color")?;
    Ok(())
}

#[test]
fn permanent_individuals_keep_their_menu_values() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("colors.txt"), "grey\nwhite\nginger\n")?;
    let mut context = OntologyContext::new(
        Config::default()
            .with_seed(9)
            .with_definitions_dir(dir.path()),
    );
    context.execute("Tom is a cat")?;
    context.execute("cats have a color from colors")?;
    context.execute("Tom's color is ginger")?;
    let color = property(&context, "cat", "color")?;

    for _ in 0..5 {
        let invention = imagine(&mut context, "imagine a cat")?;
        assert_eq!(invention.value(0, color).as_deref(), Some("ginger"));
        let (_, variable) = invention.individuals()[0]
            .properties
            .iter()
            .find(|(property, _)| *property == color)
            .ok_or("no color variable")?;
        let solved = invention.solution().value(*variable).map(ToString::to_string);
        assert_eq!(solved.as_deref(), Some("ginger"));
        let problem = invention.generator().problem();
        assert_eq!(problem.violated(invention.solution()), None);
    }
    Ok(())
}
