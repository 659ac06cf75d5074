//! # Pattern Engine
//!
//! Statements are recognized by a fixed, ordered library of sentence
//! templates. A template is a list of [`Element`]s: literal words, segments
//! that consume a variable-length span and extract a constituent, and
//! feature checks over what has been extracted so far.
//!
//! ## Matching
//!
//! Templates are tried in library order against the same input; the first
//! one that consumes every token wins. Within a template, a segment that is
//! followed by a literal tries every occurrence of that literal as its end,
//! nearest first; one followed by nothing runs to the end of the input.
//! Self-delimiting segments propose their own ends. Every choice point
//! saves the scanner [`State`](scanner::State) and restores it when the rest
//! of the template fails, which also throws away any concepts coined along
//! the failed path.
//!
//! ## Committing
//!
//! A match produces a [`Parse`]. Nothing has touched the ontology yet: the
//! caller decides whether to run a declaration's action through a
//! [`Commit`] or to execute a command.

pub mod commit;
pub mod library;
pub mod phrase;
pub mod scanner;
pub mod segment;

use std::collections::HashSet;

use tracing::debug;

use crate::error::{GrammarError, ImaginariumError, Result};
use crate::ontology::{Concept, Ontology};
use crate::token::{Token, TokenKind, tokenize, untokenize, words};

pub use commit::Commit;
pub use phrase::{
    AdjectiveList, Binding, Coinage, Conjunction, Modifier, NounList, NounPhrase, Number, Ref,
};
pub use scanner::Scanner;
pub use segment::Segment;

/// Literal words too common to suggest a template by.
const STOP_WORDS: &[&str] = &["a", "an", "of", "is", "are", "the", "'", "\"", "s", ","];

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Literal(String),
    Segment(Segment),
    Check(Feature),
}

/// A predicate over the constituents bound so far. Indices count bindings
/// of the relevant type only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// The nth noun phrase is singular.
    Singular(usize),
    /// The nth noun phrase is plural.
    Plural(usize),
    /// The nth noun phrase names a kind.
    Common(usize),
    /// The nth noun phrase has no modifiers.
    Unmodified(usize),
    /// The nth adjective list is not joined by "or".
    NotAlternatives(usize),
}

impl Feature {
    fn holds(self, bindings: &[Binding], coinages: &[Coinage]) -> bool {
        let noun = |n: usize| {
            bindings
                .iter()
                .filter_map(|b| match b {
                    Binding::Noun(np) => Some(np),
                    _ => None,
                })
                .nth(n)
        };
        match self {
            Feature::Singular(n) => noun(n).is_some_and(|np| np.agrees(Number::Singular)),
            Feature::Plural(n) => noun(n).is_some_and(|np| np.agrees(Number::Plural)),
            Feature::Common(n) => noun(n).is_some_and(|np| match np.head {
                Ref::Known(concept) => matches!(concept, Concept::Kind(_)),
                Ref::Coined(index) => coinages.get(index).is_some_and(Coinage::is_kind),
            }),
            Feature::Unmodified(n) => noun(n).is_some_and(|np| np.modifiers.is_empty()),
            Feature::NotAlternatives(n) => bindings
                .iter()
                .filter_map(|b| match b {
                    Binding::Adjectives(list) => Some(list),
                    _ => None,
                })
                .nth(n)
                .is_some_and(|list| list.conjunction != Some(Conjunction::Or)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Imagine,
    Undo,
    StartOver,
    Save,
    Test,
    Decompile,
    Stats,
    Help,
}

/// What a declaration does to the ontology once matched.
pub type Declare = fn(&mut Commit<'_>, &Parse) -> Result<()>;

#[derive(Clone, Copy)]
pub enum Action {
    Declare(Declare),
    Command(Command),
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Declare(_) => write!(f, "Declare"),
            Action::Command(command) => write!(f, "Command({command:?})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sentence {
    source: &'static str,
    elements: Vec<Element>,
    action: Action,
}

impl Sentence {
    /// Compile a template from its source. Upper-case words are
    /// placeholders for segments; everything else is literal.
    pub fn new(source: &'static str, action: Action) -> Self {
        let tokens = tokenize(source).unwrap_or_else(|_| words(source));
        let elements = tokens.iter().map(element).collect();
        Sentence {
            source,
            elements,
            action,
        }
    }

    pub fn declare(source: &'static str, action: Declare) -> Self {
        Sentence::new(source, Action::Declare(action))
    }

    pub fn command(source: &'static str, command: Command) -> Self {
        Sentence::new(source, Action::Command(command))
    }

    pub fn check(mut self, feature: Feature) -> Self {
        self.elements.push(Element::Check(feature));
        self
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn action(&self) -> Action {
        self.action
    }

    fn keywords(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Literal(word) if !STOP_WORDS.contains(&word.as_str()) => Some(word.as_str()),
            _ => None,
        })
    }
}

fn element(token: &Token) -> Element {
    let placeholder = token.kind == TokenKind::Word
        && token.text.chars().all(|c| c.is_ascii_uppercase());
    if !placeholder {
        return Element::Literal(token.key());
    }
    Element::Segment(match token.text.as_str() {
        "NP" => Segment::Noun(Number::Singular),
        "NPS" => Segment::Noun(Number::Plural),
        "PN" => Segment::Proper,
        "NPLIST" => Segment::Nouns,
        "AP" => Segment::Adjective,
        "APLIST" => Segment::Adjectives,
        "VP" => Segment::Verb { coin: true },
        "VERB" => Segment::Verb { coin: false },
        "N" => Segment::Count,
        "MODAL" => Segment::Closed(library::MODALS),
        "FREQUENCY" => Segment::Closed(library::FREQUENCIES),
        _ => Segment::Text,
    })
}

fn literal_matches(token: &Token, word: &str) -> bool {
    token.kind != TokenKind::Marker && (token.is(word) || (word == "a" && token.is("an")))
}

/// The constituents of a matched statement.
#[derive(Debug, Clone)]
pub struct Parse {
    /// Index of the winning template in the grammar.
    pub sentence: usize,
    pub bindings: Vec<Binding>,
    pub coinages: Vec<Coinage>,
}

impl Parse {
    fn nth<'a, T: 'a>(
        &'a self,
        n: usize,
        what: &str,
        select: impl Fn(&'a Binding) -> Option<T>,
    ) -> Result<T> {
        self.bindings
            .iter()
            .filter_map(select)
            .nth(n)
            .ok_or_else(|| ImaginariumError::Command(format!("sentence has no {what} #{n}")))
    }

    pub fn noun(&self, n: usize) -> Result<&NounPhrase> {
        self.nth(n, "noun phrase", |b| match b {
            Binding::Noun(np) => Some(np),
            _ => None,
        })
    }

    pub fn nouns(&self, n: usize) -> Result<&NounList> {
        self.nth(n, "noun list", |b| match b {
            Binding::Nouns(list) => Some(list),
            _ => None,
        })
    }

    pub fn adjective(&self, n: usize) -> Result<&Modifier> {
        self.nth(n, "adjective", |b| match b {
            Binding::Adjective(adjective) => Some(adjective),
            _ => None,
        })
    }

    pub fn adjectives(&self, n: usize) -> Result<&AdjectiveList> {
        self.nth(n, "adjective list", |b| match b {
            Binding::Adjectives(list) => Some(list),
            _ => None,
        })
    }

    pub fn verb(&self, n: usize) -> Result<Ref> {
        self.nth(n, "verb", |b| match b {
            Binding::Verb(verb) => Some(*verb),
            _ => None,
        })
    }

    pub fn count(&self, n: usize) -> Result<usize> {
        self.nth(n, "count", |b| match b {
            Binding::Count(count) => Some(*count),
            _ => None,
        })
    }

    pub fn text(&self, n: usize) -> Result<&[Token]> {
        self.nth(n, "text", |b| match b {
            Binding::Text(text) => Some(text.as_slice()),
            _ => None,
        })
    }

    pub fn choice(&self, n: usize) -> Result<&'static str> {
        self.nth(n, "choice", |b| match b {
            Binding::Choice(choice) => Some(*choice),
            _ => None,
        })
    }

    pub fn noun_count(&self) -> usize {
        self.bindings
            .iter()
            .filter(|b| matches!(b, Binding::Noun(_)))
            .count()
    }
}

/// The sentence library.
#[derive(Debug, Clone)]
pub struct Grammar {
    sentences: Vec<Sentence>,
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar {
            sentences: library::sentences(),
        }
    }
}

impl Grammar {
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    /// Find the first template that accepts the whole input.
    pub fn parse(&self, ontology: &Ontology, tokens: &[Token]) -> std::result::Result<Parse, GrammarError> {
        for (index, sentence) in self.sentences.iter().enumerate() {
            let mut scanner = Scanner::new(tokens);
            let mut bindings = Vec::new();
            if match_elements(&sentence.elements, &mut scanner, ontology, &mut bindings) {
                debug!(template = sentence.source, "matched");
                return Ok(Parse {
                    sentence: index,
                    bindings,
                    coinages: scanner.into_coinages(),
                });
            }
        }
        Err(GrammarError::NoMatch {
            input: untokenize(tokens),
            suggestions: self.suggestions(tokens),
        })
    }

    /// Sources of every template sharing a keyword with the input.
    pub fn suggestions(&self, tokens: &[Token]) -> Vec<String> {
        let words: HashSet<String> = tokens.iter().map(Token::key).collect();
        let mut seen = HashSet::new();
        self.sentences
            .iter()
            .filter(|s| s.keywords().any(|k| words.contains(k)))
            .map(|s| s.source.to_string())
            .filter(|source| seen.insert(source.clone()))
            .collect()
    }
}

fn match_elements(
    elements: &[Element],
    scanner: &mut Scanner,
    ontology: &Ontology,
    bindings: &mut Vec<Binding>,
) -> bool {
    let Some((element, rest)) = elements.split_first() else {
        return scanner.at_end();
    };
    match element {
        Element::Literal(word) => {
            let Some(token) = scanner.peek() else {
                return false;
            };
            if !literal_matches(token, word) {
                return false;
            }
            let state = scanner.save();
            scanner.advance_to(scanner.position() + 1);
            if match_elements(rest, scanner, ontology, bindings) {
                return true;
            }
            scanner.restore(state);
            false
        }
        Element::Check(feature) => {
            feature.holds(bindings, scanner.coinages())
                && match_elements(rest, scanner, ontology, bindings)
        }
        Element::Segment(segment) => {
            let state = scanner.save();
            for end in candidate_ends(*segment, rest, scanner, ontology) {
                scanner.restore(state);
                if let Some(binding) = segment.parse(scanner, ontology, end) {
                    bindings.push(binding);
                    if match_elements(rest, scanner, ontology, bindings) {
                        return true;
                    }
                    bindings.pop();
                }
            }
            scanner.restore(state);
            false
        }
    }
}

/// Where a segment starting at the cursor may end, given what follows it.
fn candidate_ends(
    segment: Segment,
    rest: &[Element],
    scanner: &Scanner,
    ontology: &Ontology,
) -> Vec<usize> {
    let tokens = scanner.tokens();
    let start = scanner.position();
    if segment.is_self_delimiting() {
        return segment.ends(tokens, start, ontology);
    }
    let after = start + 1..tokens.len();
    match rest.iter().find(|e| !matches!(e, Element::Check(_))) {
        None => vec![tokens.len()],
        Some(Element::Literal(word)) => after
            .filter(|p| literal_matches(&tokens[*p], word))
            .collect(),
        Some(Element::Segment(next)) if next.is_self_delimiting() => after
            .filter(|p| !next.ends(tokens, *p, ontology).is_empty())
            .collect(),
        Some(_) => (start + 1..=tokens.len()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn parse(ontology: &Ontology, text: &str) -> std::result::Result<Parse, GrammarError> {
        let tokens = tokenize(text)?;
        Grammar::default().parse(ontology, &tokens)
    }

    fn source(parse: &Parse) -> &'static str {
        Grammar::default().sentences()[parse.sentence].source()
    }

    #[test]
    fn placeholders_compile_to_segments() {
        let sentence = Sentence::command("imagine NP", Command::Imagine);
        assert_eq!(
            sentence.elements(),
            &[
                Element::Literal("imagine".into()),
                Element::Segment(Segment::Noun(Number::Singular))
            ]
        );
    }

    #[test]
    fn kind_of_coins_both_nouns() -> TestResult {
        let ontology = Ontology::new();
        let parse = parse(&ontology, "a cat is a kind of animal")?;
        assert_eq!(source(&parse), "NP is a kind of NP");
        assert_eq!(parse.coinages.len(), 2);
        Ok(())
    }

    #[test]
    fn literal_bounded_segments_backtrack() -> TestResult {
        let mut ontology = Ontology::new();
        ontology.add_kind(Some(tokenize("cat")?), None)?;
        let parse = parse(&ontology, "cats have a favorite food from foods")?;
        assert_eq!(source(&parse), "NPS have a PROPERTY from MENU");
        assert_eq!(untokenize(parse.text(0)?), "favorite food");
        assert_eq!(untokenize(parse.text(1)?), "foods");
        Ok(())
    }

    #[test]
    fn failed_templates_leave_no_coinages() -> TestResult {
        let ontology = Ontology::new();
        let parse = parse(&ontology, "cats can be fuzzy")?;
        assert_eq!(source(&parse), "NPS can be APLIST");
        assert_eq!(
            parse.coinages,
            vec![
                Coinage::Kind {
                    singular: tokenize("cat")?,
                    plural: tokenize("cats")?
                },
                Coinage::Adjective {
                    name: tokenize("fuzzy")?
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn verb_phrases_delimit_themselves() -> TestResult {
        let ontology = Ontology::new();
        let parse = parse(&ontology, "cats can play with toys")?;
        assert_eq!(source(&parse), "NPS MODAL VP NPS");
        assert!(matches!(parse.coinages[1], Coinage::Verb { ref base } if base.len() == 2));
        Ok(())
    }

    #[test]
    fn unmatched_input_suggests_templates_by_keyword() -> TestResult {
        let ontology = Ontology::new();
        let error = parse(&ontology, "imagine").err();
        let Some(GrammarError::NoMatch { suggestions, .. }) = error else {
            panic!("expected no match");
        };
        assert_eq!(suggestions, vec!["imagine NP".to_string()]);
        Ok(())
    }

    #[test]
    fn agreement_checks_reject_templates() -> TestResult {
        let mut ontology = Ontology::new();
        ontology.add_kind(Some(tokenize("cat")?), None)?;
        ontology.add_kind(Some(tokenize("animal")?), None)?;
        assert!(parse(&ontology, "cats is a kind of animal").is_err());
        Ok(())
    }
}
