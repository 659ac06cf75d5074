//! Segments — sub-scanners that consume a variable-length span.
//!
//! Most segments are told where they end (by the next literal in their
//! template, or the end of input) and must account for exactly that span.
//! Self-delimiting segments (verbs, counts, closed classes) instead propose
//! their own candidate ends from where they start.

use crate::inflection::{plural_name, singular_name};
use crate::ontology::{Concept, Ontology};
use crate::pattern::phrase::{
    AdjectiveList, Binding, Coinage, Conjunction, Modifier, NounList, NounPhrase, Number, Ref,
};
use crate::pattern::scanner::Scanner;
use crate::token::{Token, TokenKind};
use crate::trie::Form;

/// Words that never become part of a newly coined name.
const RESERVED: &[&str] = &[
    "a", "an", "the", "and", "or", "not", "is", "are", "be", "can", "cannot", "must", "has",
    "have", "should", "called", "its", "their", "each", "themselves", "kind", "kinds",
];

/// Words allowed after the first word of a new verb: "play with".
const PREPOSITIONS: &[&str] = &[
    "with", "to", "at", "on", "in", "of", "for", "about", "from", "by", "into", "over", "under",
    "after", "near",
];

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// A noun phrase; bare new nouns are read in the given number.
    Noun(Number),
    /// A proper noun, known or new.
    Proper,
    /// Noun phrases joined by commas and "and"/"or".
    Nouns,
    /// An adjective, optionally preceded by "not".
    Adjective,
    /// Adjectives joined by commas and "and"/"or".
    Adjectives,
    /// A verb phrase. New verbs are only accepted when `coin` is set.
    Verb { coin: bool },
    /// Digits or a number word.
    Count,
    /// Any non-empty run of tokens.
    Text,
    /// One of a fixed list of phrases.
    Closed(&'static [&'static str]),
}

impl Segment {
    pub fn is_self_delimiting(self) -> bool {
        matches!(
            self,
            Segment::Verb { .. } | Segment::Count | Segment::Closed(_)
        )
    }

    /// Candidate end positions for a self-delimiting segment starting at
    /// `start`, most preferred first.
    pub fn ends(self, tokens: &[Token], start: usize, ontology: &Ontology) -> Vec<usize> {
        let Some(first) = tokens.get(start) else {
            return Vec::new();
        };
        match self {
            Segment::Count => count_of(first).map(|_| vec![start + 1]).unwrap_or_default(),
            Segment::Closed(candidates) => candidates
                .iter()
                .filter_map(|candidate| matches_phrase(tokens, start, candidate))
                .collect(),
            Segment::Verb { coin } => {
                let mut cursor = start;
                if let Some(entry) = ontology.registry().lookup(tokens, &mut cursor, tokens.len())
                {
                    return match entry.value {
                        Concept::Verb(_) => vec![cursor],
                        _ => Vec::new(),
                    };
                }
                if !coin || !coinable(ontology, &tokens[start..start + 1]) {
                    return Vec::new();
                }
                let prepositions = tokens[start + 1..]
                    .iter()
                    .take_while(|t| PREPOSITIONS.iter().any(|p| t.is(p)))
                    .count();
                (0..=prepositions).rev().map(|n| start + 1 + n).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Read exactly the tokens from the cursor up to `end`. On success the
    /// cursor is left at `end`; on failure the caller restores its state.
    pub fn parse(self, scanner: &mut Scanner, ontology: &Ontology, end: usize) -> Option<Binding> {
        let start = scanner.position();
        if end <= start {
            return None;
        }
        let tokens = scanner.tokens();
        let binding = match self {
            Segment::Noun(number) => Binding::Noun(noun_phrase(scanner, ontology, end, number)?),
            Segment::Proper => Binding::Noun(proper_noun(scanner, ontology, end)?),
            Segment::Nouns => {
                let (spans, conjunction) = split_list(tokens, start, end)?;
                let mut items = Vec::new();
                for (from, to) in spans {
                    scanner.advance_to(from);
                    items.push(noun_phrase(scanner, ontology, to, Number::Plural)?);
                }
                Binding::Nouns(NounList { items, conjunction })
            }
            Segment::Adjective => Binding::Adjective(adjective(scanner, ontology, end)?),
            Segment::Adjectives => {
                let (spans, conjunction) = split_list(tokens, start, end)?;
                let mut items = Vec::new();
                for (from, to) in spans {
                    scanner.advance_to(from);
                    items.push(adjective(scanner, ontology, to)?);
                }
                Binding::Adjectives(AdjectiveList { items, conjunction })
            }
            Segment::Verb { coin } => Binding::Verb(verb(scanner, ontology, end, coin)?),
            Segment::Count => {
                if end != start + 1 {
                    return None;
                }
                Binding::Count(count_of(&tokens[start])?)
            }
            Segment::Text => Binding::Text(tokens[start..end].to_vec()),
            Segment::Closed(candidates) => {
                let choice = candidates
                    .iter()
                    .find(|c| matches_phrase(tokens, start, c) == Some(end))?;
                Binding::Choice(*choice)
            }
        };
        scanner.advance_to(end);
        Some(binding)
    }
}

/// The value of a count token.
pub fn count_of(token: &Token) -> Option<usize> {
    match token.kind {
        TokenKind::Number => token.text.parse().ok(),
        TokenKind::Word => NUMBER_WORDS.iter().position(|w| token.is(w)),
        _ => None,
    }
}

fn matches_phrase(tokens: &[Token], start: usize, phrase: &str) -> Option<usize> {
    let mut position = start;
    for word in phrase.split_whitespace() {
        if !tokens.get(position)?.is(word) {
            return None;
        }
        position += 1;
    }
    Some(position)
}

/// A name nothing else claims and that contains only plain words.
fn coinable(ontology: &Ontology, name: &[Token]) -> bool {
    !name.is_empty()
        && name
            .iter()
            .all(|t| t.kind == TokenKind::Word && !RESERVED.iter().any(|r| t.is(r)))
        && ontology.lookup(name).is_none()
}

/// Split a list span at commas and conjunctions.
fn split_list(
    tokens: &[Token],
    start: usize,
    end: usize,
) -> Option<(Vec<(usize, usize)>, Option<Conjunction>)> {
    let mut spans = Vec::new();
    let mut conjunction = None;
    let mut from = start;
    for position in start..end {
        let token = &tokens[position];
        let separator = if token.is("and") {
            Some(Conjunction::And)
        } else if token.is("or") {
            Some(Conjunction::Or)
        } else if token.is(",") {
            None
        } else {
            continue;
        };
        if let Some(separator) = separator {
            if conjunction.is_some_and(|c| c != separator) {
                return None;
            }
            conjunction = Some(separator);
        }
        if position > from {
            spans.push((from, position));
        } else if position == start || !tokens[position - 1].is(",") {
            return None;
        }
        from = position + 1;
    }
    if from >= end {
        return None;
    }
    spans.push((from, end));
    if spans.len() > 1 && conjunction.is_none() {
        conjunction = Some(Conjunction::And);
    }
    Some((spans, conjunction))
}

fn noun_phrase(
    scanner: &mut Scanner,
    ontology: &Ontology,
    end: usize,
    default: Number,
) -> Option<NounPhrase> {
    let tokens = scanner.tokens();
    let start = scanner.position();
    let mut cursor = start;
    let mut number = None;
    let mut count = None;

    let first = tokens.get(cursor)?;
    if first.is("a") || first.is("an") {
        number = Some(Number::Singular);
        count = Some(1);
        cursor += 1;
    } else if let Some(n) = count_of(first) {
        number = Some(if n == 1 {
            Number::Singular
        } else {
            Number::Plural
        });
        count = Some(n);
        cursor += 1;
    }

    let mut concepts: Vec<(Concept, Form)> = Vec::new();
    while cursor < end {
        if tokens[cursor].is(",") && !concepts.is_empty() {
            cursor += 1;
            continue;
        }
        let mut next = cursor;
        match ontology.registry().lookup(tokens, &mut next, end) {
            Some(entry) if !matches!(entry.value, Concept::Verb(_)) => {
                concepts.push((entry.value, entry.form));
                cursor = next;
            }
            _ => break,
        }
    }

    let ends_with_noun = matches!(
        concepts.last(),
        Some((Concept::Kind(_) | Concept::Individual(_), _))
    );
    let (head, form) = if cursor == end && ends_with_noun {
        let (concept, form) = concepts.pop()?;
        (Ref::Known(concept), form)
    } else {
        if cursor >= end {
            return None;
        }
        let reading = number.unwrap_or(default);
        let index = coin_kind(scanner, ontology, &tokens[cursor..end], reading, cursor == 0)?;
        let form = match &scanner.coinages()[index] {
            Coinage::Kind { singular, plural } if singular == plural => Form::Either,
            _ if reading == Number::Plural => Form::Plural,
            _ => Form::Singular,
        };
        (Ref::Coined(index), form)
    };

    let mut modifiers = Vec::new();
    for (concept, _) in concepts {
        match concept {
            Concept::Kind(_) | Concept::Adjective(_) => modifiers.push(Modifier {
                concept: Ref::Known(concept),
                positive: true,
            }),
            _ => return None,
        }
    }

    let number = match (form, number) {
        (Form::Singular, Some(Number::Plural)) | (Form::Plural, Some(Number::Singular)) => {
            return None;
        }
        (Form::Singular, _) => Some(Number::Singular),
        (Form::Plural, _) => Some(Number::Plural),
        (_, number) => number,
    };
    if matches!(head, Ref::Known(Concept::Individual(_))) && (count.is_some() || !modifiers.is_empty())
    {
        return None;
    }

    Some(NounPhrase {
        head,
        modifiers,
        number,
        count,
        text: tokens[start..end].to_vec(),
    })
}

fn coin_kind(
    scanner: &mut Scanner,
    ontology: &Ontology,
    name: &[Token],
    number: Number,
    sentence_start: bool,
) -> Option<usize> {
    if !coinable(ontology, name) {
        return None;
    }
    if let Some(index) = scanner.pending(name) {
        return scanner.coinages()[index].is_kind().then_some(index);
    }
    let mut name = name.to_vec();
    if sentence_start && let Some(first) = name.first_mut() {
        first.text = first.text.to_lowercase();
    }
    let (singular, plural) = match number {
        Number::Singular => {
            let plural = plural_name(&name).ok()?;
            (name, plural)
        }
        Number::Plural => match singular_name(&name) {
            Ok(singular) => (singular, name),
            Err(_) => {
                let plural = plural_name(&name).ok()?;
                (name, plural)
            }
        },
    };
    if ontology.lookup(&singular).is_some() || ontology.lookup(&plural).is_some() {
        return None;
    }
    Some(scanner.coin(Coinage::Kind { singular, plural }))
}

fn proper_noun(scanner: &mut Scanner, ontology: &Ontology, end: usize) -> Option<NounPhrase> {
    let tokens = scanner.tokens();
    let start = scanner.position();
    let name = &tokens[start..end];
    let head = match ontology.lookup(name) {
        Some(entry) => match entry.value {
            Concept::Individual(_) => Ref::Known(entry.value),
            _ => return None,
        },
        None => {
            if !coinable(ontology, name) || !name[0].is_capitalized() {
                return None;
            }
            match scanner.pending(name) {
                Some(index) => match scanner.coinages()[index] {
                    Coinage::Individual { .. } => Ref::Coined(index),
                    _ => return None,
                },
                None => Ref::Coined(scanner.coin(Coinage::Individual {
                    name: name.to_vec(),
                })),
            }
        }
    };
    Some(NounPhrase {
        head,
        modifiers: Vec::new(),
        number: Some(Number::Singular),
        count: None,
        text: name.to_vec(),
    })
}

fn adjective(scanner: &mut Scanner, ontology: &Ontology, end: usize) -> Option<Modifier> {
    let tokens = scanner.tokens();
    let mut start = scanner.position();
    let positive = !tokens.get(start)?.is("not");
    if !positive {
        start += 1;
    }
    if start >= end {
        return None;
    }
    let name = &tokens[start..end];
    let concept = match ontology.lookup(name) {
        Some(entry) => match entry.value {
            Concept::Adjective(_) => Ref::Known(entry.value),
            _ => return None,
        },
        None => match scanner.pending(name) {
            Some(index) => match scanner.coinages()[index] {
                Coinage::Adjective { .. } => Ref::Coined(index),
                _ => return None,
            },
            None if coinable(ontology, name) => Ref::Coined(scanner.coin(Coinage::Adjective {
                name: name.to_vec(),
            })),
            None => return None,
        },
    };
    Some(Modifier { concept, positive })
}

fn verb(scanner: &mut Scanner, ontology: &Ontology, end: usize, coin: bool) -> Option<Ref> {
    let tokens = scanner.tokens();
    let start = scanner.position();
    let mut cursor = start;
    if let Some(entry) = ontology.registry().lookup(tokens, &mut cursor, end) {
        return match entry.value {
            Concept::Verb(_) if cursor == end => Some(Ref::Known(entry.value)),
            _ => None,
        };
    }
    let name = &tokens[start..end];
    if !coin
        || !coinable(ontology, &name[..1])
        || !name[1..].iter().all(|t| PREPOSITIONS.iter().any(|p| t.is(p)))
    {
        return None;
    }
    let base: Vec<Token> = name.iter().map(|t| Token::word(t.key())).collect();
    if let Some(index) = scanner.pending(&base) {
        return matches!(scanner.coinages()[index], Coinage::Verb { .. })
            .then_some(Ref::Coined(index));
    }
    Some(Ref::Coined(scanner.coin(Coinage::Verb { base })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{tokenize, words};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn ontology() -> TestResult<Ontology> {
        let mut ontology = Ontology::new();
        ontology.add_kind(Some(words("cat")), None)?;
        ontology.add_adjective(words("fuzzy"))?;
        ontology.add_verb(words("love"))?;
        Ok(ontology)
    }

    #[test]
    fn noun_phrase_with_determiner_and_modifier() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("a fuzzy cat")?;
        let mut scanner = Scanner::new(&tokens);
        let Some(Binding::Noun(np)) = Segment::Noun(Number::Plural).parse(&mut scanner, &ontology, 3)
        else {
            panic!("expected a noun phrase");
        };
        assert_eq!(np.count, Some(1));
        assert_eq!(np.number, Some(Number::Singular));
        assert_eq!(np.modifiers.len(), 1);
        assert!(matches!(np.head, Ref::Known(Concept::Kind(_))));
        assert_eq!(scanner.position(), 3);
        Ok(())
    }

    #[test]
    fn new_plural_noun_is_coined_with_its_singular() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("dogs")?;
        let mut scanner = Scanner::new(&tokens);
        let binding = Segment::Noun(Number::Plural).parse(&mut scanner, &ontology, 1);
        assert!(matches!(binding, Some(Binding::Noun(NounPhrase { head: Ref::Coined(0), .. }))));
        assert_eq!(
            scanner.coinages(),
            &[Coinage::Kind {
                singular: words("dog"),
                plural: words("dogs")
            }]
        );
        Ok(())
    }

    #[test]
    fn determiner_must_agree_with_known_noun() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("a cats")?;
        let mut scanner = Scanner::new(&tokens);
        assert_eq!(Segment::Noun(Number::Singular).parse(&mut scanner, &ontology, 2), None);
        Ok(())
    }

    #[test]
    fn adjective_lists_record_conjunction() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("big, small or fuzzy")?;
        let mut scanner = Scanner::new(&tokens);
        let Some(Binding::Adjectives(list)) =
            Segment::Adjectives.parse(&mut scanner, &ontology, tokens.len())
        else {
            panic!("expected an adjective list");
        };
        assert_eq!(list.items.len(), 3);
        assert_eq!(list.conjunction, Some(Conjunction::Or));
        assert_eq!(scanner.coinages().len(), 2);
        Ok(())
    }

    #[test]
    fn mixed_conjunctions_are_rejected() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("big and small or fuzzy")?;
        let mut scanner = Scanner::new(&tokens);
        assert_eq!(Segment::Adjectives.parse(&mut scanner, &ontology, tokens.len()), None);
        Ok(())
    }

    #[test]
    fn new_verbs_take_trailing_prepositions() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("play with toys")?;
        assert_eq!(Segment::Verb { coin: true }.ends(&tokens, 0, &ontology), vec![2, 1]);
        assert!(Segment::Verb { coin: false }.ends(&tokens, 0, &ontology).is_empty());

        let tokens = tokenize("loves cats")?;
        assert_eq!(Segment::Verb { coin: true }.ends(&tokens, 0, &ontology), vec![1]);
        Ok(())
    }

    #[test]
    fn closed_class_and_counts() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("very rare")?;
        let mut scanner = Scanner::new(&tokens);
        let frequency = Segment::Closed(&["very rare", "rare"]);
        assert_eq!(frequency.ends(&tokens, 0, &ontology), vec![2]);
        assert_eq!(
            frequency.parse(&mut scanner, &ontology, 2),
            Some(Binding::Choice("very rare"))
        );
        assert_eq!(count_of(&Token::word("three")), Some(3));
        assert_eq!(count_of(&tokenize("12")?[0]), Some(12));
        Ok(())
    }

    #[test]
    fn proper_nouns_must_be_capitalized() -> TestResult {
        let ontology = ontology()?;
        let tokens = tokenize("Fred")?;
        let mut scanner = Scanner::new(&tokens);
        assert!(Segment::Proper.parse(&mut scanner, &ontology, 1).is_some());
        let tokens = tokenize("fred")?;
        let mut scanner = Scanner::new(&tokens);
        assert_eq!(Segment::Proper.parse(&mut scanner, &ontology, 1), None);
        Ok(())
    }
}
