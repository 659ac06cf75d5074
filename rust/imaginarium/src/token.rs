//! Token stream — splitting statements into word, number and punctuation
//! tokens, and joining tokens back into prose.
//!
//! Tokens keep their original case. Matching against literal words and
//! registered names is case-insensitive throughout the crate, so `Cats` and
//! `cats` name the same kind.

use std::fmt;

use crate::error::GrammarError;

#[derive(Debug, Clone)]
pub struct Token {
    /// The text as typed.
    pub text: String,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of letters.
    Word,
    /// A run of digits.
    Number,
    /// A single punctuation character.
    Punctuation,
    /// A bracketed meta-marker such as `[Noun]`; never typed directly, it is
    /// produced when a description template is compiled.
    Marker,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Word,
        }
    }

    pub fn marker(name: impl Into<String>) -> Self {
        Token {
            text: name.into(),
            kind: TokenKind::Marker,
        }
    }

    /// Case-insensitive comparison with a literal.
    pub fn is(&self, literal: &str) -> bool {
        fold(&self.text).eq(fold(literal))
    }

    /// Lowercased text, used as a trie key.
    pub fn key(&self) -> String {
        fold(&self.text).collect()
    }

    pub fn is_capitalized(&self) -> bool {
        self.kind == TokenKind::Word && self.text.chars().next().is_some_and(char::is_uppercase)
    }

    pub fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && fold(&self.text).eq(fold(&other.text))
    }
}

/// Per-character lowercasing shared by every comparison and by trie keys.
fn fold(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_lowercase)
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Marker => write!(f, "[{}]", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// Split text into tokens.
///
/// Letters group into words, digits into numbers, and every punctuation
/// character is a token of its own. Anything else is rejected.
pub fn tokenize(text: &str) -> Result<Vec<Token>, GrammarError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        let kind = if ch.is_alphabetic() {
            TokenKind::Word
        } else if ch.is_ascii_digit() {
            TokenKind::Number
        } else if ch.is_ascii_punctuation() || matches!(ch, '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}') {
            tokens.push(Token {
                text: normalize_punctuation(ch).to_string(),
                kind: TokenKind::Punctuation,
            });
            continue;
        } else {
            return Err(GrammarError::UnknownCharacter {
                character: ch,
                input: text.to_string(),
            });
        };

        let mut end = start + ch.len_utf8();
        while let Some(&(index, next)) = chars.peek() {
            let continues = match kind {
                TokenKind::Word => next.is_alphabetic(),
                _ => next.is_ascii_digit(),
            };
            if !continues {
                break;
            }
            end = index + next.len_utf8();
            chars.next();
        }
        tokens.push(Token {
            text: text[start..end].to_string(),
            kind,
        });
    }

    Ok(tokens)
}

fn normalize_punctuation(ch: char) -> char {
    match ch {
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201c}' | '\u{201d}' => '"',
        other => other,
    }
}

/// Join tokens back into prose.
///
/// No space goes before punctuation or markers, none around a hyphen, none
/// inside quotes or after an opening bracket, and none between an
/// apostrophe and a contraction ending (`Fred's`, `can't`). Everything else
/// is separated by exactly one space.
pub fn untokenize<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut output = String::new();
    let mut previous: Option<&Token> = None;
    let mut open_quote = false;

    for token in tokens {
        if token.text.is_empty() {
            continue;
        }
        let is_quote = token.kind == TokenKind::Punctuation && token.text == "\"";
        let space = match previous {
            None => false,
            Some(previous) => {
                let after_opening = previous.kind == TokenKind::Punctuation
                    && (matches!(previous.text.as_str(), "(" | "[" | "-")
                        || (previous.text == "\"" && open_quote));
                let contraction = previous.text == "'"
                    && (token.is("s") || token.is("t") || token.is("ll") || token.is("re"));
                let before = if is_quote {
                    open_quote
                } else {
                    matches!(token.kind, TokenKind::Punctuation | TokenKind::Marker)
                        && !matches!(token.text.as_str(), "(" | "[")
                };
                !(after_opening || contraction || before)
            }
        };
        if space {
            output.push(' ');
        }
        if is_quote {
            open_quote = !open_quote;
        }
        output.push_str(&token.to_string());
        previous = Some(token);
    }

    output
}

/// Tokenize a fixed phrase known to contain only words.
pub fn words(text: &str) -> Vec<Token> {
    text.split_whitespace().map(Token::word).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn tokenize_groups_letters_and_digits() {
        let tokens = tokenize("Cats have an age between 1 and 20.").unwrap();
        assert_eq!(
            texts(&tokens),
            vec!["Cats", "have", "an", "age", "between", "1", "and", "20", "."]
        );
        assert_eq!(tokens[5].kind, TokenKind::Number);
        assert_eq!(tokens[8].kind, TokenKind::Punctuation);
    }

    #[test]
    fn tokenize_splits_punctuation_individually() {
        let tokens = tokenize("Fred's toy, \"a ball\"").unwrap();
        assert_eq!(
            texts(&tokens),
            vec!["Fred", "'", "s", "toy", ",", "\"", "a", "ball", "\""]
        );
    }

    #[test]
    fn tokenize_preserves_case_but_compares_without_it() {
        let tokens = tokenize("Imagine a Cat").unwrap();
        assert_eq!(tokens[0].text, "Imagine");
        assert!(tokens[0].is("imagine"));
        assert_eq!(tokens[2], Token::word("cat"));
    }

    #[test]
    fn case_folding_agrees_beyond_ascii() {
        let token = Token::word("Éclair");
        assert!(token.is("éclair"));
        assert_eq!(token, Token::word("ÉCLAIR"));
        assert_eq!(token.key(), "éclair");
        assert!(!token.is("eclair"));
    }

    #[test]
    fn tokenize_rejects_unknown_characters() {
        let result = tokenize("cats are \u{1F431}");
        assert!(matches!(
            result,
            Err(GrammarError::UnknownCharacter { character: '\u{1F431}', .. })
        ));
    }

    #[test]
    fn untokenize_spacing_rules() {
        let tokens = tokenize("Fred ' s toy , a well - known \" squeaky ball \" .").unwrap();
        assert_eq!(
            untokenize(&tokens),
            "Fred's toy, a well-known \"squeaky ball\"."
        );
    }

    #[test]
    fn untokenize_no_space_before_markers() {
        let tokens = vec![Token::word("a"), Token::marker("Noun")];
        assert_eq!(untokenize(&tokens), "a[Noun]");
    }
}
