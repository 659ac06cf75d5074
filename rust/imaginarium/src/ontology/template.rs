//! Name and description templates: token lists with `[slot]` markers.

use crate::error::GrammarError;
use crate::token::{Token, TokenKind, untokenize};

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    /// Turn `[` words `]` runs into single marker tokens.
    pub fn compile(source: &[Token]) -> Result<Template, GrammarError> {
        let mut tokens = Vec::new();
        let mut iter = source.iter();
        while let Some(token) = iter.next() {
            if token.kind == TokenKind::Punctuation && token.text == "[" {
                let mut slot = Vec::new();
                loop {
                    match iter.next() {
                        Some(t) if t.kind == TokenKind::Punctuation && t.text == "]" => break,
                        Some(t) => slot.push(t.clone()),
                        None => {
                            return Err(GrammarError::Rejected {
                                input: untokenize(source),
                                reason: "unterminated [slot] in template".into(),
                            });
                        }
                    }
                }
                tokens.push(Token::marker(untokenize(&slot)));
            } else {
                tokens.push(token.clone());
            }
        }
        Ok(Template { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The template as it would be typed.
    pub fn source(&self) -> String {
        let visible: Vec<Token> = self
            .tokens
            .iter()
            .map(|t| match t.kind {
                TokenKind::Marker => Token::word(format!("[{}]", t.text)),
                _ => t.clone(),
            })
            .collect();
        untokenize(&visible)
    }
}
