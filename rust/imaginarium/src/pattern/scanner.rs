//! Scanner state: a read cursor over the token buffer plus the coinages
//! recorded by the current attempt.
//!
//! Backtracking is plain save/restore of [`State`]. Restoring truncates the
//! coinage list, so a failed attempt leaves nothing behind.

use crate::pattern::phrase::Coinage;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    position: usize,
    coinages: usize,
}

#[derive(Debug)]
pub struct Scanner<'a> {
    tokens: &'a [Token],
    position: usize,
    coinages: Vec<Coinage>,
}

impl<'a> Scanner<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Scanner {
            tokens,
            position: 0,
            coinages: Vec::new(),
        }
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn advance_to(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn save(&self) -> State {
        State {
            position: self.position,
            coinages: self.coinages.len(),
        }
    }

    pub fn restore(&mut self, state: State) {
        self.position = state.position;
        self.coinages.truncate(state.coinages);
    }

    pub fn coinages(&self) -> &[Coinage] {
        &self.coinages
    }

    /// Pending coinage already registering `name`, if any.
    pub fn pending(&self, name: &[Token]) -> Option<usize> {
        self.coinages.iter().position(|c| c.is_named(name))
    }

    /// Record a coinage, reusing an identical pending one.
    pub fn coin(&mut self, coinage: Coinage) -> usize {
        if let Some(index) = self.coinages.iter().position(|c| *c == coinage) {
            return index;
        }
        self.coinages.push(coinage);
        self.coinages.len() - 1
    }

    pub fn into_coinages(self) -> Vec<Coinage> {
        self.coinages
    }
}
