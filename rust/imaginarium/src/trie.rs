//! Concept registry — a trie over case-insensitive token sequences.
//!
//! Every name the ontology knows (kinds in both numbers, adjectives, verb
//! forms, proper nouns) is stored here, so a phrase like "big black cat"
//! can be split into the longest known names without backtracking over
//! every prefix.

use std::collections::HashMap;

use crate::token::Token;

/// Which surface form of a concept a stored name is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    Singular,
    Plural,
    /// Singular and plural forms coincide ("sheep").
    Either,
    /// The "-ing" form of a verb.
    Gerund,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    pub value: V,
    pub form: Form,
}

#[derive(Debug, Clone)]
struct Node<V> {
    children: HashMap<String, Node<V>>,
    entry: Option<Entry<V>>,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Node {
            children: HashMap::new(),
            entry: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Trie<V> {
    root: Node<V>,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Trie {
            root: Node::default(),
        }
    }
}

impl<V: Clone> Trie<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `entry`, replacing whatever was there. Storing `None`
    /// removes a stale binding.
    pub fn store(&mut self, name: &[Token], entry: Option<Entry<V>>) {
        let mut node = &mut self.root;
        for token in name {
            node = node.children.entry(token.key()).or_default();
        }
        node.entry = entry;
    }

    /// Exact lookup of a whole name.
    pub fn get(&self, name: &[Token]) -> Option<&Entry<V>> {
        let mut node = &self.root;
        for token in name {
            node = node.children.get(&token.key())?;
        }
        node.entry.as_ref()
    }

    /// Longest registered name starting at `*cursor` and ending at or before
    /// `end`. On success the cursor moves past the name; on failure it is
    /// left alone.
    pub fn lookup(&self, tokens: &[Token], cursor: &mut usize, end: usize) -> Option<&Entry<V>> {
        let end = end.min(tokens.len());
        let mut node = &self.root;
        let mut best = None;
        let mut position = *cursor;
        while position < end {
            let Some(next) = node.children.get(&tokens[position].key()) else {
                break;
            };
            node = next;
            position += 1;
            if let Some(entry) = &node.entry {
                best = Some((entry, position));
            }
        }
        let (entry, after) = best?;
        *cursor = after;
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.root = Node::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::words;
    use pretty_assertions::assert_eq;

    fn entry(value: u32, form: Form) -> Option<Entry<u32>> {
        Some(Entry { value, form })
    }

    #[test]
    fn longest_match_wins() {
        let mut trie = Trie::new();
        trie.store(&words("black"), entry(1, Form::Singular));
        trie.store(&words("black cat"), entry(2, Form::Singular));
        trie.store(&words("black cats"), entry(2, Form::Plural));

        let input = words("big black cats sleep");
        let mut cursor = 1;
        let found = trie.lookup(&input, &mut cursor, input.len());
        assert_eq!(found, entry(2, Form::Plural).as_ref());
        assert_eq!(cursor, 3);
    }

    #[test]
    fn lookup_respects_end_bound() {
        let mut trie = Trie::new();
        trie.store(&words("black"), entry(1, Form::Singular));
        trie.store(&words("black cat"), entry(2, Form::Singular));

        let input = words("black cat");
        let mut cursor = 0;
        assert_eq!(trie.lookup(&input, &mut cursor, 1).map(|e| e.value), Some(1));
        assert_eq!(cursor, 1);
    }

    #[test]
    fn failed_lookup_leaves_cursor() {
        let mut trie = Trie::new();
        trie.store(&words("black cat"), entry(2, Form::Singular));
        let input = words("black dog");
        let mut cursor = 0;
        assert_eq!(trie.lookup(&input, &mut cursor, input.len()), None);
        assert_eq!(cursor, 0);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut trie = Trie::new();
        trie.store(&words("Fred"), entry(7, Form::Singular));
        assert_eq!(trie.get(&words("FRED")).map(|e| e.value), Some(7));
    }

    #[test]
    fn storing_none_removes_binding() {
        let mut trie = Trie::new();
        trie.store(&words("cat"), entry(1, Form::Singular));
        trie.store(&words("cat"), None);
        assert_eq!(trie.get(&words("cat")), None);
        trie.store(&words("dog"), entry(2, Form::Singular));
        trie.clear();
        assert_eq!(trie.get(&words("dog")), None);
    }
}
