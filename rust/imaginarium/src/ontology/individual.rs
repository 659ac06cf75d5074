//! Permanent individuals and test declarations.

use crate::ontology::literal::{KindId, MonadicLiteral, PropertyId};
use crate::token::Token;

/// An individual named in source text. It takes part in every generated
/// problem and lives until the ontology is reset.
#[derive(Debug, Clone)]
pub struct PermanentIndividual {
    pub name: Vec<Token>,
    /// Most specific kinds only.
    pub kinds: Vec<KindId>,
    pub modifiers: Vec<MonadicLiteral>,
    /// Values fixed in source text.
    pub properties: Vec<(PropertyId, String)>,
}

/// "a fuzzy cat should exist" / "a dog cat should not exist".
#[derive(Debug, Clone)]
pub struct TestCase {
    pub kind: KindId,
    pub modifiers: Vec<MonadicLiteral>,
    pub should_exist: bool,
    /// The statement as typed, for reports.
    pub text: String,
}
