//! Error types for Imaginarium.
//!
//! Every rejection leaves the ontology exactly as it was before the
//! offending statement; the context restores its snapshot before the error
//! reaches the caller.

use std::path::PathBuf;

use imaginarium_solver::SolverError;
use thiserror::Error;

/// Input that no sentence template accepts, or that cannot be tokenized
/// or inflected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GrammarError {
    #[error("unknown character {character:?} in \"{input}\"")]
    UnknownCharacter { character: char, input: String },

    #[error("I don't understand \"{input}\"{}", suggestion_list(.suggestions))]
    NoMatch {
        input: String,
        suggestions: Vec<String>,
    },

    #[error("can't work out the {form} form of \"{word}\"")]
    NoInflection { word: String, form: &'static str },

    #[error("\"{input}\": {reason}")]
    Rejected { input: String, reason: String },
}

fn suggestion_list(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; similar sentences: {}", suggestions.join(" | "))
    }
}

/// A statement that conflicts with what the ontology already says.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContradictionError {
    #[error("{sub} can't be a kind of {parent}: {parent} is already a kind of {sub}")]
    CyclicKinds { sub: String, parent: String },

    #[error("{verb} relates {existing}, which has nothing in common with {proposed}")]
    IncompatibleSignature {
        verb: String,
        existing: String,
        proposed: String,
    },

    #[error("\"{name}\" is already used for a {existing}")]
    NameClash { name: String, existing: &'static str },

    #[error("{name}'s {property} isn't a property that can take \"{value}\"")]
    PropertyValue {
        name: String,
        property: String,
        value: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Missing or unreadable definition and menu files.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("can't read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ImaginariumError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("contradiction: {0}")]
    Contradiction(#[from] ContradictionError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The solver found no model, or gave up looking.
    #[error("no example found ({0})")]
    NoExample(#[from] SolverError),

    #[error("{0}")]
    Command(String),
}

/// Result type for Imaginarium operations
pub type Result<T> = std::result::Result<T, ImaginariumError>;
