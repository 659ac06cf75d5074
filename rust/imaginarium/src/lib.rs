//! # Imaginarium
//!
//! Describe a world in restricted English, then ask for examples of it.
//!
//! ```
//! use imaginarium::{Config, OntologyContext};
//!
//! let mut context = OntologyContext::new(Config::default().with_seed(1));
//! context.execute("a cat is a kind of animal").unwrap();
//! context.execute("cats are black or white").unwrap();
//! let output = context.execute("imagine a cat").unwrap();
//! let text = output.to_string();
//! assert!(text == "black cat" || text == "white cat");
//! ```
//!
//! Statements pass through the layers in order:
//!
//! - [`token`] splits text into words, numbers and punctuation, and
//!   [`inflection`] converts between singular, plural and gerund forms.
//! - [`pattern`] matches a token list against the sentence library,
//!   coining new nouns, adjectives and verbs as it goes, and commits the
//!   winning sentence to the [`ontology`]. The ontology's registry is a
//!   [`trie`] from word sequences to concepts.
//! - [`generator`] compiles a request ("imagine three cats") into a
//!   constraint problem for [`imaginarium_solver`], and [`invention`]
//!   reads the model back as prose.
//! - [`context`] holds the session: the transcript, undo by replay, lazily
//!   loaded definition files, and the commands.

pub mod batch;
pub mod config;
pub mod context;
pub mod decompile;
pub mod error;
pub mod generator;
pub mod inflection;
pub mod invention;
pub mod ontology;
pub mod pattern;
pub mod token;
pub mod trie;

pub use batch::{StatsReport, StatsRun, Step, TestReport, TestRun};
pub use config::Config;
pub use context::{OntologyContext, Output};
pub use error::{ContradictionError, GrammarError, ImaginariumError, ResourceError, Result};
pub use generator::{Generator, Request};
pub use invention::Invention;
pub use ontology::Ontology;
