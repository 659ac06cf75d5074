//! The session: one ontology, its transcript, and the command loop's
//! entry point.
//!
//! Declarations run against a snapshot. If anything fails (the statement
//! itself, or a definition file it caused to load) the ontology goes back
//! to the snapshot and the error is returned. Undo drops the last logged
//! statement and replays the rest into a cleared ontology.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use imaginarium_solver::Backtracking;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::batch::{StatsReport, StatsRun, TestReport, TestRun};
use crate::config::{Config, DEFINITION_EXTENSION};
use crate::decompile::decompile;
use crate::error::{GrammarError, ImaginariumError, ResourceError, Result};
use crate::generator::{Generator, Request};
use crate::invention::Invention;
use crate::ontology::{Concept, KindId, Monadic, MonadicLiteral, Ontology};
use crate::pattern::{Action, Command, Commit, Declare, Grammar, Number, Parse, Ref};
use crate::token::{Token, TokenKind, tokenize, untokenize};

/// What a line produced.
#[derive(Debug)]
pub enum Output {
    /// A declaration was committed; nothing to show.
    Accepted,
    Invention(Box<Invention>),
    Report(String),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Accepted => Ok(()),
            Output::Invention(invention) => write!(f, "{invention}"),
            Output::Report(report) => write!(f, "{report}"),
        }
    }
}

pub struct OntologyContext {
    config: Config,
    ontology: Ontology,
    grammar: Grammar,
    /// Declarations in the order they were committed.
    transcript: Vec<String>,
    /// Nouns whose definition files have been looked for.
    loaded: HashSet<String>,
    last_request: Option<Request>,
    engine: Backtracking,
}

impl OntologyContext {
    pub fn new(config: Config) -> Self {
        let engine = match config.seed {
            Some(seed) => Backtracking::seeded(seed),
            None => Backtracking::from_entropy(),
        }
        .with_max_steps(config.max_steps);
        OntologyContext {
            config,
            ontology: Ontology::new(),
            grammar: Grammar::default(),
            transcript: Vec::new(),
            loaded: HashSet::new(),
            last_request: None,
            engine,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Run one line of input: a declaration or a command. Blank lines and
    /// `#` comments do nothing.
    pub fn execute(&mut self, line: &str) -> Result<Output> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Output::Accepted);
        }
        let parse = self.parse(line)?;
        match self.action(&parse)? {
            Action::Declare(declare) => {
                self.declare(line, &parse, declare)?;
                self.transcript.push(line.to_string());
                Ok(Output::Accepted)
            }
            Action::Command(command) => self.command(command, line, &parse),
        }
    }

    /// Run every line of a file as if typed.
    pub fn run_file(&mut self, path: impl Into<PathBuf>) -> Result<Vec<Output>> {
        let path = path.into();
        let text = read(&path)?;
        text.lines().map(|line| self.execute(line)).collect()
    }

    pub fn reset(&mut self) {
        self.ontology.clear();
        self.transcript.clear();
        self.loaded.clear();
        self.last_request = None;
        info!("starting over");
    }

    /// Drop the last declaration and rebuild from the rest. Returns the
    /// statement that was undone, if there was one. If the replay fails
    /// the session is left as it was before the undo.
    pub fn undo(&mut self) -> Result<Option<String>> {
        let Some(undone) = self.transcript.last().cloned() else {
            return Ok(None);
        };
        let snapshot = (
            self.ontology.clone(),
            self.transcript.clone(),
            self.loaded.clone(),
            self.last_request.clone(),
        );
        let replay = self.transcript[..self.transcript.len() - 1].to_vec();
        self.reset();
        info!(statements = replay.len(), undone = %undone, "replaying transcript");
        match replay.iter().try_for_each(|line| self.execute(line).map(drop)) {
            Ok(()) => Ok(Some(undone)),
            Err(error) => {
                (self.ontology, self.transcript, self.loaded, self.last_request) = snapshot;
                warn!(%error, undone = %undone, "undo failed");
                Err(error)
            }
        }
    }

    /// Write the transcript to `<name>.gen`.
    pub fn save(&self, name: &str) -> Result<PathBuf> {
        let path = self.config.file(name, DEFINITION_EXTENSION);
        let mut text = self.transcript.join("\n");
        text.push('\n');
        fs::write(&path, text).map_err(|source| ResourceError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), statements = self.transcript.len(), "saved transcript");
        Ok(path)
    }

    pub fn imagine(&mut self, request: Request) -> Result<Invention> {
        self.last_request = Some(request.clone());
        let invention = Generator::new(&self.ontology, &request).solve(&mut self.engine)?;
        debug!(steps = invention.solution().steps(), "imagined");
        Ok(invention)
    }

    pub fn test(&mut self) -> TestReport {
        TestRun::new(&self.ontology).run(&mut self.engine)
    }

    /// Repeat the last `imagine` request.
    pub fn stats(&mut self) -> Result<StatsReport> {
        let request = self
            .last_request
            .clone()
            .ok_or_else(|| ImaginariumError::Command("imagine something first".into()))?;
        Ok(StatsRun::new(&self.ontology, request, self.config.stats_trials).run(&mut self.engine))
    }

    pub fn decompile(&self) -> Vec<String> {
        decompile(&self.ontology)
    }

    pub fn help(&self) -> String {
        self.grammar
            .sentences()
            .iter()
            .map(|sentence| sentence.source())
            .join("\n")
    }

    // --- Internals ---

    fn parse(&self, line: &str) -> Result<Parse> {
        let mut tokens = tokenize(line)?;
        while tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Punctuation && matches!(t.text.as_str(), "." | "!" | "?"))
        {
            tokens.pop();
        }
        self.grammar.parse(&self.ontology, &tokens).map_err(|error| {
            warn!(%error, "no sentence matched");
            error.into()
        })
    }

    fn action(&self, parse: &Parse) -> Result<Action> {
        self.grammar
            .sentence(parse.sentence)
            .map(|sentence| sentence.action())
            .ok_or_else(|| ImaginariumError::Command(format!("no sentence #{}", parse.sentence)))
    }

    /// Commit a declaration, restoring the ontology if it or any definition
    /// file it pulls in fails.
    fn declare(&mut self, line: &str, parse: &Parse, declare: Declare) -> Result<()> {
        let snapshot = (self.ontology.clone(), self.loaded.clone());
        let result = self
            .apply(line, parse, declare)
            .and_then(|kinds| self.load_definitions(&kinds));
        match result {
            Ok(()) => {
                info!(statement = line, "committed");
                Ok(())
            }
            Err(error) => {
                (self.ontology, self.loaded) = snapshot;
                warn!(statement = line, %error, "rejected");
                Err(error)
            }
        }
    }

    fn apply(&mut self, line: &str, parse: &Parse, declare: Declare) -> Result<Vec<KindId>> {
        let mut commit = Commit::new(&mut self.ontology, &self.config, line, &parse.coinages)?;
        declare(&mut commit, parse)?;
        Ok(commit.new_kinds())
    }

    /// Look once for `<noun>.gen` for each new kind and run its
    /// declarations. Loaded statements are not logged.
    fn load_definitions(&mut self, kinds: &[KindId]) -> Result<()> {
        for kind in kinds {
            let name = self.ontology.kind_name(*kind);
            if !self.loaded.insert(name.clone()) {
                continue;
            }
            let path = self.config.file(&name, DEFINITION_EXTENSION);
            let text = match read(&path) {
                Ok(text) => text,
                Err(ResourceError::FileNotFound(_)) => continue,
                Err(error) => return Err(error.into()),
            };
            info!(path = %path.display(), "loading definitions");
            for line in text.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let parse = self.parse(line)?;
                match self.action(&parse)? {
                    Action::Declare(declare) => {
                        let kinds = self.apply(line, &parse, declare)?;
                        self.load_definitions(&kinds)?;
                    }
                    Action::Command(_) => {
                        return Err(GrammarError::Rejected {
                            input: line.to_string(),
                            reason: format!("commands aren't allowed in {}", path.display()),
                        }
                        .into());
                    }
                }
            }
        }
        Ok(())
    }

    fn command(&mut self, command: Command, line: &str, parse: &Parse) -> Result<Output> {
        debug!(?command, "command");
        match command {
            Command::Imagine => {
                let request = self.request(line, parse)?;
                Ok(Output::Invention(Box::new(self.imagine(request)?)))
            }
            Command::Undo => Ok(Output::Report(match self.undo()? {
                Some(undone) => format!("undid \"{undone}\""),
                None => "nothing to undo".into(),
            })),
            Command::StartOver => {
                self.reset();
                Ok(Output::Report("starting over".into()))
            }
            Command::Save => {
                let path = self.save(&untokenize(parse.text(0)?))?;
                Ok(Output::Report(format!("saved to {}", path.display())))
            }
            Command::Test => Ok(Output::Report(self.test().to_string())),
            Command::Decompile => Ok(Output::Report(self.decompile().join("\n"))),
            Command::Stats => Ok(Output::Report(self.stats()?.to_string())),
            Command::Help => Ok(Output::Report(self.help())),
        }
    }

    /// Turn `imagine NP` into a request. Commands never coin words.
    fn request(&self, line: &str, parse: &Parse) -> Result<Request> {
        let unknown = |text: &[Token]| -> ImaginariumError {
            GrammarError::Rejected {
                input: line.to_string(),
                reason: format!("I don't know what \"{}\" means", untokenize(text)),
            }
            .into()
        };
        let np = parse.noun(0)?;
        if !parse.coinages.is_empty() {
            return Err(unknown(&np.text));
        }
        let Ref::Known(Concept::Kind(kind)) = np.head else {
            return Err(unknown(&np.text));
        };
        let modifiers = np
            .modifiers
            .iter()
            .map(|modifier| {
                let concept = match modifier.concept {
                    Ref::Known(Concept::Kind(kind)) => Monadic::Kind(kind),
                    Ref::Known(Concept::Adjective(adjective)) => Monadic::Adjective(adjective),
                    _ => return Err(unknown(&np.text)),
                };
                Ok(MonadicLiteral {
                    concept,
                    positive: modifier.positive,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let count = np.count.unwrap_or(match np.number {
            Some(Number::Plural) => 2,
            _ => 1,
        });
        if count > self.config.max_individuals {
            return Err(GrammarError::Rejected {
                input: line.to_string(),
                reason: format!(
                    "I can only imagine up to {} things at once",
                    self.config.max_individuals
                ),
            }
            .into());
        }
        Ok(Request::new(kind, count).with_modifiers(modifiers))
    }
}

impl Default for OntologyContext {
    fn default() -> Self {
        OntologyContext::new(Config::default())
    }
}

fn read(path: &PathBuf) -> std::result::Result<String, ResourceError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ResourceError::FileNotFound(path.clone()),
        _ => ResourceError::Io {
            path: path.clone(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn context() -> OntologyContext {
        OntologyContext::new(Config::default().with_seed(42))
    }

    #[test]
    fn declarations_are_logged_and_commands_are_not() -> TestResult {
        let mut context = context();
        context.execute("a cat is a kind of animal")?;
        context.execute("decompile")?;
        context.execute("help")?;
        assert_eq!(context.transcript(), &["a cat is a kind of animal".to_string()]);
        Ok(())
    }

    #[test]
    fn rejected_statements_leave_the_ontology_alone() -> TestResult {
        let mut context = context();
        context.execute("a cat is a kind of animal")?;
        let before = context.decompile();
        let error = context.execute("an animal is a kind of cat");
        assert!(matches!(error, Err(ImaginariumError::Contradiction(_))));
        assert_eq!(context.decompile(), before);
        assert_eq!(context.transcript().len(), 1);
        Ok(())
    }

    #[test]
    fn undo_replays_the_rest() -> TestResult {
        let mut context = context();
        context.execute("a cat is a kind of animal")?;
        context.execute("cats can be fuzzy")?;
        let undone = context.undo()?;
        assert_eq!(undone.as_deref(), Some("cats can be fuzzy"));
        assert_eq!(context.decompile(), vec!["cats are kinds of animals"]);
        assert_eq!(context.undo()?.as_deref(), Some("a cat is a kind of animal"));
        assert_eq!(context.undo()?, None);
        Ok(())
    }

    #[test]
    fn imagining_unknown_nouns_is_rejected() -> TestResult {
        let mut context = context();
        context.execute("a cat is a kind of animal")?;
        let error = context.execute("imagine a dragon");
        assert!(matches!(
            error,
            Err(ImaginariumError::Grammar(GrammarError::Rejected { .. }))
        ));
        assert!(context.ontology().lookup(&crate::token::words("dragon")).is_none());
        Ok(())
    }

    #[test]
    fn undo_keeps_the_session_when_replay_fails() -> TestResult {
        let dir = tempfile::tempdir()?;
        let menu = dir.path().join("colors.txt");
        fs::write(&menu, "grey\nwhite\n")?;
        let mut context =
            OntologyContext::new(Config::default().with_seed(4).with_definitions_dir(dir.path()));
        context.execute("a cat is a kind of animal")?;
        context.execute("cats have a color from colors")?;
        context.execute("cats can be fuzzy")?;
        let transcript = context.transcript().to_vec();
        let before = context.decompile();

        fs::remove_file(&menu)?;
        let error = context.undo();
        assert!(matches!(
            error,
            Err(ImaginariumError::Resource(ResourceError::FileNotFound(_)))
        ));
        assert_eq!(context.transcript(), transcript.as_slice());
        assert_eq!(context.decompile(), before);
        Ok(())
    }

    #[test]
    fn oversized_requests_are_rejected() -> TestResult {
        let mut context =
            OntologyContext::new(Config::default().with_seed(4).with_max_individuals(3));
        context.execute("a cat is a kind of animal")?;
        context.execute("imagine three cats")?;
        let error = context.execute("imagine four cats");
        assert!(matches!(
            error,
            Err(ImaginariumError::Grammar(GrammarError::Rejected { .. }))
        ));
        Ok(())
    }

    #[test]
    fn stats_needs_an_earlier_request() {
        let mut context = context();
        assert!(matches!(
            context.execute("stats"),
            Err(ImaginariumError::Command(_))
        ));
    }
}
