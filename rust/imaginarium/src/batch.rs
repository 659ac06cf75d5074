//! Long-running batch work as resumable step functions.
//!
//! A run does one solve per [`step`](StatsRun::step) and keeps its own
//! tallies, so a caller can report progress between steps or simply stop
//! calling. Nothing is shared with the session while a run is in flight.

use std::fmt;

use imaginarium_solver::{Engine, SolverError};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::ImaginariumError;
use crate::generator::{Generator, Request};
use crate::ontology::{Monadic, Ontology, TestCase};

/// Whether a run wants another step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    More,
    Done,
}

/// Repeated solves of one request, counting how often each relevant kind
/// and adjective held of the first requested individual.
#[derive(Debug)]
pub struct StatsRun {
    ontology: Ontology,
    request: Request,
    trials: usize,
    completed: usize,
    failures: usize,
    tallies: IndexMap<Monadic, usize>,
}

impl StatsRun {
    pub fn new(ontology: &Ontology, request: Request, trials: usize) -> Self {
        let mut tallies = IndexMap::new();
        for kind in ontology.descendants(request.kind) {
            tallies.insert(Monadic::Kind(kind), 0);
            for ancestor in ontology.ancestors(kind) {
                for adjective in &ontology.kind(ancestor).relevant_adjectives {
                    tallies.entry(Monadic::Adjective(*adjective)).or_insert(0);
                }
            }
        }
        StatsRun {
            ontology: ontology.clone(),
            request,
            trials,
            completed: 0,
            failures: 0,
            tallies,
        }
    }

    pub fn step(&mut self, engine: &mut impl Engine) -> Step {
        if self.completed >= self.trials {
            return Step::Done;
        }
        self.completed += 1;
        match Generator::new(&self.ontology, &self.request).solve(engine) {
            Ok(invention) => {
                if let Some(&first) = invention.requested().first() {
                    for (concept, count) in self.tallies.iter_mut() {
                        let holds = match *concept {
                            Monadic::Kind(kind) => invention.is_a(first, kind),
                            Monadic::Adjective(adjective) => invention.is(first, adjective),
                        };
                        if holds {
                            *count += 1;
                        }
                    }
                }
            }
            Err(error) => {
                debug!(trial = self.completed, %error, "stats trial failed");
                self.failures += 1;
            }
        }
        if self.completed >= self.trials {
            Step::Done
        } else {
            Step::More
        }
    }

    /// Step until done.
    pub fn run(mut self, engine: &mut impl Engine) -> StatsReport {
        while self.step(engine) == Step::More {}
        self.report()
    }

    pub fn report(&self) -> StatsReport {
        let rows = self
            .tallies
            .iter()
            .map(|(concept, count)| (self.ontology.monadic_name(*concept), *count))
            .collect();
        StatsReport {
            trials: self.completed,
            failures: self.failures,
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    pub trials: usize,
    pub failures: usize,
    /// Concept name and the number of successful trials it held in.
    pub rows: Vec<(String, usize)>,
}

impl StatsReport {
    /// Fraction of successful trials in which `name` held.
    pub fn frequency(&self, name: &str) -> Option<f64> {
        let successes = self.trials.saturating_sub(self.failures);
        let (_, count) = self.rows.iter().find(|(row, _)| row == name)?;
        (successes > 0).then(|| *count as f64 / successes as f64)
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} trials, {} failed", self.trials, self.failures)?;
        let lines: Vec<String> = self
            .rows
            .iter()
            .map(|(name, _)| {
                let percent = self.frequency(name).unwrap_or(0.0) * 100.0;
                format!("{name}: {percent:.0}%")
            })
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub text: String,
    pub passed: bool,
    /// Why a test failed, when the solver said something useful.
    pub detail: Option<String>,
}

/// The ontology's `should exist` / `should not exist` declarations, one
/// solve per step.
#[derive(Debug)]
pub struct TestRun {
    ontology: Ontology,
    tests: Vec<TestCase>,
    outcomes: Vec<TestOutcome>,
}

impl TestRun {
    pub fn new(ontology: &Ontology) -> Self {
        TestRun {
            ontology: ontology.clone(),
            tests: ontology.tests().to_vec(),
            outcomes: Vec::new(),
        }
    }

    pub fn step(&mut self, engine: &mut impl Engine) -> Step {
        let Some(test) = self.tests.get(self.outcomes.len()) else {
            return Step::Done;
        };
        let request = Request::new(test.kind, 1).with_modifiers(test.modifiers.clone());
        let result = Generator::new(&self.ontology, &request).solve(engine);
        let outcome = match (test.should_exist, result) {
            (true, Ok(_)) | (false, Err(ImaginariumError::NoExample(SolverError::Contradiction))) => {
                TestOutcome {
                    text: test.text.clone(),
                    passed: true,
                    detail: None,
                }
            }
            (true, Err(error)) => TestOutcome {
                text: test.text.clone(),
                passed: false,
                detail: Some(error.to_string()),
            },
            (false, Ok(invention)) => TestOutcome {
                text: test.text.clone(),
                passed: false,
                detail: invention
                    .requested()
                    .first()
                    .map(|i| format!("found {}", invention.description(*i))),
            },
            (false, Err(error)) => TestOutcome {
                text: test.text.clone(),
                passed: false,
                detail: Some(error.to_string()),
            },
        };
        debug!(test = %outcome.text, passed = outcome.passed, "test finished");
        self.outcomes.push(outcome);
        if self.outcomes.len() < self.tests.len() {
            Step::More
        } else {
            Step::Done
        }
    }

    pub fn run(mut self, engine: &mut impl Engine) -> TestReport {
        while self.step(engine) == Step::More {}
        TestReport {
            outcomes: self.outcomes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub outcomes: Vec<TestOutcome>,
}

impl TestReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let verdict = if outcome.passed { "pass" } else { "FAIL" };
            match &outcome.detail {
                Some(detail) => writeln!(f, "{verdict}: {} ({detail})", outcome.text)?,
                None => writeln!(f, "{verdict}: {}", outcome.text)?,
            }
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}
