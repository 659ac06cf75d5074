//! Session configuration.

use std::path::{Path, PathBuf};

use imaginarium_solver::search::DEFAULT_MAX_STEPS;

/// File extension of definition and saved transcript files.
pub const DEFINITION_EXTENSION: &str = "gen";
/// File extension of menu word lists.
pub const MENU_EXTENSION: &str = "txt";

#[derive(Debug, Clone)]
pub struct Config {
    /// Where definition files, menus and saved transcripts live.
    pub definitions_dir: Option<PathBuf>,
    /// Seed for the solver; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Search steps before the solver gives up.
    pub max_steps: usize,
    /// Number of solves per `stats` run.
    pub stats_trials: usize,
    /// Most individuals one `imagine` may ask for.
    pub max_individuals: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            definitions_dir: None,
            seed: None,
            max_steps: DEFAULT_MAX_STEPS,
            stats_trials: 100,
            max_individuals: 50,
        }
    }
}

impl Config {
    pub fn with_definitions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.definitions_dir = Some(dir.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_stats_trials(mut self, trials: usize) -> Self {
        self.stats_trials = trials;
        self
    }

    pub fn with_max_individuals(mut self, max_individuals: usize) -> Self {
        self.max_individuals = max_individuals;
        self
    }

    /// Path of a file called `name.extension` in the definitions directory,
    /// or in the working directory when none is configured.
    pub fn file(&self, name: &str, extension: &str) -> PathBuf {
        let file_name = format!("{name}.{extension}");
        match &self.definitions_dir {
            Some(dir) => dir.join(file_name),
            None => Path::new(".").join(file_name),
        }
    }
}
