use std::path::PathBuf;

use clap::Parser;
use imaginarium::Config;

#[derive(Debug, Parser)]
#[command(name = "imaginarium")]
#[command(bin_name = "imaginarium")]
#[command(about = "Describe a world in restricted English, then imagine examples of it", long_about = None)]
pub struct ImaginariumCli {
    /// Directory holding definition files (<noun>.gen) and menus (<menu>.txt)
    #[arg(short, long)]
    pub definitions: Option<PathBuf>,

    /// Seed for the solver; omit for a different world every run
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Search steps before the solver gives up
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Number of solves per `stats` run
    #[arg(long)]
    pub trials: Option<usize>,

    /// Most things one `imagine` may ask for
    #[arg(long)]
    pub max_individuals: Option<usize>,

    /// Log committed statements and solver activity
    #[arg(short, long)]
    pub verbose: bool,

    /// Run the statements in this file, then exit
    pub script: Option<PathBuf>,
}

impl ImaginariumCli {
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(dir) = &self.definitions {
            config = config.with_definitions_dir(dir);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(max_steps) = self.max_steps {
            config = config.with_max_steps(max_steps);
        }
        if let Some(trials) = self.trials {
            config = config.with_stats_trials(trials);
        }
        if let Some(max_individuals) = self.max_individuals {
            config = config.with_max_individuals(max_individuals);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn flags_map_onto_the_config() -> TestResult {
        let cli = ImaginariumCli::try_parse_from([
            "imaginarium",
            "--definitions",
            "worlds",
            "--seed",
            "7",
            "--trials",
            "10",
            "--max-individuals",
            "20",
            "cats.gen",
        ])?;
        let config = cli.config();
        assert_eq!(config.definitions_dir, Some(PathBuf::from("worlds")));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.stats_trials, 10);
        assert_eq!(config.max_individuals, 20);
        assert_eq!(cli.script, Some(PathBuf::from("cats.gen")));
        Ok(())
    }
}
