use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use imaginarium::OntologyContext;
use imaginarium_cli::{cli::ImaginariumCli, run};
use tracing_subscriber::EnvFilter;

pub fn main() -> Result<()> {
    let cli = ImaginariumCli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut context = OntologyContext::new(cli.config());
    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("can't open script {}", path.display()))?;
            run(&mut context, BufReader::new(file), io::stdout(), false)?;
        }
        None => run(&mut context, io::stdin().lock(), io::stdout(), true)?,
    }
    Ok(())
}
