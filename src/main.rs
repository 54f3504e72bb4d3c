use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use episim::manager::{Manager, save_results};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Run {
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    Batch {
        #[arg(long)]
        runs: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    Check,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(&args.config).context("failed to construct mgr")?;

    match args.command {
        Command::Run { seed, output } => {
            let seed = seed.unwrap_or_else(|| mgr.default_seed());
            let outcome = mgr.run_simulation(seed)?;
            log::info!("{}", outcome.report);
            save_results(&outcome, output)?;
        }
        Command::Batch { runs, seed, output } => {
            let seed = seed.unwrap_or_else(|| mgr.default_seed());
            let outcome = mgr.run_batch(runs, seed)?;
            save_results(&outcome, output)?;
        }
        Command::Check => log::info!("config is valid"),
    }

    Ok(())
}
