use crate::analysis::Analyzer;
use crate::clock::TICKS_PER_DAY;
use crate::config::Config;
use crate::engine::Engine;
use crate::stats::{Accumulator, AccumulatorReport, Report};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Outcome of a single run.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub report: Report,
    pub observables: serde_json::Value,
}

/// Statistics of the final reports of a batch of runs.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub n_runs: usize,
    pub first_seed: u64,
    pub n_eradicated: usize,
    pub total_infected: AccumulatorReport,
    pub total_hospitalized: AccumulatorReport,
    pub total_dead: AccumulatorReport,
    pub mean_onward_transmissions: AccumulatorReport,
    pub duration_ticks: AccumulatorReport,
}

pub struct Manager {
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let cfg = Config::from_file(config_file).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { cfg })
    }

    pub fn from_config(cfg: Config) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// Seed to use when none is given on the command line.
    pub fn default_seed(&self) -> u64 {
        self.cfg.run.seed.unwrap_or_else(rand::random)
    }

    /// Run a single simulation to completion.
    pub fn run_simulation(&self, seed: u64) -> Result<RunOutcome> {
        log::info!("starting run with seed {seed}");

        let mut engine = Engine::new(&self.cfg, seed).context("failed to construct engine")?;
        let mut analyzer = Analyzer::new();
        analyzer.update(engine.state());

        engine.start();
        for _ in 0..self.cfg.run.max_ticks {
            let ticked = engine.tick(&self.cfg).context("failed to perform tick")?;
            debug_assert!(ticked, "engine left the running phase mid-run");

            let state = engine.state();
            analyzer.update(state);

            let tick = state.clock().tick();
            log::debug!("tick {tick}: {}", state.report(&self.cfg));
            if tick % TICKS_PER_DAY == 0 {
                log::info!("{}", state.report(&self.cfg));
            }

            if self.cfg.run.stop_on_eradication && state.stats().is_eradicated() {
                log::info!("the disease has been eradicated at tick {tick}");
                break;
            }
        }

        Ok(RunOutcome {
            seed,
            report: engine.state().report(&self.cfg),
            observables: analyzer.report(),
        })
    }

    /// Run `n_runs` simulations with consecutive seeds starting at `first_seed`.
    pub fn run_batch(&self, n_runs: usize, first_seed: u64) -> Result<BatchOutcome> {
        let mut n_eradicated = 0;
        let mut total_infected = Accumulator::new();
        let mut total_hospitalized = Accumulator::new();
        let mut total_dead = Accumulator::new();
        let mut mean_onward = Accumulator::new();
        let mut duration = Accumulator::new();

        for i_run in 0..n_runs {
            let seed = first_seed.wrapping_add(i_run as u64);
            let outcome = self
                .run_simulation(seed)
                .with_context(|| format!("failed to perform run {i_run}"))?;

            let report = &outcome.report;
            if report.current.infected == 0 {
                n_eradicated += 1;
            }
            total_infected.add(report.total.infected as f64);
            total_hospitalized.add(report.total.hospitalized as f64);
            total_dead.add(report.total.dead as f64);
            mean_onward.add(report.mean_onward_transmissions);
            duration.add(report.tick as f64);

            let progress = 100.0 * (i_run + 1) as f64 / n_runs as f64;
            log::info!("completed {progress:06.2}%");
        }

        Ok(BatchOutcome {
            n_runs,
            first_seed,
            n_eradicated,
            total_infected: total_infected.report(),
            total_hospitalized: total_hospitalized.report(),
            total_dead: total_dead.report(),
            mean_onward_transmissions: mean_onward.report(),
            duration_ticks: duration.report(),
        })
    }
}

/// Write `results` as pretty JSON to `file`, or to stdout if `None`.
pub fn save_results<T: Serialize, P: AsRef<Path>>(results: &T, file: Option<P>) -> Result<()> {
    let mut writer: Box<dyn Write> = match file {
        Some(file) => {
            let file = file.as_ref();
            let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    serde_json::to_writer_pretty(&mut writer, results).context("failed to serialize results")?;
    writeln!(writer).context("failed to write results")?;
    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}
