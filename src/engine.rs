use crate::clock::Clock;
use crate::config::{ArenaConfig, Config};
use crate::disease::{self, Rates};
use crate::mobility;
use crate::model::{Agent, Population, Position, Status};
use crate::stats::{Report, Statistics};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

/// Complete state of a simulation run.
///
/// Holds the population, statistics, clock, and random number generator,
/// so that a run is fully determined by its seed and configurations.
#[derive(Clone, Serialize, Deserialize)]
pub struct State {
    population: Population,
    stats: Statistics,
    clock: Clock,
    rng: ChaCha12Rng,
}

impl State {
    /// Create a new `State` seeded with `seed`, with a fresh population.
    pub fn new(cfg: &Config, seed: u64) -> Result<Self> {
        let mut state = Self {
            population: Population::default(),
            stats: Statistics::new(),
            clock: Clock::new(),
            rng: ChaCha12Rng::seed_from_u64(seed),
        };
        state.reset(cfg).context("failed to generate initial condition")?;
        Ok(state)
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Rebuild the population and zero all counters and the clock.
    ///
    /// The first agent is seeded as infected and rolls for quarantine.
    /// The random number generator keeps its stream.
    pub fn reset(&mut self, cfg: &Config) -> Result<()> {
        let spawner = Spawner::new(&cfg.arena)?;
        let rates = Rates::new(cfg).context("failed to build rates")?;

        let agt_vec = (0..cfg.population.size)
            .map(|_| spawner.spawn(&mut self.rng))
            .collect();
        self.population = Population::new(agt_vec);
        self.stats = Statistics::new();
        self.clock.reset();

        if let Some(agt) = self.population.get_mut(0) {
            agt.infected = true;
            agt.infected_tick = Some(0);
            agt.quarantined = rates.quarantine().sample(&mut self.rng);
            self.stats = Statistics::with_patient_zero();
        }

        Ok(())
    }

    /// Advance the simulation by one tick using the configuration `cfg`.
    pub fn advance(&mut self, cfg: &Config) -> Result<()> {
        let rates = Rates::new(cfg).context("failed to build rates")?;

        if self.population.size() != cfg.population.size {
            let spawner = Spawner::new(&cfg.arena)?;
            let rng = &mut self.rng;
            let stats = &mut self.stats;
            self.population.resize(
                cfg.population.size,
                || spawner.spawn(rng),
                |agt| stats.record_removal(agt),
            );
            log::debug!("resized population to {}", cfg.population.size);
        }

        self.clock.advance();
        let now = self.clock.tick();
        let clock = self.clock;

        for i_agt in 0..self.population.n_slots() {
            if self.population.get(i_agt).is_none() {
                continue;
            }
            disease::progress(
                &mut self.population,
                i_agt,
                &mut self.stats,
                &rates,
                &clock,
                &mut self.rng,
            );
            if let Some(agt) = self.population.get_mut(i_agt) {
                mobility::move_agent(agt, cfg.population.movement_step, now, &mut self.rng);
            }
        }

        Ok(())
    }

    pub fn report(&self, cfg: &Config) -> Report {
        self.stats.report(
            &self.clock,
            cfg.vaccine.delay_ticks,
            self.population.size(),
        )
    }

    /// Owned copy of everything a renderer needs.
    pub fn snapshot(&self, cfg: &Config) -> Snapshot {
        let agents = self
            .population
            .iter()
            .map(|(index, agt)| AgentView {
                index,
                pos: agt.pos,
                status: agt.status(),
                color: agt.status().color(),
            })
            .collect();
        Snapshot {
            agents,
            report: self.report(cfg),
        }
    }
}

/// Advance `state` by one tick using the configuration `cfg`.
pub fn step(mut state: State, cfg: &Config) -> Result<State> {
    state.advance(cfg)?;
    Ok(state)
}

/// Read-only view of an agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub index: usize,
    pub pos: Position,
    pub status: Status,
    pub color: &'static str,
}

/// Read-only view of the simulation after a completed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub agents: Vec<AgentView>,
    pub report: Report,
}

struct Spawner {
    x_dist: Uniform<f64>,
    y_dist: Uniform<f64>,
    extent: f64,
}

impl Spawner {
    fn new(arena: &ArenaConfig) -> Result<Self> {
        Ok(Self {
            x_dist: Uniform::new(0.0, arena.width).context("invalid arena width")?,
            y_dist: Uniform::new(arena.top_margin, arena.height)
                .context("invalid arena height")?,
            extent: arena.extent_radius,
        })
    }

    fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Agent {
        let pos = Position::new(self.x_dist.sample(rng), self.y_dist.sample(rng));
        Agent::new(pos, self.extent)
    }
}

/// Run control phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the run to be started.
    Setup,
    Running,
    Paused,
}

/// Simulation engine.
///
/// Wraps a [`State`] with run control: ticks only advance while running.
pub struct Engine {
    state: State,
    phase: Phase,
}

impl Engine {
    /// Create a new `Engine` in the setup phase.
    pub fn new(cfg: &Config, seed: u64) -> Result<Self> {
        let state = State::new(cfg, seed)?;
        Ok(Self {
            state,
            phase: Phase::Setup,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Leave the setup phase and start running.
    pub fn start(&mut self) {
        if self.phase == Phase::Setup {
            self.phase = Phase::Running;
        }
    }

    /// Toggle between running and paused. Has no effect during setup.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Setup => Phase::Setup,
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
        };
    }

    /// Reinitialize the state and return to the setup phase.
    pub fn reset(&mut self, cfg: &Config) -> Result<()> {
        self.state.reset(cfg).context("failed to reset state")?;
        self.phase = Phase::Setup;
        Ok(())
    }

    /// Advance one tick if running. Returns whether a tick was performed.
    pub fn tick(&mut self, cfg: &Config) -> Result<bool> {
        if self.phase != Phase::Running {
            return Ok(false);
        }
        self.state.advance(cfg).context("failed to advance state")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crowded_config() -> Config {
        let mut cfg = Config::default();
        cfg.population.size = 20;
        cfg.arena.width = 1.0;
        cfg.arena.height = 1.0;
        cfg.arena.top_margin = 0.0;
        cfg
    }

    #[test]
    fn engine_ticks_only_while_running() {
        let cfg = crowded_config();
        let mut engine = Engine::new(&cfg, 1).unwrap();
        assert_eq!(engine.phase(), Phase::Setup);

        engine.toggle_pause();
        assert!(!engine.tick(&cfg).unwrap());
        assert_eq!(engine.state().clock().tick(), 0);

        engine.start();
        assert!(engine.tick(&cfg).unwrap());
        engine.toggle_pause();
        assert!(!engine.tick(&cfg).unwrap());
        engine.toggle_pause();
        assert!(engine.tick(&cfg).unwrap());
        assert_eq!(engine.state().clock().tick(), 2);
    }

    #[test]
    fn reset_returns_to_setup_with_one_infected() {
        let cfg = crowded_config();
        let mut engine = Engine::new(&cfg, 2).unwrap();
        engine.start();
        for _ in 0..20 {
            engine.tick(&cfg).unwrap();
        }

        engine.reset(&cfg).unwrap();
        let state = engine.state();
        assert_eq!(engine.phase(), Phase::Setup);
        assert_eq!(state.clock().tick(), 0);
        assert_eq!(state.stats(), &Statistics::with_patient_zero());
        assert_eq!(state.population().iter().filter(|(_, agt)| agt.infected).count(), 1);
    }

    #[test]
    fn severe_lethal_disease_kills_in_the_infection_tick() {
        let mut cfg = crowded_config();
        cfg.disease.virality = 1.0;
        cfg.disease.severity = 1.0;
        cfg.disease.lethality = 1.0;
        let state = step(State::new(&cfg, 3).unwrap(), &cfg).unwrap();

        let pop = state.population();
        assert!(pop.iter().skip(1).all(|(_, agt)| agt.dead && !agt.infected));
        assert_eq!(state.stats().total().dead, cfg.population.size - 1);
        assert_eq!(state.stats().current().hospitalized, 0);
    }

    #[test]
    fn snapshot_lists_live_agents() {
        let cfg = crowded_config();
        let state = State::new(&cfg, 4).unwrap();
        let snapshot = state.snapshot(&cfg);
        assert_eq!(snapshot.agents.len(), cfg.population.size);
        assert_eq!(snapshot.agents[0].status, Status::Infected);
        assert_eq!(snapshot.report.current.infected, 1);
    }
}
