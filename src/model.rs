//! Simulation data types.

use serde::{Deserialize, Serialize};

/// Position of an agent in the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Display category of an agent.
///
/// Variants are listed in priority order: the first matching flag wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Dead,
    Hospitalized,
    Infected,
    Recovered,
    Vaccinated,
    Susceptible,
}

impl Status {
    /// Color used to draw an agent with this status.
    pub fn color(self) -> &'static str {
        match self {
            Status::Dead => "red",
            Status::Hospitalized => "orange",
            Status::Infected => "yellow",
            Status::Recovered => "blue",
            Status::Vaccinated => "green",
            Status::Susceptible => "gray",
        }
    }
}

/// Agent of the simulation.
///
/// The health flags are not mutually exclusive; see [`Agent::status`]
/// for how they project onto a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub pos: Position,
    /// Half-width and half-height of the contact box.
    pub extent: f64,

    pub infected: bool,
    pub hospitalized: bool,
    pub recovered: bool,
    pub vaccinated: bool,
    pub dead: bool,
    pub quarantined: bool,

    /// Tick of the most recent infection.
    pub infected_tick: Option<u64>,
    /// Soft resistance to infection, decays while recovered or vaccinated.
    pub immunity: f64,
    /// Number of agents infected by this one.
    pub n_others_infected: usize,
}

impl Agent {
    /// Create a new susceptible agent.
    pub fn new(pos: Position, extent: f64) -> Self {
        Self {
            pos,
            extent,
            infected: false,
            hospitalized: false,
            recovered: false,
            vaccinated: false,
            dead: false,
            quarantined: false,
            infected_tick: None,
            immunity: 0.0,
            n_others_infected: 0,
        }
    }

    pub fn status(&self) -> Status {
        if self.dead {
            Status::Dead
        } else if self.hospitalized {
            Status::Hospitalized
        } else if self.infected {
            Status::Infected
        } else if self.recovered {
            Status::Recovered
        } else if self.vaccinated {
            Status::Vaccinated
        } else {
            Status::Susceptible
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Slot {
    alive: bool,
    agent: Agent,
}

/// Fixed set of agent slots.
///
/// Slots are never removed; shrinking the population tombstones the
/// trailing slots so every engine can skip them through [`Population::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    slots: Vec<Slot>,
}

impl Population {
    pub fn new(agents: Vec<Agent>) -> Self {
        let slots = agents
            .into_iter()
            .map(|agent| Slot { alive: true, agent })
            .collect();
        Self { slots }
    }

    /// Number of slots, live or tombstoned.
    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of live agents.
    pub fn size(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }

    pub fn get(&self, i_agt: usize) -> Option<&Agent> {
        self.slots
            .get(i_agt)
            .filter(|slot| slot.alive)
            .map(|slot| &slot.agent)
    }

    pub fn get_mut(&mut self, i_agt: usize) -> Option<&mut Agent> {
        self.slots
            .get_mut(i_agt)
            .filter(|slot| slot.alive)
            .map(|slot| &mut slot.agent)
    }

    /// Iterate over live agents with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Agent)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(i_agt, slot)| (i_agt, &slot.agent))
    }

    /// Resize the population to `size` live agents.
    ///
    /// Existing agents below `size` keep their state. Slots at or above
    /// `size` are tombstoned, passing each agent removed this way to
    /// `retire`. Every slot that becomes live again or is appended holds a
    /// fresh agent from `spawn`.
    pub fn resize<F, G>(&mut self, size: usize, mut spawn: F, mut retire: G)
    where
        F: FnMut() -> Agent,
        G: FnMut(&Agent),
    {
        for (i_agt, slot) in self.slots.iter_mut().enumerate() {
            if i_agt >= size {
                if slot.alive {
                    slot.alive = false;
                    retire(&slot.agent);
                }
            } else if !slot.alive {
                *slot = Slot {
                    alive: true,
                    agent: spawn(),
                };
            }
        }
        while self.slots.len() < size {
            self.slots.push(Slot {
                alive: true,
                agent: spawn(),
            });
        }
    }
}
