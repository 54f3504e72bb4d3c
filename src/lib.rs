//! Agent-based epidemic simulation.
//!
//! A fixed population of mobile agents moves through a 2D arena. Each tick,
//! agents in contact may transmit the disease, and infected agents may be
//! hospitalized, die, quarantine or recover, while vaccination slowly
//! protects the population.

pub mod analysis;
pub mod clock;
pub mod config;
pub mod contact;
pub mod disease;
pub mod engine;
pub mod manager;
pub mod mobility;
pub mod model;
pub mod stats;
