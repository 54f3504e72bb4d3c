use serde::{Deserialize, Serialize};

/// Number of ticks in a simulated day.
pub const TICKS_PER_DAY: u64 = 30;

/// Simulation clock counting elapsed ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    tick: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    /// Clock stopped at `tick`.
    pub fn at(tick: u64) -> Self {
        Self { tick }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn reset(&mut self) {
        self.tick = 0;
    }

    /// Current day, counting a partially elapsed day as a full one.
    pub fn day(&self) -> u64 {
        self.tick.div_ceil(TICKS_PER_DAY)
    }

    pub fn vaccine_available(&self, delay_ticks: u64) -> bool {
        self.tick > delay_ticks
    }

    /// Fraction of vaccine development completed, while still below the delay.
    pub fn vaccine_readiness(&self, delay_ticks: u64) -> Option<f64> {
        if self.tick < delay_ticks {
            Some(self.tick as f64 / delay_ticks as f64)
        } else {
            None
        }
    }
}
