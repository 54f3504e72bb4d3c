use crate::engine::State;
use crate::stats::Accumulator;
use serde_json::json;

/// Observable measured once per tick over a run.
pub trait Obs {
    fn update(&mut self, state: &State);
    fn report(&self) -> serde_json::Value;
}

/// Largest number of simultaneously infected agents.
pub struct PeakPrevalence {
    peak: usize,
    tick: u64,
}

impl PeakPrevalence {
    pub fn new() -> Self {
        Self { peak: 0, tick: 0 }
    }
}

impl Obs for PeakPrevalence {
    fn update(&mut self, state: &State) {
        let infected = state.stats().current().infected;
        if infected > self.peak {
            self.peak = infected;
            self.tick = state.clock().tick();
        }
    }

    fn report(&self) -> serde_json::Value {
        json!({ "peak_prevalence": { "infected": self.peak, "tick": self.tick } })
    }
}

/// First tick with no infected agent.
pub struct Eradication {
    tick: Option<u64>,
}

impl Eradication {
    pub fn new() -> Self {
        Self { tick: None }
    }
}

impl Obs for Eradication {
    fn update(&mut self, state: &State) {
        if self.tick.is_none() && state.stats().is_eradicated() {
            self.tick = Some(state.clock().tick());
        }
    }

    fn report(&self) -> serde_json::Value {
        json!({ "eradication_tick": self.tick })
    }
}

/// Mean and standard deviation of the number of infected agents.
pub struct Prevalence {
    acc: Accumulator,
}

impl Prevalence {
    pub fn new() -> Self {
        Self {
            acc: Accumulator::new(),
        }
    }
}

impl Obs for Prevalence {
    fn update(&mut self, state: &State) {
        self.acc.add(state.stats().current().infected as f64);
    }

    fn report(&self) -> serde_json::Value {
        json!({ "prevalence": self.acc.report() })
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new() -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(PeakPrevalence::new()),
            Box::new(Eradication::new()),
            Box::new(Prevalence::new()),
        ];
        Self { obs_ptr_vec }
    }

    pub fn update(&mut self, state: &State) {
        for obs in &mut self.obs_ptr_vec {
            obs.update(state);
        }
    }

    pub fn report(&self) -> serde_json::Value {
        let reports: Vec<_> = self.obs_ptr_vec.iter().map(|obs| obs.report()).collect();
        serde_json::Value::Array(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn observables_track_a_run_to_eradication() {
        let mut cfg = Config::default();
        cfg.population.size = 10;
        cfg.disease.virality = 0.0;
        cfg.disease.infectious_period_ticks = 10;

        let mut state = State::new(&cfg, 7).unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.update(&state);
        for _ in 0..20 {
            state.advance(&cfg).unwrap();
            analyzer.update(&state);
        }

        let report = analyzer.report();
        assert_eq!(report[0]["peak_prevalence"]["infected"], 1);
        assert_eq!(report[0]["peak_prevalence"]["tick"], 0);
        let tick = report[1]["eradication_tick"].as_u64().unwrap();
        assert!((6..=10).contains(&tick));
    }
}
