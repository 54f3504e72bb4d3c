use crate::clock::Clock;
use crate::model::Agent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of agents currently in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub infected: usize,
    pub recovered: usize,
    pub vaccinated: usize,
    pub dead: usize,
    pub hospitalized: usize,
}

/// Number of times each state has been entered since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub infected: usize,
    pub recovered: usize,
    pub vaccinated: usize,
    pub dead: usize,
    pub hospitalized: usize,
    pub quarantined: usize,
}

/// Population statistics, updated incrementally as transitions occur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    current: Counts,
    total: Totals,
    n_infections: usize,
    n_infectors: usize,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics of a freshly seeded run with a single infected agent.
    pub fn with_patient_zero() -> Self {
        let mut stats = Self::new();
        stats.current.infected = 1;
        stats.total.infected = 1;
        stats
    }

    pub fn current(&self) -> &Counts {
        &self.current
    }

    pub fn total(&self) -> &Totals {
        &self.total
    }

    /// Number of transmission events.
    pub fn n_infections(&self) -> usize {
        self.n_infections
    }

    /// Number of agents that infected at least one other agent.
    pub fn n_infectors(&self) -> usize {
        self.n_infectors
    }

    pub fn is_eradicated(&self) -> bool {
        self.current.infected == 0
    }

    /// Mean number of onward infections per infector.
    pub fn mean_onward_transmissions(&self) -> f64 {
        if self.n_infectors == 0 {
            return 0.0;
        }
        self.n_infections as f64 / self.n_infectors as f64
    }

    /// Fraction of the living population that has been vaccinated.
    pub fn vaccination_coverage(&self, population_size: usize) -> f64 {
        let n_living = population_size.saturating_sub(self.current.dead);
        if n_living == 0 {
            return 0.0;
        }
        self.current.vaccinated as f64 / n_living as f64
    }

    pub fn report(&self, clock: &Clock, vaccine_delay: u64, population_size: usize) -> Report {
        Report {
            tick: clock.tick(),
            day: clock.day(),
            current: self.current,
            total: self.total,
            mean_onward_transmissions: self.mean_onward_transmissions(),
            vaccine_readiness: clock.vaccine_readiness(vaccine_delay),
            vaccination_coverage: self.vaccination_coverage(population_size),
        }
    }

    pub(crate) fn record_infection(&mut self, was_recovered: bool) {
        self.current.infected += 1;
        self.total.infected += 1;
        if was_recovered {
            self.current.recovered -= 1;
        }
    }

    pub(crate) fn record_transmission(&mut self, first_by_infector: bool) {
        self.n_infections += 1;
        if first_by_infector {
            self.n_infectors += 1;
        }
    }

    pub(crate) fn record_hospitalization(&mut self) {
        self.current.hospitalized += 1;
        self.total.hospitalized += 1;
    }

    pub(crate) fn record_death(&mut self, was_hospitalized: bool) {
        if was_hospitalized {
            self.current.hospitalized -= 1;
        }
        self.current.infected -= 1;
        self.current.dead += 1;
        self.total.dead += 1;
    }

    pub(crate) fn record_quarantine(&mut self) {
        self.total.quarantined += 1;
    }

    pub(crate) fn record_recovery(&mut self, was_hospitalized: bool) {
        if was_hospitalized {
            self.current.hospitalized -= 1;
        }
        self.current.infected -= 1;
        self.current.recovered += 1;
        self.total.recovered += 1;
    }

    pub(crate) fn record_vaccination(&mut self) {
        self.current.vaccinated += 1;
        self.total.vaccinated += 1;
    }

    /// Drop a removed agent from the current counts. Totals keep its history.
    pub(crate) fn record_removal(&mut self, agt: &Agent) {
        self.current.infected -= agt.infected as usize;
        self.current.recovered -= agt.recovered as usize;
        self.current.vaccinated -= agt.vaccinated as usize;
        self.current.dead -= agt.dead as usize;
        self.current.hospitalized -= agt.hospitalized as usize;
    }
}

/// Statistics at a given tick, with derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub tick: u64,
    pub day: u64,
    pub current: Counts,
    pub total: Totals,
    pub mean_onward_transmissions: f64,
    /// Fraction of vaccine development completed, while still in development.
    pub vaccine_readiness: Option<f64>,
    pub vaccination_coverage: f64,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cur, tot) = (&self.current, &self.total);
        write!(
            f,
            "day {} | infected {} ({}) | hospitalized {} ({}) | dead {} ({}) | recovered {} ({}) \
             | vaccinated {} ({}) | R {:.2}",
            self.day,
            cur.infected,
            tot.infected,
            cur.hospitalized,
            tot.hospitalized,
            cur.dead,
            tot.dead,
            cur.recovered,
            tot.recovered,
            cur.vaccinated,
            tot.vaccinated,
            self.mean_onward_transmissions,
        )?;
        match self.vaccine_readiness {
            Some(readiness) => write!(f, " | vaccine {:.0}% complete", 100.0 * readiness),
            None => write!(f, " | coverage {:.0}%", 100.0 * self.vaccination_coverage),
        }
    }
}

/// Online mean and standard deviation (Welford's algorithm).
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onward_transmissions_default_to_zero() {
        let stats = Statistics::with_patient_zero();
        assert_eq!(stats.mean_onward_transmissions(), 0.0);
    }

    #[test]
    fn onward_transmissions_average_over_infectors() {
        let mut stats = Statistics::new();
        stats.record_transmission(true);
        stats.record_transmission(false);
        stats.record_transmission(false);
        stats.record_transmission(true);
        assert_eq!(stats.n_infections(), 4);
        assert_eq!(stats.n_infectors(), 2);
        assert_eq!(stats.mean_onward_transmissions(), 2.0);
    }

    #[test]
    fn coverage_excludes_the_dead() {
        let mut stats = Statistics::with_patient_zero();
        stats.record_hospitalization();
        stats.record_death(true);
        stats.record_vaccination();
        assert_eq!(stats.current().hospitalized, 0);
        assert_eq!(stats.vaccination_coverage(5), 0.25);
        assert_eq!(stats.vaccination_coverage(1), 0.0);
    }

    #[test]
    fn reinfection_moves_recovered_back_to_infected() {
        let mut stats = Statistics::with_patient_zero();
        stats.record_recovery(false);
        stats.record_infection(true);
        assert_eq!(stats.current().recovered, 0);
        assert_eq!(stats.current().infected, 1);
        assert_eq!(stats.total().recovered, 1);
        assert_eq!(stats.total().infected, 2);
    }

    #[test]
    fn removal_retires_current_counts_only() {
        let mut stats = Statistics::with_patient_zero();
        stats.record_hospitalization();
        stats.record_vaccination();

        let mut agt = Agent::new(Default::default(), 20.0);
        agt.infected = true;
        agt.hospitalized = true;
        agt.vaccinated = true;
        stats.record_removal(&agt);

        assert_eq!(*stats.current(), Counts::default());
        assert!(stats.is_eradicated());
        assert_eq!(stats.total().infected, 1);
        assert_eq!(stats.total().hospitalized, 1);
        assert_eq!(stats.total().vaccinated, 1);
    }

    #[test]
    fn report_displays_readiness_or_coverage() {
        let stats = Statistics::with_patient_zero();
        let clock = Clock::new();
        let line = stats.report(&clock, 10, 100).to_string();
        assert!(line.starts_with("day 0 | infected 1 (1)"));
        assert!(line.ends_with("vaccine 0% complete"));
        let line = stats.report(&clock, 0, 100).to_string();
        assert!(line.ends_with("coverage 0%"));
    }

    #[test]
    fn accumulator_mean_and_std_dev() {
        let mut acc = Accumulator::new();
        for val in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            acc.add(val);
        }
        let report = acc.report();
        assert!((report.mean - 5.0).abs() < 1e-12);
        assert!((report.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(Accumulator::new().report().std_dev.is_nan());
    }
}
