use crate::clock::Clock;
use crate::config::{Config, clamp_prob};
use crate::contact::contacts;
use crate::model::{Agent, Population, Status};
use crate::stats::Statistics;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_distr::Bernoulli;

/// Immunity lost per tick by recovered and vaccinated agents.
pub const IMMUNITY_DECAY: f64 = 0.00001;

/// Per-tick snapshot of the disease and vaccine parameters.
pub struct Rates {
    virality: Bernoulli,
    severity: Bernoulli,
    lethality: Bernoulli,
    quarantine: Bernoulli,
    vaccination: Bernoulli,
    efficacy: Bernoulli,
    infectious_period: f64,
    vaccine_delay: u64,
}

impl Rates {
    /// Build the rates of `cfg`, clamping probabilities into `[0, 1]`.
    pub fn new(cfg: &Config) -> Result<Self> {
        let bernoulli = |prob: f64| Bernoulli::new(clamp_prob(prob));
        Ok(Self {
            virality: bernoulli(cfg.disease.virality).context("invalid virality")?,
            severity: bernoulli(cfg.disease.severity).context("invalid severity")?,
            lethality: bernoulli(cfg.disease.lethality).context("invalid lethality")?,
            quarantine: bernoulli(cfg.population.quarantine_probability)
                .context("invalid quarantine probability")?,
            vaccination: bernoulli(cfg.vaccine.rate_per_tick).context("invalid vaccination rate")?,
            efficacy: bernoulli(cfg.vaccine.efficacy).context("invalid vaccine efficacy")?,
            infectious_period: cfg.disease.infectious_period_ticks as f64,
            vaccine_delay: cfg.vaccine.delay_ticks,
        })
    }

    pub fn quarantine(&self) -> &Bernoulli {
        &self.quarantine
    }
}

/// Apply one tick of disease progression to agent `i_agt`.
///
/// Runs infection, recovery, vaccination and status resolution in that
/// order, each step observing the effects of the previous ones.
pub fn progress<R: Rng + ?Sized>(
    pop: &mut Population,
    i_agt: usize,
    stats: &mut Statistics,
    rates: &Rates,
    clock: &Clock,
    rng: &mut R,
) {
    if pop.get(i_agt).is_none() {
        return;
    }
    let now = clock.tick();

    infect(pop, i_agt, stats, rates, now, rng);

    let Some(agt) = pop.get_mut(i_agt) else {
        return;
    };
    recover(agt, stats, rates, now, rng);
    vaccinate(agt, stats, rates, clock, rng);
    resolve_status(agt);
}

fn infect<R: Rng + ?Sized>(
    pop: &mut Population,
    i_agt: usize,
    stats: &mut Statistics,
    rates: &Rates,
    now: u64,
    rng: &mut R,
) {
    let Some(agt) = pop.get(i_agt) else {
        return;
    };
    if agt.infected || agt.dead {
        return;
    }
    let immunity = agt.immunity;

    // The first infectious contact whose draws both succeed is the infector.
    let mut infector = None;
    for j_agt in contacts(pop, i_agt) {
        if !pop.get(j_agt).is_some_and(|other| other.infected) {
            continue;
        }
        if rates.virality.sample(rng) && immunity < rng.random::<f64>() {
            infector = Some(j_agt);
            break;
        }
    }
    let Some(j_agt) = infector else {
        return;
    };

    if let Some(other) = pop.get_mut(j_agt) {
        other.n_others_infected += 1;
        stats.record_transmission(other.n_others_infected == 1);
    }

    let Some(agt) = pop.get_mut(i_agt) else {
        return;
    };
    agt.infected = true;
    agt.infected_tick = Some(now);
    let was_recovered = std::mem::take(&mut agt.recovered);
    stats.record_infection(was_recovered);

    hospitalize(agt, stats, rates, rng);
    quarantine(agt, stats, rates, rng);
}

fn hospitalize<R: Rng + ?Sized>(
    agt: &mut Agent,
    stats: &mut Statistics,
    rates: &Rates,
    rng: &mut R,
) {
    if agt.hospitalized || !rates.severity.sample(rng) {
        return;
    }
    agt.hospitalized = true;
    stats.record_hospitalization();

    if rates.lethality.sample(rng) {
        agt.infected = false;
        let was_hospitalized = std::mem::take(&mut agt.hospitalized);
        agt.dead = true;
        stats.record_death(was_hospitalized);
    }
}

fn quarantine<R: Rng + ?Sized>(agt: &mut Agent, stats: &mut Statistics, rates: &Rates, rng: &mut R) {
    if !agt.hospitalized && rates.quarantine.sample(rng) {
        agt.quarantined = true;
        stats.record_quarantine();
    }
}

fn recover<R: Rng + ?Sized>(
    agt: &mut Agent,
    stats: &mut Statistics,
    rates: &Rates,
    now: u64,
    rng: &mut R,
) {
    if !agt.infected || agt.recovered {
        return;
    }

    // Threshold is redrawn on every check, uniform over the upper half of the period.
    let half_period = rates.infectious_period / 2.0;
    let threshold = half_period + rng.random::<f64>() * half_period;
    let elapsed = now.saturating_sub(agt.infected_tick.unwrap_or(0));
    if elapsed as f64 <= threshold {
        return;
    }

    agt.infected = false;
    agt.recovered = true;
    agt.immunity = 1.0;
    agt.quarantined = false;
    let was_hospitalized = std::mem::take(&mut agt.hospitalized);
    stats.record_recovery(was_hospitalized);
}

fn vaccinate<R: Rng + ?Sized>(
    agt: &mut Agent,
    stats: &mut Statistics,
    rates: &Rates,
    clock: &Clock,
    rng: &mut R,
) {
    if agt.infected || agt.vaccinated {
        return;
    }
    if !rates.vaccination.sample(rng) || !clock.vaccine_available(rates.vaccine_delay) {
        return;
    }

    agt.vaccinated = true;
    stats.record_vaccination();
    agt.immunity = if rates.efficacy.sample(rng) { 1.0 } else { 0.0 };
}

fn resolve_status(agt: &mut Agent) {
    if matches!(agt.status(), Status::Recovered | Status::Vaccinated) {
        agt.immunity -= IMMUNITY_DECAY;
    }
}
