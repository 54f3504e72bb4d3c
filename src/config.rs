use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Disease parameters.
    pub disease: DiseaseConfig,
    /// Vaccine parameters.
    pub vaccine: VaccineConfig,
    /// Population parameters.
    pub population: PopulationConfig,
    /// Arena geometry.
    pub arena: ArenaConfig,
    /// Run parameters.
    pub run: RunConfig,
}

/// Disease parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DiseaseConfig {
    /// Probability of transmission per infectious contact and tick.
    pub virality: f64,
    /// Probability of hospitalization at infection.
    pub severity: f64,
    /// Probability of death once hospitalized.
    pub lethality: f64,
    /// Upper bound of the duration of an infection (ticks).
    pub infectious_period_ticks: u64,
}

/// Vaccine parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct VaccineConfig {
    /// Number of ticks before the vaccine becomes available.
    pub delay_ticks: u64,
    /// Probability of vaccination per eligible agent and tick.
    pub rate_per_tick: f64,
    /// Probability that a dose grants immunity.
    pub efficacy: f64,
}

/// Population parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents.
    pub size: usize,
    /// Distance covered by a moving agent per tick.
    pub movement_step: f64,
    /// Probability that a newly infected agent quarantines.
    pub quarantine_probability: f64,
}

/// Arena geometry.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
    /// Agents spawn below this height.
    pub top_margin: f64,
    /// Half-size of the contact box of each agent.
    pub extent_radius: f64,
}

/// Run parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum number of ticks per run.
    pub max_ticks: u64,
    /// Stop a run as soon as no agent is infected.
    pub stop_on_eradication: bool,
    /// Seed of the random number generator.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            disease: DiseaseConfig {
                virality: 0.05,
                severity: 0.1,
                lethality: 0.1,
                infectious_period_ticks: 420,
            },
            vaccine: VaccineConfig {
                delay_ticks: 900,
                rate_per_tick: 0.0002,
                efficacy: 0.8,
            },
            population: PopulationConfig {
                size: 500,
                movement_step: 10.0,
                quarantine_probability: 0.5,
            },
            arena: ArenaConfig {
                width: 1200.0,
                height: 800.0,
                top_margin: 200.0,
                extent_radius: 20.0,
            },
            run: RunConfig {
                max_ticks: 18_000,
                stop_on_eradication: true,
                seed: None,
            },
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let disease = &self.disease;
        check_num(disease.virality, 0.0..=1.0).context("invalid virality")?;
        check_num(disease.severity, 0.0..=1.0).context("invalid severity")?;
        check_num(disease.lethality, 0.0..=1.0).context("invalid lethality")?;
        check_num(disease.infectious_period_ticks, 1..1_000_000)
            .context("invalid infectious period")?;

        let vaccine = &self.vaccine;
        check_num(vaccine.delay_ticks, 0..1_000_000).context("invalid vaccine delay")?;
        check_num(vaccine.rate_per_tick, 0.0..=1.0).context("invalid vaccination rate")?;
        check_num(vaccine.efficacy, 0.0..=1.0).context("invalid vaccine efficacy")?;

        let population = &self.population;
        check_num(population.size, 1..100_000).context("invalid population size")?;
        check_num(population.movement_step, 0.0..1_000.0).context("invalid movement step")?;
        check_num(population.quarantine_probability, 0.0..=1.0)
            .context("invalid quarantine probability")?;

        let arena = &self.arena;
        check_num(arena.width, 1.0..1e6).context("invalid arena width")?;
        check_num(arena.height, 1.0..1e6).context("invalid arena height")?;
        if arena.top_margin < 0.0 || arena.top_margin >= arena.height {
            bail!(
                "top margin must be in the range 0.0..{:?}, but is {:?}",
                arena.height,
                arena.top_margin
            );
        }
        check_num(arena.extent_radius, 0.0..1_000.0).context("invalid extent radius")?;

        check_num(self.run.max_ticks, 1..100_000_000).context("invalid maximum number of ticks")?;

        Ok(())
    }
}

/// Clamp a probability into `[0, 1]`, mapping NaN to 0.
pub fn clamp_prob(prob: f64) -> f64 {
    if prob.is_nan() { 0.0 } else { prob.clamp(0.0, 1.0) }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
[disease]
virality = 0.3
severity = 0.2
lethality = 0.1
infectious_period_ticks = 600

[vaccine]
delay_ticks = 30
rate_per_tick = 0.01
efficacy = 0.5

[population]
size = 100
movement_step = 5.0
quarantine_probability = 0.5

[arena]
width = 200.0
height = 200.0
top_margin = 0.0
extent_radius = 20.0

[run]
max_ticks = 1000
stop_on_eradication = false
"#;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn parses_toml_without_seed() {
        let cfg: Config = toml::from_str(TOML).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.population.size, 100);
        assert_eq!(cfg.disease.infectious_period_ticks, 600);
        assert_eq!(cfg.run.seed, None);
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let mut cfg = Config::default();
        cfg.disease.virality = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("invalid virality"));
    }

    #[test]
    fn rejects_top_margin_beyond_height() {
        let mut cfg = Config::default();
        cfg.arena.top_margin = cfg.arena.height;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn clamps_probabilities() {
        assert_eq!(clamp_prob(-0.5), 0.0);
        assert_eq!(clamp_prob(2.0), 1.0);
        assert_eq!(clamp_prob(f64::NAN), 0.0);
        assert_eq!(clamp_prob(0.25), 0.25);
    }
}
