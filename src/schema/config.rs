//! Evolution configuration types.
//!
//! The configuration is an explicit object passed into the engine rather than
//! ambient state, so multiple independent runs can coexist and tests stay
//! isolated.

use serde::{Deserialize, Serialize};

/// Top-level configuration for an evolutionary ASCII art run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of chromosomes per generation. Constant across the run.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of generations to run before terminating.
    #[serde(default = "default_generation_count")]
    pub generation_count: usize,
    /// Number of fittest chromosomes carried unchanged into the next
    /// generation. Must be smaller than the population size.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
    /// Tournament size for parent selection.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Adaptive mutation-rate schedule.
    #[serde(default)]
    pub mutation: MutationSchedule,
    /// Periodic diversity injection.
    #[serde(default)]
    pub diversity: DiversityConfig,
    /// Block similarity metric.
    #[serde(default)]
    pub metric: SimilarityMetricKind,
    /// Random seed for reproducibility. `None` seeds from entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generation_count: default_generation_count(),
            elitism: default_elitism(),
            tournament_size: default_tournament_size(),
            mutation: MutationSchedule::default(),
            diversity: DiversityConfig::default(),
            metric: SimilarityMetricKind::default(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    100
}
fn default_generation_count() -> usize {
    500
}
fn default_elitism() -> usize {
    2
}
fn default_tournament_size() -> usize {
    3
}

/// Hysteresis schedule for the per-cell mutation rate.
///
/// While the trailing mean-fitness improvement stays at or below `epsilon`
/// the rate climbs by `increase_step` up to `max_rate`; once progress resumes
/// it falls by `decrease_step` down to `base_rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationSchedule {
    /// Floor of the mutation rate, also the starting rate.
    #[serde(default = "default_base_rate")]
    pub base_rate: f32,
    /// Ceiling of the mutation rate under sustained stagnation.
    #[serde(default = "default_max_rate")]
    pub max_rate: f32,
    /// Rate increase applied per stagnant generation.
    #[serde(default = "default_increase_step")]
    pub increase_step: f32,
    /// Rate decrease applied per improving generation.
    #[serde(default = "default_decrease_step")]
    pub decrease_step: f32,
    /// Number of trailing generations compared for stagnation.
    #[serde(default = "default_stagnation_window")]
    pub stagnation_window: usize,
    /// Mean-fitness improvement at or below this counts as stagnation.
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
}

impl Default for MutationSchedule {
    fn default() -> Self {
        Self {
            base_rate: default_base_rate(),
            max_rate: default_max_rate(),
            increase_step: default_increase_step(),
            decrease_step: default_decrease_step(),
            stagnation_window: default_stagnation_window(),
            epsilon: default_epsilon(),
        }
    }
}

fn default_base_rate() -> f32 {
    0.02
}
fn default_max_rate() -> f32 {
    0.25
}
fn default_increase_step() -> f32 {
    0.02
}
fn default_decrease_step() -> f32 {
    0.005
}
fn default_stagnation_window() -> usize {
    10
}
fn default_epsilon() -> f32 {
    1e-4
}

/// Periodic reseeding of part of the population with fresh random
/// chromosomes, to recover diversity lost to selection pressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityConfig {
    /// Inject every this many generations. `0` disables injection.
    #[serde(default = "default_injection_interval")]
    pub interval: usize,
    /// Fraction of population slots overwritten per injection event. Slots
    /// are drawn without replacement, so the turnover is exact.
    #[serde(default = "default_injection_fraction")]
    pub fraction: f32,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            interval: default_injection_interval(),
            fraction: default_injection_fraction(),
        }
    }
}

fn default_injection_interval() -> usize {
    25
}
fn default_injection_fraction() -> f32 {
    0.1
}

/// Which block similarity metric to evaluate candidates with.
///
/// Every metric scores in `[0.0, 1.0]` with higher meaning more similar; the
/// engine relies only on that contract, never on a particular metric's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum SimilarityMetricKind {
    /// One minus the normalized mean absolute intensity difference.
    #[default]
    NormalizedIntensity,
    /// Single-window structural similarity (SSIM), remapped to `[0, 1]`.
    Structural,
}

/// Configuration validation errors, detected before any generation runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Alphabet must contain at least one character")]
    EmptyAlphabet,
    #[error("Target grid must have non-zero dimensions")]
    ZeroGrid,
    #[error("Population size must be non-zero")]
    ZeroPopulation,
    #[error("Elitism count {elitism} must be smaller than population size {population}")]
    ElitismTooLarge { elitism: usize, population: usize },
    #[error("Tournament size must be at least 1")]
    ZeroTournament,
    #[error("Tournament size {tournament} exceeds population size {population}")]
    TournamentTooLarge { tournament: usize, population: usize },
    #[error("Mutation rates must satisfy 0 <= base_rate <= max_rate <= 1")]
    InvalidMutationBounds,
    #[error("Mutation rate steps must be non-negative")]
    NegativeRateStep,
    #[error("Stagnation window must be at least 1")]
    ZeroStagnationWindow,
    #[error("Injection fraction {0} must lie in [0, 1]")]
    InvalidInjectionFraction(f32),
    #[error("Glyph block size {glyph:?} does not match target block size {target:?}")]
    BlockSizeMismatch {
        glyph: (usize, usize),
        target: (usize, usize),
    },
}

impl EvolutionConfig {
    /// Validate the configuration's internal consistency. Cross-checks
    /// against the alphabet and image data happen in the engine constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.elitism >= self.population_size {
            return Err(ConfigError::ElitismTooLarge {
                elitism: self.elitism,
                population: self.population_size,
            });
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::ZeroTournament);
        }
        if self.tournament_size > self.population_size {
            return Err(ConfigError::TournamentTooLarge {
                tournament: self.tournament_size,
                population: self.population_size,
            });
        }

        let m = &self.mutation;
        if !(0.0..=1.0).contains(&m.base_rate)
            || !(0.0..=1.0).contains(&m.max_rate)
            || m.base_rate > m.max_rate
        {
            return Err(ConfigError::InvalidMutationBounds);
        }
        if m.increase_step < 0.0 || m.decrease_step < 0.0 {
            return Err(ConfigError::NegativeRateStep);
        }
        if m.stagnation_window == 0 {
            return Err(ConfigError::ZeroStagnationWindow);
        }

        if !(0.0..=1.0).contains(&self.diversity.fraction) {
            return Err(ConfigError::InvalidInjectionFraction(
                self.diversity.fraction,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_elitism_must_be_below_population() {
        let config = EvolutionConfig {
            population_size: 4,
            elitism: 4,
            tournament_size: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ElitismTooLarge { .. })
        ));
    }

    #[test]
    fn test_tournament_must_fit_population() {
        let config = EvolutionConfig {
            population_size: 4,
            elitism: 1,
            tournament_size: 5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TournamentTooLarge { .. })
        ));
    }

    #[test]
    fn test_mutation_bounds_checked() {
        let config = EvolutionConfig {
            mutation: MutationSchedule {
                base_rate: 0.5,
                max_rate: 0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMutationBounds)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.population_size, config.population_size);
        assert_eq!(parsed.metric, config.metric);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let parsed: EvolutionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.population_size, default_population_size());
        assert_eq!(
            parsed.mutation.stagnation_window,
            default_stagnation_window()
        );
    }
}
