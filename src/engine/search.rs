//! The evolution engine: generation loop, statistics, and termination.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::schema::{
    Alphabet, Chromosome, ConfigError, EvolutionConfig, EvolutionResult, FitnessHistory,
    GenerationStats, GlyphCache, RunStats, StopReason, TargetGrid,
};

use super::fitness::FitnessEvaluator;
use super::genetic::GeneticRng;
use super::schedule;
use super::select::build_parent_pool;
use super::similarity::metric_for;

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(&GenerationStats) + Send + Sync>;

/// Evolves a population of character grids towards the target image.
///
/// Owns the run's configuration, random stream, and read-only resources;
/// generations are strictly sequential, with per-candidate fitness
/// evaluation as the only parallel section.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    alphabet: Alphabet,
    rng: GeneticRng,
    evaluator: FitnessEvaluator,
    population: Vec<Chromosome>,
    history: FitnessHistory,
    generation: usize,
    mutation_rate: f32,
    cancelled: Arc<AtomicBool>,
}

impl EvolutionEngine {
    /// Create an engine, validating the configuration and the collaborator
    /// inputs before any generation can run.
    pub fn new(
        config: EvolutionConfig,
        alphabet: Alphabet,
        target: TargetGrid,
        glyphs: GlyphCache,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        let (width, height) = target.grid_size();
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroGrid);
        }

        let evaluator = FitnessEvaluator::new(target, glyphs, metric_for(config.metric))?;
        let rng = match config.random_seed {
            Some(seed) => GeneticRng::new(seed),
            None => GeneticRng::from_entropy(),
        };
        let mutation_rate = config.mutation.base_rate;

        Ok(Self {
            config,
            alphabet,
            rng,
            evaluator,
            population: Vec::new(),
            history: FitnessHistory::default(),
            generation: 0,
            mutation_rate,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Handle for stopping the run at the next generation boundary.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// The current population.
    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    /// The mutation rate currently in effect.
    pub fn mutation_rate(&self) -> f32 {
        self.mutation_rate
    }

    /// The evaluator, exposing the greedy baseline for reporting.
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// Build and evaluate the initial population and record generation 0.
    fn initialize(&mut self) {
        let (width, height) = self.evaluator.grid_size();
        self.generation = 0;
        self.mutation_rate = self.config.mutation.base_rate;
        self.history = FitnessHistory::default();
        self.population = (0..self.config.population_size)
            .map(|_| self.rng.random_chromosome(width, height, &self.alphabet))
            .collect();
        self.evaluator.evaluate_population(&mut self.population);
        self.record_stats();
    }

    /// Append the current population's statistics to the history.
    fn record_stats(&mut self) {
        let mean = self
            .population
            .iter()
            .map(|c| c.evaluated_fitness())
            .sum::<f32>()
            / self.population.len() as f32;
        let best = self
            .population
            .iter()
            .map(|c| c.evaluated_fitness())
            .fold(f32::NEG_INFINITY, f32::max);
        self.history.push(GenerationStats {
            generation: self.generation,
            mean_fitness: mean,
            best_fitness: best,
            mutation_rate: self.mutation_rate,
        });
    }

    /// One full generation: select, breed, mutate, evaluate, record, adapt,
    /// inject.
    fn step_generation(&mut self) {
        let elitism = self.config.elitism;
        let pool = build_parent_pool(
            &self.population,
            elitism,
            self.config.tournament_size,
            &mut self.rng,
        );

        // Elites sit at the front of the pool; they move into the next
        // generation verbatim, which keeps the best fitness monotone.
        let mut next = pool[..elitism].to_vec();
        while next.len() < self.config.population_size {
            let a = &pool[self.rng.pick_index(pool.len())];
            let b = &pool[self.rng.pick_index(pool.len())];
            let mut child = self.rng.crossover(a, b);
            self.rng.mutate(&mut child, self.mutation_rate, &self.alphabet);
            next.push(child);
        }
        self.evaluator.evaluate_population(&mut next[elitism..]);

        self.population = next;
        self.generation += 1;
        self.record_stats();

        self.mutation_rate =
            schedule::update_rate(self.mutation_rate, &self.history, &self.config.mutation);

        self.inject_diversity();
    }

    /// Overwrite a configured fraction of the population with fresh random
    /// chromosomes, every `interval` generations. Slots are drawn without
    /// replacement and the replacements are evaluated immediately, so the
    /// next selection never reads an unevaluated fitness.
    fn inject_diversity(&mut self) {
        let diversity = &self.config.diversity;
        if diversity.interval == 0 || self.generation % diversity.interval != 0 {
            return;
        }
        let count = (diversity.fraction * self.population.len() as f32).round() as usize;
        if count == 0 {
            return;
        }

        let (width, height) = self.evaluator.grid_size();
        for slot in self.rng.injection_slots(self.population.len(), count) {
            let mut fresh = self.rng.random_chromosome(width, height, &self.alphabet);
            fresh.fitness = Some(self.evaluator.fitness(&fresh));
            self.population[slot] = fresh;
        }
    }

    /// Whether the run must stop at this generation boundary.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }
        if self.generation >= self.config.generation_count {
            return Some(StopReason::Completed);
        }
        None
    }

    /// Fittest chromosome of the current population, first-found on ties.
    fn best(&self) -> &Chromosome {
        let mut best = &self.population[0];
        for candidate in &self.population[1..] {
            if candidate.evaluated_fitness() > best.evaluated_fitness() {
                best = candidate;
            }
        }
        best
    }

    /// Run the full generation loop, invoking the callback after the initial
    /// evaluation and after every generation.
    pub fn run_with_callback<F>(&mut self, callback: F) -> EvolutionResult
    where
        F: Fn(&GenerationStats),
    {
        let start = Instant::now();

        self.initialize();
        callback(self.history.records.last().expect("generation 0 recorded"));

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }
            self.step_generation();
            callback(self.history.records.last().expect("generation recorded"));
        };

        let best = self.best().clone();
        let final_mean = self
            .history
            .latest_mean()
            .expect("at least generation 0 recorded");

        EvolutionResult {
            stats: RunStats {
                generations: self.generation,
                best_fitness: best.evaluated_fitness(),
                final_mean_fitness: final_mean,
                elapsed_seconds: start.elapsed().as_secs_f64(),
                stop_reason,
            },
            best,
            history: self.history.clone(),
        }
    }

    /// Run without progress reporting.
    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Bitmap, DiversityConfig};

    /// Binary setup from the testable-properties scenario: alphabet {0,1},
    /// 2x2 blocks, 2x2 target grid with a black top row and white bottom row.
    fn binary_inputs() -> (Alphabet, TargetGrid, GlyphCache) {
        let alphabet = Alphabet::new("01".chars());
        let glyphs = GlyphCache::new(
            2,
            2,
            [
                ('0', Bitmap::filled(2, 2, 0)),
                ('1', Bitmap::filled(2, 2, 255)),
            ],
        )
        .unwrap();
        let target = TargetGrid::new(
            2,
            2,
            2,
            2,
            vec![
                Bitmap::filled(2, 2, 0),
                Bitmap::filled(2, 2, 0),
                Bitmap::filled(2, 2, 255),
                Bitmap::filled(2, 2, 255),
            ],
        )
        .unwrap();
        (alphabet, target, glyphs)
    }

    fn scenario_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 10,
            generation_count: 5,
            elitism: 1,
            tournament_size: 3,
            diversity: DiversityConfig {
                interval: 0,
                fraction: 0.0,
            },
            random_seed: Some(123),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_binary_scenario() {
        let (alphabet, target, glyphs) = binary_inputs();
        let mut engine =
            EvolutionEngine::new(scenario_config(), alphabet, target, glyphs).unwrap();
        let result = engine.run();

        assert_eq!(result.stats.stop_reason, StopReason::Completed);
        assert_eq!(result.stats.generations, 5);
        assert_eq!(result.history.len(), 6);
        assert_eq!((result.best.width, result.best.height), (2, 2));
        assert!(result.best.cells.iter().all(|&ch| ch == '0' || ch == '1'));

        // Elitism >= 1 makes the best-fitness series non-decreasing.
        for pair in result.history.records.windows(2) {
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
        }
    }

    #[test]
    fn test_population_size_constant() {
        let (alphabet, target, glyphs) = binary_inputs();
        let mut engine =
            EvolutionEngine::new(scenario_config(), alphabet, target, glyphs).unwrap();
        engine.run();
        assert_eq!(engine.population().len(), 10);
        assert!(engine.population().iter().all(|c| c.fitness.is_some()));
    }

    #[test]
    fn test_same_seed_reproduces_run() {
        let (alphabet, target, glyphs) = binary_inputs();
        let mut first = EvolutionEngine::new(
            scenario_config(),
            alphabet.clone(),
            target.clone(),
            glyphs.clone(),
        )
        .unwrap();
        let mut second = EvolutionEngine::new(scenario_config(), alphabet, target, glyphs).unwrap();

        let a = first.run();
        let b = second.run();
        assert_eq!(a.best.cells, b.best.cells);
        assert_eq!(a.history.records, b.history.records);
    }

    #[test]
    fn test_injection_keeps_population_invariants() {
        let (alphabet, target, glyphs) = binary_inputs();
        let config = EvolutionConfig {
            diversity: DiversityConfig {
                interval: 1,
                fraction: 0.5,
            },
            ..scenario_config()
        };
        let mut engine = EvolutionEngine::new(config, alphabet, target, glyphs).unwrap();
        engine.run();
        assert_eq!(engine.population().len(), 10);
        assert!(engine.population().iter().all(|c| c.fitness.is_some()));
    }

    #[test]
    fn test_cancellation_at_boundary() {
        let (alphabet, target, glyphs) = binary_inputs();
        let mut engine =
            EvolutionEngine::new(scenario_config(), alphabet, target, glyphs).unwrap();
        engine.cancel_handle().store(true, Ordering::Relaxed);

        let result = engine.run();
        assert_eq!(result.stats.stop_reason, StopReason::Cancelled);
        assert_eq!(result.stats.generations, 0);
        // Generation 0 is still evaluated and recorded.
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let (_, target, glyphs) = binary_inputs();
        let empty = Alphabet::new(std::iter::empty());
        assert!(matches!(
            EvolutionEngine::new(scenario_config(), empty, target, glyphs),
            Err(ConfigError::EmptyAlphabet)
        ));
    }

    #[test]
    fn test_degenerate_config_rejected() {
        let (alphabet, target, glyphs) = binary_inputs();
        let config = EvolutionConfig {
            population_size: 3,
            elitism: 3,
            ..scenario_config()
        };
        assert!(matches!(
            EvolutionEngine::new(config, alphabet, target, glyphs),
            Err(ConfigError::ElitismTooLarge { .. })
        ));
    }

    #[test]
    fn test_mutation_rate_stays_within_bounds() {
        let (alphabet, target, glyphs) = binary_inputs();
        let config = EvolutionConfig {
            generation_count: 30,
            ..scenario_config()
        };
        let bounds = config.mutation.clone();
        let mut engine = EvolutionEngine::new(config, alphabet, target, glyphs).unwrap();
        let result = engine.run();
        for record in &result.history.records {
            assert!(record.mutation_rate >= bounds.base_rate);
            assert!(record.mutation_rate <= bounds.max_rate);
        }
    }
}
