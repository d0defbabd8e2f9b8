//! Genetic operators behind a single seedable random source.
//!
//! Every stochastic choice in a run (initialization, tournament draws,
//! crossover coins, mutation steps, injection slots) goes through one
//! `GeneticRng`, so a fixed seed reproduces a run exactly.

use rand::prelude::*;
use rand::seq::index;

use crate::schema::{Alphabet, Chromosome, StepDirection};

/// Random number generator wrapper for the evolutionary operators.
pub struct GeneticRng {
    rng: StdRng,
}

impl GeneticRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with a random seed.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A chromosome with every cell drawn uniformly from the alphabet.
    pub fn random_chromosome(
        &mut self,
        width: usize,
        height: usize,
        alphabet: &Alphabet,
    ) -> Chromosome {
        let cells = (0..width * height)
            .map(|_| alphabet.chars()[self.rng.gen_range(0..alphabet.len())])
            .collect();
        Chromosome::new(width, height, cells)
    }

    /// Uniform crossover: each cell of the child is copied from one of the
    /// two parents by a fair coin. Always allocates a fresh cell vector; the
    /// child's fitness is unset.
    pub fn crossover(&mut self, a: &Chromosome, b: &Chromosome) -> Chromosome {
        debug_assert_eq!((a.width, a.height), (b.width, b.height));
        let cells = a
            .cells
            .iter()
            .zip(&b.cells)
            .map(|(&ca, &cb)| if self.rng.gen_bool(0.5) { ca } else { cb })
            .collect();
        Chromosome::new(a.width, a.height, cells)
    }

    /// Adjacency-guided mutation: each cell independently mutates with
    /// probability `rate`, stepping to the alphabet predecessor or successor
    /// (fair coin) with circular wrap. Mutates in place and clears the
    /// fitness; the engine exclusively owns the chromosome at this point.
    pub fn mutate(&mut self, chromosome: &mut Chromosome, rate: f32, alphabet: &Alphabet) {
        for cell in &mut chromosome.cells {
            if self.rng.r#gen::<f32>() < rate {
                let direction = if self.rng.gen_bool(0.5) {
                    StepDirection::Predecessor
                } else {
                    StepDirection::Successor
                };
                *cell = alphabet.step(*cell, direction);
            }
        }
        chromosome.fitness = None;
    }

    /// Tournament draw: sample `size` distinct indices uniformly without
    /// replacement and return the one with maximum fitness. Ties resolve to
    /// the first-encountered maximum in draw order, for determinism under a
    /// fixed random stream.
    pub fn tournament(&mut self, population: &[Chromosome], size: usize) -> usize {
        debug_assert!(size >= 1 && size <= population.len());
        let mut winner = None;
        for i in index::sample(&mut self.rng, population.len(), size) {
            let fitness = population[i].evaluated_fitness();
            match winner {
                Some((_, best)) if fitness <= best => {}
                _ => winner = Some((i, fitness)),
            }
        }
        winner.expect("tournament over empty population").0
    }

    /// A uniform index into a collection, for parent draws with replacement.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Distinct population slots for one diversity injection event, drawn
    /// uniformly without replacement so the configured turnover is exact.
    pub fn injection_slots(&mut self, population_len: usize, count: usize) -> Vec<usize> {
        index::sample(&mut self.rng, population_len, count.min(population_len)).into_vec()
    }
}
