//! Parent selection: elitism plus tournament.

use crate::schema::Chromosome;

use super::genetic::GeneticRng;

/// Indices of the `k` fittest chromosomes, fittest first. Ties keep the
/// lower index first (stable order), so the choice is deterministic.
pub fn elite_indices(population: &[Chromosome], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| {
        population[b]
            .evaluated_fitness()
            .partial_cmp(&population[a].evaluated_fitness())
            .expect("fitness must not be NaN")
    });
    indices.truncate(k);
    indices
}

/// Build a parent pool of exactly `population.len()` chromosomes.
///
/// The `elitism` fittest are cloned in unmutated; each remaining slot is
/// filled by an independent tournament over the whole population, so the
/// same chromosome may win several slots.
pub fn build_parent_pool(
    population: &[Chromosome],
    elitism: usize,
    tournament_size: usize,
    rng: &mut GeneticRng,
) -> Vec<Chromosome> {
    debug_assert!(elitism < population.len());
    debug_assert!(tournament_size >= 1 && tournament_size <= population.len());

    let mut pool = Vec::with_capacity(population.len());
    for i in elite_indices(population, elitism) {
        pool.push(population[i].clone());
    }
    while pool.len() < population.len() {
        let winner = rng.tournament(population, tournament_size);
        pool.push(population[winner].clone());
    }
    pool
}
