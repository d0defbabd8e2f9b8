//! Run statistics and result types.
//!
//! The history is append-only with the engine as its single writer; external
//! plotting consumes the serialized records.

use serde::{Deserialize, Serialize};

use super::Chromosome;

/// Fitness statistics for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index, starting at 0 for the initial population.
    pub generation: usize,
    /// Arithmetic mean fitness over the population.
    pub mean_fitness: f32,
    /// Highest fitness in the population.
    pub best_fitness: f32,
    /// Per-cell mutation rate in effect when the generation was bred.
    pub mutation_rate: f32,
}

/// Append-only record of per-generation statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FitnessHistory {
    /// One record per generation, in order, including generation 0.
    pub records: Vec<GenerationStats>,
}

impl FitnessHistory {
    /// Append a generation record.
    pub fn push(&mut self, stats: GenerationStats) {
        self.records.push(stats);
    }

    /// Number of recorded generations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no generation has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean fitness of the most recent generation.
    pub fn latest_mean(&self) -> Option<f32> {
        self.records.last().map(|r| r.mean_fitness)
    }

    /// Mean fitness `window` generations before the most recent record.
    pub fn mean_before(&self, window: usize) -> Option<f32> {
        self.records
            .len()
            .checked_sub(window + 1)
            .map(|i| self.records[i].mean_fitness)
    }
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Ran the configured number of generations.
    Completed,
    /// The cancellation flag was set at a generation boundary.
    Cancelled,
}

/// Aggregate statistics for a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of generations bred (excluding the initial population).
    pub generations: usize,
    /// Highest fitness in the final population.
    pub best_fitness: f32,
    /// Mean fitness of the final population.
    pub final_mean_fitness: f32,
    /// Wall-clock duration of the run.
    pub elapsed_seconds: f64,
    /// Why the run stopped.
    pub stop_reason: StopReason,
}

/// Everything a finished run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Fittest chromosome of the final population (first-found on ties).
    pub best: Chromosome,
    /// Per-generation statistics for plotting and reporting.
    pub history: FitnessHistory,
    /// Aggregate run statistics.
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(generation: usize, mean: f32) -> GenerationStats {
        GenerationStats {
            generation,
            mean_fitness: mean,
            best_fitness: mean + 0.1,
            mutation_rate: 0.02,
        }
    }

    #[test]
    fn test_history_windows() {
        let mut history = FitnessHistory::default();
        for (g, mean) in [0.1f32, 0.2, 0.3, 0.4].iter().enumerate() {
            history.push(record(g, *mean));
        }
        assert_eq!(history.latest_mean(), Some(0.4));
        assert_eq!(history.mean_before(2), Some(0.2));
        assert_eq!(history.mean_before(3), Some(0.1));
        assert_eq!(history.mean_before(4), None);
    }

    #[test]
    fn test_history_serialization() {
        let mut history = FitnessHistory::default();
        history.push(record(0, 0.5));
        let json = serde_json::to_string(&history).unwrap();
        let parsed: FitnessHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.records[0].best_fitness, 0.6);
    }
}
