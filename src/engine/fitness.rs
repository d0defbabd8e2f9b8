//! Fitness evaluation: mean per-block similarity of a chromosome.

use rayon::prelude::*;

use crate::schema::{Chromosome, ConfigError, GlyphCache, TargetGrid};

use super::similarity::SimilarityMetric;

/// Scores chromosomes against the target image.
///
/// Holds the run's read-only resources (target blocks, glyph cache, metric),
/// so population evaluation can run in parallel without locking.
pub struct FitnessEvaluator {
    target: TargetGrid,
    glyphs: GlyphCache,
    metric: Box<dyn SimilarityMetric>,
}

impl FitnessEvaluator {
    /// Create an evaluator, checking that glyphs and target blocks agree on
    /// the block size.
    pub fn new(
        target: TargetGrid,
        glyphs: GlyphCache,
        metric: Box<dyn SimilarityMetric>,
    ) -> Result<Self, ConfigError> {
        if glyphs.block_size() != target.block_size() {
            return Err(ConfigError::BlockSizeMismatch {
                glyph: glyphs.block_size(),
                target: target.block_size(),
            });
        }
        Ok(Self {
            target,
            glyphs,
            metric,
        })
    }

    /// Grid dimensions in cells as `(width, height)`.
    pub fn grid_size(&self) -> (usize, usize) {
        self.target.grid_size()
    }

    /// Mean similarity over all cells of the chromosome's grid.
    ///
    /// Cells whose character has no rendered glyph are skipped with a
    /// warning; the mean is taken over the cells actually scored. Returns
    /// 0.0 for an empty grid or when every cell was skipped.
    pub fn fitness(&self, chromosome: &Chromosome) -> f32 {
        let (width, height) = self.target.grid_size();
        debug_assert_eq!((chromosome.width, chromosome.height), (width, height));

        let mut total = 0.0f64;
        let mut scored = 0usize;
        for y in 0..height {
            for x in 0..width {
                let ch = chromosome.cell(x, y);
                let Some(glyph) = self.glyphs.get(ch) else {
                    log::warn!("no glyph for {ch:?} at cell ({x}, {y}), skipping");
                    continue;
                };
                total += self.metric.compare(self.target.block(x, y), glyph) as f64;
                scored += 1;
            }
        }

        if scored == 0 {
            0.0
        } else {
            (total / scored as f64) as f32
        }
    }

    /// Evaluate every chromosome, writing the score into its fitness field.
    /// Candidates are independent, so this runs in parallel; the metric is
    /// deterministic and RNG-free, so results match sequential evaluation.
    pub fn evaluate_population(&self, population: &mut [Chromosome]) {
        population.par_iter_mut().for_each(|chromosome| {
            chromosome.fitness = Some(self.fitness(chromosome));
        });
    }

    /// The greedy baseline: independently pick the best-scoring glyph for
    /// every block. With more than one character this is at least as good as
    /// any single chromosome's expected random assignment, which makes it a
    /// useful quality floor for reporting.
    pub fn greedy_baseline(&self) -> Chromosome {
        let (width, height) = self.target.grid_size();
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let block = self.target.block(x, y);
                let mut best: Option<(char, f32)> = None;
                for (ch, glyph) in self.glyphs.iter() {
                    let score = self.metric.compare(block, glyph);
                    match best {
                        Some((_, top)) if score <= top => {}
                        _ => best = Some((ch, score)),
                    }
                }
                // Empty caches are rejected by engine validation.
                cells.push(best.map(|(ch, _)| ch).unwrap_or(' '));
            }
        }
        let mut chromosome = Chromosome::new(width, height, cells);
        chromosome.fitness = Some(self.fitness(&chromosome));
        chromosome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::genetic::GeneticRng;
    use crate::engine::similarity::NormalizedIntensity;
    use crate::schema::{Alphabet, Bitmap};

    /// Two-character setup: '0' renders black, '1' renders white, target is
    /// a 2x2 grid with black top row and white bottom row.
    fn evaluator() -> FitnessEvaluator {
        let glyphs = GlyphCache::new(
            2,
            2,
            [
                ('0', Bitmap::filled(2, 2, 0)),
                ('1', Bitmap::filled(2, 2, 255)),
            ],
        )
        .unwrap();
        let blocks = vec![
            Bitmap::filled(2, 2, 0),
            Bitmap::filled(2, 2, 0),
            Bitmap::filled(2, 2, 255),
            Bitmap::filled(2, 2, 255),
        ];
        let target = TargetGrid::new(2, 2, 2, 2, blocks).unwrap();
        FitnessEvaluator::new(target, glyphs, Box::new(NormalizedIntensity)).unwrap()
    }

    #[test]
    fn test_perfect_assignment_scores_one() {
        let evaluator = evaluator();
        let perfect = Chromosome::new(2, 2, vec!['0', '0', '1', '1']);
        assert!((evaluator.fitness(&perfect) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_assignment_scores_zero() {
        let evaluator = evaluator();
        let inverted = Chromosome::new(2, 2, vec!['1', '1', '0', '0']);
        assert!(evaluator.fitness(&inverted) < 1e-6);
    }

    #[test]
    fn test_missing_glyph_degrades() {
        let evaluator = evaluator();
        // 'x' has no glyph; the three scored cells are all correct.
        let partial = Chromosome::new(2, 2, vec!['x', '0', '1', '1']);
        assert!((evaluator.fitness(&partial) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_cells_missing_scores_zero() {
        let evaluator = evaluator();
        let unknown = Chromosome::new(2, 2, vec!['x', 'x', 'x', 'x']);
        assert_eq!(evaluator.fitness(&unknown), 0.0);
    }

    #[test]
    fn test_block_size_mismatch_rejected() {
        let glyphs = GlyphCache::new(3, 3, [('0', Bitmap::filled(3, 3, 0))]).unwrap();
        let target = TargetGrid::new(1, 1, 2, 2, vec![Bitmap::filled(2, 2, 0)]).unwrap();
        assert!(matches!(
            FitnessEvaluator::new(target, glyphs, Box::new(NormalizedIntensity)),
            Err(ConfigError::BlockSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_population_evaluation_fills_fitness() {
        let evaluator = evaluator();
        let mut population = vec![
            Chromosome::new(2, 2, vec!['0', '0', '1', '1']),
            Chromosome::new(2, 2, vec!['1', '1', '0', '0']),
        ];
        evaluator.evaluate_population(&mut population);
        assert!(population.iter().all(|c| c.fitness.is_some()));
        assert!(population[0].evaluated_fitness() > population[1].evaluated_fitness());
    }

    #[test]
    fn test_greedy_baseline_beats_random() {
        let evaluator = evaluator();
        let greedy = evaluator.greedy_baseline();
        assert!((greedy.evaluated_fitness() - 1.0).abs() < 1e-6);

        let alphabet = Alphabet::new("01".chars());
        let mut rng = GeneticRng::new(42);
        for _ in 0..10 {
            let random = rng.random_chromosome(2, 2, &alphabet);
            assert!(greedy.evaluated_fitness() >= evaluator.fitness(&random));
        }
    }
}
