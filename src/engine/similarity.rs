//! Block similarity metrics.
//!
//! Every metric scores a pair of equal-size bitmaps in `[0.0, 1.0]`, higher
//! meaning more similar, with 1.0 for identical inputs. The evaluator and
//! selector rely only on that contract, so metrics are interchangeable.
//! A dimension mismatch is non-fatal: the metric logs a warning and returns
//! the neutral score 0.0.

use crate::schema::{Bitmap, SimilarityMetricKind};

/// A deterministic comparison of two equal-size grayscale bitmaps.
pub trait SimilarityMetric: Send + Sync {
    /// Score in `[0.0, 1.0]`, higher is better; 0.0 on dimension mismatch.
    fn compare(&self, a: &Bitmap, b: &Bitmap) -> f32;

    /// Human-readable metric name for logs.
    fn name(&self) -> &'static str;
}

/// Instantiate the metric selected in the configuration.
pub fn metric_for(kind: SimilarityMetricKind) -> Box<dyn SimilarityMetric> {
    match kind {
        SimilarityMetricKind::NormalizedIntensity => Box::new(NormalizedIntensity),
        SimilarityMetricKind::Structural => Box::new(StructuralSimilarity),
    }
}

fn dimensions_match(metric: &dyn SimilarityMetric, a: &Bitmap, b: &Bitmap) -> bool {
    if a.dimensions() == b.dimensions() {
        return true;
    }
    log::warn!(
        "{}: dimension mismatch {:?} vs {:?}, scoring 0.0",
        metric.name(),
        a.dimensions(),
        b.dimensions()
    );
    false
}

/// One minus the mean absolute intensity difference, normalized to `[0, 1]`.
pub struct NormalizedIntensity;

impl SimilarityMetric for NormalizedIntensity {
    fn compare(&self, a: &Bitmap, b: &Bitmap) -> f32 {
        if !dimensions_match(self, a, b) {
            return 0.0;
        }
        if a.data.is_empty() {
            return 1.0;
        }
        let total: u64 = a
            .data
            .iter()
            .zip(&b.data)
            .map(|(&pa, &pb)| pa.abs_diff(pb) as u64)
            .sum();
        let mean = total as f64 / a.data.len() as f64;
        (1.0 - mean / 255.0) as f32
    }

    fn name(&self) -> &'static str {
        "normalized-intensity"
    }
}

/// Single-window structural similarity over the whole block.
///
/// Computes SSIM with the standard stabilizers (K1 = 0.01, K2 = 0.03,
/// L = 255) from the blocks' means, variances and covariance, then remaps
/// the `[-1, 1]` result to `[0, 1]` to honor the metric contract.
pub struct StructuralSimilarity;

impl SimilarityMetric for StructuralSimilarity {
    fn compare(&self, a: &Bitmap, b: &Bitmap) -> f32 {
        if !dimensions_match(self, a, b) {
            return 0.0;
        }
        let n = a.data.len();
        if n == 0 {
            return 1.0;
        }

        let mean_a = a.mean_luminance();
        let mean_b = b.mean_luminance();

        let mut var_a = 0.0f64;
        let mut var_b = 0.0f64;
        let mut cov = 0.0f64;
        for (&pa, &pb) in a.data.iter().zip(&b.data) {
            let da = pa as f64 - mean_a;
            let db = pb as f64 - mean_b;
            var_a += da * da;
            var_b += db * db;
            cov += da * db;
        }
        var_a /= n as f64;
        var_b /= n as f64;
        cov /= n as f64;

        const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
        const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

        let ssim = ((2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2))
            / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2));

        (((ssim + 1.0) / 2.0).clamp(0.0, 1.0)) as f32
    }

    fn name(&self) -> &'static str {
        "structural-similarity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(width: usize, height: usize, data: Vec<u8>) -> Bitmap {
        Bitmap::new(width, height, data).unwrap()
    }

    #[test]
    fn test_identical_blocks_score_one() {
        let a = bitmap(2, 2, vec![10, 200, 30, 40]);
        assert_eq!(NormalizedIntensity.compare(&a, &a), 1.0);
        let ssim = StructuralSimilarity.compare(&a, &a);
        assert!(ssim > 0.99, "ssim of identical blocks was {ssim}");
    }

    #[test]
    fn test_opposite_blocks_score_low() {
        let black = Bitmap::filled(2, 2, 0);
        let white = Bitmap::filled(2, 2, 255);
        assert!(NormalizedIntensity.compare(&black, &white) < 1e-6);
        assert!(StructuralSimilarity.compare(&black, &white) < 0.6);
    }

    #[test]
    fn test_dimension_mismatch_is_neutral() {
        let a = Bitmap::filled(2, 2, 128);
        let b = Bitmap::filled(2, 3, 128);
        assert_eq!(NormalizedIntensity.compare(&a, &b), 0.0);
        assert_eq!(StructuralSimilarity.compare(&a, &b), 0.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let samples = [
            bitmap(2, 2, vec![0, 255, 0, 255]),
            bitmap(2, 2, vec![255, 0, 255, 0]),
            bitmap(2, 2, vec![1, 2, 3, 4]),
            Bitmap::filled(2, 2, 128),
        ];
        for a in &samples {
            for b in &samples {
                for metric in [metric_for(SimilarityMetricKind::NormalizedIntensity),
                    metric_for(SimilarityMetricKind::Structural)]
                {
                    let score = metric.compare(a, b);
                    assert!((0.0..=1.0).contains(&score), "{score} out of range");
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = bitmap(2, 2, vec![10, 20, 30, 40]);
        let b = bitmap(2, 2, vec![40, 30, 20, 10]);
        assert_eq!(
            NormalizedIntensity.compare(&a, &b),
            NormalizedIntensity.compare(&a, &b)
        );
        assert_eq!(
            StructuralSimilarity.compare(&a, &b),
            StructuralSimilarity.compare(&a, &b)
        );
    }

    #[test]
    fn test_closer_intensity_scores_higher() {
        let target = Bitmap::filled(2, 2, 100);
        let near = Bitmap::filled(2, 2, 110);
        let far = Bitmap::filled(2, 2, 250);
        assert!(
            NormalizedIntensity.compare(&target, &near)
                > NormalizedIntensity.compare(&target, &far)
        );
    }
}
