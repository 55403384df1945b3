//! Percentile bootstrap confidence intervals.
//!
//! Each estimate resamples the observed groups with replacement, to their
//! own sizes, `iterations` times and reads the `alpha / 2` and
//! `1 - alpha / 2` quantiles off the resampled statistics. The generator is
//! reseeded for every estimate so results do not depend on call order.

use super::stats::{mean, population_sd, quantile_sorted, Result, StatsError};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_ITERATIONS: usize = 10_000;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Fewer iterations than this give unstable tail quantiles.
pub const MIN_ITERATIONS: usize = 100;

/// Point estimate with its bootstrap interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapEstimate {
    /// Statistic on the observed data.
    pub estimate: f64,
    /// Lower percentile bound.
    pub lower: f64,
    /// Upper percentile bound.
    pub upper: f64,
    /// Standard deviation of the resampled statistics.
    pub se: f64,
}

impl BootstrapEstimate {
    pub fn excludes_zero(&self) -> bool {
        self.lower > 0.0 || self.upper < 0.0
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Seeded percentile bootstrap.
#[derive(Debug, Clone, Copy)]
pub struct Bootstrap {
    iterations: usize,
    seed: u64,
    alpha: f64,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl Bootstrap {
    /// Create a bootstrap, validating the settings.
    pub fn new(iterations: usize, seed: u64, alpha: f64) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(StatsError::TooFewIterations {
                min: MIN_ITERATIONS,
                got: iterations,
            });
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StatsError::InvalidAlpha(alpha));
        }
        Ok(Self {
            iterations,
            seed,
            alpha,
        })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Confidence level as a percentage, e.g. 95.
    pub fn confidence_percent(&self) -> f64 {
        (1.0 - self.alpha) * 100.0
    }

    /// CI for the mean of one sample.
    pub fn single_mean(&self, values: &[f64]) -> Result<BootstrapEstimate> {
        let observed = mean(values)?;
        let mut rng = self.rng();

        let stats: Vec<f64> = (0..self.iterations)
            .map(|_| resampled_mean(&mut rng, values))
            .collect();

        self.summarize(observed, stats)
    }

    /// CI for `mean(second) - mean(first)`.
    pub fn mean_difference(&self, first: &[f64], second: &[f64]) -> Result<BootstrapEstimate> {
        let observed = mean(second)? - mean(first)?;
        let mut rng = self.rng();

        let stats: Vec<f64> = (0..self.iterations)
            .map(|_| {
                let m1 = resampled_mean(&mut rng, first);
                let m2 = resampled_mean(&mut rng, second);
                m2 - m1
            })
            .collect();

        self.summarize(observed, stats)
    }

    /// CI for the difference of two anchoring effects:
    /// `(mean(a_high) - mean(a_low)) - (mean(b_high) - mean(b_low))`.
    pub fn difference_of_differences(
        &self,
        a_low: &[f64],
        a_high: &[f64],
        b_low: &[f64],
        b_high: &[f64],
    ) -> Result<BootstrapEstimate> {
        let observed = (mean(a_high)? - mean(a_low)?) - (mean(b_high)? - mean(b_low)?);
        let mut rng = self.rng();

        let stats: Vec<f64> = (0..self.iterations)
            .map(|_| {
                let a = resampled_mean(&mut rng, a_high) - resampled_mean(&mut rng, a_low);
                let b = resampled_mean(&mut rng, b_high) - resampled_mean(&mut rng, b_low);
                a - b
            })
            .collect();

        self.summarize(observed, stats)
    }

    fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    fn summarize(&self, estimate: f64, mut stats: Vec<f64>) -> Result<BootstrapEstimate> {
        stats.sort_by(|a, b| a.total_cmp(b));

        let lower = quantile_sorted(&stats, self.alpha / 2.0)?;
        let upper = quantile_sorted(&stats, 1.0 - self.alpha / 2.0)?;
        let se = population_sd(&stats)?;

        debug!(
            "Bootstrap estimate {:.3} [{:.3}, {:.3}], se {:.4} ({} iterations)",
            estimate, lower, upper, se, self.iterations
        );

        Ok(BootstrapEstimate {
            estimate,
            lower,
            upper,
            se,
        })
    }
}

/// Mean of one resample of `values`, drawn with replacement. Callers have
/// already rejected empty input via `mean`.
fn resampled_mean(rng: &mut ChaCha8Rng, values: &[f64]) -> f64 {
    let n = values.len();
    let sum: f64 = (0..n).map(|_| values[rng.gen_range(0..n)]).sum();
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIGH: [f64; 5] = [10.0, 11.0, 9.0, 12.0, 10.0];
    const LOW: [f64; 5] = [1.0, 2.0, 0.0, 3.0, 1.0];

    fn quick() -> Bootstrap {
        Bootstrap::new(1_000, 42, 0.05).unwrap()
    }

    #[test]
    fn test_deterministic_with_fixed_seed() {
        let a = quick().mean_difference(&LOW, &HIGH).unwrap();
        let b = quick().mean_difference(&LOW, &HIGH).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let values: Vec<f64> = (0..40).map(|i| 10.0 + (i as f64 * 0.37).sin() * 5.0).collect();
        let a = Bootstrap::new(2_000, 1, 0.05).unwrap().single_mean(&values).unwrap();
        let b = Bootstrap::new(2_000, 2, 0.05).unwrap().single_mean(&values).unwrap();
        assert_eq!(a.estimate, b.estimate);
        assert_ne!(a.se, b.se);
    }

    #[test]
    fn test_independent_of_call_order() {
        let bootstrap = quick();
        bootstrap.single_mean(&HIGH).unwrap();
        bootstrap
            .difference_of_differences(&LOW, &HIGH, &HIGH, &LOW)
            .unwrap();
        let after = bootstrap.mean_difference(&LOW, &HIGH).unwrap();

        assert_eq!(after, quick().mean_difference(&LOW, &HIGH).unwrap());
    }

    #[test]
    fn test_mean_difference_bounds() {
        let est = quick().mean_difference(&LOW, &HIGH).unwrap();
        assert!((est.estimate - 9.0).abs() < 1e-9);
        assert!(est.lower <= est.estimate && est.estimate <= est.upper);
        assert!(est.excludes_zero());
        assert!(est.se > 0.0);
        // Resampled means cannot leave [9 - 3, 12 - 0].
        assert!(est.lower >= 6.0 && est.upper <= 12.0);
    }

    #[test]
    fn test_zero_variance_collapses_to_point() {
        let low = [3.0; 30];
        let high = [9.0; 30];
        let est = quick().mean_difference(&low, &high).unwrap();
        assert_eq!(est.estimate, 6.0);
        assert_eq!(est.lower, 6.0);
        assert_eq!(est.upper, 6.0);
        assert_eq!(est.se, 0.0);
        assert_eq!(est.width(), 0.0);
    }

    #[test]
    fn test_null_effect_includes_zero() {
        let a = [4.0, 6.0, 5.0, 7.0, 3.0, 5.0, 6.0, 4.0];
        let est = quick().mean_difference(&a, &a).unwrap();
        assert_eq!(est.estimate, 0.0);
        assert!(!est.excludes_zero());
    }

    #[test]
    fn test_single_mean() {
        let est = quick().single_mean(&HIGH).unwrap();
        assert!((est.estimate - 10.4).abs() < 1e-9);
        assert!(est.lower >= 9.0 && est.upper <= 12.0);
        assert!(est.lower < est.upper);
    }

    #[test]
    fn test_difference_of_differences() {
        let low = [3.0; 10];
        let high = [9.0; 10];
        let flat = [5.0; 10];
        let est = quick()
            .difference_of_differences(&low, &high, &flat, &flat)
            .unwrap();
        assert_eq!(est.estimate, 6.0);
        assert_eq!(est.lower, 6.0);
        assert_eq!(est.upper, 6.0);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            Bootstrap::new(10, 42, 0.05),
            Err(StatsError::TooFewIterations { .. })
        ));
        assert!(matches!(
            Bootstrap::new(1_000, 42, 1.0),
            Err(StatsError::InvalidAlpha(_))
        ));
        assert_eq!(
            quick().mean_difference(&[], &HIGH),
            Err(StatsError::EmptySample)
        );
    }

    #[test]
    fn test_defaults() {
        let b = Bootstrap::default();
        assert_eq!(b.iterations(), 10_000);
        assert_eq!(b.seed(), 42);
        assert!((b.confidence_percent() - 95.0).abs() < 1e-9);
    }
}
