//! Descriptive and inferential statistics.
//!
//! Small, allocation-light helpers over `&[f64]`. Failures are reported
//! as [`StatsError`] so callers can decide whether a model with too little
//! data is an error or just an "insufficient data" entry.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use std::fmt;
use thiserror::Error;

/// Errors from the statistics helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("empty sample")]
    EmptySample,

    #[error("need at least {needed} samples, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    #[error("zero variance")]
    ZeroVariance,

    #[error("alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),

    #[error("at least {min} bootstrap iterations required, got {got}")]
    TooFewIterations { min: usize, got: usize },

    #[error("quantile must be in [0, 1], got {0}")]
    InvalidQuantile(f64),

    #[error("distribution error: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(StatsError::EmptySample);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `n` in the denominator.
pub fn population_sd(values: &[f64]) -> Result<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok((ss / values.len() as f64).sqrt())
}

/// Variance with `n - 1` in the denominator.
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(StatsError::InsufficientSamples {
            needed: 2,
            got: values.len(),
        });
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok(ss / (values.len() - 1) as f64)
}

pub fn sample_sd(values: &[f64]) -> Result<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Quantile of an ascending slice, interpolating linearly between order
/// statistics.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(StatsError::EmptySample);
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidQuantile(p));
    }
    if sorted.len() == 1 {
        return Ok(sorted[0]);
    }

    let index = (sorted.len() - 1) as f64 * p;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    let weight = index - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn median(values: &[f64]) -> Result<f64> {
    quantile_sorted(&sorted_copy(values), 0.5)
}

/// Min, quartiles and max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

pub fn five_number_summary(values: &[f64]) -> Result<FiveNumberSummary> {
    let sorted = sorted_copy(values);
    Ok(FiveNumberSummary {
        min: quantile_sorted(&sorted, 0.0)?,
        q1: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q3: quantile_sorted(&sorted, 0.75)?,
        max: quantile_sorted(&sorted, 1.0)?,
    })
}

/// Summary of one sample. `sd` and `se` are zero below two observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Descriptive {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub sd: f64,
    pub se: f64,
}

pub fn describe(values: &[f64]) -> Result<Descriptive> {
    let n = values.len();
    let m = mean(values)?;
    let sd = if n >= 2 { sample_sd(values)? } else { 0.0 };
    let se = if n >= 2 { sd / (n as f64).sqrt() } else { 0.0 };

    Ok(Descriptive {
        n,
        mean: m,
        median: median(values)?,
        sd,
        se,
    })
}

/// A symmetric confidence interval around a mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
    pub margin: f64,
}

/// Two-sided standard normal quantile for a confidence level.
fn z_critical(confidence: f64) -> Result<f64> {
    if confidence <= 0.0 || confidence >= 1.0 {
        return Err(StatsError::InvalidAlpha(1.0 - confidence));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + confidence) / 2.0))
}

/// Normal-approximation CI for the mean. Needs two observations.
pub fn normal_ci(values: &[f64], confidence: f64) -> Result<Interval> {
    let d = describe(values)?;
    if d.n < 2 {
        return Err(StatsError::InsufficientSamples { needed: 2, got: d.n });
    }
    let margin = z_critical(confidence)? * d.se;

    Ok(Interval {
        lower: d.mean - margin,
        upper: d.mean + margin,
        margin,
    })
}

/// Welch's two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub t: f64,
    pub df: f64,
    /// Two-sided p-value.
    pub p: f64,
}

/// Welch's t-test of `mean(a) - mean(b)`, two-sided.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TTestResult> {
    let var_a = sample_variance(a)?;
    let var_b = sample_variance(b)?;
    let (n_a, n_b) = (a.len() as f64, b.len() as f64);

    let se2 = var_a / n_a + var_b / n_b;
    if se2 == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let t = (mean(a)? - mean(b)?) / se2.sqrt();

    // Welch-Satterthwaite
    let denom = (var_a / n_a).powi(2) / (n_a - 1.0) + (var_b / n_b).powi(2) / (n_b - 1.0);
    let df = se2 * se2 / denom;

    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);

    Ok(TTestResult { t, df, p })
}

/// Standardized mean difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    pub cohens_d: f64,
    pub hedges_g: f64,
}

/// Cohen's d and Hedges' g of `mean(a) - mean(b)` using the pooled SD.
pub fn effect_size(a: &[f64], b: &[f64]) -> Result<EffectSize> {
    let var_a = sample_variance(a)?;
    let var_b = sample_variance(b)?;
    let (n_a, n_b) = (a.len() as f64, b.len() as f64);

    let pooled = ((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / (n_a + n_b - 2.0);
    if pooled == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let cohens_d = (mean(a)? - mean(b)?) / pooled.sqrt();
    let correction = 1.0 - 3.0 / (4.0 * (n_a + n_b) - 9.0);

    Ok(EffectSize {
        cohens_d,
        hedges_g: cohens_d * correction,
    })
}

/// Conventional reading of |d|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectMagnitude::Negligible => write!(f, "negligible"),
            EffectMagnitude::Small => write!(f, "small"),
            EffectMagnitude::Medium => write!(f, "medium"),
            EffectMagnitude::Large => write!(f, "large"),
        }
    }
}

pub fn interpret_cohens_d(d: f64) -> EffectMagnitude {
    match d.abs() {
        x if x < 0.2 => EffectMagnitude::Negligible,
        x if x < 0.5 => EffectMagnitude::Small,
        x if x < 0.8 => EffectMagnitude::Medium,
        _ => EffectMagnitude::Large,
    }
}

/// Bonferroni-adjusted p-value for a family of `tests`.
pub fn bonferroni(p: f64, tests: usize) -> f64 {
    (p * tests as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIGH: [f64; 5] = [10.0, 11.0, 9.0, 12.0, 10.0];
    const LOW: [f64; 5] = [1.0, 2.0, 0.0, 3.0, 1.0];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean_and_sd() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
        assert!(close(population_sd(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap(), 2.0));
        assert!(close(sample_variance(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 5.0 / 3.0));
        assert_eq!(mean(&[]), Err(StatsError::EmptySample));
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0).unwrap(), 1.0);
        assert_eq!(quantile_sorted(&sorted, 1.0).unwrap(), 4.0);
        assert!(close(quantile_sorted(&sorted, 0.5).unwrap(), 2.5));
        assert!(close(quantile_sorted(&sorted, 0.25).unwrap(), 1.75));
        assert!(quantile_sorted(&sorted, 1.5).is_err());
        assert_eq!(quantile_sorted(&[7.0], 0.3).unwrap(), 7.0);
    }

    #[test]
    fn test_describe() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(d.n, 4);
        assert_eq!(d.mean, 2.5);
        assert_eq!(d.median, 2.5);
        assert!(d.sd > 0.0);
        assert!(d.se > 0.0);

        let single = describe(&[5.0]).unwrap();
        assert_eq!(single.sd, 0.0);
        assert_eq!(single.se, 0.0);
    }

    #[test]
    fn test_five_number_summary() {
        let s = five_number_summary(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.q3, 4.0);
        assert_eq!(s.max, 5.0);
    }

    #[test]
    fn test_normal_ci_contains_mean() {
        let ci = normal_ci(&HIGH, 0.95).unwrap();
        let m = mean(&HIGH).unwrap();
        assert!(ci.lower < m && m < ci.upper);
        assert!(close(ci.upper - m, ci.margin));
        assert!(normal_ci(&[1.0], 0.95).is_err());
    }

    #[test]
    fn test_welch_t_test() {
        let res = welch_t_test(&HIGH, &LOW).unwrap();
        assert!(res.t > 0.0);
        assert!(res.df > 1.0);
        assert!(res.p >= 0.0 && res.p < 0.001);

        let same = welch_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(close(same.t, 0.0));
        assert!(close(same.p, 1.0));

        assert_eq!(
            welch_t_test(&[2.0, 2.0], &[2.0, 2.0]),
            Err(StatsError::ZeroVariance)
        );
    }

    #[test]
    fn test_effect_size() {
        // Equal variance 1.0 in both groups, means 2 apart.
        let es = effect_size(&[3.0, 4.0, 5.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(close(es.cohens_d, 2.0));
        assert!(es.hedges_g < es.cohens_d);
        assert!(effect_size(&[1.0], &[2.0, 3.0]).is_err());
    }

    #[test]
    fn test_interpret_cohens_d() {
        assert_eq!(interpret_cohens_d(0.1), EffectMagnitude::Negligible);
        assert_eq!(interpret_cohens_d(-0.3), EffectMagnitude::Small);
        assert_eq!(interpret_cohens_d(0.5), EffectMagnitude::Medium);
        assert_eq!(interpret_cohens_d(-2.0), EffectMagnitude::Large);
    }

    #[test]
    fn test_bonferroni() {
        assert!(close(bonferroni(0.01, 3), 0.03));
        assert_eq!(bonferroni(0.4, 5), 1.0);
    }
}
