//! Data models for the anchoring analysis.
//!
//! This module contains the input records read from the results
//! directory and the result structures shared by the reports and charts.

use crate::analysis::bootstrap::BootstrapEstimate;
use crate::analysis::stats::{EffectMagnitude, FiveNumberSummary, Interval, TTestResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which anchor a condition presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSide {
    /// Anchor below the model's baseline
    Low,
    /// Anchor above the model's baseline
    High,
}

impl fmt::Display for AnchorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSide::Low => write!(f, "Low"),
            AnchorSide::High => write!(f, "High"),
        }
    }
}

/// Parsed model output nested under `result`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    /// Recommended sentence in months.
    #[serde(default)]
    pub sentence_months: Option<f64>,
}

/// One line of a JSONL results file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRecord {
    /// Condition identifier, e.g. `low-anchor-3mo`.
    #[serde(default)]
    pub condition_id: Option<String>,
    /// Provider-qualified model id.
    #[serde(default)]
    pub model: Option<String>,
    /// Experiment the trial belongs to.
    #[serde(default)]
    pub experiment_id: Option<String>,
    /// Parsed result; null when the trial failed.
    #[serde(default)]
    pub result: Option<TrialResult>,
    /// Flat outcome used by the per-anchor trial files.
    #[serde(default)]
    pub sentence_months: Option<f64>,
    /// Outcome after SACD debiasing.
    #[serde(default)]
    pub debiased_sentence: Option<f64>,
    /// Anchor shown to the model (SACD trials).
    #[serde(default)]
    pub anchor: Option<f64>,
}

impl TrialRecord {
    /// Condition id, or `unknown` when absent.
    pub fn condition(&self) -> &str {
        self.condition_id.as_deref().unwrap_or("unknown")
    }

    /// Model id, or `unknown` when absent.
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or("unknown")
    }

    /// The parsed model outcome under `result`. Flat records are left out:
    /// the SACD runs write their already-debiased outcome there.
    pub fn result_sentence(&self) -> Option<f64> {
        self.result.as_ref().and_then(|r| r.sentence_months)
    }

    /// The trial outcome in months, falling back to the flat field used by
    /// the per-anchor trial files.
    pub fn sentence(&self) -> Option<f64> {
        self.result_sentence().or(self.sentence_months)
    }

    /// The debiased outcome, falling back to the plain outcome.
    pub fn debiased(&self) -> Option<f64> {
        self.debiased_sentence.or_else(|| self.sentence())
    }
}

/// Baseline and anchors for one model (`anchor-values.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorValue {
    /// Provider-qualified model id.
    pub model: String,
    /// Mean sentence without an anchor.
    #[serde(default)]
    pub mean_overall: f64,
    /// Low anchor in months.
    #[serde(default)]
    pub low_anchor: f64,
    /// High anchor in months.
    #[serde(default)]
    pub high_anchor: f64,
}

/// Mean, spread and bootstrap CI of one condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionSummary {
    /// Number of trials with an outcome.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Population standard deviation.
    pub sd: f64,
    /// Bootstrap CI of the mean.
    pub ci: BootstrapEstimate,
}

/// High-minus-low anchoring effect with its condition summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchoringEffect {
    /// Low anchor condition.
    pub low: ConditionSummary,
    /// High anchor condition.
    pub high: ConditionSummary,
    /// Bootstrap estimate of `mean(high) - mean(low)`.
    pub difference: BootstrapEstimate,
}

impl AnchoringEffect {
    /// True when both conditions produced identical outputs on every trial.
    pub fn is_deterministic(&self) -> bool {
        self.low.sd == 0.0 && self.high.sd == 0.0
    }
}

/// Anchoring analysis of a single results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchoringAnalysis {
    /// Display label of the model.
    pub model: String,
    /// Name of the analyzed file.
    pub file: String,
    /// Trials in the low anchor condition.
    pub n_low: usize,
    /// Trials in the high anchor condition.
    pub n_high: usize,
    /// Effect, when both conditions have data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<AnchoringEffect>,
}

/// Difference between two models' anchoring effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossModelComparison {
    /// Model whose effect is the minuend.
    pub model_a: String,
    /// Model whose effect is the subtrahend.
    pub model_b: String,
    /// `effect(a) - effect(b)` in months.
    pub difference: f64,
    /// Bootstrap CI of the difference; absent when every group has zero variance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci: Option<BootstrapEstimate>,
}

/// Settings the bootstrap report was produced with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapMetadata {
    /// Generation time.
    pub generated: DateTime<Utc>,
    /// Resampling iterations.
    pub iterations: usize,
    /// Generator seed.
    pub seed: u64,
    /// Two-sided significance level.
    pub alpha: f64,
}

/// The complete bootstrap CI report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// Settings used.
    pub metadata: BootstrapMetadata,
    /// One entry per analyzed file.
    pub analyses: Vec<AnchoringAnalysis>,
    /// Pairwise comparisons of models with an effect.
    pub comparisons: Vec<CrossModelComparison>,
}

/// Per-model statistics over every results file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStatistics {
    pub model: String,
    pub n_low: usize,
    pub n_high: usize,
    pub n_total: usize,
    pub mean_low: Option<f64>,
    pub mean_high: Option<f64>,
    pub sd_low: Option<f64>,
    pub sd_high: Option<f64>,
    pub ci_low: Option<Interval>,
    pub ci_high: Option<Interval>,
    /// Min, quartiles and max of the low anchor outcomes.
    pub distribution_low: Option<FiveNumberSummary>,
    pub distribution_high: Option<FiveNumberSummary>,
    pub anchoring_effect: Option<f64>,
    pub effect_ci: Option<BootstrapEstimate>,
    pub ttest: Option<TTestResult>,
    pub cohens_d: Option<f64>,
    pub hedges_g: Option<f64>,
    pub effect_magnitude: Option<EffectMagnitude>,
    pub p_bonferroni: Option<f64>,
    pub significant_bonferroni: Option<bool>,
}

/// Statistics over all models, with the Bonferroni family size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsReport {
    /// Generation time.
    pub generated: DateTime<Utc>,
    /// Records that contributed an outcome.
    pub records: usize,
    /// Models with a t-test.
    pub num_comparisons: usize,
    /// Corrected per-test alpha, when any test ran.
    pub bonferroni_alpha: Option<f64>,
    /// Statistics keyed by model id.
    pub models: BTreeMap<String, ModelStatistics>,
}

impl StatisticsReport {
    /// Number of models still significant after correction.
    pub fn significant_after_correction(&self) -> usize {
        self.models
            .values()
            .filter(|m| m.significant_bonferroni == Some(true))
            .count()
    }
}

/// Baseline, anchors and samples gathered for one model, for charting.
#[derive(Debug, Clone, Default)]
pub struct ModelProfile {
    /// Full model id from the anchor table.
    pub full_name: String,
    /// Mean sentence without an anchor.
    pub baseline: f64,
    /// Low anchor in months.
    pub low_anchor: f64,
    /// High anchor in months.
    pub high_anchor: f64,
    /// Outcomes under the low anchor.
    pub low: Vec<f64>,
    /// Outcomes under the high anchor.
    pub high: Vec<f64>,
    /// SACD outcomes starting from the low anchor.
    pub sacd_low: Vec<f64>,
    /// SACD outcomes starting from the high anchor.
    pub sacd_high: Vec<f64>,
}

impl ModelProfile {
    pub fn new(anchor: &AnchorValue) -> Self {
        Self {
            full_name: anchor.model.clone(),
            baseline: anchor.mean_overall,
            low_anchor: anchor.low_anchor,
            high_anchor: anchor.high_anchor,
            ..Self::default()
        }
    }

    /// Which side an observed anchor belongs to. Ties go to high.
    pub fn side_of(&self, anchor: f64) -> AnchorSide {
        if (anchor - self.low_anchor).abs() < (anchor - self.high_anchor).abs() {
            AnchorSide::Low
        } else {
            AnchorSide::High
        }
    }

    /// Anchored samples for one side.
    pub fn anchored(&self, side: AnchorSide) -> &[f64] {
        match side {
            AnchorSide::Low => &self.low,
            AnchorSide::High => &self.high,
        }
    }

    /// SACD samples for one side.
    pub fn debiased(&self, side: AnchorSide) -> &[f64] {
        match side {
            AnchorSide::Low => &self.sacd_low,
            AnchorSide::High => &self.sacd_high,
        }
    }

    /// Anchored mean minus baseline, `None` without samples.
    pub fn effect(&self, side: AnchorSide) -> Option<f64> {
        crate::analysis::stats::mean(self.anchored(side))
            .ok()
            .map(|m| m - self.baseline)
    }

    pub fn has_sacd(&self) -> bool {
        !self.sacd_low.is_empty() || !self.sacd_high.is_empty()
    }
}

/// One bar of the technique ranking figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueDelta {
    /// Technique name.
    pub name: String,
    /// Months moved toward baseline; negative is better.
    pub delta: f64,
    /// Models that improved.
    pub improved: usize,
    /// Models evaluated.
    pub total: usize,
    /// Models where the technique backfired.
    #[serde(default)]
    pub backfired: usize,
}

/// Aggregate technique ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueRanking {
    /// Total trials behind the aggregate.
    pub trials: usize,
    /// Number of models.
    pub models: usize,
    /// Effect of the random-control prompt, drawn as a reference line.
    pub random_control_effect: f64,
    /// Techniques in display order.
    pub techniques: Vec<TechniqueDelta>,
}

/// SACD effect for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDelta {
    pub model: String,
    pub delta: f64,
}

/// Baseline convergence of one technique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceEntry {
    pub technique: String,
    /// Percentage points of convergence toward baseline.
    pub convergence: f64,
    /// Significance marker such as `***` or `ns`.
    #[serde(default)]
    pub significance: String,
}

/// MAD values of one technique across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MadSeries {
    /// Technique id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Hex color, e.g. `#e74c3c`.
    pub color: String,
    /// MAD per domain, aligned with `MadByDomain::domains`.
    pub values: Vec<f64>,
    /// 95% CI per domain.
    pub ci: Vec<(f64, f64)>,
}

/// Mean absolute deviation by domain and technique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MadByDomain {
    pub domains: Vec<String>,
    pub techniques: Vec<MadSeries>,
}

/// Aggregated numbers behind the paper figures (`paper-figures.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperFigures {
    #[serde(default)]
    pub technique_ranking: Option<TechniqueRanking>,
    #[serde(default)]
    pub sacd_by_model: Vec<ModelDelta>,
    #[serde(default)]
    pub convergence: Vec<ConvergenceEntry>,
    #[serde(default)]
    pub mad_by_domain: Option<MadByDomain>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_record_nested_result() {
        let line = r#"{"conditionId":"low-anchor-3mo","model":"openai/gpt-4o","result":{"sentenceMonths":4}}"#;
        let record: TrialRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.condition(), "low-anchor-3mo");
        assert_eq!(record.sentence(), Some(4.0));
    }

    #[test]
    fn test_trial_record_null_result_falls_back() {
        let failed: TrialRecord =
            serde_json::from_str(r#"{"conditionId":"x","result":null,"error":"timeout"}"#).unwrap();
        assert_eq!(failed.sentence(), None);

        let flat: TrialRecord =
            serde_json::from_str(r#"{"model":"m","sentenceMonths":7.5}"#).unwrap();
        assert_eq!(flat.sentence(), Some(7.5));
        assert_eq!(flat.result_sentence(), None);
        assert_eq!(flat.condition(), "unknown");
    }

    #[test]
    fn test_debiased_prefers_sacd_field() {
        let record: TrialRecord =
            serde_json::from_str(r#"{"debiasedSentence":6,"sentenceMonths":9,"anchor":3}"#)
                .unwrap();
        assert_eq!(record.debiased(), Some(6.0));
        assert_eq!(record.anchor, Some(3.0));
    }

    #[test]
    fn test_profile_side_of() {
        let profile = ModelProfile::new(&AnchorValue {
            model: "openai/gpt-4o".to_string(),
            mean_overall: 12.0,
            low_anchor: 6.0,
            high_anchor: 18.0,
        });
        assert_eq!(profile.side_of(5.0), AnchorSide::Low);
        assert_eq!(profile.side_of(20.0), AnchorSide::High);
        assert_eq!(profile.side_of(12.0), AnchorSide::High);
    }

    #[test]
    fn test_profile_effect() {
        let mut profile = ModelProfile {
            baseline: 10.0,
            ..ModelProfile::default()
        };
        assert_eq!(profile.effect(AnchorSide::Low), None);
        profile.low = vec![6.0, 8.0];
        assert_eq!(profile.effect(AnchorSide::Low), Some(-3.0));
    }
}
