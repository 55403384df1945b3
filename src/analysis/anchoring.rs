//! Anchoring-effect pipelines behind the `bootstrap` and `stats` reports.

use super::aggregator::{group_by_condition, group_by_model, ModelSamples};
use super::bootstrap::Bootstrap;
use super::stats::{
    bonferroni, effect_size, five_number_summary, interpret_cohens_d, mean, normal_ci,
    population_sd, sample_sd, welch_t_test, Result,
};
use crate::models::{
    AnchoringAnalysis, AnchoringEffect, ConditionSummary, CrossModelComparison, ModelStatistics,
    StatisticsReport, TrialRecord,
};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Confidence level of the normal-approximation intervals.
const NORMAL_CI_LEVEL: f64 = 0.95;

/// Low and high anchor outcomes of one labelled results file.
#[derive(Debug, Clone)]
pub struct AnchoringSamples {
    /// Display label of the model.
    pub label: String,
    /// File the samples came from.
    pub file: String,
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl AnchoringSamples {
    /// Pick the two configured conditions out of a file's records.
    pub fn from_records(
        label: &str,
        file: &str,
        records: &[TrialRecord],
        low_condition: &str,
        high_condition: &str,
    ) -> Self {
        let mut by_condition = group_by_condition(records);
        Self {
            label: label.to_string(),
            file: file.to_string(),
            low: by_condition.remove(low_condition).unwrap_or_default(),
            high: by_condition.remove(high_condition).unwrap_or_default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.low.is_empty() && !self.high.is_empty()
    }

    fn has_variance(&self) -> bool {
        [&self.low, &self.high]
            .iter()
            .any(|g| population_sd(g).map(|sd| sd > 0.0).unwrap_or(false))
    }
}

fn summarize_condition(values: &[f64], bootstrap: &Bootstrap) -> Result<ConditionSummary> {
    Ok(ConditionSummary {
        n: values.len(),
        mean: mean(values)?,
        sd: population_sd(values)?,
        ci: bootstrap.single_mean(values)?,
    })
}

/// Anchoring effect of one file. Files missing either condition yield an
/// analysis without an effect.
pub fn analyze_anchoring(
    samples: &AnchoringSamples,
    bootstrap: &Bootstrap,
) -> Result<AnchoringAnalysis> {
    let effect = if samples.is_complete() {
        Some(AnchoringEffect {
            low: summarize_condition(&samples.low, bootstrap)?,
            high: summarize_condition(&samples.high, bootstrap)?,
            difference: bootstrap.mean_difference(&samples.low, &samples.high)?,
        })
    } else {
        warn!(
            "{}: insufficient data (low n={}, high n={})",
            samples.label,
            samples.low.len(),
            samples.high.len()
        );
        None
    };

    Ok(AnchoringAnalysis {
        model: samples.label.clone(),
        file: samples.file.clone(),
        n_low: samples.low.len(),
        n_high: samples.high.len(),
        effect,
    })
}

/// Pairwise differences between the anchoring effects of complete files.
///
/// A CI is attached only when at least one of the four groups varies;
/// with deterministic outputs the difference is exact.
pub fn compare_models(
    samples: &[AnchoringSamples],
    bootstrap: &Bootstrap,
) -> Result<Vec<CrossModelComparison>> {
    let complete: Vec<&AnchoringSamples> = samples.iter().filter(|s| s.is_complete()).collect();
    let mut comparisons = Vec::new();

    for (i, a) in complete.iter().enumerate() {
        for b in &complete[i + 1..] {
            let difference =
                (mean(&a.high)? - mean(&a.low)?) - (mean(&b.high)? - mean(&b.low)?);

            let ci = if a.has_variance() || b.has_variance() {
                Some(bootstrap.difference_of_differences(&a.low, &a.high, &b.low, &b.high)?)
            } else {
                None
            };

            comparisons.push(CrossModelComparison {
                model_a: a.label.clone(),
                model_b: b.label.clone(),
                difference,
                ci,
            });
        }
    }

    Ok(comparisons)
}

fn model_statistics(
    model: &str,
    samples: &ModelSamples,
    bootstrap: &Bootstrap,
) -> Result<ModelStatistics> {
    let ModelSamples { low, high, all } = samples;

    let mut stats = ModelStatistics {
        model: model.to_string(),
        n_low: low.len(),
        n_high: high.len(),
        n_total: all.len(),
        mean_low: mean(low).ok(),
        mean_high: mean(high).ok(),
        sd_low: sample_sd(low).ok(),
        sd_high: sample_sd(high).ok(),
        ci_low: normal_ci(low, NORMAL_CI_LEVEL).ok(),
        ci_high: normal_ci(high, NORMAL_CI_LEVEL).ok(),
        distribution_low: five_number_summary(low).ok(),
        distribution_high: five_number_summary(high).ok(),
        ..ModelStatistics::default()
    };

    if let (Some(m_low), Some(m_high)) = (stats.mean_low, stats.mean_high) {
        stats.anchoring_effect = Some(m_high - m_low);
        stats.effect_ci = Some(bootstrap.mean_difference(low, high)?);

        match welch_t_test(high, low) {
            Ok(t) => stats.ttest = Some(t),
            Err(e) => debug!("{}: no t-test ({})", model, e),
        }
        if let Ok(es) = effect_size(high, low) {
            stats.cohens_d = Some(es.cohens_d);
            stats.hedges_g = Some(es.hedges_g);
            stats.effect_magnitude = Some(interpret_cohens_d(es.cohens_d));
        }
    }

    Ok(stats)
}

/// Statistics for every model in `records`, with Bonferroni correction
/// across all models that have a t-test.
pub fn compute_statistics(
    records: &[TrialRecord],
    bootstrap: &Bootstrap,
    mut on_model: impl FnMut(&str),
) -> Result<StatisticsReport> {
    let grouped = group_by_model(records);
    let mut models: BTreeMap<String, ModelStatistics> = BTreeMap::new();

    for (model, samples) in &grouped {
        on_model(model);
        if samples.low.is_empty() && samples.high.is_empty() {
            debug!("{}: no anchored conditions, skipping", model);
            continue;
        }
        models.insert(model.clone(), model_statistics(model, samples, bootstrap)?);
    }

    let num_comparisons = models.values().filter(|m| m.ttest.is_some()).count();
    let bonferroni_alpha = (num_comparisons > 0).then(|| 0.05 / num_comparisons as f64);

    for stats in models.values_mut() {
        if let Some(t) = stats.ttest {
            let p = bonferroni(t.p, num_comparisons);
            stats.p_bonferroni = Some(p);
            stats.significant_bonferroni = Some(p < 0.05);
        }
    }

    Ok(StatisticsReport {
        generated: Utc::now(),
        records: grouped.values().map(|s| s.all.len()).sum(),
        num_comparisons,
        bonferroni_alpha,
        models,
    })
}
