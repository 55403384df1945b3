//! Trial aggregation and model-name handling.
//!
//! This module groups trial outcomes by condition and by model, and
//! builds the per-model profiles the charts are drawn from.

use crate::models::{AnchorSide, AnchorValue, ModelProfile, TrialRecord};
use std::collections::BTreeMap;
use tracing::debug;

/// Provider prefixes dropped from model ids in tables.
const PROVIDER_PREFIXES: [&str; 3] = ["anthropic/", "openai/", "openrouter/"];

/// Outcomes of one model split by anchor side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSamples {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
    /// Every outcome, including conditions that are neither side.
    pub all: Vec<f64>,
}

/// Group outcomes by condition id. Only `result.sentenceMonths` counts;
/// records without it are dropped.
pub fn group_by_condition(records: &[TrialRecord]) -> BTreeMap<String, Vec<f64>> {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for record in records {
        if let Some(sentence) = record.result_sentence() {
            grouped
                .entry(record.condition().to_string())
                .or_default()
                .push(sentence);
        }
    }

    grouped
}

/// Decide the anchor side from a condition id.
pub fn classify_condition(condition: &str) -> Option<AnchorSide> {
    if condition.contains("low") || condition.contains("3mo") {
        Some(AnchorSide::Low)
    } else if condition.contains("high") || condition.contains("9mo") {
        Some(AnchorSide::High)
    } else {
        None
    }
}

/// Group outcomes by model id, splitting low and high anchor conditions.
/// Like [`group_by_condition`], flat records are ignored.
pub fn group_by_model(records: &[TrialRecord]) -> BTreeMap<String, ModelSamples> {
    let mut grouped: BTreeMap<String, ModelSamples> = BTreeMap::new();

    for record in records {
        let Some(sentence) = record.result_sentence() else {
            continue;
        };

        let samples = grouped.entry(record.model_name().to_string()).or_default();
        match classify_condition(record.condition()) {
            Some(AnchorSide::Low) => samples.low.push(sentence),
            Some(AnchorSide::High) => samples.high.push(sentence),
            None => {}
        }
        samples.all.push(sentence);
    }

    grouped
}

/// Normalize a model id for matching across files:
/// `openai/GPT-4.1` becomes `gpt-4-1`.
pub fn normalize_model_name(name: &str) -> String {
    name.rsplit('/')
        .next()
        .unwrap_or(name)
        .replace('.', "-")
        .to_lowercase()
}

/// Drop the provider prefix from a model id for display.
pub fn short_model_name(name: &str) -> &str {
    PROVIDER_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Build chart profiles keyed by normalized model name.
///
/// Only models present in the anchor table get a profile; trials for
/// other models are ignored. SACD trials are assigned to the side whose
/// anchor is closer to the anchor they were shown.
pub fn build_model_profiles(
    anchors: &[AnchorValue],
    low_trials: &[TrialRecord],
    high_trials: &[TrialRecord],
    sacd_trials: &[TrialRecord],
) -> BTreeMap<String, ModelProfile> {
    let mut profiles: BTreeMap<String, ModelProfile> = anchors
        .iter()
        .map(|a| (normalize_model_name(&a.model), ModelProfile::new(a)))
        .collect();

    let mut ignored = 0usize;

    for (trials, side) in [(low_trials, AnchorSide::Low), (high_trials, AnchorSide::High)] {
        for trial in trials {
            let Some(sentence) = trial.sentence() else {
                continue;
            };
            match profiles.get_mut(&normalize_model_name(trial.model_name())) {
                Some(profile) => match side {
                    AnchorSide::Low => profile.low.push(sentence),
                    AnchorSide::High => profile.high.push(sentence),
                },
                None => ignored += 1,
            }
        }
    }

    for trial in sacd_trials {
        let Some(sentence) = trial.debiased() else {
            continue;
        };
        let Some(profile) = profiles.get_mut(&normalize_model_name(trial.model_name())) else {
            ignored += 1;
            continue;
        };
        match profile.side_of(trial.anchor.unwrap_or(0.0)) {
            AnchorSide::Low => profile.sacd_low.push(sentence),
            AnchorSide::High => profile.sacd_high.push(sentence),
        }
    }

    if ignored > 0 {
        debug!("Ignored {} trials for models without anchor values", ignored);
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrialResult;

    fn trial(model: &str, condition: &str, months: Option<f64>) -> TrialRecord {
        TrialRecord {
            condition_id: Some(condition.to_string()),
            model: Some(model.to_string()),
            result: Some(TrialResult {
                sentence_months: months,
            }),
            ..TrialRecord::default()
        }
    }

    fn flat(model: &str, condition: &str, months: f64) -> TrialRecord {
        TrialRecord {
            condition_id: Some(condition.to_string()),
            model: Some(model.to_string()),
            sentence_months: Some(months),
            ..TrialRecord::default()
        }
    }

    fn sacd(model: &str, anchor: f64, debiased: f64) -> TrialRecord {
        TrialRecord {
            model: Some(model.to_string()),
            anchor: Some(anchor),
            debiased_sentence: Some(debiased),
            ..TrialRecord::default()
        }
    }

    #[test]
    fn test_group_by_condition() {
        let records = vec![
            trial("m", "low-anchor-3mo", Some(4.0)),
            trial("m", "high-anchor-9mo", Some(10.0)),
            trial("m", "low-anchor-3mo", Some(5.0)),
            trial("m", "low-anchor-3mo", None),
        ];

        let grouped = group_by_condition(&records);

        assert_eq!(grouped.get("low-anchor-3mo"), Some(&vec![4.0, 5.0]));
        assert_eq!(grouped.get("high-anchor-9mo"), Some(&vec![10.0]));
    }

    #[test]
    fn test_missing_condition_is_unknown() {
        let record = TrialRecord {
            result: Some(TrialResult {
                sentence_months: Some(3.0),
            }),
            ..TrialRecord::default()
        };
        let grouped = group_by_condition(&[record]);
        assert_eq!(grouped.get("unknown"), Some(&vec![3.0]));
    }

    #[test]
    fn test_grouping_ignores_flat_outcomes() {
        let records = vec![
            trial("m", "low-anchor-3mo", Some(3.0)),
            flat("m", "low-anchor-3mo", 6.0),
        ];

        assert_eq!(group_by_condition(&records)["low-anchor-3mo"], vec![3.0]);
        let grouped = group_by_model(&records);
        assert_eq!(grouped["m"].low, vec![3.0]);
        assert_eq!(grouped["m"].all, vec![3.0]);
    }

    #[test]
    fn test_classify_condition() {
        assert_eq!(classify_condition("low-anchor-3mo"), Some(AnchorSide::Low));
        assert_eq!(classify_condition("anchor-3mo"), Some(AnchorSide::Low));
        assert_eq!(classify_condition("high-anchor"), Some(AnchorSide::High));
        assert_eq!(classify_condition("prosecutor-9mo"), Some(AnchorSide::High));
        assert_eq!(classify_condition("no-anchor"), None);
    }

    #[test]
    fn test_group_by_model() {
        let records = vec![
            trial("openai/gpt-4o", "low-anchor-3mo", Some(4.0)),
            trial("openai/gpt-4o", "high-anchor-9mo", Some(10.0)),
            trial("openai/gpt-4o", "no-anchor", Some(7.0)),
            trial("anthropic/claude", "low-anchor-3mo", Some(6.0)),
        ];

        let grouped = group_by_model(&records);

        let gpt = &grouped["openai/gpt-4o"];
        assert_eq!(gpt.low, vec![4.0]);
        assert_eq!(gpt.high, vec![10.0]);
        assert_eq!(gpt.all.len(), 3);
        assert_eq!(grouped["anthropic/claude"].high.len(), 0);
    }

    #[test]
    fn test_normalize_model_name() {
        assert_eq!(normalize_model_name("openai/GPT-4.1"), "gpt-4-1");
        assert_eq!(
            normalize_model_name("openrouter/anthropic/claude-3.5-sonnet"),
            "claude-3-5-sonnet"
        );
        assert_eq!(normalize_model_name("o3"), "o3");
    }

    #[test]
    fn test_short_model_name() {
        assert_eq!(short_model_name("anthropic/claude-opus-4"), "claude-opus-4");
        assert_eq!(short_model_name("openrouter/moonshot/kimi"), "moonshot/kimi");
        assert_eq!(short_model_name("mistral-large"), "mistral-large");
    }

    #[test]
    fn test_build_model_profiles() {
        let anchors = vec![AnchorValue {
            model: "openai/gpt-4.1".to_string(),
            mean_overall: 12.0,
            low_anchor: 6.0,
            high_anchor: 18.0,
        }];
        let low = vec![
            trial("gpt-4.1", "low", Some(8.0)),
            trial("other-model", "low", Some(1.0)),
        ];
        let high = vec![flat("openai/gpt-4.1", "high", 16.0)];
        let sacd_trials = vec![sacd("gpt-4.1", 6.0, 11.0), sacd("gpt-4.1", 18.0, 13.0)];

        let profiles = build_model_profiles(&anchors, &low, &high, &sacd_trials);

        assert_eq!(profiles.len(), 1);
        let p = &profiles["gpt-4-1"];
        assert_eq!(p.full_name, "openai/gpt-4.1");
        assert_eq!(p.low, vec![8.0]);
        assert_eq!(p.high, vec![16.0]);
        assert_eq!(p.sacd_low, vec![11.0]);
        assert_eq!(p.sacd_high, vec![13.0]);
        assert!(p.has_sacd());
        assert_eq!(p.effect(AnchorSide::Low), Some(-4.0));
    }
}
