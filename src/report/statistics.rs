//! Statistics report (`statistics.md` / `statistics.json`).

use super::{format_effect, format_p};
use crate::analysis::short_model_name;
use crate::analysis::stats::{FiveNumberSummary, Interval};
use crate::models::{ModelStatistics, StatisticsReport};
use anyhow::Result;

/// Generate the Markdown statistics report.
pub fn generate_statistics_markdown(report: &StatisticsReport) -> String {
    let mut output = String::new();

    output.push_str("# Statistical Analysis Results\n\n");
    output.push_str(&format!(
        "Generated: {}\n\n",
        report.generated.format("%Y-%m-%dT%H:%M:%SZ")
    ));
    output.push_str(&format!(
        "Records: {} across {} models\n\n",
        report.records,
        report.models.len()
    ));

    output.push_str(&generate_summary_table(report));
    output.push_str(&generate_distribution_table(report));
    output.push_str(&generate_bonferroni_section(report));
    output.push_str(&generate_interpretation_section(report.num_comparisons));

    output
}

/// Serialize the statistics report as pretty JSON.
pub fn generate_statistics_json(report: &StatisticsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn format_mean_ci(mean: Option<f64>, ci: Option<&Interval>) -> String {
    let Some(mean) = mean else {
        return "N/A".to_string();
    };
    match ci {
        Some(ci) => format!("{:.1} [{:.1}, {:.1}]", mean, ci.lower, ci.upper),
        None => format!("{:.1} [?, ?]", mean),
    }
}

fn format_effect_cell(stats: &ModelStatistics) -> String {
    match (stats.anchoring_effect, stats.effect_ci) {
        (Some(effect), Some(ci)) => {
            format!("{} [{:.1}, {:.1}]", format_effect(effect), ci.lower, ci.upper)
        }
        (Some(effect), None) => format_effect(effect),
        _ => "N/A".to_string(),
    }
}

fn generate_summary_table(report: &StatisticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Summary Table\n\n");
    section.push_str(
        "| Model | n (low/high) | Mean Low [95% CI] | Mean High [95% CI] | Effect [bootstrap CI] | Cohen's d | p-value |\n",
    );
    section.push_str(
        "|-------|--------------|-------------------|--------------------|-----------------------|-----------|---------|\n",
    );

    for (model, stats) in &report.models {
        let d = match (stats.cohens_d, stats.effect_magnitude) {
            (Some(d), Some(magnitude)) => format!("{:.2} ({})", d, magnitude),
            _ => "N/A".to_string(),
        };
        let p = stats
            .ttest
            .map(|t| format_p(t.p, 3))
            .unwrap_or_else(|| "N/A".to_string());

        section.push_str(&format!(
            "| {} | {}/{} | {} | {} | {} | {} | {} |\n",
            short_model_name(model),
            stats.n_low,
            stats.n_high,
            format_mean_ci(stats.mean_low, stats.ci_low.as_ref()),
            format_mean_ci(stats.mean_high, stats.ci_high.as_ref()),
            format_effect_cell(stats),
            d,
            p
        ));
    }
    section.push('\n');

    section
}

fn format_distribution(summary: Option<&FiveNumberSummary>) -> String {
    match summary {
        Some(s) => format!(
            "{:.1} / {:.1} / {:.1} / {:.1} / {:.1}",
            s.min, s.q1, s.median, s.q3, s.max
        ),
        None => "N/A".to_string(),
    }
}

fn generate_distribution_table(report: &StatisticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Distribution (min / Q1 / median / Q3 / max)\n\n");
    section.push_str("| Model | Low anchor | High anchor |\n");
    section.push_str("|-------|------------|-------------|\n");

    for (model, stats) in &report.models {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            short_model_name(model),
            format_distribution(stats.distribution_low.as_ref()),
            format_distribution(stats.distribution_high.as_ref())
        ));
    }
    section.push('\n');

    section
}

fn generate_bonferroni_section(report: &StatisticsReport) -> String {
    let mut section = String::new();
    let tests = report.num_comparisons;

    section.push_str("## Bonferroni Correction\n\n");
    section.push_str(&format!("- **Number of comparisons**: {}\n", tests));
    match report.bonferroni_alpha {
        Some(alpha) => section.push_str(&format!(
            "- **Corrected α**: {:.4} (0.05 / {})\n",
            alpha, tests
        )),
        None => section.push_str("- **Corrected α**: N/A\n"),
    }
    section.push_str(&format!(
        "- **Significant after correction**: {} / {} models\n\n",
        report.significant_after_correction(),
        tests
    ));

    if tests == 0 {
        return section;
    }

    section.push_str("### Models Significant After Bonferroni Correction\n\n");
    section.push_str("| Model | p (uncorrected) | p (Bonferroni) | Significant |\n");
    section.push_str("|-------|-----------------|----------------|-------------|\n");

    for (model, stats) in &report.models {
        let (Some(t), Some(p_bonf)) = (stats.ttest, stats.p_bonferroni) else {
            continue;
        };
        let significant = if stats.significant_bonferroni == Some(true) {
            "✅ Yes"
        } else {
            "❌ No"
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            short_model_name(model),
            format_p(t.p, 4),
            format_p(p_bonf, 4),
            significant
        ));
    }
    section.push('\n');

    section
}

fn generate_interpretation_section(tests: usize) -> String {
    let mut section = String::new();

    section.push_str("## Interpretation\n\n");
    section.push_str("- **Effect**: Difference in mean sentence (high anchor - low anchor). Positive = anchoring toward higher values.\n");
    section.push_str("- **Cohen's d**: Standardized effect size. |d| < 0.2 = negligible, 0.2-0.5 = small, 0.5-0.8 = medium, > 0.8 = large.\n");
    section.push_str("- **p-value**: Two-tailed Welch's t-test. p < 0.05 suggests a statistically significant difference.\n");
    section.push_str(&format!(
        "- **Bonferroni**: Corrected p-values account for multiple comparisons (α = 0.05 / {}).\n\n",
        tests
    ));

    section.push_str("## Notes\n\n");
    section.push_str("- Condition means use 95% normal-approximation CIs\n");
    section.push_str("- The effect CI is a percentile bootstrap of the mean difference\n");
    section.push_str("- Models with insufficient data (n < 2, or zero variance) show N/A\n");
    section.push_str("- Only records with a parsed result.sentenceMonths are included; flat SACD outputs are left out\n");

    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bootstrap::BootstrapEstimate;
    use crate::analysis::stats::{EffectMagnitude, TTestResult};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn create_test_report() -> StatisticsReport {
        let gpt = ModelStatistics {
            model: "openai/gpt-4o".to_string(),
            n_low: 30,
            n_high: 30,
            n_total: 60,
            mean_low: Some(3.0),
            mean_high: Some(9.2),
            sd_low: Some(0.5),
            sd_high: Some(0.7),
            ci_low: Some(Interval {
                lower: 2.8,
                upper: 3.2,
                margin: 0.2,
            }),
            ci_high: Some(Interval {
                lower: 8.9,
                upper: 9.5,
                margin: 0.3,
            }),
            distribution_low: Some(FiveNumberSummary {
                min: 2.0,
                q1: 3.0,
                median: 3.0,
                q3: 3.0,
                max: 4.0,
            }),
            distribution_high: None,
            anchoring_effect: Some(6.2),
            effect_ci: Some(BootstrapEstimate {
                estimate: 6.2,
                lower: 5.9,
                upper: 6.5,
                se: 0.15,
            }),
            ttest: Some(TTestResult {
                t: 39.5,
                df: 52.3,
                p: 1e-12,
            }),
            cohens_d: Some(10.2),
            hedges_g: Some(10.07),
            effect_magnitude: Some(EffectMagnitude::Large),
            p_bonferroni: Some(2e-12),
            significant_bonferroni: Some(true),
        };
        let claude = ModelStatistics {
            model: "anthropic/claude-sonnet-4".to_string(),
            n_low: 1,
            n_high: 0,
            n_total: 1,
            mean_low: Some(4.0),
            ..ModelStatistics::default()
        };

        let mut models = BTreeMap::new();
        models.insert(gpt.model.clone(), gpt);
        models.insert(claude.model.clone(), claude);

        StatisticsReport {
            generated: Utc::now(),
            records: 61,
            num_comparisons: 1,
            bonferroni_alpha: Some(0.05),
            models,
        }
    }

    #[test]
    fn test_generate_statistics_markdown() {
        let markdown = generate_statistics_markdown(&create_test_report());

        assert!(markdown.contains("# Statistical Analysis Results"));
        assert!(markdown.contains(
            "| gpt-4o | 30/30 | 3.0 [2.8, 3.2] | 9.2 [8.9, 9.5] | +6.2mo [5.9, 6.5] | 10.20 (large) | <.001 |"
        ));
        assert!(markdown.contains("| claude-sonnet-4 | 1/0 | 4.0 [?, ?] | N/A | N/A | N/A | N/A |"));
        assert!(markdown.contains("| gpt-4o | 2.0 / 3.0 / 3.0 / 3.0 / 4.0 | N/A |"));
        assert!(markdown.contains("- **Corrected α**: 0.0500 (0.05 / 1)"));
        assert!(markdown.contains("- **Significant after correction**: 1 / 1 models"));
        assert!(markdown.contains("| gpt-4o | <.001 | <.001 | ✅ Yes |"));
    }

    #[test]
    fn test_bonferroni_section_without_tests() {
        let mut report = create_test_report();
        report.models.retain(|_, m| m.ttest.is_none());
        report.num_comparisons = 0;
        report.bonferroni_alpha = None;

        let section = generate_bonferroni_section(&report);
        assert!(section.contains("- **Corrected α**: N/A"));
        assert!(!section.contains("| Model |"));
    }

    #[test]
    fn test_generate_statistics_json() {
        let json = generate_statistics_json(&create_test_report()).unwrap();

        assert!(json.contains("\"num_comparisons\": 1"));
        assert!(json.contains("\"openai/gpt-4o\""));
        assert!(json.contains("\"effect_magnitude\": \"large\""));
    }
}
