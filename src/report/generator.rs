//! Bootstrap CI report.
//!
//! Renders a `BootstrapReport` as Markdown with the methodology, a summary
//! table, per-model details and the cross-model comparison.

use super::{format_ci, format_percent, group_thousands};
use crate::models::{AnchoringAnalysis, BootstrapMetadata, BootstrapReport, CrossModelComparison};
use anyhow::Result;

/// Generate the complete Markdown bootstrap report.
pub fn generate_bootstrap_markdown(report: &BootstrapReport) -> String {
    let mut output = String::new();
    let level = confidence_label(report.metadata.alpha);

    output.push_str("# Bootstrap Confidence Interval Analysis\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_methodology_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.analyses, &level));
    output.push_str(&generate_details_section(&report.analyses, &level));
    output.push_str(&generate_comparison_section(&report.comparisons, &level));
    output.push_str(&generate_interpretation_section(&report.analyses));

    output
}

/// Serialize the bootstrap report as pretty JSON.
pub fn generate_bootstrap_json(report: &BootstrapReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// `95%` for alpha 0.05.
fn confidence_label(alpha: f64) -> String {
    format!("{}%", format_percent((1.0 - alpha) * 100.0))
}

fn generate_metadata_section(metadata: &BootstrapMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "**Generated:** {}\n",
        metadata.generated.format("%Y-%m-%d")
    ));
    section.push_str(&format!(
        "**Bootstrap iterations:** {}\n",
        group_thousands(metadata.iterations)
    ));
    section.push_str(&format!("**Random seed:** {}\n\n", metadata.seed));

    section
}

fn generate_methodology_section(metadata: &BootstrapMetadata) -> String {
    let mut section = String::new();
    let lower = format_percent(metadata.alpha / 2.0 * 100.0);
    let upper = format_percent((1.0 - metadata.alpha / 2.0) * 100.0);

    section.push_str("## Methodology\n\n");
    section.push_str(&format!(
        "Bootstrap {} confidence intervals are computed using the percentile method:\n",
        confidence_label(metadata.alpha)
    ));
    section.push_str("1. Resample with replacement from each condition (n samples → n samples)\n");
    section.push_str(
        "2. Compute the statistic of interest (mean difference for the anchoring effect)\n",
    );
    section.push_str(&format!(
        "3. Repeat {} times\n",
        group_thousands(metadata.iterations)
    ));
    section.push_str(&format!(
        "4. Report the {}th and {}th percentiles as CI bounds\n\n",
        lower, upper
    ));
    section.push_str(
        "**Note on deterministic sampling (temp=0):** When a model produces identical outputs\n",
    );
    section.push_str(
        "for identical inputs (SD=0), bootstrap CIs collapse to point estimates. There is no\n",
    );
    section.push_str(
        "sampling uncertainty to quantify, so the narrow CIs reflect the data, not an error.\n\n",
    );

    section
}

fn generate_summary_section(analyses: &[AnchoringAnalysis], level: &str) -> String {
    let mut section = String::new();

    section.push_str("## Key Findings\n\n");
    section.push_str("### Anchoring Effect Summary\n\n");
    section.push_str(&format!(
        "| Model | n | Effect (months) | {} CI | Significant? |\n",
        level
    ));
    section.push_str("|-------|---|-----------------|--------|--------------|\n");

    for analysis in analyses {
        let Some(ref effect) = analysis.effect else {
            continue;
        };
        let d = &effect.difference;
        let significant = if d.excludes_zero() {
            "Yes ✓"
        } else {
            "No (CI crosses 0)"
        };
        section.push_str(&format!(
            "| {} | {}+{} | {:.2} | [{:.2}, {:.2}] | {} |\n",
            analysis.model, analysis.n_low, analysis.n_high, d.estimate, d.lower, d.upper, significant
        ));
    }
    section.push('\n');

    section
}

fn generate_details_section(analyses: &[AnchoringAnalysis], level: &str) -> String {
    let mut section = String::new();

    section.push_str("## Detailed Results\n\n");
    for analysis in analyses {
        section.push_str(&generate_model_block(analysis, level));
    }

    section
}

/// Details for one analyzed file.
fn generate_model_block(analysis: &AnchoringAnalysis, level: &str) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {}\n", analysis.model));
    block.push_str(&format!("**File:** `{}`\n\n", analysis.file));

    let Some(ref effect) = analysis.effect else {
        block.push_str(&format!(
            "*Insufficient data for analysis (low n={}, high n={})*\n\n",
            analysis.n_low, analysis.n_high
        ));
        return block;
    };

    block.push_str("**Condition Means:**\n");
    for (name, summary) in [("Low anchor", &effect.low), ("High anchor", &effect.high)] {
        block.push_str(&format!(
            "- {}: {:.2} ± {:.2} (n={})\n",
            name, summary.mean, summary.sd, summary.n
        ));
        block.push_str(&format!(
            "  - {} CI: [{:.2}, {:.2}]\n",
            level, summary.ci.lower, summary.ci.upper
        ));
    }
    block.push('\n');

    let d = &effect.difference;
    block.push_str("**Anchoring Effect (High - Low):**\n");
    block.push_str(&format!("- Point estimate: {:.2} months\n", d.estimate));
    block.push_str(&format!("- Bootstrap SE: {:.4}\n", d.se));
    block.push_str(&format!("- {} CI: [{:.2}, {:.2}]\n", level, d.lower, d.upper));
    block.push_str(&format!("- CI width: {:.2} months\n", d.width()));

    if effect.is_deterministic() {
        block.push_str("\n**⚠️ Note:** SD=0 in both conditions (deterministic output at temp=0).\n");
        block.push_str("The bootstrap CI collapses to the point estimate; there is no\n");
        block.push_str("sampling variability to quantify.\n");
    }

    if d.excludes_zero() {
        block.push_str("- **Conclusion:** Significant anchoring effect (CI excludes zero)\n");
    } else {
        block.push_str("- **Conclusion:** No significant anchoring effect (CI includes zero)\n");
    }
    block.push('\n');

    block
}

fn generate_comparison_section(comparisons: &[CrossModelComparison], level: &str) -> String {
    let mut section = String::new();

    section.push_str("## Cross-Model Comparison\n\n");

    if comparisons.is_empty() {
        section.push_str("*Fewer than two models have complete data; nothing to compare.*\n\n");
        return section;
    }

    for c in comparisons {
        section.push_str(&format!(
            "**{} effect - {} effect = {:.2} months**\n\n",
            c.model_a, c.model_b, c.difference
        ));

        match c.ci {
            Some(ci) => {
                section.push_str(&format!(
                    "- {} CI (difference of differences): {}\n",
                    level,
                    format_ci(ci.estimate, ci.lower, ci.upper, 2)
                ));
                section.push_str(&format!("- Bootstrap SE: {:.4}\n", ci.se));
                if ci.excludes_zero() {
                    section.push_str("- The models differ in susceptibility (CI excludes zero)\n\n");
                } else {
                    section.push_str("- No reliable difference between the models (CI includes zero)\n\n");
                }
            }
            None => {
                section.push_str(
                    "*All four conditions have SD=0, so a bootstrap CI for this difference is\n",
                );
                section.push_str(&format!(
                    "not meaningful. The observed difference ({:.1} months) is exact under\n",
                    c.difference
                ));
                section.push_str("deterministic sampling.*\n\n");
            }
        }
    }

    section
}

fn generate_interpretation_section(analyses: &[AnchoringAnalysis]) -> String {
    let mut section = String::new();

    section.push_str("## Interpretation Notes\n\n");
    section.push_str("### Understanding SD=0 Results\n\n");
    section.push_str("When temperature=0 produces identical outputs across all trials:\n");
    section.push_str("- Bootstrap CIs collapse to point estimates (e.g., [6.00, 6.00])\n");
    section.push_str("- This is **not** an error; it reflects zero sampling variance\n");
    section.push_str("- The effect is deterministic and reproducible\n");
    section.push_str("- Any non-zero effect is trivially significant\n\n");

    let with_effect: Vec<_> = analyses
        .iter()
        .filter_map(|a| a.effect.as_ref().map(|e| (a, e)))
        .collect();
    if with_effect.is_empty() {
        return section;
    }

    section.push_str("### Per-Model Summary\n\n");
    for (i, (analysis, effect)) in with_effect.iter().enumerate() {
        let d = &effect.difference;
        section.push_str(&format!(
            "{}. **{}:** {:.1} month anchoring effect, CI [{:.2}, {:.2}]\n",
            i + 1,
            analysis.model,
            d.estimate,
            d.lower,
            d.upper
        ));
        if effect.is_deterministic() {
            if d.estimate == 0.0 {
                section.push_str("   - Deterministic null effect: complete resistance under this paradigm\n");
            } else {
                section.push_str("   - Deterministic effect: reproducible, not a statistical artifact\n");
            }
        } else if d.excludes_zero() {
            section.push_str("   - Effect persists across resamples\n");
        } else {
            section.push_str("   - Effect is within sampling noise\n");
        }
    }
    section.push('\n');

    section
}
