//! Report generation.
//!
//! Markdown and JSON renderings of the bootstrap and statistics results,
//! plus the number formatting they share.

mod generator;
mod statistics;

pub use generator::{generate_bootstrap_json, generate_bootstrap_markdown};
pub use statistics::{generate_statistics_json, generate_statistics_markdown};

use anyhow::{Context, Result};
use std::path::Path;

/// Render `mean [lo, hi]` with a fixed number of decimals.
pub fn format_ci(mean: f64, lower: f64, upper: f64, decimals: usize) -> String {
    format!(
        "{:.prec$} [{:.prec$}, {:.prec$}]",
        mean,
        lower,
        upper,
        prec = decimals
    )
}

/// Render a p-value, collapsing anything below 0.001 to `<.001`.
pub fn format_p(p: f64, decimals: usize) -> String {
    if p.is_nan() {
        "N/A".to_string()
    } else if p < 0.001 {
        "<.001".to_string()
    } else {
        format!("{:.prec$}", p, prec = decimals)
    }
}

/// Signed effect in months, e.g. `+6.0mo`.
pub fn format_effect(effect: f64) -> String {
    let sign = if effect >= 0.0 { "+" } else { "" };
    format!("{}{:.1}mo", sign, effect)
}

/// Integer with comma thousands separators.
pub(crate) fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Percentage without trailing zeros, e.g. `2.5` or `95`.
pub(crate) fn format_percent(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Write a rendered report, creating the parent directory when needed.
pub fn save_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ci() {
        assert_eq!(format_ci(6.0, 5.5, 6.25, 2), "6.00 [5.50, 6.25]");
        assert_eq!(format_ci(3.14159, 3.0, 3.3, 1), "3.1 [3.0, 3.3]");
    }

    #[test]
    fn test_format_p() {
        assert_eq!(format_p(0.0004, 3), "<.001");
        assert_eq!(format_p(0.0123, 3), "0.012");
        assert_eq!(format_p(0.5, 4), "0.5000");
        assert_eq!(format_p(f64::NAN, 3), "N/A");
    }

    #[test]
    fn test_format_effect() {
        assert_eq!(format_effect(6.0), "+6.0mo");
        assert_eq!(format_effect(0.0), "+0.0mo");
        assert_eq!(format_effect(-2.34), "-2.3mo");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(10_000), "10,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(2.5), "2.5");
        assert_eq!(format_percent(95.0), "95");
        assert_eq!(format_percent(97.49999999999999), "97.5");
    }

    #[test]
    fn test_save_report_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.md");
        save_report("# Report\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report\n");
    }
}
