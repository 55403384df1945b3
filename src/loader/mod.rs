//! Loading of result files.
//!
//! JSONL trial files and the small JSON summary documents that sit
//! beside them in the results directory. Missing files are skipped with a
//! notice rather than failing the run.

use crate::models::{AnchorValue, PaperFigures, TrialRecord};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File holding per-model baselines and anchors.
pub const ANCHOR_VALUES_FILE: &str = "anchor-values.json";

/// Load every record of a JSONL file.
///
/// Blank lines are ignored. Lines that fail to parse are skipped with a
/// warning so one bad line does not discard a whole run.
pub fn load_jsonl(path: &Path) -> Result<Vec<TrialRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file: {}", path.display()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<TrialRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                debug!("{}:{}: {}", path.display(), index + 1, e);
            }
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} malformed line(s) in {}",
            skipped,
            path.display()
        );
    }
    debug!("Loaded {} records from {}", records.len(), path.display());

    Ok(records)
}

/// Load a JSONL file, or print a notice and return `None` if it is missing.
pub fn load_optional_jsonl(path: &Path) -> Result<Option<Vec<TrialRecord>>> {
    if !path.exists() {
        println!("   File not found: {}", path.display());
        return Ok(None);
    }
    load_jsonl(path).map(Some)
}

/// Find `*.jsonl` files under `dir` whose name starts with `prefix`.
///
/// Only the top level of `dir` is searched and the result is sorted by
/// path. A missing directory yields no files.
pub fn discover_jsonl(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    if !dir.is_dir() {
        debug!("Not a directory, nothing to discover: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!("Cannot read entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.starts_with(prefix) && name.ends_with(".jsonl")
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

/// Load and concatenate every file in `paths`.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<TrialRecord>> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(load_jsonl(path)?);
    }
    Ok(records)
}

fn load_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        info!("No {} found", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(Some(value))
}

/// Load `anchor-values.json`, if present.
pub fn load_anchor_values(path: &Path) -> Result<Option<Vec<AnchorValue>>> {
    load_optional_json(path)
}

/// Load the paper figures summary, if present.
pub fn load_paper_figures(path: &Path) -> Result<Option<PaperFigures>> {
    load_optional_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_jsonl_skips_blank_and_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "trials.jsonl",
            concat!(
                r#"{"conditionId":"low-anchor-3mo","result":{"sentenceMonths":3}}"#,
                "\n\n",
                "not json\n",
                r#"{"conditionId":"high-anchor-9mo","result":{"sentenceMonths":9}}"#,
                "\n"
            ),
        );

        let records = load_jsonl(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sentence(), Some(9.0));
    }

    #[test]
    fn test_load_optional_jsonl_missing() {
        let dir = TempDir::new().unwrap();
        let result = load_optional_jsonl(&dir.path().join("absent.jsonl")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_discover_jsonl() {
        let dir = TempDir::new().unwrap();
        write(&dir, "low-anchor-gpt.jsonl", "");
        write(&dir, "low-anchor-opus.jsonl", "");
        write(&dir, "low-anchor-notes.md", "");
        write(&dir, "sacd-gpt.jsonl", "");
        write(&dir, "high-anchor/gpt.jsonl", "");

        let low = discover_jsonl(dir.path(), "low-anchor-");
        assert_eq!(low.len(), 2);
        assert!(low[0].ends_with("low-anchor-gpt.jsonl"));

        let all = discover_jsonl(dir.path(), "");
        assert_eq!(all.len(), 3);

        let nested = discover_jsonl(&dir.path().join("high-anchor"), "");
        assert_eq!(nested.len(), 1);

        assert!(discover_jsonl(&dir.path().join("missing"), "").is_empty());
    }

    #[test]
    fn test_load_anchor_values() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            ANCHOR_VALUES_FILE,
            r#"[{"model":"openai/gpt-4o","meanOverall":12.5,"lowAnchor":6,"highAnchor":19}]"#,
        );

        let values = load_anchor_values(&path).unwrap().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].high_anchor, 19.0);

        assert!(load_anchor_values(&dir.path().join("none.json"))
            .unwrap()
            .is_none());

        let bad = write(&dir, "bad.json", "{");
        assert!(load_anchor_values(&bad).is_err());
    }

    #[test]
    fn test_load_paper_figures_partial() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "paper-figures.json",
            r#"{"convergence":[{"technique":"Full SACD","convergence":24,"significance":"***"}]}"#,
        );

        let figures = load_paper_figures(&path).unwrap().unwrap();
        assert_eq!(figures.convergence.len(), 1);
        assert!(figures.technique_ranking.is_none());
        assert!(figures.sacd_by_model.is_empty());
    }
}
