//! Heatmaps: anchoring effect per model and MAD per domain.

use super::{argmin, category_label, diverging_color, sequential_color, Chart, FONT};
use crate::models::{AnchorSide, MadByDomain, ModelProfile};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;

const MISSING_GRAY: RGBColor = RGBColor(0xdd, 0xdd, 0xdd);

/// One heatmap cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub fill: RGBColor,
    pub label: String,
    /// White on dark fills.
    pub dark: bool,
}

/// Draw a row-major grid of cells with categorical axes. The first row is
/// drawn at the top.
fn draw_grid<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    rows: &[String],
    columns: &[String],
    cells: &[Vec<Cell>],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let n_rows = rows.len();
    let n_cols = columns.len();
    let row_labels: Vec<String> = rows.iter().rev().cloned().collect();

    let mut chart = ChartBuilder::on(root)
        .caption(caption, (FONT, 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(200)
        .build_cartesian_2d(-0.5..(n_cols as f64 - 0.5), -0.5..(n_rows as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n_cols)
        .y_labels(n_rows)
        .x_label_formatter(&|v| category_label(columns, *v))
        .y_label_formatter(&|v| category_label(&row_labels, *v))
        .label_style((FONT, 14))
        .draw()?;

    let centered = Pos::new(HPos::Center, VPos::Center);

    for (i, row) in cells.iter().enumerate() {
        let y = (n_rows - 1 - i) as f64;
        for (j, cell) in row.iter().enumerate() {
            let x = j as f64;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                cell.fill.filled(),
            )))?;

            let text_color = if cell.dark { WHITE } else { BLACK };
            let style = TextStyle::from((FONT, 14).into_font())
                .color(&text_color)
                .pos(centered);
            chart.draw_series(std::iter::once(Text::new(cell.label.clone(), (x, y), style)))?;
        }
    }

    Ok(())
}

/// Low and high anchor effects relative to each model's baseline.
#[derive(Debug, Clone)]
pub struct AnchoringHeatmap {
    models: Vec<String>,
    cells: Vec<Vec<Cell>>,
}

impl AnchoringHeatmap {
    pub fn new(profiles: &BTreeMap<String, ModelProfile>, limit: f64) -> Self {
        let models = profiles.keys().cloned().collect();
        let cells = profiles
            .values()
            .map(|profile| {
                [AnchorSide::Low, AnchorSide::High]
                    .iter()
                    .map(|&side| effect_cell(profile.effect(side), limit))
                    .collect()
            })
            .collect();

        Self { models, cells }
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }
}

fn effect_cell(effect: Option<f64>, limit: f64) -> Cell {
    match effect {
        Some(e) => Cell {
            fill: diverging_color(e, limit),
            label: format!("{:+.1}mo", e),
            dark: e.abs() > limit / 2.0,
        },
        None => Cell {
            fill: MISSING_GRAY,
            label: "N/A".to_string(),
            dark: false,
        },
    }
}

impl Chart for AnchoringHeatmap {
    fn file_name(&self) -> &str {
        "anchoring_heatmap"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let columns = vec![
            "Low Anchor Effect".to_string(),
            "High Anchor Effect".to_string(),
        ];
        draw_grid(
            root,
            "Anchoring Effects Across Models (months from baseline)",
            &self.models,
            &columns,
            &self.cells,
        )
    }
}

/// MAD by domain and technique; the best technique per domain is starred.
#[derive(Debug, Clone)]
pub struct MadHeatmap {
    domains: Vec<String>,
    techniques: Vec<String>,
    cells: Vec<Vec<Cell>>,
}

impl MadHeatmap {
    pub fn new(mad: &MadByDomain) -> Self {
        let rows: Vec<Vec<f64>> = (0..mad.domains.len())
            .map(|d| {
                mad.techniques
                    .iter()
                    .map(|t| t.values.get(d).copied().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();

        let finite = rows.iter().flatten().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        let cells = rows
            .iter()
            .map(|row| {
                let best = argmin(row);
                row.iter()
                    .enumerate()
                    .map(|(j, &v)| mad_cell(v, best == Some(j), min, max))
                    .collect()
            })
            .collect();

        Self {
            domains: mad.domains.clone(),
            techniques: mad.techniques.iter().map(|t| t.label.clone()).collect(),
            cells,
        }
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }
}

fn mad_cell(value: f64, best: bool, min: f64, max: f64) -> Cell {
    if !value.is_finite() {
        return Cell {
            fill: MISSING_GRAY,
            label: "N/A".to_string(),
            dark: false,
        };
    }
    let marker = if best { "*" } else { "" };
    Cell {
        fill: sequential_color(value, min, max),
        label: format!("{:.1}{}", value, marker),
        dark: value > 50.0,
    }
}

impl Chart for MadHeatmap {
    fn file_name(&self) -> &str {
        "mad-heatmap"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        draw_grid(
            root,
            "MAD (%) by Domain x Technique (* = best in domain; lower = better)",
            &self.domains,
            &self.techniques,
            &self.cells,
        )
    }
}
