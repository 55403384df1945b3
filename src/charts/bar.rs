//! Bar charts: SACD comparison and the paper summary figures.

use super::{
    argmin, category_label, padded_range, parse_hex_color, Chart, ANCHORED_RED, BASELINE_GREEN,
    BRIGHT_GREEN, DEBIASED_BLUE, FONT, NEUTRAL_GRAY, WARNING_ORANGE,
};
use crate::analysis::stats::mean;
use crate::models::{
    AnchorSide, ConvergenceEntry, MadByDomain, ModelDelta, ModelProfile, TechniqueRanking,
};
use crate::report::group_thousands;
use anyhow::Result;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;

type BarChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Upper error bars taller than this are truncated.
pub const MAX_UPPER_ERROR: f64 = 100.0;

/// One bar at an integer category position.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub value: f64,
    pub color: RGBColor,
    pub label: Option<String>,
    pub outlined: bool,
}

impl Bar {
    fn new(value: f64, color: RGBColor) -> Self {
        Self {
            value,
            color,
            label: None,
            outlined: false,
        }
    }

    fn with_label(mut self, label: String) -> Self {
        self.label = Some(label);
        self
    }
}

/// Mesh with the category names on the x axis.
fn build_bar_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    caption: &str,
    categories: &[String],
    y_range: (f64, f64),
    x_desc: &str,
    y_desc: &str,
) -> Result<BarChart<'a, DB>>
where
    DB::ErrorType: 'static,
{
    let n = categories.len().max(1);
    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 20))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_range.0..y_range.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|v| category_label(categories, *v))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((FONT, 12))
        .draw()?;

    Ok(chart)
}

/// Draw `bars` of `width`, shifted by `offset` from their category position.
fn draw_bars<DB: DrawingBackend>(
    chart: &mut BarChart<'_, DB>,
    bars: &[Option<Bar>],
    width: f64,
    offset: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let half = width / 2.0;

    for (i, bar) in bars.iter().enumerate() {
        let Some(bar) = bar else {
            continue;
        };
        let x = i as f64 + offset;
        let corners = [(x - half, 0.0), (x + half, bar.value)];

        chart.draw_series(std::iter::once(Rectangle::new(corners, bar.color.filled())))?;
        let border = if bar.outlined {
            BLACK.stroke_width(3)
        } else {
            BLACK.stroke_width(1)
        };
        chart.draw_series(std::iter::once(Rectangle::new(corners, border)))?;

        if let Some(ref label) = bar.label {
            let vpos = if bar.value >= 0.0 {
                VPos::Bottom
            } else {
                VPos::Top
            };
            let style = TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Center, vpos));
            chart.draw_series(std::iter::once(Text::new(
                label.clone(),
                (x, bar.value),
                style,
            )))?;
        }
    }

    Ok(())
}

/// Horizontal line across the whole x range.
fn draw_hline<DB: DrawingBackend>(
    chart: &mut BarChart<'_, DB>,
    n: usize,
    y: f64,
    style: ShapeStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    chart.draw_series(LineSeries::new(
        vec![(-0.5, y), (n as f64 - 0.5, y)],
        style,
    ))?;
    Ok(())
}

/// Anchored vs SACD-debiased means, one panel per anchor side.
#[derive(Debug, Clone)]
pub struct SacdComparisonChart {
    models: Vec<String>,
    baselines: Vec<f64>,
    anchored: [Vec<Option<f64>>; 2],
    debiased: [Vec<Option<f64>>; 2],
}

const SIDES: [AnchorSide; 2] = [AnchorSide::Low, AnchorSide::High];

impl SacdComparisonChart {
    /// `None` when no model has SACD trials.
    pub fn new(profiles: &BTreeMap<String, ModelProfile>) -> Option<Self> {
        let with_sacd: Vec<(&String, &ModelProfile)> =
            profiles.iter().filter(|(_, p)| p.has_sacd()).collect();
        if with_sacd.is_empty() {
            return None;
        }

        Some(Self {
            models: with_sacd.iter().map(|(name, _)| (*name).clone()).collect(),
            baselines: with_sacd.iter().map(|(_, p)| p.baseline).collect(),
            anchored: SIDES.map(|side| {
                with_sacd
                    .iter()
                    .map(|(_, p)| mean(p.anchored(side)).ok())
                    .collect::<Vec<_>>()
            }),
            debiased: SIDES.map(|side| {
                with_sacd
                    .iter()
                    .map(|(_, p)| mean(p.debiased(side)).ok())
                    .collect::<Vec<_>>()
            }),
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Anchored and debiased means for one side.
    pub fn panel(&self, side: AnchorSide) -> (&[Option<f64>], &[Option<f64>]) {
        let i = side as usize;
        (&self.anchored[i], &self.debiased[i])
    }

    fn draw_panel<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        side: AnchorSide,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let (anchored, debiased) = self.panel(side);
        let values = anchored
            .iter()
            .chain(debiased)
            .flatten()
            .copied()
            .chain(self.baselines.iter().copied());
        let (_, top) = padded_range(values, 0.1);

        let mut chart = build_bar_chart(
            area,
            &format!("{} Anchor Condition", side),
            &self.models,
            (0.0, top),
            "Model",
            "Sentence (months)",
        )?;

        let bars = |values: &[Option<f64>], color: RGBColor| -> Vec<Option<Bar>> {
            values.iter().map(|v| v.map(|v| Bar::new(v, color))).collect()
        };
        draw_bars(&mut chart, &bars(anchored, ANCHORED_RED), 0.35, -0.175)?;
        draw_bars(&mut chart, &bars(debiased, DEBIASED_BLUE), 0.35, 0.175)?;

        chart
            .draw_series(self.baselines.iter().enumerate().map(|(i, &b)| {
                let x = i as f64;
                PathElement::new(vec![(x - 0.4, b), (x + 0.4, b)], BASELINE_GREEN.stroke_width(3))
            }))?
            .label("Baseline (no anchor)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BASELINE_GREEN.stroke_width(3)));

        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
            .label("Anchored")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], ANCHORED_RED.filled()));
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
            .label("SACD Debiased")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], DEBIASED_BLUE.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;

        Ok(())
    }
}

impl Chart for SacdComparisonChart {
    fn file_name(&self) -> &str {
        "sacd_comparison"
    }

    fn size(&self, default: (u32, u32)) -> (u32, u32) {
        (default.0 * 7 / 5, default.1 * 3 / 4)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let root = root.titled("SACD Debiasing Effectiveness by Model", (FONT, 26))?;
        let panels = root.split_evenly((1, 2));
        for (area, side) in panels.iter().zip(SIDES) {
            self.draw_panel(area, side)?;
        }
        Ok(())
    }
}

/// Aggregate technique deltas against the random-control reference.
#[derive(Debug, Clone)]
pub struct TechniqueRankingChart {
    caption: String,
    names: Vec<String>,
    bars: Vec<Bar>,
    reference: f64,
}

impl TechniqueRankingChart {
    pub fn new(ranking: &TechniqueRanking) -> Self {
        let reference = ranking.random_control_effect;
        let bars = ranking
            .techniques
            .iter()
            .map(|t| {
                let color = if t.name.to_lowercase().contains("random") {
                    NEUTRAL_GRAY
                } else if t.delta < reference {
                    BRIGHT_GREEN
                } else {
                    ANCHORED_RED
                };
                let mut label = format!("{:.1}mo ({}/{} ✓", t.delta, t.improved, t.total);
                if t.backfired > 0 {
                    label.push_str(&format!(", {} ✗", t.backfired));
                }
                label.push(')');
                Bar::new(t.delta, color).with_label(label)
            })
            .collect();

        Self {
            caption: format!(
                "Debiasing Technique Effectiveness ({} trials across {} models)",
                group_thousands(ranking.trials),
                ranking.models
            ),
            names: ranking.techniques.iter().map(|t| t.name.clone()).collect(),
            bars,
            reference,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }
}

impl Chart for TechniqueRankingChart {
    fn file_name(&self) -> &str {
        "technique-ranking"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let range = padded_range(
            self.bars.iter().map(|b| b.value).chain([self.reference]),
            0.15,
        );
        let mut chart = build_bar_chart(
            root,
            &self.caption,
            &self.names,
            range,
            "Debiasing Technique",
            "Δ from Baseline (months)",
        )?;

        let bars: Vec<Option<Bar>> = self.bars.iter().cloned().map(Some).collect();
        draw_bars(&mut chart, &bars, 0.6, 0.0)?;
        draw_hline(&mut chart, self.names.len(), 0.0, BLACK.stroke_width(1))?;

        chart
            .draw_series(LineSeries::new(
                vec![(-0.5, self.reference), (self.names.len() as f64 - 0.5, self.reference)],
                DEBIASED_BLUE.stroke_width(2),
            ))?
            .label(format!("Random Control baseline ({:.1}mo)", self.reference))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DEBIASED_BLUE.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::LowerRight)
            .draw()?;

        Ok(())
    }
}

/// SACD effect per model: green where it debiases, red where it backfires.
#[derive(Debug, Clone)]
pub struct SacdByModelChart {
    names: Vec<String>,
    bars: Vec<Bar>,
}

impl SacdByModelChart {
    pub fn new(deltas: &[ModelDelta]) -> Self {
        Self {
            names: deltas.iter().map(|d| d.model.clone()).collect(),
            bars: deltas
                .iter()
                .map(|d| {
                    let color = if d.delta < 0.0 { BASELINE_GREEN } else { ANCHORED_RED };
                    Bar::new(d.delta, color).with_label(format!("{:+.1}", d.delta))
                })
                .collect(),
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

impl Chart for SacdByModelChart {
    fn file_name(&self) -> &str {
        "sacd-model-dependency"
    }

    fn size(&self, default: (u32, u32)) -> (u32, u32) {
        (default.0 * 6 / 5, default.1 * 3 / 4)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let range = padded_range(self.bars.iter().map(|b| b.value), 0.15);
        let mut chart = build_bar_chart(
            root,
            "Full SACD (Iterative) Effect by Model: Green = Debiasing, Red = Backfire",
            &self.names,
            range,
            "Model",
            "SACD Effect (months)",
        )?;

        let bars: Vec<Option<Bar>> = self.bars.iter().cloned().map(Some).collect();
        draw_bars(&mut chart, &bars, 0.7, 0.0)?;
        draw_hline(&mut chart, self.names.len(), 0.0, BLACK.stroke_width(1))?;

        Ok(())
    }
}

/// Baseline convergence per technique with significance markers.
#[derive(Debug, Clone)]
pub struct ConvergenceChart {
    names: Vec<String>,
    bars: Vec<Bar>,
}

impl ConvergenceChart {
    pub fn new(entries: &[ConvergenceEntry]) -> Self {
        Self {
            names: entries.iter().map(|e| e.technique.clone()).collect(),
            bars: entries
                .iter()
                .map(|e| {
                    let color = if e.convergence > 5.0 {
                        BRIGHT_GREEN
                    } else if e.convergence > 0.0 {
                        WARNING_ORANGE
                    } else {
                        ANCHORED_RED
                    };
                    let label = format!("{:+.0}% {}", e.convergence, e.significance);
                    Bar::new(e.convergence, color).with_label(label.trim_end().to_string())
                })
                .collect(),
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

impl Chart for ConvergenceChart {
    fn file_name(&self) -> &str {
        "convergence-by-technique"
    }

    fn size(&self, default: (u32, u32)) -> (u32, u32) {
        (default.0 * 7 / 10, default.1 * 5 / 8)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let (lo, hi) = padded_range(self.bars.iter().map(|b| b.value), 0.15);
        let mut chart = build_bar_chart(
            root,
            "Baseline Convergence by Technique",
            &self.names,
            (lo.min(-5.0), hi),
            "Debiasing Technique",
            "Baseline Convergence (%)",
        )?;

        let bars: Vec<Option<Bar>> = self.bars.iter().cloned().map(Some).collect();
        draw_bars(&mut chart, &bars, 0.6, 0.0)?;
        draw_hline(&mut chart, self.names.len(), 0.0, BLACK.stroke_width(1))?;

        let (w, h) = root.dim_in_pixel();
        let note = TextStyle::from((FONT, 11).into_font()).pos(Pos::new(HPos::Right, VPos::Bottom));
        root.draw(&Text::new(
            "*** p<0.001, * p<0.05, ns = not significant",
            (w as i32 - 20, h as i32 - 8),
            note,
        ))?;

        Ok(())
    }
}

/// One technique's bar in a MAD panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MadBar {
    pub value: f64,
    /// CI lower bound.
    pub lower: f64,
    /// CI upper bound after capping.
    pub upper: f64,
    pub color: RGBColor,
}

/// One domain of the MAD figure.
#[derive(Debug, Clone)]
pub struct MadPanel {
    pub domain: String,
    pub bars: Vec<Option<MadBar>>,
    /// Technique with the lowest MAD.
    pub best: Option<usize>,
}

/// MAD by domain with bootstrap CIs, one panel per domain.
#[derive(Debug, Clone)]
pub struct MadByDomainChart {
    techniques: Vec<String>,
    colors: Vec<RGBColor>,
    panels: Vec<MadPanel>,
}

impl MadByDomainChart {
    pub fn new(mad: &MadByDomain) -> Self {
        let colors: Vec<RGBColor> = mad
            .techniques
            .iter()
            .map(|t| parse_hex_color(&t.color).unwrap_or(NEUTRAL_GRAY))
            .collect();

        let panels = mad
            .domains
            .iter()
            .enumerate()
            .map(|(d, domain)| {
                let bars: Vec<Option<MadBar>> = mad
                    .techniques
                    .iter()
                    .zip(&colors)
                    .map(|(t, &color)| {
                        let value = *t.values.get(d)?;
                        let (lo, hi) = t.ci.get(d).copied().unwrap_or((value, value));
                        Some(MadBar {
                            value,
                            lower: lo,
                            upper: value + (hi - value).min(MAX_UPPER_ERROR),
                            color,
                        })
                    })
                    .collect();
                let values: Vec<f64> = bars
                    .iter()
                    .map(|b| b.as_ref().map(|b| b.value).unwrap_or(f64::NAN))
                    .collect();

                MadPanel {
                    domain: domain.clone(),
                    best: argmin(&values),
                    bars,
                }
            })
            .collect();

        Self {
            techniques: mad.techniques.iter().map(|t| t.label.clone()).collect(),
            colors,
            panels,
        }
    }

    pub fn panels(&self) -> &[MadPanel] {
        &self.panels
    }

    fn draw_panel<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        panel: &MadPanel,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let top = panel
            .bars
            .iter()
            .flatten()
            .map(|b| b.upper.max(b.value))
            .fold(0.0f64, f64::max)
            * 1.1;

        let mut chart = build_bar_chart(
            area,
            &panel.domain,
            &self.techniques,
            (0.0, top.max(1.0)),
            "",
            "MAD (%)",
        )?;

        let bars: Vec<Option<Bar>> = panel
            .bars
            .iter()
            .enumerate()
            .map(|(i, b)| {
                b.as_ref().map(|b| Bar {
                    value: b.value,
                    color: b.color,
                    label: None,
                    outlined: panel.best == Some(i),
                })
            })
            .collect();
        draw_bars(&mut chart, &bars, 0.6, 0.0)?;

        chart.draw_series(panel.bars.iter().enumerate().filter_map(|(i, b)| {
            b.as_ref().map(|b| {
                ErrorBar::new_vertical(i as f64, b.lower, b.value, b.upper, BLACK.filled(), 8)
            })
        }))?;

        Ok(())
    }
}

impl Chart for MadByDomainChart {
    fn file_name(&self) -> &str {
        "mad-by-domain"
    }

    fn size(&self, default: (u32, u32)) -> (u32, u32) {
        (default.0 * 7 / 5, default.1)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let root = root.titled(
            "Debiasing Effectiveness by Domain: MAD from Baseline (lower = better; 95% bootstrap CI)",
            (FONT, 20),
        )?;

        let (legend, body) = root.split_vertically(30);
        let step = legend.dim_in_pixel().0 as i32 / self.techniques.len().max(1) as i32;
        for (i, (name, color)) in self.techniques.iter().zip(&self.colors).enumerate() {
            let x = 20 + i as i32 * step;
            legend.draw(&Rectangle::new([(x, 8), (x + 14, 22)], color.filled()))?;
            legend.draw(&Text::new(name.as_str(), (x + 20, 9), (FONT, 13)))?;
        }

        let cols = 3;
        let rows = ((self.panels.len() + cols - 1) / cols).max(1);
        let areas = body.split_evenly((rows, cols));
        for (area, panel) in areas.iter().zip(&self.panels) {
            self.draw_panel(area, panel)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MadSeries, TechniqueDelta};

    fn technique(name: &str, delta: f64, improved: usize, backfired: usize) -> TechniqueDelta {
        TechniqueDelta {
            name: name.to_string(),
            delta,
            improved,
            total: 11,
            backfired,
        }
    }

    #[test]
    fn test_technique_ranking_labels_and_colors() {
        let ranking = TechniqueRanking {
            trials: 14_220,
            models: 11,
            random_control_effect: -6.0,
            techniques: vec![
                technique("Outside View", -12.7, 11, 0),
                technique("Random Control", -6.0, 10, 1),
                technique("Full SACD", -1.2, 7, 4),
            ],
        };

        let chart = TechniqueRankingChart::new(&ranking);
        let bars = chart.bars();

        assert_eq!(
            chart.caption(),
            "Debiasing Technique Effectiveness (14,220 trials across 11 models)"
        );
        assert_eq!(bars[0].label.as_deref(), Some("-12.7mo (11/11 ✓)"));
        assert_eq!(bars[0].color, BRIGHT_GREEN);
        assert_eq!(bars[1].color, NEUTRAL_GRAY);
        assert_eq!(bars[2].label.as_deref(), Some("-1.2mo (7/11 ✓, 4 ✗)"));
        assert_eq!(bars[2].color, ANCHORED_RED);
    }

    #[test]
    fn test_sacd_by_model_colors() {
        let deltas = vec![
            ModelDelta {
                model: "Haiku 4.5".to_string(),
                delta: -21.5,
            },
            ModelDelta {
                model: "Opus 4.6".to_string(),
                delta: 4.5,
            },
        ];
        let chart = SacdByModelChart::new(&deltas);

        assert_eq!(chart.bars()[0].color, BASELINE_GREEN);
        assert_eq!(chart.bars()[0].label.as_deref(), Some("-21.5"));
        assert_eq!(chart.bars()[1].color, ANCHORED_RED);
        assert_eq!(chart.bars()[1].label.as_deref(), Some("+4.5"));
    }

    #[test]
    fn test_convergence_colors_and_markers() {
        let entry = |technique: &str, convergence: f64, significance: &str| ConvergenceEntry {
            technique: technique.to_string(),
            convergence,
            significance: significance.to_string(),
        };
        let chart = ConvergenceChart::new(&[
            entry("Full SACD", 24.0, "***"),
            entry("Devil's Advocate", 2.0, "ns"),
            entry("Other", -1.0, ""),
        ]);

        assert_eq!(chart.bars()[0].label.as_deref(), Some("+24% ***"));
        assert_eq!(chart.bars()[0].color, BRIGHT_GREEN);
        assert_eq!(chart.bars()[1].color, WARNING_ORANGE);
        assert_eq!(chart.bars()[2].color, ANCHORED_RED);
        assert_eq!(chart.bars()[2].label.as_deref(), Some("-1%"));
    }

    #[test]
    fn test_mad_panels_cap_upper_error() {
        let mad = MadByDomain {
            domains: vec!["Loan".to_string()],
            techniques: vec![
                MadSeries {
                    id: "baseline".to_string(),
                    label: "No Intervention".to_string(),
                    color: "#808080".to_string(),
                    values: vec![105.4],
                    ci: vec![(42.5, 892.3)],
                },
                MadSeries {
                    id: "premortem".to_string(),
                    label: "Premortem".to_string(),
                    color: "not a color".to_string(),
                    values: vec![54.9],
                    ci: vec![(41.1, 60.8)],
                },
            ],
        };

        let chart = MadByDomainChart::new(&mad);
        let panel = &chart.panels()[0];
        let baseline = panel.bars[0].as_ref().unwrap();
        let premortem = panel.bars[1].as_ref().unwrap();

        assert!((baseline.upper - 205.4).abs() < 1e-9);
        assert_eq!(baseline.lower, 42.5);
        assert_eq!(baseline.color, RGBColor(128, 128, 128));
        assert!((premortem.upper - 60.8).abs() < 1e-9);
        assert_eq!(premortem.color, NEUTRAL_GRAY);
        assert_eq!(panel.best, Some(1));
    }

    #[test]
    fn test_sacd_comparison_requires_sacd_data() {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "gpt-4o".to_string(),
            ModelProfile {
                baseline: 12.0,
                low: vec![6.0],
                high: vec![18.0],
                ..ModelProfile::default()
            },
        );
        assert!(SacdComparisonChart::new(&profiles).is_none());

        profiles.insert(
            "opus".to_string(),
            ModelProfile {
                baseline: 10.0,
                high: vec![14.0, 16.0],
                sacd_high: vec![11.0],
                ..ModelProfile::default()
            },
        );
        let chart = SacdComparisonChart::new(&profiles).unwrap();
        assert_eq!(chart.models(), ["opus".to_string()]);

        let (anchored, debiased) = chart.panel(AnchorSide::High);
        assert_eq!(anchored, [Some(15.0)]);
        assert_eq!(debiased, [Some(11.0)]);

        let (anchored, debiased) = chart.panel(AnchorSide::Low);
        assert_eq!(anchored, [None]);
        assert_eq!(debiased, [None]);
    }
}
