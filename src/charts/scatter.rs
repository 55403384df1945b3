//! Model taxonomy scatter plot.

use super::{Chart, FONT};
use crate::models::{AnchorSide, ModelProfile};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;

/// Quadrant names, clockwise from the upper left.
const QUADRANTS: [(f64, f64, &str); 4] = [
    (-1.0, 1.0, "Asymmetric (low ↓, high ↑)"),
    (1.0, 1.0, "Classic Anchoring (both ↑)"),
    (1.0, -1.0, "Reverse (low ↑, high ↓)"),
    (-1.0, -1.0, "Compression (both ↓)"),
];

/// A model positioned by its low and high anchor effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyPoint {
    pub model: String,
    pub low_effect: f64,
    pub high_effect: f64,
}

/// Low vs high anchor effect per model, with symmetric axes.
#[derive(Debug, Clone)]
pub struct ModelTaxonomyChart {
    points: Vec<TaxonomyPoint>,
    extent: f64,
}

impl ModelTaxonomyChart {
    /// Models without samples on a side sit at zero on that axis.
    pub fn new(profiles: &BTreeMap<String, ModelProfile>) -> Self {
        let points: Vec<TaxonomyPoint> = profiles
            .iter()
            .map(|(model, profile)| TaxonomyPoint {
                model: model.clone(),
                low_effect: profile.effect(AnchorSide::Low).unwrap_or(0.0),
                high_effect: profile.effect(AnchorSide::High).unwrap_or(0.0),
            })
            .collect();

        let extent = points
            .iter()
            .flat_map(|p| [p.low_effect.abs(), p.high_effect.abs()])
            .fold(1.0f64, f64::max)
            * 1.1;

        Self { points, extent }
    }

    pub fn points(&self) -> &[TaxonomyPoint] {
        &self.points
    }

    /// Half-width of both axes.
    pub fn extent(&self) -> f64 {
        self.extent
    }
}

impl Chart for ModelTaxonomyChart {
    fn file_name(&self) -> &str {
        "model_taxonomy"
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let e = self.extent;
        let mut chart = ChartBuilder::on(root)
            .caption("Model Taxonomy by Anchoring Pattern", (FONT, 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(-e..e, -e..e)?;

        chart
            .configure_mesh()
            .x_desc("Low Anchor Effect (months from baseline)")
            .y_desc("High Anchor Effect (months from baseline)")
            .label_style((FONT, 13))
            .draw()?;

        for line in [[(-e, 0.0), (e, 0.0)], [(0.0, -e), (0.0, e)]] {
            chart.draw_series(LineSeries::new(line, BLACK.mix(0.4).stroke_width(1)))?;
        }

        let faded = BLACK.mix(0.45);
        let quadrant_style = TextStyle::from((FONT, 15).into_font())
            .color(&faded)
            .pos(Pos::new(HPos::Center, VPos::Center));
        for (sx, sy, name) in QUADRANTS {
            chart.draw_series(std::iter::once(Text::new(
                name,
                (sx * e * 0.6, sy * e * 0.85),
                quadrant_style.clone(),
            )))?;
        }

        for (i, point) in self.points.iter().enumerate() {
            let color = Palette99::pick(i);
            let at = (point.low_effect, point.high_effect);
            chart.draw_series(std::iter::once(Circle::new(at, 7, color.mix(0.8).filled())))?;
            chart.draw_series(std::iter::once(
                EmptyElement::at(at) + Text::new(point.model.clone(), (8, -14), (FONT, 12)),
            ))?;
        }

        Ok(())
    }
}
