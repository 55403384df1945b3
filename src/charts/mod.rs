//! Chart rendering.
//!
//! Every chart prepares its data up front and draws onto any plotters
//! backend. [`ChartRenderer`] writes each chart once per configured image
//! format, PNG through the bitmap backend and SVG through the vector one.

pub mod bar;
pub mod heatmap;
pub mod scatter;

pub use bar::{
    ConvergenceChart, MadByDomainChart, SacdByModelChart, SacdComparisonChart,
    TechniqueRankingChart,
};
pub use heatmap::{AnchoringHeatmap, MadHeatmap};
pub use scatter::ModelTaxonomyChart;

use crate::config::{ChartsConfig, ImageFormat};
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

pub(crate) const FONT: &str = "sans-serif";

pub(crate) const ANCHORED_RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
pub(crate) const DEBIASED_BLUE: RGBColor = RGBColor(0x34, 0x98, 0xdb);
pub(crate) const BASELINE_GREEN: RGBColor = RGBColor(0x27, 0xae, 0x60);
pub(crate) const BRIGHT_GREEN: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
pub(crate) const NEUTRAL_GRAY: RGBColor = RGBColor(0x95, 0xa5, 0xa6);
pub(crate) const WARNING_ORANGE: RGBColor = RGBColor(0xf3, 0x9c, 0x12);

/// A chart that can draw itself on any backend.
pub trait Chart {
    /// File name without extension.
    fn file_name(&self) -> &str;

    /// Pixel size, given the configured default.
    fn size(&self, default: (u32, u32)) -> (u32, u32) {
        default
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB::ErrorType: 'static;
}

/// Writes charts into one directory in a fixed set of formats.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    dir: PathBuf,
    size: (u32, u32),
    formats: Vec<ImageFormat>,
}

impl ChartRenderer {
    pub fn new(dir: &Path, config: &ChartsConfig, formats: &[ImageFormat]) -> Self {
        Self {
            dir: dir.to_path_buf(),
            size: (config.width, config.height),
            formats: formats.to_vec(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render `chart` in every format. Returns the written paths.
    pub fn render<C: Chart>(&self, chart: &C) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create figures directory: {}", self.dir.display()))?;

        let size = chart.size(self.size);
        let mut written = Vec::with_capacity(self.formats.len());

        for format in &self.formats {
            let path = self
                .dir
                .join(format!("{}.{}", chart.file_name(), format.extension()));
            debug!("Rendering {} at {}x{}", path.display(), size.0, size.1);

            let result = match format {
                ImageFormat::Png => draw_on(chart, &BitMapBackend::new(&path, size).into_drawing_area()),
                ImageFormat::Svg => draw_on(chart, &SVGBackend::new(&path, size).into_drawing_area()),
            };
            result.with_context(|| format!("Failed to render {}", path.display()))?;

            written.push(path);
        }

        Ok(written)
    }
}

fn draw_on<C: Chart, DB: DrawingBackend>(chart: &C, root: &DrawingArea<DB, Shift>) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    chart.draw(root)?;
    root.present()?;
    Ok(())
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Three-stop gradient over `t` in `[0, 1]`.
fn gradient(stops: [RGBColor; 3], t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    if t < 0.5 {
        lerp(stops[0], stops[1], t * 2.0)
    } else {
        lerp(stops[1], stops[2], (t - 0.5) * 2.0)
    }
}

/// Blue below zero, white at zero, red above; saturates at `±limit`.
pub fn diverging_color(value: f64, limit: f64) -> RGBColor {
    const STOPS: [RGBColor; 3] = [
        RGBColor(0x21, 0x66, 0xac),
        RGBColor(0xf7, 0xf7, 0xf7),
        RGBColor(0xb2, 0x18, 0x2b),
    ];
    gradient(STOPS, 0.5 + value / (2.0 * limit))
}

/// Green at `min`, yellow in the middle, red at `max`.
pub fn sequential_color(value: f64, min: f64, max: f64) -> RGBColor {
    const STOPS: [RGBColor; 3] = [
        RGBColor(0x1a, 0x98, 0x50),
        RGBColor(0xff, 0xff, 0xbf),
        RGBColor(0xd7, 0x30, 0x27),
    ];
    let span = max - min;
    let t = if span > 0.0 { (value - min) / span } else { 0.5 };
    gradient(STOPS, t)
}

/// Label formatter for an axis whose categories sit on integer positions.
pub(crate) fn category_label(names: &[String], value: f64) -> String {
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names.get(index as usize).cloned().unwrap_or_default()
}

/// Index of the smallest value, if any.
pub(crate) fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

/// Lower and upper bounds of `values` padded by `pad` of their span, always
/// including zero.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = (hi - lo).max(1.0);
    (lo - span * pad, hi + span * pad)
}
