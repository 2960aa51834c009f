//! PNG rendering with plotters.
//!
//! Four fixed chart shapes: histogram with a density curve, scatterplot,
//! annotated correlation heatmap and a grouped bar count. The numeric parts
//! (binning, density, grouping, colour scale) are plain functions so they can
//! be tested without drawing anything.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::debug;

use crate::core::summary::{correlation, sample_std};
use crate::domain::{Dataset, DatasetError, PlotKind, PlotRequest};

use super::PlotRenderer;

/// Number of histogram bins
pub const HIST_BINS: usize = 30;

/// Points sampled along the density curve
const KDE_POINTS: usize = 200;

const FONT: &str = "sans-serif";

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Qualitative palette for hue levels
const SET2: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

/// Errors raised while drawing a chart
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw {path}: {message}")]
    Draw { path: PathBuf, message: String },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

fn draw_err<E: Display>(path: &Path, err: E) -> RenderError {
    RenderError::Draw {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Renders plot requests to PNG files
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersRenderer;

impl PlottersRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PlotRenderer for PlottersRenderer {
    fn render(&self, request: &PlotRequest, dataset: &Dataset, path: &Path) -> Result<()> {
        debug!(operation = "plot.render", path = %path.display(), kind = ?request.kind, "rendering");

        match &request.kind {
            PlotKind::Distribution { column } => draw_distribution(dataset, column, path),
            PlotKind::Scatter { x, y } => draw_scatter(dataset, x, y, path),
            PlotKind::Heatmap { columns } => draw_heatmap(dataset, columns, path),
            PlotKind::GroupedCount { x, hue } => draw_grouped_count(dataset, x, hue, path),
        }
        .with_context(|| format!("Failed to render plot: {}", path.display()))
    }
}

/// One histogram bin, `[start, end)` except the last which is closed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins spanning the data range
///
/// Empty when there is nothing to bin or the range has no finite width.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (min, max) = min_max(values);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    if !(hi - lo).is_finite() {
        return Vec::new();
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: lo + i as f64 * width,
            end: lo + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Gaussian kernel density over `[lo, hi]` with Scott's bandwidth
///
/// Empty when the density is undefined (fewer than two values or no spread).
pub fn kde_curve(values: &[f64], lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)> {
    let std = sample_std(values);
    if values.len() < 2 || !std.is_finite() || std == 0.0 || points < 2 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            (x, density * norm)
        })
        .collect()
}

/// Diverging blue-white-red colour for a coefficient in `[-1, 1]`
pub fn coolwarm(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if !value.is_finite() {
        return RGBColor(235, 235, 235);
    }

    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0).clamp(0.0, 1.0);
    let (from, to, f) = if t < 0.5 {
        (COLD, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * f).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Row counts of `x` categories split by `hue` levels
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedCounts {
    /// Categories in order of first appearance
    pub categories: Vec<String>,
    /// Hue levels, numerically sorted when they are all numbers
    pub hues: Vec<String>,
    /// `counts[category][hue]`
    pub counts: Vec<Vec<usize>>,
}

impl GroupedCounts {
    pub fn max(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Count rows per (x, hue) pair, skipping rows missing either value
pub fn grouped_counts(dataset: &Dataset, x: &str, hue: &str) -> Result<GroupedCounts, DatasetError> {
    let x_col = dataset.require(x)?;
    let hue_col = dataset.require(hue)?;

    let mut categories: Vec<String> = Vec::new();
    let mut tally: BTreeMap<(usize, String), usize> = BTreeMap::new();
    let mut hue_levels: Vec<String> = Vec::new();

    for row in 0..dataset.row_count() {
        let (Some(cat), Some(level)) = (x_col.label_at(row), hue_col.label_at(row)) else {
            continue;
        };
        let cat_idx = match categories.iter().position(|c| *c == cat) {
            Some(idx) => idx,
            None => {
                categories.push(cat);
                categories.len() - 1
            }
        };
        if !hue_levels.contains(&level) {
            hue_levels.push(level.clone());
        }
        *tally.entry((cat_idx, level)).or_insert(0) += 1;
    }

    sort_levels(&mut hue_levels);

    let counts = (0..categories.len())
        .map(|c| {
            hue_levels
                .iter()
                .map(|h| tally.get(&(c, h.clone())).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Ok(GroupedCounts {
        categories,
        hues: hue_levels,
        counts,
    })
}

fn sort_levels(levels: &mut [String]) {
    let numeric: Option<Vec<f64>> = levels.iter().map(|l| l.parse::<f64>().ok()).collect();
    if numeric.is_some() {
        levels.sort_by(|a, b| {
            let a = a.parse::<f64>().unwrap_or(f64::NAN);
            let b = b.parse::<f64>().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        });
    } else {
        levels.sort();
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Data range with a 5% margin on both sides
fn padded_range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let (lo, hi) = min_max(values);
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Axis bounds plotters can lay out: both ends and the span finite
fn drawable_range(lo: f64, hi: f64, path: &Path) -> Result<(f64, f64), RenderError> {
    if lo.is_finite() && hi.is_finite() && (hi - lo).is_finite() {
        Ok((lo, hi))
    } else {
        Err(RenderError::Draw {
            path: path.to_path_buf(),
            message: format!("axis range [{}, {}] is not finite", lo, hi),
        })
    }
}

fn finite(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().filter(|v| v.is_finite()).collect()
}

fn label_style(size: u32, pos: Pos) -> TextStyle<'static> {
    (FONT, size).into_font().color(&BLACK).pos(pos)
}

fn draw_label(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    text: &str,
    at: (i32, i32),
    pos: Pos,
    path: &Path,
) -> Result<(), RenderError> {
    root.draw(&Text::new(text.to_string(), at, label_style(14, pos)))
        .map_err(|e| draw_err(path, e))
}

fn draw_distribution(dataset: &Dataset, column: &str, path: &Path) -> Result<(), RenderError> {
    let values = finite(dataset.numeric_values(column)?);
    let bins = histogram(&values, HIST_BINS);
    let (lo, hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ if values.is_empty() => (0.0, 1.0),
        _ => min_max(&values),
    };
    let (lo, hi) = drawable_range(lo, hi, path)?;

    // density scaled to the histogram's count axis
    let bin_width = (hi - lo) / HIST_BINS as f64;
    let scale = values.len() as f64 * bin_width;
    let curve: Vec<(f64, f64)> = kde_curve(&values, lo, hi, KDE_POINTS)
        .into_iter()
        .map(|(x, d)| (x, d * scale))
        .collect();

    let y_max = bins
        .iter()
        .map(|b| b.count as f64)
        .chain(curve.iter().map(|p| p.1))
        .fold(1.0, f64::max)
        * 1.05;

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {}", column), (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)
        .map_err(|e| draw_err(path, e))?;

    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("Frequency")
        .draw()
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new(
                [(b.start, 0.0), (b.end, b.count as f64)],
                BAR_COLOR.mix(0.5).filled(),
            )
        }))
        .map_err(|e| draw_err(path, e))?;

    if !curve.is_empty() {
        chart
            .draw_series(LineSeries::new(curve, BAR_COLOR.stroke_width(2)))
            .map_err(|e| draw_err(path, e))?;
    }

    root.present().map_err(|e| draw_err(path, e))?;
    Ok(())
}

fn draw_scatter(dataset: &Dataset, x: &str, y: &str, path: &Path) -> Result<(), RenderError> {
    let x_col = dataset.require(x)?;
    let y_col = dataset.require(y)?;
    let points: Vec<(f64, f64)> = (0..dataset.row_count())
        .filter_map(|r| Some((x_col.number_at(r)?, y_col.number_at(r)?)))
        .filter(|(px, py)| px.is_finite() && py.is_finite())
        .collect();

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (x_lo, x_hi) = padded_range(&xs);
    let (y_lo, y_hi) = padded_range(&ys);
    let (x_lo, x_hi) = drawable_range(x_lo, x_hi, path)?;
    let (y_lo, y_hi) = drawable_range(y_lo, y_hi, path)?;

    let root = BitMapBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} vs {}", x, y), (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(|e| draw_err(path, e))?;

    chart
        .configure_mesh()
        .x_desc(x)
        .y_desc(y)
        .draw()
        .map_err(|e| draw_err(path, e))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(px, py)| Circle::new((px, py), 3, BAR_COLOR.mix(0.7).filled())),
        )
        .map_err(|e| draw_err(path, e))?;

    root.present().map_err(|e| draw_err(path, e))?;
    Ok(())
}

fn draw_heatmap(dataset: &Dataset, columns: &[String], path: &Path) -> Result<(), RenderError> {
    let matrix = correlation(dataset, columns)?;
    let n = matrix.len().max(1);
    let size = n as f64;

    let root = BitMapBackend::new(path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Heatmap", (FONT, 24).into_font())
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(130)
        .build_cartesian_2d(0.0..size, 0.0..size)
        .map_err(|e| draw_err(path, e))?;

    // row 0 sits at the top
    let cells: Vec<(usize, usize, f64)> = (0..matrix.len())
        .flat_map(|i| (0..matrix.len()).map(move |j| (i, j)))
        .map(|(i, j)| (i, j, matrix.get(i, j)))
        .collect();

    chart
        .draw_series(cells.iter().map(|&(i, j, r)| {
            let top = size - i as f64;
            Rectangle::new(
                [(j as f64, top - 1.0), (j as f64 + 1.0, top)],
                coolwarm(r).filled(),
            )
        }))
        .map_err(|e| draw_err(path, e))?;

    let annotation = label_style(16, Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(cells.iter().map(|&(i, j, r)| {
            let text = if r.is_finite() {
                format!("{:.2}", r)
            } else {
                "nan".to_string()
            };
            Text::new(
                text,
                (j as f64 + 0.5, size - i as f64 - 0.5),
                annotation.clone(),
            )
        }))
        .map_err(|e| draw_err(path, e))?;

    for (k, name) in matrix.columns.iter().enumerate() {
        let (bx, by) = chart.backend_coord(&(k as f64 + 0.5, 0.0));
        draw_label(&root, name, (bx, by + 8), Pos::new(HPos::Center, VPos::Top), path)?;

        let (lx, ly) = chart.backend_coord(&(0.0, size - k as f64 - 0.5));
        draw_label(&root, name, (lx - 8, ly), Pos::new(HPos::Right, VPos::Center), path)?;
    }

    root.present().map_err(|e| draw_err(path, e))?;
    Ok(())
}

fn draw_grouped_count(dataset: &Dataset, x: &str, hue: &str, path: &Path) -> Result<(), RenderError> {
    let groups = grouped_counts(dataset, x, hue)?;
    let slots = groups.categories.len().max(1) as f64;
    let y_max = (groups.max() as f64 * 1.1).max(1.0);
    let bar_width = 0.8 / groups.hues.len().max(1) as f64;

    let root = BitMapBackend::new(path, (600, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Survival Count by Gender", (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..slots, 0.0..y_max)
        .map_err(|e| draw_err(path, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc("Gender")
        .y_desc("Count")
        .draw()
        .map_err(|e| draw_err(path, e))?;

    for (k, level) in groups.hues.iter().enumerate() {
        let color = SET2[k % SET2.len()];
        chart
            .draw_series((0..groups.categories.len()).map(|c| {
                let x0 = c as f64 + 0.1 + k as f64 * bar_width;
                let count = groups.counts[c][k] as f64;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, count)], color.filled())
            }))
            .map_err(|e| draw_err(path, e))?
            .label(format!("{}: {}", hue, level))
            .legend(move |(lx, ly)| Rectangle::new([(lx, ly - 5), (lx + 12, ly + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| draw_err(path, e))?;

    for (c, category) in groups.categories.iter().enumerate() {
        let (bx, by) = chart.backend_coord(&(c as f64 + 0.5, 0.0));
        draw_label(&root, category, (bx, by + 6), Pos::new(HPos::Center, VPos::Top), path)?;
    }

    root.present().map_err(|e| draw_err(path, e))?;
    Ok(())
}
