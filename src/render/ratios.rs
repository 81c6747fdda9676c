//! Two-panel grouped bar chart of `_ext` / method ratios plus a legend panel.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::RenderContext;
use crate::error::{FigureError, Result};
use crate::metrics::ratio::{RatioMetric, RatioTable};

const OFFSET_SPAN: f64 = 0.35;
const DASH: f64 = 0.06;
const LABEL_FONT: u32 = 16;

/// A method family shown as one bar group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodGroup {
    pub id: String,
    pub label: String,
}

impl MethodGroup {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatioBar {
    pub metric: RatioMetric,
    pub distribution: String,
    pub color_index: usize,
    pub y_center: f64,
    pub height: f64,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatioLayout {
    pub groups: Vec<MethodGroup>,
    pub offsets: Vec<f64>,
    pub bars: Vec<RatioBar>,
    /// Upper x bound per metric panel, always past the parity line.
    pub x_max: [f64; 2],
    pub legend: Vec<(String, usize)>,
}

impl RatioLayout {
    pub fn bars_for(&self, metric: RatioMetric) -> impl Iterator<Item = &RatioBar> {
        self.bars.iter().filter(move |b| b.metric == metric)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (-0.6, self.groups.len() as f64 - 0.4)
    }
}

#[derive(Clone, Debug)]
pub struct RatioStyle {
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

/// `n` offsets evenly spaced over `[-0.35, 0.35]`; a lone offset sits at 0.
pub fn bar_offsets(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = 2.0 * OFFSET_SPAN / (n - 1) as f64;
            (0..n).map(|i| -OFFSET_SPAN + step * i as f64).collect()
        }
    }
}

fn bar_height(offsets: &[f64]) -> f64 {
    match offsets {
        [a, b, ..] => b - a,
        _ => 2.0 * OFFSET_SPAN,
    }
}

pub fn layout_ratio_chart(
    table: &RatioTable,
    groups: &[MethodGroup],
    ctx: &RenderContext,
    legend_labels: &BTreeMap<String, String>,
) -> RatioLayout {
    let colors = ctx.colors();
    let offsets = bar_offsets(colors.len());
    let height = bar_height(&offsets);
    let mut bars = Vec::new();
    let mut x_max = [1.0f64; 2];

    for (gi, group) in groups.iter().enumerate() {
        for row in table.rows_for(&group.id) {
            let Some(ci) = colors.index_of(&row.distribution) else {
                warn!(distribution = %row.distribution, "no color assigned; bar skipped");
                continue;
            };
            for (mi, metric) in RatioMetric::ALL.into_iter().enumerate() {
                let width = row.get(metric);
                if !width.is_finite() {
                    warn!(distribution = %row.distribution, method = %row.method, "non-finite ratio skipped");
                    continue;
                }
                x_max[mi] = x_max[mi].max(width);
                bars.push(RatioBar {
                    metric,
                    distribution: row.distribution.clone(),
                    color_index: ci,
                    y_center: gi as f64 - offsets[ci],
                    height,
                    width,
                });
            }
        }
    }

    let legend = colors
        .distributions()
        .iter()
        .enumerate()
        .map(|(i, d)| (legend_labels.get(d).cloned().unwrap_or_else(|| d.clone()), i))
        .collect();

    RatioLayout {
        groups: groups.to_vec(),
        offsets,
        bars,
        x_max: x_max.map(|m| m * 1.1),
        legend,
    }
}

/// Pixels reserved left of the first panel so the widest group label fits.
fn label_area_width(groups: &[MethodGroup]) -> u32 {
    let chars = groups.iter().map(|g| g.label.chars().count()).max().unwrap_or(0) as u32;
    chars * (LABEL_FONT * 5 / 8) + 24
}

fn dashed_vline(x: f64, y0: f64, y1: f64) -> Vec<PathElement<(f64, f64)>> {
    let mut out = Vec::new();
    let mut y = y0;
    while y < y1 {
        let end = (y + DASH).min(y1);
        out.push(PathElement::new(vec![(x, y), (x, end)], BLACK.stroke_width(1)));
        y += 2.0 * DASH;
    }
    out
}

fn draw_metric_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    layout: &RatioLayout,
    ctx: &RenderContext,
    metric: RatioMetric,
    panel: usize,
) -> Result<()> {
    let (y0, y1) = layout.y_range();
    let mut chart = ChartBuilder::on(area)
        .caption(metric.title(), ("sans-serif", 22))
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(if panel == 0 { label_area_width(&layout.groups) } else { 8 })
        .build_cartesian_2d(0.0f64..layout.x_max[panel], y0..y1)
        .map_err(FigureError::render)?;

    let groups = &layout.groups;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(5)
        .y_labels(if panel == 0 { groups.len() * 4 + 1 } else { 0 })
        .y_label_formatter(&|y| {
            let idx = y.round();
            if idx < 0.0 || (y - idx).abs() > 1e-6 {
                return String::new();
            }
            groups
                .get(idx as usize)
                .map(|g| g.label.clone())
                .unwrap_or_default()
        })
        .axis_style(BLACK.stroke_width(2))
        .label_style(("sans-serif", LABEL_FONT))
        .draw()
        .map_err(FigureError::render)?;

    chart
        .draw_series(layout.bars_for(metric).map(|bar| {
            let half = bar.height / 2.0;
            Rectangle::new(
                [(0.0, bar.y_center - half), (bar.width, bar.y_center + half)],
                ctx.color_at(bar.color_index).filled(),
            )
        }))
        .map_err(FigureError::render)?;

    chart
        .draw_series(dashed_vline(1.0, y0, y1))
        .map_err(FigureError::render)?;
    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    layout: &RatioLayout,
    ctx: &RenderContext,
) -> Result<()> {
    let n = layout.legend.len();
    if n == 0 {
        return Ok(());
    }
    let (w, h) = area.dim_in_pixel();
    let rows = n.div_ceil(2);
    let line_h = (h as usize / (rows + 1)).clamp(8, 24) as i32;
    let col_w = (w / 2) as i32;
    let top = (h as i32 - line_h * rows as i32) / 2;
    let swatch = (line_h * 2 / 3).max(4);
    for (k, (label, ci)) in layout.legend.iter().enumerate() {
        // column-major, like a two-column legend box
        let col = (k / rows) as i32;
        let row = (k % rows) as i32;
        let x = 4 + col * col_w;
        let y = top + row * line_h;
        area.draw(&Rectangle::new(
            [(x, y), (x + swatch, y + swatch)],
            ctx.color_at(*ci).filled(),
        ))
        .map_err(FigureError::render)?;
        area.draw(&Text::new(
            label.clone(),
            (x + swatch + 3, y),
            ("sans-serif", (line_h - 2).max(6) as u32),
        ))
        .map_err(FigureError::render)?;
    }
    Ok(())
}

pub fn draw_ratio_layout<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &RatioLayout,
    ctx: &RenderContext,
) -> Result<()> {
    root.fill(&WHITE).map_err(FigureError::render)?;
    let (w, _) = root.dim_in_pixel();
    // metric panels : legend = 4 : 1
    let (metrics_area, legend_area) = root.split_horizontally(w * 4 / 5);
    let panels = metrics_area.split_evenly((1, 2));
    for (panel, (area, metric)) in panels.iter().zip(RatioMetric::ALL).enumerate() {
        draw_metric_panel(area, layout, ctx, metric, panel)?;
    }
    draw_legend(&legend_area, layout, ctx)?;
    root.present().map_err(FigureError::render)?;
    Ok(())
}

pub fn render_ratio_png(path: &Path, layout: &RatioLayout, ctx: &RenderContext, style: &RatioStyle) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    draw_ratio_layout(&root, layout, ctx)
}

pub fn render_ratio_chart(
    ctx: &mut RenderContext,
    table: &RatioTable,
    groups: &[MethodGroup],
    legend_labels: &BTreeMap<String, String>,
    style: &RatioStyle,
) -> Result<PathBuf> {
    let layout = layout_ratio_chart(table, groups, ctx, legend_labels);
    debug!(bars = layout.bars.len(), distributions = layout.offsets.len(), "ratio layout");
    let path = ctx.sink().dir().join(&style.file_name);
    render_ratio_png(&path, &layout, ctx, style)?;
    ctx.sink_mut().report(path.clone());
    Ok(path)
}
