//! Bound-narrowing diagram: one horizontal segment per stage.
//!
//! Under symlog an interval that straddles zero is drawn as a single
//! compressed segment; the positive and negative parts are not split apart.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, warn};

use super::scale::{AxisScale, ScaleProbe, select_scale};
use super::{RenderContext, format_runtime, format_sci};
use crate::error::{FigureError, Result};
use crate::load::bounds::{BoundRow, StageKind};

const Y_MIN: f64 = -0.9;
const Y_MAX: f64 = 3.5;
const LABEL_LIFT: f64 = 0.1;
const TICK_ROW: f64 = -0.7;

#[derive(Clone, Debug, PartialEq)]
pub struct EndpointMark {
    pub value: f64,
    /// Transformed position; `None` when the scale cannot place the value.
    pub position: Option<f64>,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StageSegment {
    pub kind: StageKind,
    pub y: f64,
    pub lo: EndpointMark,
    pub hi: EndpointMark,
    /// Stage name and runtime on two lines, e.g. `"GSL\n(4.2 sec)"`.
    pub row_label: String,
}

impl StageSegment {
    pub fn drawable(&self) -> Option<(f64, f64)> {
        Some((self.lo.position?, self.hi.position?))
    }
}

/// Everything needed to draw one row, computed without touching a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundLayout {
    pub title: String,
    pub scale: AxisScale,
    pub segments: Vec<StageSegment>,
    pub x_range: (f64, f64),
    pub ticks: Vec<(f64, String)>,
}

impl BoundLayout {
    pub fn masked_endpoints(&self) -> usize {
        self.segments
            .iter()
            .flat_map(|s| [&s.lo, &s.hi])
            .filter(|m| m.position.is_none())
            .count()
    }

    pub fn row_label(&self, y: f64) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| (s.y - y).abs() < 1e-6)
            .map(|s| s.row_label.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BoundStyle {
    pub width: u32,
    pub height: u32,
    pub probe: ScaleProbe,
    pub linthresh: f64,
}

fn mark(scale: &AxisScale, value: f64) -> EndpointMark {
    EndpointMark {
        value,
        position: scale.forward(value),
        label: format_sci(value),
    }
}

pub fn layout_bound_row(row: &BoundRow, probe: ScaleProbe, linthresh: f64) -> BoundLayout {
    let scale = select_scale(row, probe, linthresh);
    let segments: Vec<StageSegment> = row
        .stages
        .iter()
        .map(|stage| StageSegment {
            kind: stage.kind,
            y: f64::from(stage.kind.row_offset()),
            lo: mark(&scale, stage.interval.lo),
            hi: mark(&scale, stage.interval.hi),
            row_label: format!("{}\n({} sec)", stage.kind.label(), format_runtime(stage.runtime)),
        })
        .collect();

    let positions: Vec<f64> = segments
        .iter()
        .flat_map(|s| [s.lo.position, s.hi.position])
        .flatten()
        .collect();
    let x_range = padded_range(&positions);

    let (data_lo, data_hi) = (scale.inverse(x_range.0), scale.inverse(x_range.1));
    let ticks = scale
        .ticks(data_lo, data_hi)
        .into_iter()
        .filter_map(|v| scale.forward(v).map(|p| (p, format_tick(v))))
        .collect();

    BoundLayout {
        title: row.sampler.clone(),
        scale,
        segments,
        x_range,
        ticks,
    }
}

fn padded_range(positions: &[f64]) -> (f64, f64) {
    let lo = positions.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = positions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let span = hi - lo;
    if span < 1e-12 {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = span * 0.08;
    (lo - pad, hi + pad)
}

fn format_tick(v: f64) -> String {
    if v == 0.0 { "0".to_string() } else { format!("{v:e}") }
}

pub fn draw_bound_layout<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    layout: &BoundLayout,
) -> Result<()> {
    root.fill(&WHITE).map_err(FigureError::render)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&layout.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(10)
        .y_label_area_size(190)
        .build_cartesian_2d(layout.x_range.0..layout.x_range.1, Y_MIN..Y_MAX)
        .map_err(FigureError::render)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_labels(0)
        .draw()
        .map_err(FigureError::render)?;

    // Mesh labels are single-line, so stage labels are placed by hand.
    let label_font = ("sans-serif", 20).into_font().style(FontStyle::Bold);
    for segment in &layout.segments {
        let (px, py) = chart.backend_coord(&(layout.x_range.0, segment.y));
        for (line, vpos) in segment.row_label.lines().zip([VPos::Bottom, VPos::Top]) {
            let style = TextStyle::from(label_font.clone()).pos(Pos::new(HPos::Right, vpos));
            root.draw(&Text::new(line.to_string(), (px - 12, py), style))
                .map_err(FigureError::render)?;
        }
    }

    let endpoint_style = TextStyle::from(("sans-serif", 16).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    for segment in &layout.segments {
        let Some((x0, x1)) = segment.drawable() else {
            warn!(
                sampler = %layout.title,
                stage = segment.kind.label(),
                lo = segment.lo.value,
                hi = segment.hi.value,
                "endpoint cannot be placed on a log axis; stage masked"
            );
            continue;
        };
        chart
            .draw_series(LineSeries::new(
                vec![(x0, segment.y), (x1, segment.y)],
                BLACK.stroke_width(2),
            ))
            .map_err(FigureError::render)?;
        chart
            .draw_series([x0, x1].into_iter().map(|x| {
                EmptyElement::at((x, segment.y)) + Rectangle::new([(-5, -5), (5, 5)], BLACK.filled())
            }))
            .map_err(FigureError::render)?;
        for m in [&segment.lo, &segment.hi] {
            if let Some(x) = m.position {
                chart
                    .draw_series(std::iter::once(Text::new(
                        m.label.clone(),
                        (x, segment.y + LABEL_LIFT),
                        endpoint_style.clone(),
                    )))
                    .map_err(FigureError::render)?;
            }
        }
    }

    let tick_style = TextStyle::from(("sans-serif", 16).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (x, label) in &layout.ticks {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(*x, Y_MIN), (*x, Y_MIN + 0.08)],
                BLACK,
            )))
            .map_err(FigureError::render)?;
        chart
            .draw_series(std::iter::once(Text::new(
                label.clone(),
                (*x, TICK_ROW),
                tick_style.clone(),
            )))
            .map_err(FigureError::render)?;
    }

    root.present().map_err(FigureError::render)?;
    Ok(())
}

pub fn render_bound_png(path: &Path, layout: &BoundLayout, style: &BoundStyle) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    draw_bound_layout(&root, layout)
}

/// Lay out, draw and report one row. Returns the written path.
pub fn render_bound_row(ctx: &mut RenderContext, row: &BoundRow, style: &BoundStyle) -> Result<std::path::PathBuf> {
    let layout = layout_bound_row(row, style.probe, style.linthresh);
    debug!(
        sampler = %row.sampler,
        symlog = layout.scale.is_symlog(),
        masked = layout.masked_endpoints(),
        "bound layout"
    );
    let path = ctx.sink().path_for(&row.sampler, "png");
    render_bound_png(&path, &layout, style)?;
    ctx.sink_mut().report(path.clone());
    Ok(path)
}
