//! Drives each pass from configured inputs to written artifacts.
//!
//! Malformed inputs end a pass with an error. Failures confined to one bound
//! row or one distribution are logged, collected in the summary, and the pass
//! carries on.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::{FigureError, Result};
use crate::load::bounds::load_bound_rows;
use crate::load::canon::{BASELINE_ID, Canonicalizer};
use crate::load::rate::{RateRecord, discover_rate_files, encounter_order, load_rate_files};
use crate::metrics::ratio::{comparison_records, ratio_table};
use crate::metrics::{MethodMatrix, rate_rows};
use crate::render::bounds::{BoundStyle, render_bound_row};
use crate::render::ratios::{RatioStyle, render_ratio_chart};
use crate::render::{OutputSink, RenderContext};
use crate::table::write_table;

/// What a pass produced and what it had to skip.
#[derive(Debug, Default)]
pub struct PassSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<FigureError>,
}

impl PassSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: PassSummary) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }
}

fn canonicalizer(cfg: &AppConfig) -> Canonicalizer {
    Canonicalizer::new(cfg.input.canon_rules.clone())
}

/// All rate records under the configured directory, in file-name order.
pub fn load_rates(cfg: &AppConfig) -> Result<Vec<RateRecord>> {
    let dir = Path::new(&cfg.input.rate_dir);
    let files = discover_rate_files(dir, &cfg.input.rate_marker)?;
    if files.is_empty() {
        warn!(dir = %dir.display(), marker = %cfg.input.rate_marker, "no rate files found");
    }
    load_rate_files(&files, &canonicalizer(cfg))
}

pub fn run_bounds(cfg: &AppConfig) -> Result<PassSummary> {
    let rows = load_bound_rows(
        Path::new(&cfg.input.bounds_reference),
        Path::new(&cfg.input.bounds_derived),
        &canonicalizer(cfg),
    )?;
    info!(rows = rows.len(), "loaded bound rows");

    let sink = OutputSink::new(&cfg.output.dir);
    sink.prepare()?;
    let mut ctx = RenderContext::new(sink);
    let style = BoundStyle {
        width: cfg.bounds.width,
        height: cfg.bounds.height,
        probe: cfg.bounds.scale_probe,
        linthresh: cfg.bounds.linthresh,
    };

    let mut failures = Vec::new();
    for row in &rows {
        if let Err(err) = render_bound_row(&mut ctx, row, &style) {
            error!(sampler = %row.sampler, "bound diagram failed: {err}");
            failures.push(err);
        }
    }
    Ok(PassSummary {
        written: ctx.sink().written().to_vec(),
        failures,
    })
}

/// Output directory and file name of the comparison chart.
pub fn comparison_target(cfg: &AppConfig, out: Option<&Path>) -> (PathBuf, String) {
    if let Some(out) = out {
        if let Some(name) = out.file_name() {
            let dir = out
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return (dir, name.to_string_lossy().to_string());
        }
    }
    (
        PathBuf::from(&cfg.output.dir),
        format!("{}.png", cfg.output.comparison_name),
    )
}

pub fn run_ratios(cfg: &AppConfig, out: Option<&Path>) -> Result<PassSummary> {
    let records = load_rates(cfg)?;
    // Every distribution the loader met, baseline-only files included.
    let distributions = encounter_order(&records);
    let matrix = MethodMatrix::from_records(comparison_records(&records))?;
    let table = ratio_table(
        &matrix,
        &distributions,
        &cfg.ratios.family_ids(),
        &cfg.ratios.ext_suffix,
    );
    info!(
        distributions = distributions.len(),
        ratios = table.rows.len(),
        skipped = table.failures.len(),
        "ratio table ready"
    );

    let (dir, file_name) = comparison_target(cfg, out);
    let sink = OutputSink::new(dir);
    sink.prepare()?;
    let mut ctx = RenderContext::with_distributions(&distributions, sink)?;
    let style = RatioStyle {
        width: cfg.ratios.width,
        height: cfg.ratios.height,
        file_name,
    };
    render_ratio_chart(&mut ctx, &table, &cfg.ratios.families, &cfg.legend.labels, &style)?;

    Ok(PassSummary {
        written: ctx.sink().written().to_vec(),
        failures: table.failures,
    })
}

/// Writes the LaTeX rate table to `out`; returns the number of rows.
pub fn run_table<W: Write>(cfg: &AppConfig, out: &mut W) -> Result<usize> {
    let records = load_rates(cfg)?;
    let rows = rate_rows(&records, &cfg.ratios.ext_suffix, BASELINE_ID);
    write_table(out, &rows)?;
    Ok(rows.len())
}

/// Runs the bound, ratio and table passes in turn. A pass that fails is
/// recorded in the summary and the next one still runs.
pub fn run_all<W: Write>(cfg: &AppConfig, out: &mut W) -> PassSummary {
    let mut summary = PassSummary::default();
    match run_bounds(cfg) {
        Ok(pass) => summary.merge(pass),
        Err(err) => {
            error!("bounds pass failed: {err}");
            summary.failures.push(err);
        }
    }
    match run_ratios(cfg, None) {
        Ok(pass) => summary.merge(pass),
        Err(err) => {
            error!("ratios pass failed: {err}");
            summary.failures.push(err);
        }
    }
    match run_table(cfg, out) {
        Ok(rows) => info!(rows, "table written"),
        Err(err) => {
            error!("table pass failed: {err}");
            summary.failures.push(err);
        }
    }
    summary
}
