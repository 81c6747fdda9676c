//! Paired ratios between a method and its externally measured `_ext` variant.

use tracing::warn;

use super::{MethodMatrix, Metric};
use crate::error::{FigureError, Result};
use crate::load::rate::RateRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatioMetric {
    Flips,
    Runtime,
}

impl RatioMetric {
    pub const ALL: [RatioMetric; 2] = [RatioMetric::Flips, RatioMetric::Runtime];

    pub fn source(self) -> Metric {
        match self {
            RatioMetric::Flips => Metric::BitsPerVariate,
            RatioMetric::Runtime => Metric::VariatesPerSecond,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RatioMetric::Flips => "Bits/Variate Ratio",
            RatioMetric::Runtime => "Variates/Sec Ratio",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatioRow {
    pub distribution: String,
    pub method: String,
    pub ratio_flips: f64,
    pub ratio_runtime: f64,
}

impl RatioRow {
    pub fn get(&self, metric: RatioMetric) -> f64 {
        match metric {
            RatioMetric::Flips => self.ratio_flips,
            RatioMetric::Runtime => self.ratio_runtime,
        }
    }
}

/// Rows that could be computed plus the per-distribution failures.
#[derive(Debug, Default)]
pub struct RatioTable {
    pub rows: Vec<RatioRow>,
    pub failures: Vec<FigureError>,
}

impl RatioTable {
    pub fn rows_for(&self, method: &str) -> impl Iterator<Item = &RatioRow> {
        self.rows.iter().filter(move |r| r.method == method)
    }
}

/// `value(method + ext_suffix) / value(method)` for both ratio metrics.
pub fn ratio_row(matrix: &MethodMatrix, distribution: &str, method: &str, ext_suffix: &str) -> Result<RatioRow> {
    let ext = format!("{method}{ext_suffix}");
    let missing = |variant: &str| FigureError::MissingVariant {
        distribution: distribution.to_string(),
        method: method.to_string(),
        variant: variant.to_string(),
    };
    let mut values = [0.0f64; 2];
    for (slot, metric) in values.iter_mut().zip(RatioMetric::ALL) {
        let base = matrix
            .value(distribution, metric.source(), method)
            .ok_or_else(|| missing(method))?;
        let other = matrix
            .value(distribution, metric.source(), &ext)
            .ok_or_else(|| missing(&ext))?;
        *slot = other / base;
    }
    Ok(RatioRow {
        distribution: distribution.to_string(),
        method: method.to_string(),
        ratio_flips: values[0],
        ratio_runtime: values[1],
    })
}

/// Ratios for every listed distribution and method family, sorted by
/// `(distribution, method)`. A missing variant only drops that cell.
///
/// `distributions` comes from all loaded records, baseline rows included, so
/// a distribution with no comparable measurements still reports its
/// `MissingVariant` failures.
pub fn ratio_table<S: AsRef<str>>(
    matrix: &MethodMatrix,
    distributions: &[S],
    families: &[String],
    ext_suffix: &str,
) -> RatioTable {
    let mut table = RatioTable::default();
    for distribution in distributions {
        let distribution = distribution.as_ref();
        for family in families {
            match ratio_row(matrix, distribution, family, ext_suffix) {
                Ok(row) => table.rows.push(row),
                Err(err) => {
                    warn!("skipping ratio: {err}");
                    table.failures.push(err);
                }
            }
        }
    }
    table.rows.sort_by(|a, b| {
        a.distribution
            .cmp(&b.distribution)
            .then_with(|| a.method.cmp(&b.method))
    });
    table
}

/// Records that feed the ratio comparison: baseline rows are dropped.
pub fn comparison_records(records: &[RateRecord]) -> impl Iterator<Item = &RateRecord> {
    records.iter().filter(|r| !r.baseline)
}
