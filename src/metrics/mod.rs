//! Derived efficiency metrics and the method-indexed matrix.

pub mod ratio;

use std::collections::BTreeMap;

use crate::error::{FigureError, Result};
use crate::load::rate::RateRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    BitsPerVariate,
    VariatesPerSecond,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::BitsPerVariate, Metric::VariatesPerSecond];

    pub fn of(self, record: &RateRecord) -> f64 {
        match self {
            Metric::BitsPerVariate => record.bits_per_variate(),
            Metric::VariatesPerSecond => record.variates_per_second(),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Metric::BitsPerVariate => "bits/variate",
            Metric::VariatesPerSecond => "variates/sec",
        }
    }
}

/// `(distribution, metric) -> {method: value}`, immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodMatrix {
    cells: BTreeMap<(String, Metric), BTreeMap<String, f64>>,
}

impl MethodMatrix {
    /// Pivot records into the matrix; one record per `(distribution, method)`.
    pub fn from_records<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a RateRecord>,
    {
        let mut cells: BTreeMap<(String, Metric), BTreeMap<String, f64>> = BTreeMap::new();
        for record in records {
            for metric in Metric::ALL {
                let row = cells
                    .entry((record.distribution.clone(), metric))
                    .or_default();
                if row.insert(record.method.clone(), metric.of(record)).is_some() {
                    return Err(FigureError::DuplicateMeasurement {
                        distribution: record.distribution.clone(),
                        method: record.method.clone(),
                    });
                }
            }
        }
        Ok(Self { cells })
    }

    pub fn value(&self, distribution: &str, metric: Metric, method: &str) -> Option<f64> {
        self.cells
            .get(&(distribution.to_string(), metric))
            .and_then(|row| row.get(method))
            .copied()
    }

    pub fn methods(&self, distribution: &str, metric: Metric) -> Option<&BTreeMap<String, f64>> {
        self.cells.get(&(distribution.to_string(), metric))
    }

    /// Distribution ids, sorted.
    pub fn distributions(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for (dist, _) in self.cells.keys() {
            if out.last() != Some(&dist.as_str()) {
                out.push(dist.as_str());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One line of the per-distribution, per-method rate table.
#[derive(Clone, Debug, PartialEq)]
pub struct RateRow {
    pub distribution: String,
    pub method: String,
    pub bits_per_variate: f64,
    pub variates_per_second: f64,
}

/// Rows for the rate table: `_ext` variants dropped, baseline rows relabeled.
pub fn rate_rows(records: &[RateRecord], ext_suffix: &str, baseline_id: &str) -> Vec<RateRow> {
    let mut rows: Vec<RateRow> = records
        .iter()
        .filter(|r| !r.is_external(ext_suffix))
        .map(|r| RateRow {
            distribution: r.distribution.clone(),
            method: if r.baseline {
                baseline_id.to_string()
            } else {
                r.method.clone()
            },
            bits_per_variate: r.bits_per_variate(),
            variates_per_second: r.variates_per_second(),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.distribution
            .cmp(&b.distribution)
            .then_with(|| a.method.cmp(&b.method))
    });
    rows
}
