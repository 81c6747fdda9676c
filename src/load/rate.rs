//! Rate records: `method n time flips`, one file per distribution.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::canon::Canonicalizer;
use super::{fields_with_shape, numbered_lines, parse_f64_field, parse_u64_field, read_input};
use crate::error::{FigureError, Result};

const RATE_FIELDS: usize = 4;

/// One benchmark observation for one method on one distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct RateRecord {
    pub method: String,
    pub baseline: bool,
    pub distribution: String,
    pub sample_count: u64,
    pub elapsed_time: f64,
    pub bit_consumption: u64,
}

impl RateRecord {
    pub fn bits_per_variate(&self) -> f64 {
        self.bit_consumption as f64 / self.sample_count as f64
    }

    pub fn variates_per_second(&self) -> f64 {
        self.sample_count as f64 / self.elapsed_time
    }

    pub fn is_external(&self, ext_suffix: &str) -> bool {
        self.method.ends_with(ext_suffix)
    }
}

/// Lazily parses the lines of one rate file.
pub struct RateLines<'a, I> {
    lines: I,
    distribution: &'a str,
    canon: &'a Canonicalizer,
}

impl<'a, I> Iterator for RateLines<'a, I>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    type Item = Result<RateRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line_no, line) = self.lines.next()?;
        Some(parse_rate_line(self.distribution, line_no, line, self.canon))
    }
}

pub fn rate_records<'a>(
    text: &'a str,
    distribution: &'a str,
    canon: &'a Canonicalizer,
) -> RateLines<'a, impl Iterator<Item = (usize, &'a str)>> {
    RateLines {
        lines: numbered_lines(text),
        distribution,
        canon,
    }
}

pub fn parse_rate_line(
    distribution: &str,
    line_no: usize,
    line: &str,
    canon: &Canonicalizer,
) -> Result<RateRecord> {
    let cols = fields_with_shape(distribution, line_no, line, RATE_FIELDS)?;
    let err = |m: String| FigureError::parse(distribution, line_no, m);

    let raw_method = cols[0].as_str();
    let method = canon.canonicalize(raw_method);
    if method.is_empty() {
        return Err(err(format!("method `{raw_method}` is empty after canonicalization")));
    }
    let sample_count = parse_u64_field(&cols, 1, "n").map_err(err)?;
    let elapsed_time = parse_f64_field(&cols, 2, "time").map_err(err)?;
    let bit_consumption = parse_u64_field(&cols, 3, "flips").map_err(err)?;

    if sample_count == 0 {
        return Err(err("n must be positive".to_string()));
    }
    if !(elapsed_time > 0.0 && elapsed_time.is_finite()) {
        return Err(err(format!("time must be positive, got {elapsed_time}")));
    }

    Ok(RateRecord {
        method,
        baseline: Canonicalizer::is_baseline(raw_method),
        distribution: distribution.to_string(),
        sample_count,
        elapsed_time,
        bit_consumption,
    })
}

/// A rate file located by a directory scan.
#[derive(Clone, Debug)]
pub struct RateFile {
    pub path: PathBuf,
    pub distribution: String,
}

/// Files directly inside `dir` whose names contain `marker`, in file-name order.
pub fn discover_rate_files(dir: &Path, marker: &str) -> Result<Vec<RateFile>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            FigureError::io(path, std::io::Error::other(e.to_string()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.contains(marker) {
            continue;
        }
        out.push(RateFile {
            path: entry.path().to_path_buf(),
            distribution: name,
        });
    }
    debug!(count = out.len(), dir = %dir.display(), "discovered rate files");
    Ok(out)
}

/// Read every rate file fully, one after another, keeping encounter order.
pub fn load_rate_files(files: &[RateFile], canon: &Canonicalizer) -> Result<Vec<RateRecord>> {
    let mut records = Vec::new();
    for file in files {
        let text = read_input(&file.path)?;
        for record in rate_records(&text, &file.distribution, canon) {
            records.push(record?);
        }
        debug!(distribution = %file.distribution, total = records.len(), "loaded rate file");
    }
    Ok(records)
}

/// Distinct distributions in the order the loader first met them.
pub fn encounter_order(records: &[RateRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in records {
        if !seen.iter().any(|d| d == &r.distribution) {
            seen.push(r.distribution.clone());
        }
    }
    seen
}
