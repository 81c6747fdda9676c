//! Bound records from the paired `bounds.ran` / `bounds.cdf` files.
//!
//! The reference file holds `sampler lo hi runtime` from the established
//! library; the derived file holds `sampler c_lo c_hi s_lo s_hi e_lo e_hi runtime`
//! for the CDF, SF and DDF stages. Rows must list the same samplers in order.

use std::path::Path;

use super::canon::Canonicalizer;
use super::{fields_with_shape, numbered_lines, parse_f64_field, read_input};
use crate::error::{FigureError, Result};

const REFERENCE_FIELDS: usize = 4;
const DERIVED_FIELDS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Reference,
    Cdf,
    Sf,
    Ddf,
}

impl StageKind {
    pub const ALL: [StageKind; 4] = [
        StageKind::Reference,
        StageKind::Cdf,
        StageKind::Sf,
        StageKind::Ddf,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StageKind::Reference => "GSL",
            StageKind::Cdf => "CDF",
            StageKind::Sf => "SF",
            StageKind::Ddf => "DDF",
        }
    }

    /// Vertical position in the diagram; the reference sits on top.
    pub fn row_offset(self) -> u32 {
        match self {
            StageKind::Reference => 3,
            StageKind::Cdf => 2,
            StageKind::Sf => 1,
            StageKind::Ddf => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn straddles_zero(&self) -> bool {
        self.lo < 0.0 && self.hi > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    pub kind: StageKind,
    pub interval: Interval,
    pub runtime: f64,
}

/// Four interval estimates for one sampler, in `StageKind::ALL` order.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundRow {
    pub sampler: String,
    pub stages: [Stage; 4],
}

impl BoundRow {
    pub fn stage(&self, kind: StageKind) -> &Stage {
        // stages are stored in StageKind::ALL order
        &self.stages[StageKind::ALL.iter().position(|k| *k == kind).unwrap_or(0)]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceLine {
    pub sampler: String,
    pub interval: Interval,
    pub runtime: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DerivedLine {
    pub sampler: String,
    pub cdf: Interval,
    pub sf: Interval,
    pub ddf: Interval,
    pub runtime: f64,
}

/// Lazily parses one of the two bound file shapes.
pub struct BoundLines<'a, I, T> {
    lines: I,
    source_name: &'a str,
    canon: &'a Canonicalizer,
    parse: fn(&str, usize, &str, &Canonicalizer) -> Result<T>,
}

impl<'a, I, T> Iterator for BoundLines<'a, I, T>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line_no, line) = self.lines.next()?;
        Some((self.parse)(self.source_name, line_no, line, self.canon))
    }
}

pub fn reference_lines<'a>(
    text: &'a str,
    source_name: &'a str,
    canon: &'a Canonicalizer,
) -> BoundLines<'a, impl Iterator<Item = (usize, &'a str)>, ReferenceLine> {
    BoundLines {
        lines: numbered_lines(text),
        source_name,
        canon,
        parse: parse_reference_line,
    }
}

pub fn derived_lines<'a>(
    text: &'a str,
    source_name: &'a str,
    canon: &'a Canonicalizer,
) -> BoundLines<'a, impl Iterator<Item = (usize, &'a str)>, DerivedLine> {
    BoundLines {
        lines: numbered_lines(text),
        source_name,
        canon,
        parse: parse_derived_line,
    }
}

fn sampler_name(source_name: &str, line_no: usize, raw: &str, canon: &Canonicalizer) -> Result<String> {
    let name = canon.canonicalize(raw);
    if name.is_empty() {
        return Err(FigureError::parse(
            source_name,
            line_no,
            format!("sampler `{raw}` is empty after canonicalization"),
        ));
    }
    Ok(name)
}

pub fn parse_reference_line(
    source_name: &str,
    line_no: usize,
    line: &str,
    canon: &Canonicalizer,
) -> Result<ReferenceLine> {
    let cols = fields_with_shape(source_name, line_no, line, REFERENCE_FIELDS)?;
    let err = |m: String| FigureError::parse(source_name, line_no, m);
    Ok(ReferenceLine {
        sampler: sampler_name(source_name, line_no, &cols[0], canon)?,
        interval: Interval::new(
            parse_f64_field(&cols, 1, "lo").map_err(err)?,
            parse_f64_field(&cols, 2, "hi").map_err(err)?,
        ),
        runtime: parse_f64_field(&cols, 3, "runtime").map_err(err)?,
    })
}

pub fn parse_derived_line(
    source_name: &str,
    line_no: usize,
    line: &str,
    canon: &Canonicalizer,
) -> Result<DerivedLine> {
    let cols = fields_with_shape(source_name, line_no, line, DERIVED_FIELDS)?;
    let err = |m: String| FigureError::parse(source_name, line_no, m);
    let pair = |lo: usize, name_lo: &str, name_hi: &str| -> Result<Interval> {
        Ok(Interval::new(
            parse_f64_field(&cols, lo, name_lo).map_err(err)?,
            parse_f64_field(&cols, lo + 1, name_hi).map_err(err)?,
        ))
    };
    Ok(DerivedLine {
        sampler: sampler_name(source_name, line_no, &cols[0], canon)?,
        cdf: pair(1, "c_lo", "c_hi")?,
        sf: pair(3, "s_lo", "s_hi")?,
        ddf: pair(5, "e_lo", "e_hi")?,
        runtime: parse_f64_field(&cols, 7, "runtime").map_err(err)?,
    })
}

/// Zip the two parsed files into rows, checking they describe the same samplers.
pub fn pair_bound_rows(reference: Vec<ReferenceLine>, derived: Vec<DerivedLine>) -> Result<Vec<BoundRow>> {
    if reference.len() != derived.len() {
        return Err(FigureError::ShapeMismatch {
            row: reference.len().min(derived.len()) + 1,
            detail: format!(
                "reference file has {} rows, derived file has {}",
                reference.len(),
                derived.len()
            ),
        });
    }
    let mut rows = Vec::with_capacity(reference.len());
    for (i, (r, d)) in reference.into_iter().zip(derived).enumerate() {
        if r.sampler != d.sampler {
            return Err(FigureError::ShapeMismatch {
                row: i + 1,
                detail: format!("sampler `{}` vs `{}`", r.sampler, d.sampler),
            });
        }
        rows.push(BoundRow {
            sampler: r.sampler,
            stages: [
                Stage {
                    kind: StageKind::Reference,
                    interval: r.interval,
                    runtime: r.runtime,
                },
                Stage {
                    kind: StageKind::Cdf,
                    interval: d.cdf,
                    runtime: d.runtime,
                },
                Stage {
                    kind: StageKind::Sf,
                    interval: d.sf,
                    runtime: d.runtime,
                },
                Stage {
                    kind: StageKind::Ddf,
                    interval: d.ddf,
                    runtime: d.runtime,
                },
            ],
        });
    }
    Ok(rows)
}

pub fn parse_bound_texts(
    reference_text: &str,
    reference_name: &str,
    derived_text: &str,
    derived_name: &str,
    canon: &Canonicalizer,
) -> Result<Vec<BoundRow>> {
    let reference = reference_lines(reference_text, reference_name, canon).collect::<Result<Vec<_>>>()?;
    let derived = derived_lines(derived_text, derived_name, canon).collect::<Result<Vec<_>>>()?;
    pair_bound_rows(reference, derived)
}

pub fn load_bound_rows(reference: &Path, derived: &Path, canon: &Canonicalizer) -> Result<Vec<BoundRow>> {
    let reference_text = read_input(reference)?;
    let derived_text = read_input(derived)?;
    parse_bound_texts(
        &reference_text,
        &reference.display().to_string(),
        &derived_text,
        &derived.display().to_string(),
        canon,
    )
}
