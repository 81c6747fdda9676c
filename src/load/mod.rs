//! Record loading for the benchmark harness output.
//!
//! Fields are separated by a single space. Sampler names printed by the
//! harness are double-quoted and may contain spaces, e.g.
//! `"gsl_ran_beta(rng, 5, 5)" 1000 0.012 64000`.

pub mod bounds;
pub mod canon;
pub mod rate;

use std::fs::read_to_string;
use std::path::Path;

use crate::error::{FigureError, Result};

/// Split one line into fields, honouring double quotes.
///
/// Consecutive separators produce empty fields, so a doubled space changes
/// the field count and is caught by the shape check of the caller.
pub fn split_fields(line: &str) -> std::result::Result<Vec<String>, String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ' ' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(current);
    Ok(fields)
}

pub(crate) fn parse_f64_field(cols: &[String], idx: usize, name: &str) -> std::result::Result<f64, String> {
    let raw = cols
        .get(idx)
        .ok_or_else(|| format!("missing required field: {name}"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|e| format!("invalid {name} `{raw}`: {e}"))?;
    if v.is_nan() {
        return Err(format!("invalid {name}: NaN"));
    }
    Ok(v)
}

pub(crate) fn parse_u64_field(cols: &[String], idx: usize, name: &str) -> std::result::Result<u64, String> {
    let raw = cols
        .get(idx)
        .ok_or_else(|| format!("missing required field: {name}"))?;
    raw.parse::<u64>()
        .map_err(|e| format!("invalid {name} `{raw}`: {e}"))
}

/// Non-blank lines with their 1-based line numbers.
pub(crate) fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l))
}

/// Split a line and check its field count in one step.
pub(crate) fn fields_with_shape(
    source_name: &str,
    line_no: usize,
    line: &str,
    expected: usize,
) -> Result<Vec<String>> {
    let cols = split_fields(line).map_err(|m| FigureError::parse(source_name, line_no, m))?;
    if cols.len() != expected {
        return Err(FigureError::parse(
            source_name,
            line_no,
            format!("expected {expected} fields, found {}", cols.len()),
        ));
    }
    Ok(cols)
}

pub(crate) fn read_input(path: &Path) -> Result<String> {
    read_to_string(path).map_err(|e| FigureError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_fields() {
        let cols = split_fields("opt 1000 0.5 7000").unwrap();
        assert_eq!(cols, vec!["opt", "1000", "0.5", "7000"]);
    }

    #[test]
    fn split_keeps_spaces_inside_quotes() {
        let cols = split_fields("\"gsl_ran_beta(rng, 5, 5)\" 1000 0.012 64000").unwrap();
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0], "gsl_ran_beta(rng, 5, 5)");
    }

    #[test]
    fn split_double_space_yields_empty_field() {
        let cols = split_fields("opt  1000").unwrap();
        assert_eq!(cols, vec!["opt", "", "1000"]);
    }

    #[test]
    fn split_rejects_unterminated_quote() {
        assert!(split_fields("\"gsl_ran_beta(rng, 5 1000").is_err());
    }

    #[test]
    fn split_ignores_carriage_return() {
        let cols = split_fields("opt 1 2 3\r").unwrap();
        assert_eq!(cols[3], "3");
    }

    #[test]
    fn shape_check_reports_line() {
        let err = fields_with_shape("f", 7, "a b c", 4).unwrap_err();
        match err {
            FigureError::Parse { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error: {other}"),
        }
    }
}
