//! LaTeX `tabular` of bits/variate and variates/sec per distribution and method.

use std::fmt::Write as _;
use std::io::Write;

use crate::error::{FigureError, Result};
use crate::metrics::{Metric, RateRow};

/// Escape the characters LaTeX treats specially in text cells.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '&' | '%' | '#' | '$' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Render rows as a booktabs `tabular`. Rows are emitted in the order given;
/// `metrics::rate_rows` already sorts them.
pub fn format_table(rows: &[RateRow]) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "\\begin{{tabular}}{{llrr}}");
    let _ = writeln!(s, "\\toprule");
    let _ = writeln!(
        s,
        "distribution & method & {} & {} \\\\",
        Metric::BitsPerVariate.column(),
        Metric::VariatesPerSecond.column()
    );
    let _ = writeln!(s, "\\midrule");
    for row in rows {
        let _ = writeln!(
            s,
            "{} & {} & {:.6} & {:.6} \\\\",
            escape_latex(&row.distribution),
            escape_latex(&row.method),
            row.bits_per_variate,
            row.variates_per_second
        );
    }
    let _ = writeln!(s, "\\bottomrule");
    let _ = writeln!(s, "\\end{{tabular}}");
    s
}

pub fn write_table<W: Write>(out: &mut W, rows: &[RateRow]) -> Result<()> {
    out.write_all(format_table(rows).as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| FigureError::io("<stdout>", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dist: &str, method: &str, bpv: f64, vps: f64) -> RateRow {
        RateRow {
            distribution: dist.to_string(),
            method: method.to_string(),
            bits_per_variate: bpv,
            variates_per_second: vps,
        }
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_latex("opt_ext"), "opt\\_ext");
        assert_eq!(escape_latex("a&b%c#d$e{f}"), "a\\&b\\%c\\#d\\$e\\{f\\}");
        assert_eq!(escape_latex("beta@5,5"), "beta@5,5");
    }

    #[test]
    fn table_has_booktabs_frame_and_six_decimals() {
        let text = format_table(&[row("gaussian@15", "opt", 7.0, 2000.0)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\\begin{tabular}{llrr}");
        assert_eq!(lines[1], "\\toprule");
        assert_eq!(lines[2], "distribution & method & bits/variate & variates/sec \\\\");
        assert_eq!(lines[3], "\\midrule");
        assert_eq!(lines[4], "gaussian@15 & opt & 7.000000 & 2000.000000 \\\\");
        assert_eq!(lines[5], "\\bottomrule");
        assert_eq!(lines[6], "\\end{tabular}");
    }

    #[test]
    fn write_table_matches_format() {
        let rows = [row("beta@5,5", "gsl", 64.0, 1e6), row("beta@5,5", "opt", 12.5, 3e5)];
        let mut buf = Vec::new();
        write_table(&mut buf, &rows).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format_table(&rows));
    }
}
