//! Figure rendering on top of plotters.
//!
//! All plotting state lives in an explicit [`RenderContext`]: the palette, the
//! distribution color assignment and the output sink.

pub mod bounds;
pub mod palette;
pub mod ratios;
pub mod scale;

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use tracing::info;

use crate::error::{FigureError, Result};
use palette::{ColorAssignment, palette_for};

/// Where finished artifacts go; every written path is reported on stdout.
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl OutputSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prepare(&self) -> Result<()> {
        create_dir_all(&self.dir).map_err(|e| FigureError::io(&self.dir, e))
    }

    /// Path for an artifact; path separators in `name` are replaced.
    pub fn path_for(&self, name: &str, extension: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{safe}.{extension}"))
    }

    pub fn report(&mut self, path: PathBuf) {
        println!("{}", path.display());
        info!(path = %path.display(), "wrote artifact");
        self.written.push(path);
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

pub struct RenderContext {
    palette: Vec<RGBColor>,
    colors: ColorAssignment,
    sink: OutputSink,
}

impl RenderContext {
    /// Context without distribution colors, enough for bound diagrams.
    pub fn new(sink: OutputSink) -> Self {
        Self {
            palette: Vec::new(),
            colors: ColorAssignment::default(),
            sink,
        }
    }

    /// Builds the color assignment once; fails if the palette runs out.
    pub fn with_distributions<S: AsRef<str>>(distributions: &[S], sink: OutputSink) -> Result<Self> {
        let colors = ColorAssignment::from_encounter_order(distributions);
        let palette = palette_for(colors.len())?;
        Ok(Self {
            palette,
            colors,
            sink,
        })
    }

    pub fn colors(&self) -> &ColorAssignment {
        &self.colors
    }

    pub fn color_at(&self, index: usize) -> RGBColor {
        self.palette
            .get(index)
            .copied()
            .unwrap_or(RGBColor(128, 128, 128))
    }

    pub fn color_of(&self, distribution: &str) -> Option<RGBColor> {
        self.colors.index_of(distribution).map(|i| self.color_at(i))
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut OutputSink {
        &mut self.sink
    }
}

/// C `%e` formatting: six fraction digits, signed two-digit exponent.
pub fn format_sci(x: f64) -> String {
    if !x.is_finite() {
        return format!("{x}");
    }
    let s = format!("{x:.6e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// Runtime in seconds as the harness printed it, always with a fraction part.
pub fn format_runtime(secs: f64) -> String {
    format!("{secs:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_sci_matches_c_style() {
        assert_eq!(format_sci(1.0), "1.000000e+00");
        assert_eq!(format_sci(-12.5), "-1.250000e+01");
        assert_eq!(format_sci(0.0), "0.000000e+00");
        assert_eq!(format_sci(2.5e-7), "2.500000e-07");
        assert_eq!(format_sci(6.02e123), "6.020000e+123");
    }

    #[test]
    fn format_runtime_keeps_fraction() {
        assert_eq!(format_runtime(3.0), "3.0");
        assert_eq!(format_runtime(0.25), "0.25");
    }

    #[test]
    fn sink_paths_are_flat() {
        let sink = OutputSink::new("out");
        assert_eq!(sink.path_for("flat(.1, 3.14)", "png"), Path::new("out/flat(.1, 3.14).png"));
        assert_eq!(sink.path_for("a/b", "png"), Path::new("out/a_b.png"));
    }

    #[test]
    fn context_colors_follow_assignment() {
        let ctx = RenderContext::with_distributions(&["b@1", "a@2"], OutputSink::new("out")).unwrap();
        assert_eq!(ctx.color_of("b@1"), Some(palette::TAB20C[0]));
        assert_eq!(ctx.color_of("a@2"), Some(palette::TAB20C[1]));
        assert_eq!(ctx.color_of("c@3"), None);
    }

    #[test]
    fn context_reports_palette_exhaustion() {
        let names: Vec<String> = (0..41).map(|i| format!("d@{i}")).collect();
        let err = RenderContext::with_distributions(&names, OutputSink::new("out")).err();
        assert!(matches!(err, Some(FigureError::PaletteExhaustion { needed: 41, .. })));
    }
}
