use crate::load::canon::{CanonRule, default_rules};
use crate::render::ratios::MethodGroup;
use crate::render::scale::ScaleProbe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{FigureError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory scanned for per-distribution rate files.
    #[serde(default = "InputConfig::default_rate_dir")]
    pub rate_dir: String,
    #[serde(default = "InputConfig::default_rate_marker")]
    pub rate_marker: String,
    #[serde(default = "InputConfig::default_bounds_reference")]
    pub bounds_reference: String,
    #[serde(default = "InputConfig::default_bounds_derived")]
    pub bounds_derived: String,
    #[serde(default = "default_rules")]
    pub canon_rules: Vec<CanonRule>,
}

impl InputConfig {
    fn default_rate_dir() -> String {
        ".".to_string()
    }
    fn default_rate_marker() -> String {
        "@".to_string()
    }
    fn default_bounds_reference() -> String {
        "bounds.ran".to_string()
    }
    fn default_bounds_derived() -> String {
        "bounds.cdf".to_string()
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            rate_dir: Self::default_rate_dir(),
            rate_marker: Self::default_rate_marker(),
            bounds_reference: Self::default_bounds_reference(),
            bounds_derived: Self::default_bounds_derived(),
            canon_rules: default_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: String,
    /// File stem of the comparison chart.
    #[serde(default = "OutputConfig::default_comparison_name")]
    pub comparison_name: String,
}

impl OutputConfig {
    fn default_dir() -> String {
        ".".to_string()
    }
    fn default_comparison_name() -> String {
        "figure_8".to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            comparison_name: Self::default_comparison_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsConfig {
    #[serde(default = "BoundsConfig::default_width")]
    pub width: u32,
    #[serde(default = "BoundsConfig::default_height")]
    pub height: u32,
    #[serde(default)]
    pub scale_probe: ScaleProbe,
    #[serde(default = "BoundsConfig::default_linthresh")]
    pub linthresh: f64,
}

impl BoundsConfig {
    fn default_width() -> u32 {
        1500
    }
    fn default_height() -> u32 {
        1200
    }
    fn default_linthresh() -> f64 {
        2.0
    }
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            scale_probe: ScaleProbe::default(),
            linthresh: Self::default_linthresh(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatiosConfig {
    #[serde(default = "RatiosConfig::default_ext_suffix")]
    pub ext_suffix: String,
    #[serde(default = "RatiosConfig::default_width")]
    pub width: u32,
    #[serde(default = "RatiosConfig::default_height")]
    pub height: u32,
    /// Bar groups from bottom to top.
    #[serde(default = "RatiosConfig::default_families")]
    pub families: Vec<MethodGroup>,
}

impl RatiosConfig {
    fn default_ext_suffix() -> String {
        "_ext".to_string()
    }
    fn default_width() -> u32 {
        1600
    }
    fn default_height() -> u32 {
        550
    }
    fn default_families() -> Vec<MethodGroup> {
        vec![MethodGroup::new("opt", "Optimal"), MethodGroup::new("cbs", "CBS")]
    }

    pub fn family_ids(&self) -> Vec<String> {
        self.families.iter().map(|f| f.id.clone()).collect()
    }
}

impl Default for RatiosConfig {
    fn default() -> Self {
        Self {
            ext_suffix: Self::default_ext_suffix(),
            width: Self::default_width(),
            height: Self::default_height(),
            families: Self::default_families(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LegendConfig {
    /// Distribution id -> legend text, e.g. `"beta@5,5" = "Beta(5,5)"`.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub bounds: BoundsConfig,
    #[serde(default)]
    pub ratios: RatiosConfig,
    #[serde(default)]
    pub legend: LegendConfig,
}

impl AppConfig {
    /// Defaults as a TOML template with every value commented out.
    fn commented_template(text: &str) -> String {
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && !trimmed.starts_with("[[") && trimmed.ends_with(']') {
                // Plain table headers stay live; array-of-tables headers would
                // create empty entries, so they are commented with their keys.
                commented.push_str(line);
                commented.push('\n');
            } else {
                commented.push_str("# ");
                commented.push_str(line);
                commented.push('\n');
            }
        }
        commented
    }

    /// Reads `path` if it exists. A missing file means defaults; nothing is
    /// written. Unreadable or malformed files also fall back to defaults.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if !path_obj.exists() {
            debug!("no config at {path}; using defaults");
            return Self::default();
        }
        match fs::read_to_string(path_obj) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    warn!("Failed to parse config {path}: {err}. Using defaults.");
                }
            },
            Err(err) => {
                warn!("Failed to read config {path}: {err}. Using defaults.");
            }
        }
        Self::default()
    }

    /// Writes the defaults to `path` as a commented template. An existing
    /// file is left alone; returns whether the template was written.
    pub fn write_template(path: &str) -> Result<bool> {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            return Ok(false);
        }
        let text = toml::to_string_pretty(&Self::default())
            .map_err(|e| FigureError::io(path_obj, std::io::Error::other(e.to_string())))?;
        fs::write(path_obj, Self::commented_template(&text)).map_err(|e| FigureError::io(path_obj, e))?;
        info!("wrote default config to {path}");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "rvg_figures_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn load_or_default_leaves_missing_file_alone() {
        let path = unique_path("missing.toml");
        let path_str = path.to_string_lossy().to_string();
        let _ = fs::remove_file(&path);

        let cfg = AppConfig::load_or_default(&path_str);
        assert!(!path.exists(), "loading must not create a config file");
        assert_eq!(cfg.input.rate_marker, "@");
        assert_eq!(cfg.input.bounds_reference, "bounds.ran");
        assert_eq!(cfg.output.comparison_name, "figure_8");
        assert_eq!(cfg.bounds.width, 1500);
        assert_eq!(cfg.bounds.scale_probe, ScaleProbe::WithoutDdf);
        assert_eq!(cfg.ratios.family_ids(), vec!["opt".to_string(), "cbs".to_string()]);
    }

    #[test]
    fn write_template_writes_commented_defaults() {
        let path = unique_path("template.toml");
        let path_str = path.to_string_lossy().to_string();
        let _ = fs::remove_file(&path);

        assert!(AppConfig::write_template(&path_str).expect("write template"));
        let contents = fs::read_to_string(&path).expect("read written config");
        assert!(contents.contains("[bounds]"), "table headers stay live");
        assert!(
            contents.contains("# linthresh = 2.0"),
            "should write commented linthresh"
        );
        assert!(
            contents.contains("# scale_probe = \"without-ddf\""),
            "should write commented scale_probe"
        );
        assert!(
            contents.contains("# [[ratios.families]]"),
            "array tables are commented out"
        );

        // The template must load back to the same defaults.
        let defaults = AppConfig::default();
        let reloaded = AppConfig::load_or_default(&path_str);
        assert_eq!(reloaded.ratios.families, defaults.ratios.families);
        assert_eq!(reloaded.input.canon_rules, defaults.input.canon_rules);

        // A second call leaves the existing file untouched.
        fs::write(&path, "[bounds]\nwidth = 640\n").unwrap();
        assert!(!AppConfig::write_template(&path_str).expect("second call"));
        assert_eq!(AppConfig::load_or_default(&path_str).bounds.width, 640);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let text = r#"
[bounds]
scale_probe = "all-stages"

[legend.labels]
"beta@5,5" = "Beta(5,5)"
"#;
        let cfg: AppConfig = toml::from_str(text).expect("parse partial config");
        assert_eq!(cfg.bounds.scale_probe, ScaleProbe::AllStages);
        assert_eq!(cfg.bounds.linthresh, 2.0);
        assert_eq!(cfg.legend.labels.get("beta@5,5").map(String::as_str), Some("Beta(5,5)"));
        assert_eq!(cfg.ratios.ext_suffix, "_ext");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = unique_path("broken.toml");
        fs::write(&path, "[bounds\nwidth = ").unwrap();
        let cfg = AppConfig::load_or_default(&path.to_string_lossy());
        assert_eq!(cfg.bounds.width, 1500);
        let _ = fs::remove_file(&path);
    }
}
