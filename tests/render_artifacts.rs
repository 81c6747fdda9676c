use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use rvg_figures::FigureError;
use rvg_figures::config::AppConfig;
use rvg_figures::pipeline::{run_all, run_bounds, run_ratios};
use walkdir::WalkDir;

fn unique_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "rvg_figures_render_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

fn sample_config(out_dir: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.input.rate_dir = "samples/rate".to_string();
    cfg.input.bounds_reference = "samples/bounds/bounds.ran".to_string();
    cfg.input.bounds_derived = "samples/bounds/bounds.cdf".to_string();
    cfg.output.dir = out_dir.to_string_lossy().to_string();
    cfg.bounds.width = 600;
    cfg.bounds.height = 480;
    cfg.ratios.width = 800;
    cfg.ratios.height = 300;
    cfg
}

fn pngs_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("png"))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn bounds_pass_writes_one_png_per_sampler() {
    let out = unique_dir("bounds");
    let cfg = sample_config(&out);

    let summary = run_bounds(&cfg).expect("bounds pass");
    assert!(summary.is_clean(), "{:?}", summary.failures);

    let expected = [
        "cauchy(1).png",
        "exponential(1).png",
        "flat(.1, 3.14).png",
        "gaussian(1).png",
    ];
    assert_eq!(pngs_in(&out), expected);
    assert_eq!(summary.written.len(), expected.len());
    for name in expected {
        let path = out.join(name);
        assert!(summary.written.contains(&path), "{name} not reported");
        assert!(fs::metadata(&path).expect("png metadata").len() > 0);
    }

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn unwritable_bound_row_does_not_stop_the_pass() {
    let out = unique_dir("bounds_blocked");
    // A directory where the cauchy PNG would go makes that one write fail.
    fs::create_dir_all(out.join("cauchy(1).png")).expect("create blocker");
    let cfg = sample_config(&out);

    let summary = run_bounds(&cfg).expect("bounds pass");
    assert_eq!(summary.failures.len(), 1, "{:?}", summary.failures);
    assert!(matches!(summary.failures[0], FigureError::Render(_)));
    assert_eq!(summary.written.len(), 3);
    assert!(!summary.written.contains(&out.join("cauchy(1).png")));
    assert!(out.join("gaussian(1).png").is_file());

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn ratios_pass_writes_the_comparison_chart() {
    let out = unique_dir("ratios");
    let cfg = sample_config(&out);
    let target = out.join("figure_8.png");

    let summary = run_ratios(&cfg, Some(&target)).expect("ratios pass");
    assert!(summary.is_clean(), "{:?}", summary.failures);
    assert_eq!(summary.written, vec![target.clone()]);
    assert!(fs::metadata(&target).expect("chart metadata").len() > 0);

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn all_keeps_going_after_a_failed_pass() {
    let out = unique_dir("all");
    let mut cfg = sample_config(&out);
    cfg.input.bounds_reference = out.join("missing.ran").to_string_lossy().to_string();

    let mut table = Vec::new();
    let summary = run_all(&cfg, &mut table);

    assert!(!summary.is_clean());
    assert_eq!(summary.failures.len(), 1, "{:?}", summary.failures);
    assert!(matches!(summary.failures[0], FigureError::Io { .. }));
    assert_eq!(summary.written, vec![out.join("figure_8.png")]);
    assert!(out.join("figure_8.png").exists());
    let text = String::from_utf8(table).unwrap();
    assert!(text.starts_with("\\begin{tabular}"), "{text}");

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn all_subcommand_exits_nonzero_but_runs_later_passes() {
    let out = unique_dir("cli_all");
    fs::create_dir_all(&out).expect("create temp dir");
    let config = out.join("rvg-figures.toml");
    let text = format!(
        "[input]\nrate_dir = \"samples/rate\"\nbounds_reference = {:?}\nbounds_derived = \"samples/bounds/bounds.cdf\"\n\n[output]\ndir = {:?}\n",
        out.join("missing.ran").to_string_lossy(),
        out.to_string_lossy(),
    );
    fs::write(&config, text).expect("write config");

    let exe = env!("CARGO_BIN_EXE_rvg-figures");
    let output = Command::new(exe)
        .args(["all", "--log-level", "warn", "--config"])
        .arg(&config)
        .output()
        .expect("run rvg-figures");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("figure_8.png"), "stdout: {stdout}");
    assert!(stdout.contains("\\begin{tabular}{llrr}"), "stdout: {stdout}");
    assert!(out.join("figure_8.png").exists());

    let _ = fs::remove_dir_all(&out);
}

#[test]
fn sample_bound_ticks_stay_readable() {
    use rvg_figures::load::bounds::load_bound_rows;
    use rvg_figures::load::canon::Canonicalizer;
    use rvg_figures::render::bounds::layout_bound_row;
    use rvg_figures::render::scale::ScaleProbe;

    let rows = load_bound_rows(
        Path::new("samples/bounds/bounds.ran"),
        Path::new("samples/bounds/bounds.cdf"),
        &Canonicalizer::default(),
    )
    .expect("sample bounds load");
    for row in &rows {
        let layout = layout_bound_row(row, ScaleProbe::default(), 2.0);
        assert!(
            !layout.ticks.is_empty() && layout.ticks.len() <= 9,
            "{}: {} ticks",
            row.sampler,
            layout.ticks.len()
        );
    }
}
