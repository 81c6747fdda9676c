use std::fs;
use std::path::PathBuf;

use rvg_figures::FigureError;
use rvg_figures::config::AppConfig;
use rvg_figures::load::rate::encounter_order;
use rvg_figures::metrics::MethodMatrix;
use rvg_figures::metrics::ratio::{comparison_records, ratio_table};
use rvg_figures::pipeline::load_rates;

fn unique_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "rvg_figures_ratio_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

fn config_for(dir: &PathBuf) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.input.rate_dir = dir.to_string_lossy().to_string();
    cfg
}

const FULL: &str = "\"generate_opt\" 1000 0.5 7000\n\"generate_opt_ext\" 1000 0.8 9000\n\"generate_cbs\" 1000 0.4 7400\n\"generate_cbs_ext\" 1000 0.7 9600\n";

#[test]
fn missing_variant_only_drops_its_distribution() {
    let dir = unique_dir("missing");
    fs::write(dir.join("gaussian@15"), FULL).unwrap();
    fs::write(
        dir.join("cauchy@7"),
        "\"generate_opt\" 1000 0.5 7000\n\"generate_opt_ext\" 1000 0.8 9000\n\"generate_cbs\" 1000 0.4 7400\n",
    )
    .unwrap();

    let cfg = config_for(&dir);
    let records = load_rates(&cfg).expect("load");
    let comparison: Vec<_> = comparison_records(&records).cloned().collect();
    let matrix = MethodMatrix::from_records(&comparison).expect("matrix");
    let table = ratio_table(
        &matrix,
        &encounter_order(&records),
        &cfg.ratios.family_ids(),
        &cfg.ratios.ext_suffix,
    );

    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.failures.len(), 1);
    match &table.failures[0] {
        FigureError::MissingVariant {
            distribution,
            method,
            variant,
        } => {
            assert_eq!(distribution, "cauchy@7");
            assert_eq!(method, "cbs");
            assert_eq!(variant, "cbs_ext");
        }
        other => panic!("unexpected failure: {other}"),
    }
    assert!(!table.failures[0].is_fatal());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn baseline_only_file_is_not_silently_dropped() {
    let dir = unique_dir("baseline_only");
    fs::write(dir.join("gaussian@15"), FULL).unwrap();
    fs::write(
        dir.join("gamma@.5,1"),
        "\"gsl_ran_gamma(rng, a, b)\" 1000 0.0002 64000\n",
    )
    .unwrap();

    let cfg = config_for(&dir);
    let records = load_rates(&cfg).expect("load");
    let distributions = encounter_order(&records);
    assert_eq!(distributions, vec!["gamma@.5,1", "gaussian@15"]);

    let comparison: Vec<_> = comparison_records(&records).cloned().collect();
    let matrix = MethodMatrix::from_records(&comparison).expect("matrix");
    let table = ratio_table(
        &matrix,
        &distributions,
        &cfg.ratios.family_ids(),
        &cfg.ratios.ext_suffix,
    );
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.failures.len(), 2, "one failure per method family");
    for failure in &table.failures {
        match failure {
            FigureError::MissingVariant { distribution, .. } => assert_eq!(distribution, "gamma@.5,1"),
            other => panic!("unexpected failure: {other}"),
        }
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn duplicate_measurement_is_rejected() {
    let dir = unique_dir("duplicate");
    fs::write(
        dir.join("gaussian@15"),
        format!("{FULL}\"generate_opt\" 1000 0.6 7100\n"),
    )
    .unwrap();
    let records = load_rates(&config_for(&dir)).expect("load");
    let err = MethodMatrix::from_records(&records).unwrap_err();
    assert!(matches!(err, FigureError::DuplicateMeasurement { .. }));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_line_fails_the_pass() {
    let dir = unique_dir("malformed");
    fs::write(dir.join("gaussian@15"), "\"generate_opt\" 0 0.5 7000\n").unwrap();
    let err = load_rates(&config_for(&dir)).unwrap_err();
    match err {
        FigureError::Parse { line, .. } => assert_eq!(line, 1),
        other => panic!("unexpected error: {other}"),
    }
    let _ = fs::remove_dir_all(&dir);
}
