// Entry point: parses flags, loads config, runs the requested passes.
use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use rvg_figures::cli::{Args, Command};
use rvg_figures::config::AppConfig;
use rvg_figures::pipeline::{PassSummary, run_all, run_bounds, run_ratios, run_table};

fn run(args: Args) -> rvg_figures::Result<PassSummary> {
    if args.write_config && !AppConfig::write_template(&args.config)? {
        warn!(path = %args.config, "config exists; template not written");
    }
    let mut cfg = AppConfig::load_or_default(&args.config);
    let mut summary = PassSummary::default();
    match args.command {
        Command::Bounds {
            reference,
            derived,
            out_dir,
        } => {
            if let Some(r) = reference {
                cfg.input.bounds_reference = r;
            }
            if let Some(d) = derived {
                cfg.input.bounds_derived = d;
            }
            if let Some(o) = out_dir {
                cfg.output.dir = o;
            }
            summary.merge(run_bounds(&cfg)?);
        }
        Command::Ratios { dir, out } => {
            if let Some(d) = dir {
                cfg.input.rate_dir = d;
            }
            summary.merge(run_ratios(&cfg, out.as_deref().map(Path::new))?);
        }
        Command::Table { dir } => {
            if let Some(d) = dir {
                cfg.input.rate_dir = d;
            }
            let rows = run_table(&cfg, &mut io::stdout().lock())?;
            info!(rows, "table written");
        }
        Command::All => {
            summary.merge(run_all(&cfg, &mut io::stdout().lock()));
        }
    }
    Ok(summary)
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(summary) if summary.is_clean() => ExitCode::SUCCESS,
        Ok(summary) => {
            for failure in &summary.failures {
                error!("{failure}");
            }
            error!(
                written = summary.written.len(),
                failed = summary.failures.len(),
                "finished with failures"
            );
            ExitCode::from(1)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(1)
        }
    }
}
