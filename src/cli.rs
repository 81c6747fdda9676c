use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, global = true, default_value = "rvg-figures.toml")]
    pub config: String,

    /// Log level written to stderr (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: tracing::Level,

    /// Write a commented default config to `--config` if none exists
    #[arg(long, global = true)]
    pub write_config: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Draw one bound-narrowing diagram per sampler
    Bounds {
        /// Reference bounds file (overrides config)
        #[arg(long)]
        reference: Option<String>,

        /// Derived bounds file (overrides config)
        #[arg(long)]
        derived: Option<String>,

        /// Output directory (overrides config)
        #[arg(long)]
        out_dir: Option<String>,
    },
    /// Draw the `_ext` ratio comparison chart
    Ratios {
        /// Directory holding the rate files (overrides config)
        #[arg(long)]
        dir: Option<String>,

        /// Output image path (overrides config)
        #[arg(long)]
        out: Option<String>,
    },
    /// Print the rate table as LaTeX on stdout
    Table {
        /// Directory holding the rate files (overrides config)
        #[arg(long)]
        dir: Option<String>,
    },
    /// Run every pass with the configured inputs
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_follow_subcommand() {
        let args = Args::try_parse_from([
            "rvg-figures",
            "bounds",
            "--reference",
            "a.ran",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.log_level, tracing::Level::DEBUG);
        assert_eq!(args.config, "rvg-figures.toml");
        assert!(!args.write_config);
        match args.command {
            Command::Bounds {
                reference, derived, ..
            } => {
                assert_eq!(reference.as_deref(), Some("a.ran"));
                assert!(derived.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn write_config_is_opt_in() {
        let args = Args::try_parse_from(["rvg-figures", "all", "--write-config", "--config", "x.toml"]).unwrap();
        assert!(args.write_config);
        assert_eq!(args.config, "x.toml");
        assert!(matches!(args.command, Command::All));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Args::try_parse_from(["rvg-figures"]).is_err());
    }
}
