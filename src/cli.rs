//! Command-line interface definitions for trendpress.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every flag is optional: anything not given falls back to the config file,
//! then to the built-in defaults (see [`crate::config::PipelineConfig`]).

use clap::Parser;

use crate::config::BackendKind;

/// Command-line arguments for the trendpress application.
///
/// # Examples
///
/// ```sh
/// # Defaults: local backend, ./output directory
/// trendpress
///
/// # Point at a config file and a different output directory
/// trendpress -c trendpress.yaml -o ./runs/today
///
/// # One-off override: more keywords, remote HTTP generation
/// trendpress --top-n 10 --backend http
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for raw data snapshots and generated articles
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "TRENDPRESS_CONFIG")]
    pub config: Option<String>,

    /// Number of trending topics used as the run's keyword set
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Interest history window, e.g. "now 7-d"
    #[arg(long)]
    pub timeframe: Option<String>,

    /// Maximum prompts submitted for generation in one run
    #[arg(long)]
    pub generation_cap: Option<usize>,

    /// Generation backend override
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_nothing() {
        let cli = Cli::parse_from(["trendpress"]);
        assert!(cli.output_dir.is_none());
        assert!(cli.config.is_none());
        assert!(cli.backend.is_none());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "trendpress",
            "--output-dir",
            "./out",
            "--top-n",
            "7",
            "--backend",
            "queued",
        ]);
        assert_eq!(cli.output_dir.as_deref(), Some("./out"));
        assert_eq!(cli.top_n, Some(7));
        assert_eq!(cli.backend, Some(BackendKind::Queued));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["trendpress", "-o", "/tmp/out", "-c", "/tmp/config.yaml"]);
        assert_eq!(cli.output_dir.as_deref(), Some("/tmp/out"));
        assert_eq!(cli.config.as_deref(), Some("/tmp/config.yaml"));
    }
}
