//! # trendpress
//!
//! A trend-to-blog pipeline that fetches trending search topics, enriches
//! them with interest statistics, related queries, and news headlines, then
//! asks a language-model backend to draft one article per topic.
//!
//! ## Features
//!
//! - Pulls trending topics and per-keyword interest series from a trends
//!   provider API
//! - Computes descriptive statistics (average, min/max, growth rate) per
//!   keyword
//! - Builds one editorial prompt per keyword from stats, related queries,
//!   and recent headlines
//! - Generates drafts through a local, HTTP, or task-queue backend
//! - Persists raw snapshots and one text file per generated article
//!
//! ## Usage
//!
//! ```sh
//! trendpress -o ./output --backend http
//! ```
//!
//! ## Architecture
//!
//! One run moves strictly through fetch → aggregate → prompt → generate →
//! persist. Empty data at a load-bearing stage halts the run cleanly;
//! everything else degrades per keyword or per prompt. See
//! [`pipeline::PipelineDriver`] for the full failure policy.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod generation;
mod models;
mod outputs;
mod pipeline;
mod prompts;
mod stats;
mod trends;
mod utils;

use cli::Cli;
use config::PipelineConfig;
use generation::GenerationClient;
use models::RunOutcome;
use pipeline::PipelineDriver;
use trends::HttpTrendSource;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("trendpress starting up");

    // Parse CLI and resolve configuration
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = PipelineConfig::load(args.config.as_deref())?;
    config.apply_cli(&args);
    config.validate()?;
    info!(
        output_dir = %config.output_dir,
        top_n = config.top_n,
        timeframe = %config.timeframe,
        generation_cap = config.generation_cap,
        backend = ?config.generation.backend,
        "Configuration resolved"
    );

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // --- Collaborators ---
    let source = HttpTrendSource::new(&config.trends)?;
    let generator = GenerationClient::from_config(&config.generation)?;

    // --- Run the pipeline ---
    let driver = PipelineDriver::new(source, generator, config);
    let outcome = driver.run().await?;

    match &outcome {
        RunOutcome::Completed(report) => {
            for artifact in &report.artifacts {
                if artifact.succeeded() {
                    info!(keyword = %artifact.keyword, path = %artifact.path, "article ready");
                } else {
                    warn!(
                        keyword = %artifact.keyword,
                        error = artifact.error.as_deref().unwrap_or("unknown"),
                        "article failed"
                    );
                }
            }
            info!(
                generated = report.generated,
                failed = report.failed,
                prompts = report.prompts_built,
                "Run finished"
            );
        }
        RunOutcome::Aborted(stage) => {
            warn!(code = stage.code(), reason = %stage, "Run ended early with nothing to generate");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
