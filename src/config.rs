//! Run configuration: YAML file, CLI overrides, validation.
//!
//! Precedence is CLI flag > config file > built-in default. The file is
//! optional; a run with no config at all uses the defaults below (local
//! generation backend, `output/` directory, five keywords, three articles).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Accepted timeframe grammar: rolling windows (`now 7-d`, `now 1-H`,
/// `today 3-m`, `today 5-y`), the full history (`all`), or an explicit
/// `YYYY-MM-DD YYYY-MM-DD` range.
static TIMEFRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(all|now \d+-[Hd]|today \d+-[my]|\d{4}-\d{2}-\d{2} \d{4}-\d{2}-\d{2})$")
        .expect("valid regex")
});

/// Which generation backend binding to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Deterministic in-process renderer; no network, useful for dry runs.
    Local,
    /// Synchronous HTTP generation service (`POST /generate`).
    Http,
    /// Task-queue API (`POST /tasks`, then poll `GET /tasks/{id}`).
    Queued,
}

/// Trends provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Base URL of the trends provider API.
    pub base_url: String,
    /// Base URL of the RSS search feed used for news headlines.
    pub news_base_url: String,
    /// Geography code passed to the provider (e.g. `US`).
    pub geo: String,
    pub request_timeout_secs: u64,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8089".to_string(),
            news_base_url: "https://news.google.com/rss/search".to_string(),
            geo: "US".to_string(),
            request_timeout_secs: 25,
        }
    }
}

/// Generation backend selection and sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub backend: BackendKind,
    /// Base URL for the `http` and `queued` backends; ignored by `local`.
    pub base_url: String,
    pub max_length: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// Per-prompt budget: request timeout for `http`, poll deadline for `queued`.
    pub request_timeout_secs: u64,
    /// Poll cadence for the `queued` backend.
    pub poll_interval_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            base_url: "http://localhost:5000".to_string(),
            max_length: 512,
            temperature: 0.7,
            top_p: 0.9,
            request_timeout_secs: 120,
            poll_interval_secs: 2,
        }
    }
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory receiving raw snapshots and generated articles.
    pub output_dir: String,
    /// How many fetched trending topics become the run's keyword set.
    pub top_n: usize,
    /// Interest history window requested from the provider.
    pub timeframe: String,
    /// How many prompts are submitted for generation per run.
    pub generation_cap: usize,
    pub trends: TrendsConfig,
    pub generation: GenerationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            top_n: 5,
            timeframe: "now 7-d".to_string(),
            generation_cap: 3,
            trends: TrendsConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load the config file when a path is given, otherwise start from
    /// defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("no config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!(path, "loaded configuration");
        Ok(config)
    }

    /// Apply CLI flag overrides on top of the loaded values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref output_dir) = cli.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(top_n) = cli.top_n {
            self.top_n = top_n;
        }
        if let Some(ref timeframe) = cli.timeframe {
            self.timeframe = timeframe.clone();
        }
        if let Some(generation_cap) = cli.generation_cap {
            self.generation_cap = generation_cap;
        }
        if let Some(backend) = cli.backend {
            self.generation.backend = backend;
        }
    }

    /// Reject values the rest of the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TIMEFRAME.is_match(&self.timeframe) {
            return Err(ConfigError::InvalidTimeframe(self.timeframe.clone()));
        }
        for url in [
            &self.trends.base_url,
            &self.trends.news_base_url,
            &self.generation.base_url,
        ] {
            Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.generation_cap, 3);
        assert_eq!(config.timeframe, "now 7-d");
        assert_eq!(config.generation.backend, BackendKind::Local);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "top_n: 8\ngeneration:\n  backend: http\n  max_length: 256\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.top_n, 8);
        assert_eq!(config.generation.backend, BackendKind::Http);
        assert_eq!(config.generation.max_length, 256);
        // Untouched sections fall back to defaults.
        assert_eq!(config.generation_cap, 3);
        assert_eq!(config.trends.geo, "US");
    }

    #[test]
    fn test_timeframe_validation() {
        let mut config = PipelineConfig::default();
        for ok in ["now 7-d", "now 1-H", "today 3-m", "today 5-y", "all", "2023-09-01 2023-09-30"] {
            config.timeframe = ok.to_string();
            config.validate().unwrap();
        }
        config.timeframe = "last week".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeframe(_))
        ));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = PipelineConfig::default();
        config.generation.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = PipelineConfig::load(Some("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
