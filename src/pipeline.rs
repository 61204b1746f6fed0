//! Run orchestration.
//!
//! [`PipelineDriver`] sequences one run end to end:
//!
//! ```text
//! fetch topics -> fetch series -> fetch related (per keyword, best-effort)
//!   -> fetch news (best-effort) -> persist raw -> aggregate -> build prompts
//!   -> generate (per prompt, best-effort, capped) -> persist artifacts
//! ```
//!
//! Failure policy, in one place so the stages themselves stay simple:
//!
//! - Topics and interest series are load-bearing: a provider failure there is
//!   fatal, and an empty result halts the run at that checkpoint with no
//!   generation attempted.
//! - Related queries, news, raw persistence, individual generation calls, and
//!   artifact writes are best-effort: failures are logged, recorded against
//!   the unit they belong to, and the run continues.
//!
//! The driver is generic over its collaborators, so tests drive it with
//! canned sources and backends.

use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, SourceError};
use crate::generation::{Generate, GenerationParams, generate_with_backoff};
use crate::models::{
    AbortStage, BlogArtifact, KeywordSeries, NewsHeadline, RelatedQuery, RunOutcome, RunReport,
};
use crate::outputs::{artifacts, json};
use crate::trends::TrendSource;
use crate::{prompts, stats};

/// Concurrent in-flight related-query fetches.
const RELATED_CONCURRENCY: usize = 4;

pub const TOPICS_FILE: &str = "trending_topics.json";
pub const TRENDS_FILE: &str = "basic_trends.json";
pub const RELATED_FILE: &str = "related_queries.json";
pub const NEWS_FILE: &str = "news_headlines.json";

pub struct PipelineDriver<S, G> {
    source: S,
    generator: G,
    config: PipelineConfig,
}

impl<S, G> PipelineDriver<S, G>
where
    S: TrendSource,
    G: Generate,
{
    pub fn new(source: S, generator: G, config: PipelineConfig) -> Self {
        Self {
            source,
            generator,
            config,
        }
    }

    /// Execute one full run.
    ///
    /// Returns `Err` only when a load-bearing provider call fails outright;
    /// empty data at a checkpoint is an orderly [`RunOutcome::Aborted`].
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let output_dir = PathBuf::from(&self.config.output_dir);

        // ---- Topics ----
        let topics = self
            .source
            .fetch_top_topics()
            .await
            .map_err(|source| fatal("fetch_topics", source))?;
        if topics.is_empty() {
            return Ok(self.abort(AbortStage::Topics));
        }
        let keywords: Vec<String> = topics.iter().take(self.config.top_n).cloned().collect();
        info!(?keywords, "selected keyword set");

        // ---- Interest series ----
        let series = self
            .source
            .fetch_series(&keywords, &self.config.timeframe)
            .await
            .map_err(|source| fatal("fetch_series", source))?;
        if series.is_empty() {
            return Ok(self.abort(AbortStage::Trends));
        }

        // ---- Related queries (best-effort, per keyword) ----
        let related = self.fetch_related_all(&keywords).await;

        // ---- News headlines (best-effort) ----
        let news = match self.source.fetch_news(&keywords).await {
            Ok(news) => news,
            Err(e) => {
                warn!(error = %e, "news fetch failed; continuing without headlines");
                HashMap::new()
            }
        };

        // ---- Raw snapshots ----
        self.persist_raw(&output_dir, &topics, &series, &related, &news)
            .await;

        // ---- Aggregate ----
        let values: BTreeMap<String, Vec<f64>> = series
            .iter()
            .map(|(keyword, s)| (keyword.clone(), s.values()))
            .collect();
        let keyword_stats = stats::aggregate(&values);
        if keyword_stats.is_empty() {
            return Ok(self.abort(AbortStage::Stats));
        }

        // ---- Prompts ----
        let blog_prompts = prompts::build_prompts(&keyword_stats, &related, &topics, &news);
        if blog_prompts.is_empty() {
            return Ok(self.abort(AbortStage::Prompts));
        }

        // ---- Generate (capped) ----
        let params = GenerationParams::from(&self.config.generation);
        let timeout = self.config.generation.request_timeout();
        let cap = self.config.generation_cap;
        if blog_prompts.len() > cap {
            info!(
                built = blog_prompts.len(),
                cap, "more prompts than the generation cap; extra prompts are skipped"
            );
        }

        let mut run_artifacts = Vec::new();
        let mut generated = 0usize;
        let mut failed = 0usize;

        for (i, prompt) in blog_prompts.iter().take(cap).enumerate() {
            let ordinal = i + 1;
            let path = artifacts::artifact_path(&output_dir, ordinal);
            info!(ordinal, keyword = %prompt.keyword, "generating article");

            match generate_with_backoff(&self.generator, &prompt.text, &params, timeout).await {
                Ok(text) => {
                    if let Err(e) = artifacts::write_artifact(&path, &text).await {
                        error!(error = %e, "failed to persist article; keeping it in the report");
                    }
                    generated += 1;
                    run_artifacts.push(BlogArtifact {
                        keyword: prompt.keyword.clone(),
                        prompt_text: prompt.text.clone(),
                        text: Some(text),
                        path: path.display().to_string(),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(ordinal, keyword = %prompt.keyword, error = %e, "generation failed; continuing");
                    failed += 1;
                    run_artifacts.push(BlogArtifact {
                        keyword: prompt.keyword.clone(),
                        prompt_text: prompt.text.clone(),
                        text: None,
                        path: path.display().to_string(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let report = RunReport {
            keywords,
            prompts_built: blog_prompts.len(),
            generated,
            failed,
            artifacts: run_artifacts,
        };
        info!(
            keywords = report.keywords.len(),
            prompts = report.prompts_built,
            generated = report.generated,
            failed = report.failed,
            "run completed"
        );
        Ok(RunOutcome::Completed(report))
    }

    fn abort(&self, stage: AbortStage) -> RunOutcome {
        warn!(code = stage.code(), reason = %stage, "run aborted");
        RunOutcome::Aborted(stage)
    }

    /// Fetch related queries for every keyword, tolerating individual
    /// failures. A keyword whose fetch fails is recorded with an empty list.
    async fn fetch_related_all(&self, keywords: &[String]) -> HashMap<String, Vec<RelatedQuery>> {
        let source = &self.source;
        stream::iter(keywords.iter().cloned())
            .map(|keyword| async move {
                match source.fetch_related(&keyword).await {
                    Ok(entries) => {
                        if entries.is_empty() {
                            warn!(%keyword, "no related queries found");
                        }
                        (keyword, entries)
                    }
                    Err(e) => {
                        warn!(%keyword, error = %e, "related query fetch failed; continuing");
                        (keyword, Vec::new())
                    }
                }
            })
            .buffer_unordered(RELATED_CONCURRENCY)
            .collect()
            .await
    }

    /// Write the raw snapshot files. Best-effort: each failure is logged and
    /// the run goes on.
    async fn persist_raw(
        &self,
        output_dir: &Path,
        topics: &[String],
        series: &BTreeMap<String, KeywordSeries>,
        related: &HashMap<String, Vec<RelatedQuery>>,
        news: &HashMap<String, Vec<NewsHeadline>>,
    ) {
        if let Err(e) = json::save_json(&output_dir.join(TOPICS_FILE), &topics).await {
            warn!(error = %e, "failed to persist trending topics");
        }
        if let Err(e) = json::save_json(&output_dir.join(TRENDS_FILE), series).await {
            warn!(error = %e, "failed to persist interest series");
        }
        if let Err(e) = json::save_json(&output_dir.join(RELATED_FILE), related).await {
            warn!(error = %e, "failed to persist related queries");
        }
        if let Err(e) = json::save_json(&output_dir.join(NEWS_FILE), news).await {
            warn!(error = %e, "failed to persist news headlines");
        }
    }
}

fn fatal(stage: &'static str, source: SourceError) -> PipelineError {
    error!(stage, error = %source, "trend provider unavailable");
    PipelineError::Source { stage, source }
}
