//! Data models for trend data and its processed representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`TrendPoint`] / [`KeywordSeries`]: raw interest-over-time samples per keyword
//! - [`KeywordStats`]: descriptive statistics derived from one series
//! - [`RelatedQuery`] / [`NewsHeadline`]: auxiliary context supplied per keyword
//! - [`BlogPrompt`]: the generation instruction built for one keyword
//! - [`BlogArtifact`] / [`RunReport`] / [`RunOutcome`]: what one run produced
//!
//! Everything here is plain data. Each run builds these values fresh and
//! discards them once artifacts are on disk; no state survives across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single interest sample for a keyword.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrendPoint {
    /// When the sample was taken. Serialized as an RFC 3339 string.
    pub timestamp: DateTime<Utc>,
    /// Interest value at that time (providers typically scale 0-100).
    pub value: f64,
}

/// The interest-over-time series for one keyword.
///
/// Points are ordered ascending by timestamp; [`crate::trends::HttpTrendSource`]
/// sorts on ingest so downstream code can rely on it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordSeries {
    pub keyword: String,
    pub points: Vec<TrendPoint>,
}

impl KeywordSeries {
    /// The numeric value sequence, in timestamp order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Descriptive statistics for one keyword's series.
///
/// `average` and `growth_rate` are rounded to two decimals; `min` and `max`
/// are exact sample values. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeywordStats {
    pub keyword: String,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Percentage change from the first to the last sample; `0.0` when the
    /// first sample is zero.
    pub growth_rate: f64,
}

/// A related search query supplied by the trends provider.
///
/// Provider entries are occasionally incomplete, so both fields are optional
/// and consumers must tolerate either being absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelatedQuery {
    #[serde(default)]
    pub query: Option<String>,
    /// Relative relevance score, when the provider reports one.
    #[serde(default)]
    pub value: Option<i64>,
}

/// A news headline associated with a keyword.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsHeadline {
    pub title: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The generation instruction built for one keyword. Immutable once built and
/// consumed exactly once by the generation backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlogPrompt {
    pub keyword: String,
    pub text: String,
}

/// The outcome of one prompt's generation attempt.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlogArtifact {
    pub keyword: String,
    pub prompt_text: String,
    /// Generated article text; `None` when the attempt failed.
    pub text: Option<String>,
    /// Target file path, derived from the artifact's ordinal in the run.
    pub path: String,
    /// Failure description when `text` is `None`.
    pub error: Option<String>,
}

impl BlogArtifact {
    pub fn succeeded(&self) -> bool {
        self.text.is_some()
    }
}

/// Summary of a run that reached the generation stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunReport {
    pub keywords: Vec<String>,
    pub prompts_built: usize,
    pub generated: usize,
    pub failed: usize,
    pub artifacts: Vec<BlogArtifact>,
}

/// The terminal checkpoint at which a run halted for lack of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortStage {
    Topics,
    Trends,
    Stats,
    Prompts,
}

impl AbortStage {
    /// Stable machine-readable code, used in the final summary event.
    pub fn code(&self) -> &'static str {
        match self {
            AbortStage::Topics => "aborted_no_topics",
            AbortStage::Trends => "aborted_no_trends",
            AbortStage::Stats => "aborted_no_stats",
            AbortStage::Prompts => "aborted_no_prompts",
        }
    }
}

impl std::fmt::Display for AbortStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            AbortStage::Topics => "no trending topics fetched",
            AbortStage::Trends => "no interest data fetched",
            AbortStage::Stats => "no statistics could be computed",
            AbortStage::Prompts => "no prompts could be built",
        };
        write!(f, "{reason}")
    }
}

/// How a run ended: either it reached generation, or it halted at one of the
/// four empty-data checkpoints.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunReport),
    Aborted(AbortStage),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(secs: i64, value: f64) -> TrendPoint {
        TrendPoint {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            value,
        }
    }

    #[test]
    fn test_series_values_in_order() {
        let series = KeywordSeries {
            keyword: "ai".to_string(),
            points: vec![point(0, 10.0), point(60, 20.0), point(120, 15.0)],
        };
        assert_eq!(series.values(), vec![10.0, 20.0, 15.0]);
        assert!(!series.is_empty());
    }

    #[test]
    fn test_trend_point_timestamp_round_trip() {
        let p = point(1_700_000_000, 42.0);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("2023-11-14T22:13:20Z"));
        let back: TrendPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_related_query_tolerates_missing_fields() {
        let q: RelatedQuery = serde_json::from_str("{}").unwrap();
        assert!(q.query.is_none());
        assert!(q.value.is_none());

        let q: RelatedQuery = serde_json::from_str(r#"{"query": "ai news"}"#).unwrap();
        assert_eq!(q.query.as_deref(), Some("ai news"));
    }

    #[test]
    fn test_headline_tolerates_missing_source() {
        let h: NewsHeadline = serde_json::from_str(r#"{"title": "Something happened"}"#).unwrap();
        assert_eq!(h.title, "Something happened");
        assert!(h.source.is_none());
    }

    #[test]
    fn test_artifact_succeeded() {
        let ok = BlogArtifact {
            keyword: "ai".to_string(),
            prompt_text: "write".to_string(),
            text: Some("article".to_string()),
            path: "output/blog_1.txt".to_string(),
            error: None,
        };
        assert!(ok.succeeded());

        let failed = BlogArtifact {
            text: None,
            error: Some("timed out".to_string()),
            ..ok.clone()
        };
        assert!(!failed.succeeded());
    }

    #[test]
    fn test_abort_stage_codes() {
        assert_eq!(AbortStage::Topics.code(), "aborted_no_topics");
        assert_eq!(AbortStage::Prompts.code(), "aborted_no_prompts");
        assert_eq!(AbortStage::Trends.to_string(), "no interest data fetched");
    }
}
