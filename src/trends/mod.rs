//! Trend data acquisition.
//!
//! [`TrendSource`] is the seam between the pipeline and whatever supplies
//! trending topics, interest series, related queries, and news headlines.
//! The driver is generic over it, so tests swap in canned fakes and the
//! production binary uses [`HttpTrendSource`].
//!
//! Providers are allowed to answer with *empty* data instead of failing;
//! the driver decides which stages treat emptiness as terminal.

use std::collections::{BTreeMap, HashMap};

use crate::error::SourceError;
use crate::models::{KeywordSeries, NewsHeadline, RelatedQuery};

pub mod http;
mod rss;

pub use http::HttpTrendSource;

/// Supplier of trend data for one run.
pub trait TrendSource {
    /// Current top trending topics, most popular first.
    async fn fetch_top_topics(&self) -> Result<Vec<String>, SourceError>;

    /// Interest-over-time series for each keyword over the timeframe.
    async fn fetch_series(
        &self,
        keywords: &[String],
        timeframe: &str,
    ) -> Result<BTreeMap<String, KeywordSeries>, SourceError>;

    /// Related search queries for one keyword. May be empty.
    async fn fetch_related(&self, keyword: &str) -> Result<Vec<RelatedQuery>, SourceError>;

    /// Recent news headlines per keyword. May be empty; individual keyword
    /// failures are the implementation's to tolerate.
    async fn fetch_news(
        &self,
        keywords: &[String],
    ) -> Result<HashMap<String, Vec<NewsHeadline>>, SourceError>;
}
