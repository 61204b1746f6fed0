//! JSON-over-HTTP trends provider client.
//!
//! The provider's scraping internals are not this crate's problem; this is a
//! thin client against a fixed contract:
//!
//! - `GET {base}/trending/top?geo={geo}` → JSON array of topic strings
//! - `GET {base}/interest?keywords={a,b,c}&timeframe={tf}` → JSON object
//!   mapping each keyword to an array of `{timestamp, value}` samples
//! - `GET {base}/related?keyword={kw}` → JSON array of
//!   `{query, value}` entries
//!
//! News headlines come from a separate RSS search feed
//! (`{news_base}?q={kw}&hl=en-US&gl={geo}&ceid={geo}:en`), fetched
//! best-effort per keyword.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{TrendSource, rss};
use crate::config::TrendsConfig;
use crate::error::{ConfigError, SourceError};
use crate::models::{KeywordSeries, NewsHeadline, RelatedQuery, TrendPoint};
use crate::utils::truncate_for_log;

/// Cap on headlines retained per keyword; prompt construction only ever
/// consumes the first few.
const MAX_HEADLINES_PER_KEYWORD: usize = 10;

pub struct HttpTrendSource {
    client: Client,
    base_url: String,
    news_base_url: String,
    geo: String,
}

impl HttpTrendSource {
    pub fn new(config: &TrendsConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("trendpress/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            news_base_url: config.news_base_url.trim_end_matches('/').to_string(),
            geo: config.geo.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!(%url, "trend provider request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: truncate_for_log(&body, 200),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            SourceError::Payload(format!("{e} in body {}", truncate_for_log(&body, 200)))
        })
    }

    async fn fetch_news_for(&self, keyword: &str) -> Result<Vec<NewsHeadline>, SourceError> {
        let url = format!(
            "{}?q={}&hl=en-US&gl={}&ceid={}:en",
            self.news_base_url,
            urlencoding::encode(keyword),
            self.geo,
            self.geo
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: format!("news feed for {keyword:?}"),
            });
        }
        let xml = response.text().await?;
        let mut headlines = rss::parse_headlines(&xml)?;
        headlines.truncate(MAX_HEADLINES_PER_KEYWORD);
        Ok(headlines)
    }
}

impl TrendSource for HttpTrendSource {
    #[instrument(level = "info", skip_all)]
    async fn fetch_top_topics(&self) -> Result<Vec<String>, SourceError> {
        let url = format!(
            "{}/trending/top?geo={}",
            self.base_url,
            urlencoding::encode(&self.geo)
        );
        let topics: Vec<String> = self.get_json(&url).await?;
        info!(count = topics.len(), "fetched trending topics");
        Ok(topics)
    }

    #[instrument(level = "info", skip_all, fields(timeframe = %timeframe))]
    async fn fetch_series(
        &self,
        keywords: &[String],
        timeframe: &str,
    ) -> Result<BTreeMap<String, KeywordSeries>, SourceError> {
        let url = format!(
            "{}/interest?keywords={}&timeframe={}",
            self.base_url,
            urlencoding::encode(&keywords.join(",")),
            urlencoding::encode(timeframe)
        );
        let raw: BTreeMap<String, Vec<TrendPoint>> = self.get_json(&url).await?;

        let series = raw
            .into_iter()
            .map(|(keyword, mut points)| {
                // Downstream relies on ascending timestamps.
                points.sort_by_key(|p| p.timestamp);
                let keyword_series = KeywordSeries {
                    keyword: keyword.clone(),
                    points,
                };
                (keyword, keyword_series)
            })
            .collect::<BTreeMap<_, _>>();

        info!(keywords = series.len(), "fetched interest series");
        Ok(series)
    }

    #[instrument(level = "info", skip_all, fields(keyword = %keyword))]
    async fn fetch_related(&self, keyword: &str) -> Result<Vec<RelatedQuery>, SourceError> {
        let url = format!(
            "{}/related?keyword={}",
            self.base_url,
            urlencoding::encode(keyword)
        );
        let related: Vec<RelatedQuery> = self.get_json(&url).await?;
        info!(count = related.len(), "fetched related queries");
        Ok(related)
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_news(
        &self,
        keywords: &[String],
    ) -> Result<HashMap<String, Vec<NewsHeadline>>, SourceError> {
        let news: HashMap<String, Vec<NewsHeadline>> = stream::iter(keywords.iter().cloned())
            .then(|keyword| async move {
                match self.fetch_news_for(&keyword).await {
                    Ok(headlines) => {
                        debug!(%keyword, count = headlines.len(), "fetched headlines");
                        Some((keyword, headlines))
                    }
                    Err(e) => {
                        warn!(%keyword, error = %e, "headline fetch failed; continuing");
                        None
                    }
                }
            })
            .filter_map(std::future::ready)
            .collect()
            .await;

        info!(keywords = news.len(), "fetched news headlines");
        Ok(news)
    }
}
