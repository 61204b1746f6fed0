//! Blog prompt construction.
//!
//! One prompt per keyword that survived aggregation. Each prompt folds the
//! keyword's statistics, up to five related topics, and up to three recent
//! headlines into a single editorial instruction for the generation backend.
//! A keyword that cannot be composed is logged and skipped; it never takes
//! the rest of the batch down with it.

use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{BlogPrompt, KeywordStats, NewsHeadline, RelatedQuery};
use crate::utils::normalize_ws;

/// Maximum related-topic strings folded into one prompt.
const MAX_TOPICS: usize = 5;
/// Maximum headlines folded into one prompt.
const MAX_HEADLINES: usize = 3;

#[derive(Debug, Error)]
enum PromptError {
    #[error("keyword is blank")]
    BlankKeyword,
}

/// Build one prompt per keyword in `stats`, in key order.
///
/// Related queries with missing or blank text are dropped; when none remain
/// for a keyword, the fallback is up to [`MAX_TOPICS`] trending topics
/// excluding that keyword itself. Headlines with blank titles are dropped.
/// A keyword with no usable related or headline data still yields a valid
/// prompt whose topics clause is empty.
pub fn build_prompts(
    stats: &BTreeMap<String, KeywordStats>,
    related: &HashMap<String, Vec<RelatedQuery>>,
    trending_topics: &[String],
    news: &HashMap<String, Vec<NewsHeadline>>,
) -> Vec<BlogPrompt> {
    let mut prompts = Vec::with_capacity(stats.len());

    for (keyword, keyword_stats) in stats {
        let related_entries = related.get(keyword).map(Vec::as_slice).unwrap_or(&[]);
        let headlines = news.get(keyword).map(Vec::as_slice).unwrap_or(&[]);

        match compose(keyword, keyword_stats, related_entries, trending_topics, headlines) {
            Ok(prompt) => prompts.push(prompt),
            Err(e) => {
                warn!(%keyword, error = %e, "skipping keyword during prompt construction");
                continue;
            }
        }
    }

    info!(count = prompts.len(), "built blog prompts");
    prompts
}

fn compose(
    keyword: &str,
    stats: &KeywordStats,
    related: &[RelatedQuery],
    trending_topics: &[String],
    headlines: &[NewsHeadline],
) -> Result<BlogPrompt, PromptError> {
    if keyword.trim().is_empty() {
        return Err(PromptError::BlankKeyword);
    }

    let mut topics: Vec<String> = related
        .iter()
        .filter_map(|q| q.query.as_deref())
        .map(normalize_ws)
        .filter(|s| !s.is_empty())
        .unique()
        .take(MAX_TOPICS)
        .collect();

    if topics.is_empty() {
        // Fall back to the other trending topics of the run.
        topics = trending_topics
            .iter()
            .filter(|t| t.as_str() != keyword)
            .map(|t| normalize_ws(t))
            .filter(|s| !s.is_empty())
            .unique()
            .take(MAX_TOPICS)
            .collect();
    }
    let topics_clause = topics.join(", ");

    let headlines_clause = headlines
        .iter()
        .filter(|h| !h.title.trim().is_empty())
        .take(MAX_HEADLINES)
        .map(|h| match h.source.as_deref() {
            Some(source) if !source.trim().is_empty() => {
                format!("{} ({})", normalize_ws(&h.title), source.trim())
            }
            _ => normalize_ws(&h.title),
        })
        .join("; ");

    let mut text = format!(
        "Write a detailed and engaging article about '{keyword}', focusing on its significance \
         and recent developments. Search interest averaged {average} over the period \
         (low {min}, high {max}) with a growth rate of {growth_rate}%. Include insights into \
         how this topic is impacting society and any important events associated with it. \
         Also, discuss related topics such as {topics_clause}. Provide valuable information \
         for readers looking to stay updated.",
        average = stats.average,
        min = stats.min,
        max = stats.max,
        growth_rate = stats.growth_rate,
    );

    if !headlines_clause.is_empty() {
        text.push_str(&format!(" Recent headlines: {headlines_clause}."));
    }

    Ok(BlogPrompt {
        keyword: keyword.to_string(),
        text,
    })
}
