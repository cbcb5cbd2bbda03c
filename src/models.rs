//! Data models for raw LLM batches and the article records extracted from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawBatch`]: The free-text answer of one crawl request, tagged with its category
//! - [`ArticleRecord`]: A normalized article ready for persistence
//! - [`NewsFeed`]: The persisted collection of records for one category
//!
//! Records serialize with snake_case keys (`published_at`, `thumbnail_url`,
//! `relevance_score`) to match the news table the widget reads from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The unstructured text returned by a single crawl request.
///
/// The category is supplied by the caller that issued the request; it is
/// never parsed out of the text itself.
#[derive(Debug, Clone)]
pub struct RawBatch {
    /// The model's free-text answer.
    pub content: String,
    /// The news category the articles were requested for.
    pub category: String,
}

impl RawBatch {
    pub fn new(content: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            category: category.into(),
        }
    }

    /// Consume the batch and extract every valid article from it.
    pub fn extract(self) -> Vec<ArticleRecord> {
        crate::extractor::extract_articles(&self.content, &self.category)
    }
}

/// A normalized news article.
///
/// # Field Rules
///
/// * `title`, `summary` and `source` are always non-empty
/// * `content` mirrors `summary` for batch-extracted articles
/// * `url` falls back to a placeholder embedding `id` when no source URL was given
/// * `thumbnail_url` falls back to a generic placeholder image
/// * `relevance_score` is synthetic and lies in `80..=94`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Synthetic identifier: `{unix_millis}-{block_index}-{random suffix}`.
    pub id: String,
    /// The article headline.
    pub title: String,
    /// A short summary of the article.
    pub summary: String,
    /// The article body.
    pub content: String,
    /// Link to the original article, or a placeholder.
    pub url: String,
    /// The publication the article came from.
    pub source: String,
    /// The category the article was requested under.
    pub category: String,
    /// Extraction time.
    pub published_at: DateTime<Utc>,
    /// Thumbnail image, or a generic placeholder.
    pub thumbnail_url: String,
    /// Synthetic ranking score.
    pub relevance_score: u8,
}

impl ArticleRecord {
    /// Extract the domain name (before .com/.in/etc) from the article URL.
    ///
    /// For example: "https://www.livemint.com/markets/story" -> "livemint"
    pub fn source_tag(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string())
        } else {
            None
        }
    }
}

/// The persisted set of articles for one category and crawl run.
#[derive(Debug, Deserialize, Serialize)]
pub struct NewsFeed {
    /// The category every article in this feed was requested under.
    pub category: String,
    /// When the feed was produced.
    pub generated_at: DateTime<Utc>,
    /// The extracted articles, in the order the model returned them.
    pub articles: Vec<ArticleRecord>,
}
