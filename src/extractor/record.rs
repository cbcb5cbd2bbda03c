//! Record assembly and the validity gate.

use super::fields::ClassifiedFields;
use crate::models::ArticleRecord;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Base of the placeholder link used when an article has no source URL.
pub const PLACEHOLDER_URL_BASE: &str = "https://investorpaisa.com/news";
/// Thumbnail used when an article has no image.
pub const PLACEHOLDER_THUMBNAIL_URL: &str =
    "https://placehold.co/600x400/0f172a/ffffff?text=InvestorPaisa+News";

/// Lowest relevance score handed out.
pub const RELEVANCE_MIN: u8 = 80;
/// Highest relevance score handed out.
pub const RELEVANCE_MAX: u8 = 94;

const ID_SUFFIX_LEN: usize = 9;

/// Build a candidate record from one block's fields.
///
/// Missing required fields become empty strings; [`validate`] decides
/// whether the candidate survives.
pub fn assemble<R: Rng + ?Sized>(
    fields: ClassifiedFields,
    index: usize,
    category: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> ArticleRecord {
    let id = make_id(now, index, rng);
    let summary = fields.summary.unwrap_or_default();

    let url = non_empty(fields.source_url).unwrap_or_else(|| placeholder_url(&id));
    let thumbnail_url =
        non_empty(fields.image_url).unwrap_or_else(|| PLACEHOLDER_THUMBNAIL_URL.to_string());

    ArticleRecord {
        title: fields.title.unwrap_or_default(),
        content: summary.clone(),
        summary,
        url,
        source: fields.source.unwrap_or_default(),
        category: category.to_string(),
        published_at: now,
        thumbnail_url,
        relevance_score: rng.random_range(RELEVANCE_MIN..=RELEVANCE_MAX),
        id,
    }
}

/// Keep the record only if title, summary and source are all non-blank.
pub fn validate(record: ArticleRecord) -> Option<ArticleRecord> {
    let complete = [&record.title, &record.summary, &record.source]
        .iter()
        .all(|v| !v.trim().is_empty());
    complete.then_some(record)
}

/// `{unix_millis}-{index}-{random lowercase alphanumerics}`
pub fn make_id<R: Rng + ?Sized>(now: DateTime<Utc>, index: usize, rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{}-{}", now.timestamp_millis(), index, suffix)
}

pub fn placeholder_url(id: &str) -> String {
    format!("{}/{}", PLACEHOLDER_URL_BASE, id)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
