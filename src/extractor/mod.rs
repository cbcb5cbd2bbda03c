//! Batch article extraction from free-text LLM answers.
//!
//! The crawl prompt asks the model to emit each article between sentinel
//! markers, one field per line:
//!
//! ```text
//! ---ARTICLE START---
//! TITLE: Sensex closes at record high
//! SUMMARY: Benchmarks rallied on strong FII inflows.
//! IMAGE_URL: https://example.com/image.jpg
//! SOURCE_URL: https://example.com/story
//! SOURCE: Mint
//! ---ARTICLE END---
//! ```
//!
//! # Pipeline
//!
//! 1. [`blocks::split_blocks`] cuts the text into sentinel-delimited blocks
//! 2. [`blocks::tokenize_lines`] turns each block into trimmed lines
//! 3. [`fields::ClassifiedFields::collect`] classifies lines by prefix
//! 4. [`record::assemble`] builds a candidate record with fallbacks
//! 5. [`record::validate`] drops candidates missing title, summary or source
//!
//! The model's answer is untrusted text. Extraction never fails: malformed
//! blocks simply contribute no record, and the extractor holds no shared
//! state, so it can be called concurrently from any number of crawls.

pub mod blocks;
pub mod fields;
pub mod record;

use crate::models::ArticleRecord;
use chrono::{DateTime, Utc};
use fields::ClassifiedFields;
use rand::Rng;
use tracing::debug;

/// Extract every valid article from `raw_text`, tagging each with `category`.
///
/// Ids, timestamps and relevance scores use the current time and the
/// thread-local RNG.
pub fn extract_articles(raw_text: &str, category: &str) -> Vec<ArticleRecord> {
    extract_articles_with(raw_text, category, Utc::now(), &mut rand::rng())
}

/// Same as [`extract_articles`] with an explicit clock reading and RNG.
pub fn extract_articles_with<R: Rng + ?Sized>(
    raw_text: &str,
    category: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<ArticleRecord> {
    let blocks = blocks::split_blocks(raw_text);
    let total = blocks.len();

    let records: Vec<ArticleRecord> = blocks
        .into_iter()
        .enumerate()
        .filter_map(|(index, block)| {
            let fields = ClassifiedFields::collect(blocks::tokenize_lines(block));
            let candidate = record::assemble(fields, index, category, now, rng);
            let kept = record::validate(candidate);
            if kept.is_none() {
                debug!(index, %category, "Dropping block missing title, summary or source");
            }
            kept
        })
        .collect();

    debug!(%category, blocks = total, extracted = records.len(), "Extracted articles");
    records
}
