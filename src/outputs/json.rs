//! JSON output for the news widget.
//!
//! Each crawled category is written as a [`NewsFeed`] document under a
//! directory named after the feed's UTC generation date. Re-running on the
//! same day replaces that category's file.

use crate::models::NewsFeed;
use crate::utils::slugify;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path a feed is written to: `{json_output_dir}/{YYYY-MM-DD}/{category-slug}.json`.
pub fn feed_path(feed: &NewsFeed, json_output_dir: &str) -> PathBuf {
    let date = feed.generated_at.date_naive().to_string();
    let mut name = slugify(&feed.category);
    if name.is_empty() {
        name = "uncategorized".to_string();
    }
    PathBuf::from(json_output_dir)
        .join(date)
        .join(format!("{}.json", name))
}

/// Write a [`NewsFeed`] as pretty-printed JSON.
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, category = %feed.category))]
pub async fn write_feed(feed: &NewsFeed, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(feed)?;
    let path = feed_path(feed, json_output_dir);

    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = feed.articles.len(), "Wrote news feed");
    Ok(path)
}
