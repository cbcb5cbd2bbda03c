//! # paisa_news
//!
//! The market-news crawler behind the InvestorPaisa news widget. It asks an
//! OpenAI-compatible LLM for recent articles per category, extracts the
//! sentinel-delimited answer into structured records, and writes one JSON
//! feed per category.
//!
//! ## Usage
//!
//! ```sh
//! paisa_news -j ./json -c ./config.yaml -k stocks,markets -n 5
//! ```
//!
//! ## Architecture
//!
//! 1. **Prompting**: Build a crawl prompt per category ([`prompt`])
//! 2. **Asking**: Call the LLM with retry and backoff ([`api`])
//! 3. **Extraction**: Parse the free-text answer into records ([`extractor`])
//! 4. **Output**: Write JSON feeds and report crawl status ([`outputs`], [`crawler`])

use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod crawler;
mod extractor;
mod models;
mod outputs;
mod prompt;
mod utils;

use api::{ChatClient, RetryAsk};
use cli::Cli;
use config::CrawlerConfig;
use crawler::{CrawlOutcome, CrawlStatus, crawl_category, process_batch, unique_categories};
use models::RawBatch;
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("paisa_news starting up");

    let args = Cli::parse();
    debug!(?args.json_output_dir, ?args.categories, count = args.count, "Parsed CLI arguments");

    // Early check: ensure JSON output dir is writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let categories = unique_categories(args.categories.as_slice());
    if categories.len() < args.categories.len() {
        warn!(
            given = args.categories.len(),
            kept = categories.len(),
            "Dropped blank or duplicate categories (same feed file name)"
        );
    }
    if categories.is_empty() {
        return Err("no categories to crawl".into());
    }

    let outcomes = match &args.input {
        Some(path) => vec![extract_saved_response(path, &categories[0], args.count).await?],
        None => crawl_all(&args, &categories).await?,
    };

    // ---- Output ----
    let mut written = 0usize;
    let mut summary = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let message = outcome.message();
        match outcome.status {
            CrawlStatus::Succeeded => info!(category = %outcome.category, "{}", message),
            CrawlStatus::PartiallySucceeded => warn!(category = %outcome.category, "{}", message),
            CrawlStatus::Failed => error!(category = %outcome.category, "{}", message),
        }
        summary.push((outcome.status, outcome.articles.len()));

        if outcome.articles.is_empty() {
            continue;
        }
        let feed = outcome.into_feed();
        match json::write_feed(&feed, &args.json_output_dir).await {
            Ok(_) => written += 1,
            Err(e) => error!(category = %feed.category, error = %e, "Failed to write feed"),
        }
    }

    let total_articles: usize = summary.iter().map(|(_, n)| n).sum();
    let failed = summary
        .iter()
        .filter(|(s, _)| *s == CrawlStatus::Failed)
        .count();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        categories = summary.len(),
        failed,
        feeds_written = written,
        articles = total_articles,
        "Execution complete"
    );

    Ok(())
}

/// Crawl every category through the configured LLM, a few at a time.
#[instrument(level = "info", skip_all, fields(categories = categories.len()))]
async fn crawl_all(args: &Cli, categories: &[String]) -> Result<Vec<CrawlOutcome>, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => CrawlerConfig::load(path).await?,
        None => {
            info!("No config file given; using defaults");
            CrawlerConfig::default()
        }
    };
    if let Some(key) = &args.api_key {
        config.api_key = key.clone();
    }
    if config.api_key.is_empty() {
        warn!(api_base = %config.api_base, "No API key configured; requests are sent unauthenticated");
    }

    let api = RetryAsk::with_defaults(ChatClient::new(config)?);
    let parallel = args.parallel.max(1);
    info!(parallel, count = args.count, "Starting category crawl");

    let outcomes: Vec<CrawlOutcome> = stream::iter(categories.iter())
        .map(|category| crawl_category(&api, category, args.count))
        .buffer_unordered(parallel)
        .collect()
        .await;

    Ok(outcomes)
}

/// Run extraction over a model response saved to disk.
#[instrument(level = "info")]
async fn extract_saved_response(
    path: &str,
    category: &str,
    count: usize,
) -> Result<CrawlOutcome, Box<dyn Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    info!(bytes = content.len(), "Read saved response");
    Ok(process_batch(RawBatch::new(content, category), count))
}
