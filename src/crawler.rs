//! Per-category crawl: prompt the model, extract articles, judge the outcome.

use crate::api::AskAsync;
use crate::models::{ArticleRecord, NewsFeed, RawBatch};
use crate::prompt::crawl_prompt;
use crate::utils::{slugify, truncate_for_log};
use chrono::Utc;
use itertools::Itertools;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// How a crawl went, from the reader's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// Every requested article was extracted.
    Succeeded,
    /// Some, but fewer than requested, articles were extracted.
    PartiallySucceeded,
    /// No article came back, or the API call failed.
    Failed,
}

impl CrawlStatus {
    pub fn judge(requested: usize, extracted: usize) -> Self {
        if extracted == 0 {
            CrawlStatus::Failed
        } else if extracted < requested {
            CrawlStatus::PartiallySucceeded
        } else {
            CrawlStatus::Succeeded
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrawlStatus::Succeeded => "crawling succeeded",
            CrawlStatus::PartiallySucceeded => "crawling partially succeeded",
            CrawlStatus::Failed => "crawling failed",
        };
        f.write_str(s)
    }
}

/// Result of crawling one category.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub category: String,
    pub requested: usize,
    pub articles: Vec<ArticleRecord>,
    pub status: CrawlStatus,
}

impl CrawlOutcome {
    /// Build an outcome from extracted articles.
    ///
    /// Articles with a title already seen (case-insensitive) are dropped and
    /// the list is capped at `requested`.
    pub fn from_articles(category: &str, requested: usize, articles: Vec<ArticleRecord>) -> Self {
        let articles: Vec<ArticleRecord> = articles
            .into_iter()
            .unique_by(|a| a.title.to_lowercase())
            .take(requested)
            .collect();
        let status = CrawlStatus::judge(requested, articles.len());
        Self {
            category: category.to_string(),
            requested,
            articles,
            status,
        }
    }

    pub fn failed(category: &str, requested: usize) -> Self {
        Self {
            category: category.to_string(),
            requested,
            articles: Vec::new(),
            status: CrawlStatus::Failed,
        }
    }

    /// e.g. "crawling partially succeeded: 3 of 5 stocks articles"
    pub fn message(&self) -> String {
        format!(
            "{}: {} of {} {} articles",
            self.status,
            self.articles.len(),
            self.requested,
            self.category
        )
    }

    pub fn into_feed(self) -> NewsFeed {
        NewsFeed {
            category: self.category,
            generated_at: Utc::now(),
            articles: self.articles,
        }
    }
}

/// Trim category names and drop blanks and any category whose feed file
/// name (its slug) was already taken by an earlier one.
pub fn unique_categories<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|c| c.as_ref().trim().to_string())
        .filter(|c| !c.is_empty())
        .unique_by(|c| slugify(c))
        .collect()
}

/// Turn an already-fetched raw answer into an outcome.
pub fn process_batch(batch: RawBatch, requested: usize) -> CrawlOutcome {
    let category = batch.category.clone();
    let articles = batch.extract();
    let outcome = CrawlOutcome::from_articles(&category, requested, articles);
    info!(
        category = %outcome.category,
        requested,
        extracted = outcome.articles.len(),
        status = %outcome.status,
        "Processed batch"
    );
    log_articles(&outcome);
    outcome
}

fn log_articles(outcome: &CrawlOutcome) {
    for article in &outcome.articles {
        debug!(
            id = %article.id,
            title = %article.title,
            source = %article.source,
            domain = ?article.source_tag(),
            "Extracted article"
        );
    }
}

/// Ask the model for `requested` articles in `category` and extract them.
///
/// API errors are logged and reported as [`CrawlStatus::Failed`]; they never
/// abort the caller.
#[instrument(level = "info", skip(api))]
pub async fn crawl_category<A>(api: &A, category: &str, requested: usize) -> CrawlOutcome
where
    A: AskAsync<Response = String>,
{
    let t0 = Instant::now();
    let prompt = crawl_prompt(category, requested);

    match api.ask(&prompt).await {
        Ok(raw) => {
            let preview = truncate_for_log(&raw, 300);
            debug!(
                elapsed_ms = t0.elapsed().as_millis(),
                response_preview = %preview,
                "Received crawl response"
            );
            let outcome = process_batch(RawBatch::new(raw, category), requested);
            if outcome.articles.is_empty() {
                warn!(response_preview = %preview, "Model response contained no usable articles");
            }
            outcome
        }
        Err(e) => {
            error!(elapsed_ms = t0.elapsed().as_millis(), error = %e, "Crawl request failed");
            CrawlOutcome::failed(category, requested)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug)]
    struct Canned(Result<String, String>);

    impl AskAsync for Canned {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            assert!(text.contains("---ARTICLE START---"));
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(e.clone().into()),
            }
        }
    }

    fn block(title: &str) -> String {
        format!(
            "---ARTICLE START---\nTITLE: {}\nSUMMARY: Summary of {}\nSOURCE: Mint\n---ARTICLE END---\n",
            title, title
        )
    }

    #[test]
    fn test_unique_categories_collapses_same_slug() {
        let categories = unique_categories(&["Mutual Funds", "mutual-funds", " stocks ", "stocks", "", "IPO"]);
        assert_eq!(categories, vec!["Mutual Funds", "stocks", "IPO"]);
    }

    #[tokio::test]
    async fn test_colliding_categories_crawl_once() {
        use std::cell::Cell;

        #[derive(Debug)]
        struct Counting(Cell<usize>);

        impl AskAsync for Counting {
            type Response = String;

            async fn ask(&self, _text: &str) -> Result<String, Box<dyn Error>> {
                self.0.set(self.0.get() + 1);
                Ok(block("A"))
            }
        }

        let api = Counting(Cell::new(0));
        let mut paths = Vec::new();
        for category in unique_categories(&["Mutual Funds", "mutual-funds"]) {
            let feed = crawl_category(&api, &category, 1).await.into_feed();
            paths.push(crate::outputs::json::feed_path(&feed, "/srv/news"));
        }

        assert_eq!(api.0.get(), 1);
        assert_eq!(paths.len(), 1);
    }

    #[tokio::test]
    async fn test_crawl_matches_saved_batch_processing() {
        let raw = format!(
            "{}{}---ARTICLE START---\nTITLE: x\n---ARTICLE END---",
            block("A"),
            block("a")
        );
        let crawled = crawl_category(&Canned(Ok(raw.clone())), "stocks", 3).await;
        let processed = process_batch(RawBatch::new(raw, "stocks"), 3);

        assert_eq!(crawled.status, processed.status);
        assert_eq!(crawled.message(), processed.message());
        let titles = |o: &CrawlOutcome| o.articles.iter().map(|a| a.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&crawled), titles(&processed));
    }

    #[test]
    fn test_judge() {
        assert_eq!(CrawlStatus::judge(5, 5), CrawlStatus::Succeeded);
        assert_eq!(CrawlStatus::judge(5, 3), CrawlStatus::PartiallySucceeded);
        assert_eq!(CrawlStatus::judge(5, 0), CrawlStatus::Failed);
        assert_eq!(CrawlStatus::judge(0, 0), CrawlStatus::Failed);
    }

    #[tokio::test]
    async fn test_crawl_full_success() {
        let api = Canned(Ok(format!("{}{}", block("A"), block("B"))));
        let outcome = crawl_category(&api, "stocks", 2).await;

        assert_eq!(outcome.status, CrawlStatus::Succeeded);
        assert_eq!(outcome.articles.len(), 2);
        assert!(outcome.articles.iter().all(|a| a.category == "stocks"));
    }

    #[tokio::test]
    async fn test_crawl_partial_success() {
        let api = Canned(Ok(format!(
            "{}---ARTICLE START---\nTITLE: no source\nSUMMARY: x\n---ARTICLE END---",
            block("A")
        )));
        let outcome = crawl_category(&api, "markets", 2).await;

        assert_eq!(outcome.status, CrawlStatus::PartiallySucceeded);
        assert_eq!(outcome.message(), "crawling partially succeeded: 1 of 2 markets articles");
    }

    #[tokio::test]
    async fn test_crawl_caps_at_requested() {
        let api = Canned(Ok(format!("{}{}{}", block("A"), block("B"), block("C"))));
        let outcome = crawl_category(&api, "stocks", 2).await;

        assert_eq!(outcome.articles.len(), 2);
        assert_eq!(outcome.articles[0].title, "A");
        assert_eq!(outcome.articles[1].title, "B");
    }

    #[tokio::test]
    async fn test_crawl_dedupes_titles() {
        let api = Canned(Ok(format!("{}{}{}", block("A"), block("a"), block("B"))));
        let outcome = crawl_category(&api, "stocks", 5).await;

        let titles: Vec<&str> = outcome.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_crawl_api_error_is_failure() {
        let api = Canned(Err("rate limited".to_string()));
        let outcome = crawl_category(&api, "economy", 3).await;

        assert_eq!(outcome.status, CrawlStatus::Failed);
        assert!(outcome.articles.is_empty());
        assert_eq!(outcome.message(), "crawling failed: 0 of 3 economy articles");
    }

    #[tokio::test]
    async fn test_crawl_garbage_response_is_failure() {
        let api = Canned(Ok("I cannot browse the internet.".to_string()));
        let outcome = crawl_category(&api, "economy", 3).await;
        assert_eq!(outcome.status, CrawlStatus::Failed);
    }

    #[test]
    fn test_process_batch() {
        let outcome = process_batch(RawBatch::new(block("Only"), "ipo"), 1);
        assert_eq!(outcome.status, CrawlStatus::Succeeded);

        let feed = outcome.into_feed();
        assert_eq!(feed.category, "ipo");
        assert_eq!(feed.articles.len(), 1);
    }
}
