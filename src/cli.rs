//! Command-line interface definitions for the news crawler.
//!
//! All arguments can be provided via command-line flags; secrets can also
//! come from environment variables.

use clap::Parser;

/// Command-line arguments for the news crawler.
///
/// # Examples
///
/// ```sh
/// # Crawl the default categories
/// paisa_news -j ./json --config ./config.yaml
///
/// # Ten articles each for two categories
/// paisa_news -j ./json -k "stocks,mutual funds" -n 10
///
/// # Re-run extraction over a saved model response, no API call
/// paisa_news -j ./json -k markets -i ./response.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSON feeds
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Comma-separated news categories to crawl
    #[arg(
        short = 'k',
        long,
        value_delimiter = ',',
        default_value = "stocks,markets,economy"
    )]
    pub categories: Vec<String>,

    /// Articles requested per category
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,

    /// Extract from a saved raw model response instead of calling the API
    /// (uses the first category only)
    #[arg(short, long)]
    pub input: Option<String>,

    /// API key, overrides the one in the config file
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Number of categories crawled concurrently
    #[arg(long, default_value_t = 4)]
    pub parallel: usize,
}
