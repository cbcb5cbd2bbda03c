//! LLM endpoint configuration.
//!
//! Loaded from an optional YAML file:
//!
//! ```yaml
//! api_base: "https://api.openai.com/v1"
//! api_key: "sk-..."
//! model: "gpt-4o-mini"
//! temperature: 0.4
//! max_tokens: 2048
//! timeout_secs: 60
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base URL of an OpenAI-compatible API, without the trailing `/chat/completions`.
    pub api_base: String,
    /// Bearer token; may be left empty for local servers.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.4,
            max_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load the configuration file at `path`.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let yaml = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(model = %config.model, api_base = %config.api_base, "Loaded configuration");
        Ok(config)
    }
}
