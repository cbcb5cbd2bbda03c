//! LLM API interaction with exponential backoff retry logic.
//!
//! This module talks to an OpenAI-compatible chat-completions endpoint and
//! adds automatic retry with exponential backoff and jitter on top.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`ChatClient`]: `reqwest` client for `POST {api_base}/chat/completions`
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::config::CrawlerConfig;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Trait for async LLM interaction.
///
/// Implementors of this trait can send text to an LLM and receive a response.
/// This abstraction allows for different LLM backends or decorators (like retry logic).
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper around an existing [`AskAsync`] implementation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = ChatClient::new(config)?;
    /// let retry_client = RetryAsk::new(client, 5, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    /// 5 retries starting at one second.
    pub fn with_defaults(inner: T) -> Self {
        Self::new(inner, 5, StdDuration::from_secs(1))
    }
}

impl<T> RetryAsk<T> {
    /// Delay before retry number `attempt` (1-based), without jitter.
    fn backoff_delay(&self, attempt: usize) -> StdDuration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay)
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff_delay(attempt);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Each [`AskAsync::ask`] sends the text as a single user message and
/// returns the first choice's content.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: CrawlerConfig,
}

impl ChatClient {
    pub fn new(config: CrawlerConfig) -> Result<Self, Box<dyn Error>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

impl AskAsync for ChatClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.config.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: text,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut request = self.http.post(self.endpoint()).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let res: Result<String, Box<dyn Error>> = async {
            let response: ChatResponse = request
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            first_choice_content(response)
        }
        .await;
        let dt = t0.elapsed();

        match &res {
            Ok(content) => debug!(elapsed_ms = dt.as_millis(), bytes = content.len(), "API call succeeded"),
            Err(e) => warn!(elapsed_ms = dt.as_millis(), error = %e, "API call failed"),
        }
        res
    }
}

fn first_choice_content(response: ChatResponse) -> Result<String, Box<dyn Error>> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| "chat completion returned no content".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Flaky {
        failures: usize,
        calls: Cell<usize>,
    }

    impl AskAsync for Flaky {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n < self.failures {
                Err(format!("transient failure {}", n).into())
            } else {
                Ok(format!("echo: {}", text))
            }
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let api = RetryAsk::new(
            Flaky { failures: 2, calls: Cell::new(0) },
            5,
            StdDuration::from_millis(1),
        );
        let res = api.ask("hello").await.unwrap();
        assert_eq!(res, "echo: hello");
        assert_eq!(api.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let api = RetryAsk::new(
            Flaky { failures: usize::MAX, calls: Cell::new(0) },
            2,
            StdDuration::from_millis(1),
        );
        let err = api.ask("hello").await.unwrap_err();
        assert!(err.to_string().contains("transient failure 2"));
        assert_eq!(api.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_success() {
        let api = RetryAsk::with_defaults(Flaky { failures: 0, calls: Cell::new(0) });
        api.ask("x").await.unwrap();
        assert_eq!(api.inner.calls.get(), 1);
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let api = RetryAsk::with_defaults(Flaky { failures: 0, calls: Cell::new(0) });
        assert_eq!(api.backoff_delay(1), StdDuration::from_secs(1));
        assert_eq!(api.backoff_delay(2), StdDuration::from_secs(2));
        assert_eq!(api.backoff_delay(5), StdDuration::from_secs(16));
        assert_eq!(api.backoff_delay(6), StdDuration::from_secs(30));
    }

    #[test]
    fn test_backoff_large_attempt_does_not_overflow() {
        let api = RetryAsk::new(
            Flaky { failures: 0, calls: Cell::new(0) },
            100,
            StdDuration::from_secs(1),
        );
        assert_eq!(api.backoff_delay(33), StdDuration::from_secs(30));
        assert_eq!(api.backoff_delay(100), StdDuration::from_secs(30));
        assert_eq!(api.backoff_delay(usize::MAX), StdDuration::from_secs(30));
    }

    #[test]
    fn test_retry_debug_hides_inner() {
        let api = RetryAsk::with_defaults(Flaky { failures: 0, calls: Cell::new(0) });
        let dbg = format!("{:?}", api);
        assert!(dbg.contains("max_retries: 5"));
        assert!(!dbg.contains("Flaky"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = CrawlerConfig {
            api_base: "http://localhost:1234/v1/".to_string(),
            ..Default::default()
        };
        let client = ChatClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage { role: "user", content: "hi" }],
            temperature: 0.5,
            max_tokens: 100,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["max_tokens"], 100);
    }

    #[test]
    fn test_first_choice_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"---ARTICLE START---"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(response).unwrap(), "---ARTICLE START---");
    }

    #[test]
    fn test_first_choice_content_missing() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice_content(response).is_err());

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(first_choice_content(response).is_err());
    }
}
