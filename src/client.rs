//! The Semantic Scholar citation count client.

use crate::enrich::CitationLookup;
use crate::error::{PublistError, Result};
use crate::rate_limit::RateLimiter;
use crate::source::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Default Semantic Scholar Graph API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";

/// Async client for live citation counts from the Semantic Scholar Graph API.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> publist::error::Result<()> {
/// let client = publist::SemanticScholarClient::new(None)?;
/// let count = client
///     .fetch_citation_count("ffdbd7f0b03b85747b001b4734d5ee31b5229aa4")
///     .await?;
/// println!("{} citations", count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SemanticScholarClient {
    pub(crate) http: Client,
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: String,
    pub(crate) rate_limiter: RateLimiter,
}

#[derive(Debug, Deserialize)]
struct CitationCountResponse {
    #[serde(rename = "citationCount")]
    citation_count: Option<u64>,
}

impl SemanticScholarClient {
    /// Create a client, optionally authenticated with an API key.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limiter: RateLimiter::new(1.0),
        })
    }

    /// Create a client using the `SEMANTIC_SCHOLAR_API_KEY` environment variable
    /// if it is set.
    pub fn from_env() -> Result<Self> {
        Self::new(std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok())
    }

    /// Override the base URL (useful for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the rate limit (requests per second).
    pub fn with_rate_limit(mut self, per_second: f64) -> Self {
        self.rate_limiter = RateLimiter::new(per_second);
        self
    }

    /// Fetch the current citation count of one paper.
    pub async fn fetch_citation_count(&self, paper_id: &str) -> Result<u64> {
        let path = format!("/paper/{}", paper_id);
        let body = self.get(&path, &[("fields", "citationCount")]).await?;
        parse_citation_count(&body)
    }

    /// Make a GET request to the API.
    pub(crate) async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        self.rate_limiter.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .get(&url)
            .header("User-Agent", concat!("publist/", env!("CARGO_PKG_VERSION")))
            .query(params);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let result = handle_response(response).await;
        if let Err(PublistError::RateLimited {
            retry_after: Some(wait),
        }) = &result
        {
            self.rate_limiter.pause(*wait).await;
        }
        result
    }
}

impl CitationLookup for SemanticScholarClient {
    fn citation_count<'a>(&'a self, paper_id: &'a str) -> BoxFuture<'a, Result<u64>> {
        Box::pin(self.fetch_citation_count(paper_id))
    }
}

/// Parse a `{"citationCount": n}` response body.
pub fn parse_citation_count(json: &str) -> Result<u64> {
    let response: CitationCountResponse = serde_json::from_str(json)
        .map_err(|e| PublistError::Parse(format!("Invalid citation count response: {}", e)))?;
    response
        .citation_count
        .ok_or_else(|| PublistError::Parse("Response has no citationCount".to_string()))
}

/// Handle the HTTP response, mapping status codes to errors.
pub(crate) async fn handle_response(response: reqwest::Response) -> Result<String> {
    let status = response.status().as_u16();
    if (200..=299).contains(&status) {
        return Ok(response.text().await?);
    }

    let url = response.url().to_string();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &url, retry_after.as_deref(), body))
}

/// Error for a non-2xx response.
pub(crate) fn status_error(
    status: u16,
    url: &str,
    retry_after: Option<&str>,
    body: String,
) -> PublistError {
    match status {
        404 => PublistError::NotFound(url.to_string()),
        429 => PublistError::RateLimited {
            retry_after: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        },
        _ => PublistError::Api {
            status,
            message: body,
        },
    }
}
