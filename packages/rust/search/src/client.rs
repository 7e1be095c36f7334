//! Job search API client.
//!
//! Issues a single GET per run against the configured search endpoint. Every
//! failure is reported as a typed error; deciding whether to carry on with an
//! empty result is the pipeline's job.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};

use jobfeed_shared::{Credentials, JobFeedError, JobListing, Result, SearchConfig, SearchResponse};

/// Maximum response size we accept (10 MB).
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// User-Agent string for API requests.
pub(crate) const USER_AGENT: &str = concat!("jobfeed/", env!("CARGO_PKG_VERSION"));

const API_KEY_HEADER: &str = "X-RapidAPI-Key";
const API_HOST_HEADER: &str = "X-RapidAPI-Host";

// ---------------------------------------------------------------------------
// JobSearchClient
// ---------------------------------------------------------------------------

/// Client for the job search API.
pub struct JobSearchClient {
    config: SearchConfig,
    credentials: Credentials,
    client: Client,
}

impl JobSearchClient {
    /// Create a client. Credentials must already have been resolved.
    pub fn new(config: SearchConfig, credentials: Credentials) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self {
            config,
            credentials,
            client,
        })
    }

    /// Query parameters sent with every search.
    fn query_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", query.to_string()),
            ("page", self.config.page.to_string()),
            ("num_pages", self.config.num_pages.to_string()),
        ];
        if let Some(window) = self.config.date_posted {
            params.push(("date_posted", window.as_str().to_string()));
        }
        params
    }

    /// Run one search and return the listings in API order.
    #[instrument(skip_all, fields(endpoint = %self.config.endpoint))]
    pub async fn search(&self, query: &str) -> Result<Vec<JobListing>> {
        info!(
            query,
            num_pages = self.config.num_pages,
            date_posted = ?self.config.date_posted,
            "searching job listings"
        );

        let response = self
            .client
            .get(self.config.endpoint.clone())
            .query(&self.query_params(query))
            .header(API_KEY_HEADER, self.credentials.api_key())
            .header(API_HOST_HEADER, &self.config.api_host)
            .send()
            .await
            .map_err(|e| JobFeedError::Network(format!("{}: {e}", self.config.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobFeedError::upstream(status.as_u16(), &body));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(JobFeedError::parse(format!(
                    "response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| JobFeedError::Network(format!("failed to read body: {e}")))?;

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| JobFeedError::parse(format!("invalid search response: {e}")))?;

        debug!(status = ?parsed.status, "search response decoded");
        let listings = parsed.into_listings();
        info!(count = listings.len(), "search returned listings");

        Ok(listings)
    }
}

/// Build a reqwest client with the shared user agent and the given timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| JobFeedError::Network(format!("failed to build HTTP client: {e}")))
}
