//! Public job-board source.
//!
//! Fetches a list of JSON job boards one after another, maps their loosely
//! shaped payloads onto [`JobListing`], and aggregates the matches. A board
//! that fails contributes nothing; the remaining boards are still fetched.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument, warn};

use jobfeed_shared::{ApplyOption, BoardSource, BoardsConfig, JobFeedError, JobListing, Result};

use crate::client::build_client;

/// Object keys that may hold the listing array.
const LIST_KEYS: &[&str] = &["jobs", "data", "postings", "job_postings"];
const TITLE_KEYS: &[&str] = &["position", "title", "name"];
const LINK_KEYS: &[&str] = &["apply_url", "absolute_url", "url"];

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome for a single board.
#[derive(Debug, Clone)]
pub struct BoardReport {
    /// Board display name.
    pub name: String,
    /// Listings the board returned, before filter and limit.
    pub fetched: usize,
    /// Listings kept from this board (after filter and limit).
    pub matched: usize,
    /// Why the board contributed nothing, if it failed.
    pub error: Option<String>,
}

/// Aggregated outcome of a boards run.
#[derive(Debug, Clone, Default)]
pub struct BoardsResult {
    /// Deduplicated listings, in board order.
    pub listings: Vec<JobListing>,
    /// One report per configured board.
    pub reports: Vec<BoardReport>,
}

// ---------------------------------------------------------------------------
// BoardFetcher
// ---------------------------------------------------------------------------

/// Sequential fetcher for the configured job boards.
pub struct BoardFetcher {
    config: BoardsConfig,
    client: Client,
}

impl BoardFetcher {
    /// Create a fetcher with the boards' own timeout.
    pub fn new(config: BoardsConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// Fetch every board, keep the listings accepted by `keep`, cap each board
    /// at `per_source_limit`, and deduplicate the aggregate.
    #[instrument(skip_all, fields(boards = self.config.sources.len()))]
    pub async fn fetch_all(&self, keep: impl Fn(&JobListing) -> bool) -> BoardsResult {
        let mut listings = Vec::new();
        let mut reports = Vec::with_capacity(self.config.sources.len());

        for (i, source) in self.config.sources.iter().enumerate() {
            if i > 0 && self.config.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
            }

            match self.fetch_board(source).await {
                Ok(found) => {
                    let fetched = found.len();
                    let kept: Vec<JobListing> = found
                        .into_iter()
                        .filter(|job| keep(job))
                        .take(self.config.per_source_limit)
                        .collect();
                    info!(board = %source.name, fetched, matched = kept.len(), "board fetched");
                    reports.push(BoardReport {
                        name: source.name.clone(),
                        fetched,
                        matched: kept.len(),
                        error: None,
                    });
                    listings.extend(kept);
                }
                Err(e) => {
                    warn!(board = %source.name, error = %e, "board failed, skipping");
                    reports.push(BoardReport {
                        name: source.name.clone(),
                        fetched: 0,
                        matched: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        BoardsResult {
            listings: dedupe_listings(listings),
            reports,
        }
    }

    async fn fetch_board(&self, source: &BoardSource) -> Result<Vec<JobListing>> {
        let response = self
            .client
            .get(source.url.clone())
            .send()
            .await
            .map_err(|e| JobFeedError::Network(format!("{}: {e}", source.url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobFeedError::upstream(status.as_u16(), &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| JobFeedError::Network(format!("{}: body read failed: {e}", source.url)))?;

        parse_board_payload(&body, source)
    }
}

// ---------------------------------------------------------------------------
// Payload mapping
// ---------------------------------------------------------------------------

/// Map a board's JSON payload onto listings.
///
/// Accepts a top-level array or an object holding the array under one of
/// [`LIST_KEYS`]. Items that are not objects are skipped; anything else
/// without a usable list yields no listings.
pub fn parse_board_payload(body: &str, source: &BoardSource) -> Result<Vec<JobListing>> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| JobFeedError::parse(format!("{}: invalid JSON: {e}", source.name)))?;

    let items = match &json {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => LIST_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    Ok(items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| board_item_to_listing(item, source))
        .collect())
}

fn board_item_to_listing(item: &Value, source: &BoardSource) -> JobListing {
    JobListing {
        // Company is always the board name.
        employer_name: Some(source.name.clone()),
        employer_website: None,
        job_title: first_str(item, TITLE_KEYS),
        job_location: board_location(item.get("location")),
        job_city: None,
        job_state: None,
        job_country: None,
        job_apply_link: first_str(item, LINK_KEYS),
        job_google_link: None,
        // The board page itself is the last-resort link.
        apply_options: Some(vec![ApplyOption {
            publisher: Some(source.name.clone()),
            apply_link: Some(source.url.to_string()),
        }]),
    }
}

/// A location is either a plain string or an object with `city`/`name` and `country`.
fn board_location(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_blank(s),
        obj @ Value::Object(_) => {
            let base = first_str(obj, &["city", "name"]);
            let country = first_str(obj, &["country"]);
            match (base, country) {
                (Some(base), Some(country)) => Some(format!("{base}, {country}")),
                (Some(one), None) | (None, Some(one)) => Some(one),
                (None, None) => None,
            }
        }
        _ => None,
    }
}

fn first_str(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str).and_then(non_blank))
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Drop listings whose `(title, company)` pair was already seen, keeping the first.
pub fn dedupe_listings(listings: Vec<JobListing>) -> Vec<JobListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|job| {
            let key = (
                job.title().unwrap_or_default().to_string(),
                job.company().unwrap_or_default().to_string(),
            );
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(name: &str, url: &str) -> BoardSource {
        BoardSource {
            name: name.into(),
            url: Url::parse(url).unwrap(),
        }
    }

    fn writer_titles(job: &JobListing) -> bool {
        job.title()
            .is_some_and(|t| t.to_lowercase().contains("writer"))
    }

    #[test]
    fn parses_greenhouse_shape() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/greenhouse-board.fixture.json")
            .expect("read greenhouse fixture");
        let board = source("Postman", "https://boards-api.greenhouse.io/v1/boards/postman/jobs");
        let listings = parse_board_payload(&fixture, &board).unwrap();

        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0].title(), Some("Senior Technical Writer"));
        assert_eq!(listings[0].company(), Some("Postman"));
        assert_eq!(listings[0].job_location.as_deref(), Some("Remote - US"));
        assert_eq!(
            listings[0].job_apply_link.as_deref(),
            Some("https://boards.greenhouse.io/postman/jobs/101")
        );
        assert_eq!(
            listings[0].alternate_link(),
            Some("https://boards-api.greenhouse.io/v1/boards/postman/jobs")
        );
    }

    #[test]
    fn parses_remoteok_shape() {
        let body = r#"[
            {"legal": "API terms of service"},
            {"position": "Technical Writer", "company": "Globex", "location": "Worldwide", "url": "https://remoteok.com/l/1"},
            {"position": "Backend Engineer", "company": "Initech", "location": "", "apply_url": "https://remoteok.com/apply/2"}
        ]"#;
        let board = source("RemoteOK", "https://remoteok.com/api");
        let listings = parse_board_payload(body, &board).unwrap();

        assert_eq!(listings.len(), 3);
        // The legal notice has no title and will never match a filter
        assert_eq!(listings[0].title(), None);
        // The board name wins over any company field in the item
        assert_eq!(listings[1].company(), Some("RemoteOK"));
        assert_eq!(listings[2].company(), Some("RemoteOK"));
        assert_eq!(listings[1].job_location.as_deref(), Some("Worldwide"));
        assert_eq!(listings[2].job_location, None);
        assert_eq!(listings[2].job_apply_link.as_deref(), Some("https://remoteok.com/apply/2"));
    }

    #[test]
    fn location_object_with_country() {
        let value: Value = serde_json::json!({"city": "Dublin", "country": "Ireland"});
        assert_eq!(board_location(Some(&value)).as_deref(), Some("Dublin, Ireland"));

        let value: Value = serde_json::json!({"country": "Ireland"});
        assert_eq!(board_location(Some(&value)).as_deref(), Some("Ireland"));

        let value: Value = serde_json::json!(42);
        assert_eq!(board_location(Some(&value)), None);
    }

    #[test]
    fn unknown_shape_yields_nothing() {
        let board = source("Odd", "https://odd.example/jobs");
        assert!(parse_board_payload(r#"{"results": []}"#, &board).unwrap().is_empty());
        assert!(parse_board_payload(r#""text""#, &board).unwrap().is_empty());
        assert!(parse_board_payload("not json", &board).is_err());
    }

    #[test]
    fn dedupe_keeps_first() {
        let job = |title: &str, company: &str, link: &str| JobListing {
            job_title: Some(title.into()),
            employer_name: Some(company.into()),
            job_apply_link: Some(link.into()),
            ..Default::default()
        };
        let deduped = dedupe_listings(vec![
            job("Writer", "A", "first"),
            job("Writer", "B", "other company"),
            job("Writer", "A", "second"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].job_apply_link.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_fetch_all_continues_past_failures() {
        let server = MockServer::start().await;
        let fixture = std::fs::read_to_string("../../../fixtures/json/greenhouse-board.fixture.json")
            .expect("read greenhouse fixture");

        Mock::given(method("GET"))
            .and(path("/good/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/broken/jobs"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = BoardsConfig {
            per_source_limit: 8,
            delay_ms: 0,
            timeout_secs: 5,
            sources: vec![
                source("Broken", &format!("{}/broken/jobs", server.uri())),
                source("Good", &format!("{}/good/jobs", server.uri())),
            ],
        };

        let fetcher = BoardFetcher::new(config).unwrap();
        let result = fetcher.fetch_all(writer_titles).await;

        assert_eq!(result.reports.len(), 2);
        assert!(result.reports[0].error.is_some());
        assert_eq!(result.reports[0].fetched, 0);
        assert_eq!(result.reports[1].fetched, 3);
        assert_eq!(result.reports[1].matched, 2);
        assert_eq!(result.listings.len(), 2);
        assert!(result.listings.iter().all(writer_titles));
    }

    #[tokio::test]
    async fn test_fetch_all_applies_per_source_limit() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "jobs": (0..5)
                .map(|i| serde_json::json!({"title": format!("Writer {i}"), "absolute_url": format!("https://x/{i}")}))
                .collect::<Vec<_>>()
        });

        Mock::given(method("GET"))
            .and(path("/many"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let config = BoardsConfig {
            per_source_limit: 3,
            delay_ms: 0,
            timeout_secs: 5,
            sources: vec![source("Many", &format!("{}/many", server.uri()))],
        };

        let fetcher = BoardFetcher::new(config).unwrap();
        let result = fetcher.fetch_all(|_| true).await;

        assert_eq!(result.listings.len(), 3);
        assert_eq!(result.listings[2].title(), Some("Writer 2"));
    }
}
