//! Application configuration for jobfeed.
//!
//! Config is read from `--config <path>`, then `./jobfeed.toml`, then
//! `~/.jobfeed/jobfeed.toml`. CLI flags override config file values, which
//! override defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{JobFeedError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "jobfeed.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".jobfeed";

/// Shortest allowed truncation width; anything narrower cannot hold the `...` suffix.
const MIN_FIELD_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Config structs (matching jobfeed.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search API settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Query building.
    #[serde(default)]
    pub query: QueryConfig,

    /// Local title filter.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Table rendering.
    #[serde(default)]
    pub render: RenderConfig,

    /// Template and output file.
    #[serde(default)]
    pub output: OutputConfig,

    /// Public job boards used by the `boards` source.
    #[serde(default)]
    pub boards: BoardsConfig,
}

impl AppConfig {
    /// Phrases used by the local filter: `filter.phrases` when set, else the target phrases.
    pub fn filter_phrases(&self) -> &[String] {
        if self.filter.phrases.is_empty() {
            &self.query.target_phrases
        } else {
            &self.filter.phrases
        }
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.search.page == 0 || self.search.num_pages == 0 {
            return Err(JobFeedError::config(
                "search.page and search.num_pages must be at least 1",
            ));
        }
        if self.render.max_company_len < MIN_FIELD_LEN || self.render.max_title_len < MIN_FIELD_LEN
        {
            return Err(JobFeedError::config(format!(
                "render.max_company_len and render.max_title_len must be at least {MIN_FIELD_LEN}"
            )));
        }
        if self.render.default_location.trim().is_empty()
            || self.render.placeholder_link.trim().is_empty()
        {
            return Err(JobFeedError::config(
                "render.default_location and render.placeholder_link must not be empty",
            ));
        }
        if self.output.table_marker.is_empty() || self.output.date_marker.is_empty() {
            return Err(JobFeedError::config("output markers must not be empty"));
        }
        if self.output.table_marker == self.output.date_marker {
            return Err(JobFeedError::config(
                "output.table_marker and output.date_marker must differ",
            ));
        }
        Ok(())
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,

    /// Value of the `X-RapidAPI-Host` header.
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// First result page to request.
    #[serde(default = "default_one")]
    pub page: u32,

    /// Number of pages the API should return in one response.
    #[serde(default = "default_one")]
    pub num_pages: u32,

    /// Optional posting-age window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<DatePosted>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_host: default_api_host(),
            api_key_env: default_api_key_env(),
            page: default_one(),
            num_pages: default_one(),
            date_posted: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> Url {
    Url::parse("https://jsearch.p.rapidapi.com/search").expect("valid default endpoint")
}
fn default_api_host() -> String {
    "jsearch.p.rapidapi.com".into()
}
fn default_api_key_env() -> String {
    "RAPIDAPI_KEY".into()
}
fn default_one() -> u32 {
    1
}
fn default_timeout() -> u64 {
    30
}

/// Posting-age window accepted by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePosted {
    All,
    Today,
    #[serde(rename = "3days")]
    ThreeDays,
    Week,
    Month,
}

impl DatePosted {
    /// Wire value of the `date_posted` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::ThreeDays => "3days",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for DatePosted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[query]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Job-title phrases, in priority order.
    #[serde(default = "default_target_phrases")]
    pub target_phrases: Vec<String>,

    /// Also add each phrase's individual words as terms.
    #[serde(default = "default_true")]
    pub expand_words: bool,

    /// Maximum number of OR-ed terms (0 = unlimited).
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,

    /// Free text appended after the OR-ed terms (e.g. `remote`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            target_phrases: default_target_phrases(),
            expand_words: true,
            max_terms: default_max_terms(),
            suffix: Some("remote".into()),
        }
    }
}

fn default_target_phrases() -> Vec<String> {
    [
        "technical writer",
        "technical writing",
        "documentation",
        "docs engineer",
        "api documentation",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_true() -> bool {
    true
}
fn default_max_terms() -> usize {
    12
}

/// `[filter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Drop listings whose title matches none of the phrases.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Phrases to match; empty means reuse `query.target_phrases`.
    #[serde(default)]
    pub phrases: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            phrases: Vec::new(),
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Maximum number of data rows.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Company names longer than this (in chars) are truncated.
    #[serde(default = "default_max_company_len")]
    pub max_company_len: usize,

    /// Job titles longer than this (in chars) are truncated.
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,

    /// Location used when a listing has none.
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Link used when a listing has no apply URL.
    #[serde(default = "default_placeholder_link")]
    pub placeholder_link: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            max_company_len: default_max_company_len(),
            max_title_len: default_max_title_len(),
            default_location: default_location(),
            placeholder_link: default_placeholder_link(),
        }
    }
}

fn default_max_rows() -> usize {
    15
}
fn default_max_company_len() -> usize {
    50
}
fn default_max_title_len() -> usize {
    80
}
fn default_location() -> String {
    "Remote".into()
}
fn default_placeholder_link() -> String {
    "#".into()
}

/// How the rendered table reaches the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Fill the template and overwrite the output file.
    #[default]
    Template,
    /// Rewrite the `JOBS-START`/`JOBS-END` region of the existing output file.
    Inject,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Template document with the two markers.
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// File overwritten on every run.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Template fill or region injection.
    #[serde(default)]
    pub mode: OutputMode,

    /// Marker replaced by the table.
    #[serde(default = "default_table_marker")]
    pub table_marker: String,

    /// Marker replaced by the update timestamp.
    #[serde(default = "default_date_marker")]
    pub date_marker: String,

    /// chrono format string for the update timestamp (rendered in UTC).
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            output_path: default_output_path(),
            mode: OutputMode::default(),
            table_marker: default_table_marker(),
            date_marker: default_date_marker(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_template_path() -> PathBuf {
    PathBuf::from("jobs-template.md")
}
fn default_output_path() -> PathBuf {
    PathBuf::from("README.md")
}
fn default_table_marker() -> String {
    "<!-- JOBS_TABLE -->".into()
}
fn default_date_marker() -> String {
    "<!-- UPDATE_DATE -->".into()
}
fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M UTC".into()
}

/// `[boards]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardsConfig {
    /// Listings kept per board after filtering.
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,

    /// Pause between two board requests, in ms.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_board_timeout")]
    pub timeout_secs: u64,

    /// Boards to query, in order.
    #[serde(default = "default_board_sources")]
    pub sources: Vec<BoardSource>,
}

impl Default for BoardsConfig {
    fn default() -> Self {
        Self {
            per_source_limit: default_per_source_limit(),
            delay_ms: default_delay_ms(),
            timeout_secs: default_board_timeout(),
            sources: default_board_sources(),
        }
    }
}

/// `[[boards.sources]]` entry: a public JSON job board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSource {
    /// Display name, also used as the company name of its listings.
    pub name: String,
    /// JSON endpoint.
    pub url: Url,
}

fn default_per_source_limit() -> usize {
    8
}
fn default_delay_ms() -> u64 {
    500
}
fn default_board_timeout() -> u64 {
    8
}
fn default_board_sources() -> Vec<BoardSource> {
    [
        ("RemoteOK", "https://remoteok.com/api"),
        ("Postman", "https://boards-api.greenhouse.io/v1/boards/postman/jobs"),
        ("Twilio", "https://boards-api.greenhouse.io/v1/boards/twilio/jobs"),
        ("MongoDB", "https://boards-api.greenhouse.io/v1/boards/mongodb/jobs"),
    ]
    .into_iter()
    .map(|(name, url)| BoardSource {
        name: name.into(),
        url: Url::parse(url).expect("valid default board URL"),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API key read from the environment. `Debug` never prints the key.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Read the key from the environment variable `var_name`.
    pub fn from_env(var_name: &str) -> Result<Self> {
        Self::from_lookup(var_name, |name| std::env::var(name).ok())
    }

    /// Read the key through an arbitrary lookup (used by tests).
    pub fn from_lookup(var_name: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match lookup(var_name) {
            Some(val) if !val.trim().is_empty() => Ok(Self {
                api_key: val.trim().to_string(),
            }),
            _ => Err(JobFeedError::config(format!(
                "API key not found. Set the {var_name} environment variable."
            ))),
        }
    }

    /// The raw key, for the request header.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.jobfeed/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| JobFeedError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.jobfeed/jobfeed.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config.
///
/// An explicit path must exist. Otherwise `./jobfeed.toml` is tried, then the
/// user config file; defaults are returned when neither exists.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    match config_file_path() {
        Ok(path) if path.exists() => load_config_from(&path),
        _ => {
            tracing::debug!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| JobFeedError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| JobFeedError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Write a default `jobfeed.toml` into `dir`. Refuses to overwrite an existing file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(JobFeedError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| JobFeedError::io(dir, e))?;
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| JobFeedError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| JobFeedError::io(&path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(path)
}
