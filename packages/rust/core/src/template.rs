//! Template loading, placeholder substitution, and output writing.
//!
//! Two output styles are supported:
//! - template fill: replace the table and date markers in a template and
//!   overwrite the output file with the result;
//! - region injection: rewrite the `JOBS-START`/`JOBS-END` block of an
//!   existing document, leaving the rest untouched.
//!
//! Writes are plain overwrites; there is no temp-file/rename step.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{NoExpand, Regex};
use tracing::{debug, info, warn};

use jobfeed_shared::{JobFeedError, OutputConfig, Result};

/// Opening marker of an injectable region.
pub const REGION_START: &str = "<!-- JOBS-START -->";

/// Closing marker of an injectable region.
pub const REGION_END: &str = "<!-- JOBS-END -->";

/// Matches the first region, tolerant of marker whitespace and case.
static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--\s*JOBS-START\s*-->.*?<!--\s*JOBS-END\s*-->").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Template fill
// ---------------------------------------------------------------------------

/// Built-in template used when the template file cannot be read.
pub fn default_template(config: &OutputConfig) -> String {
    format!(
        "# Technical Writing Jobs\n\
         \n\
         Open technical writing and documentation roles, refreshed automatically.\n\
         \n\
         {table}\n\
         \n\
         _Last updated: {date}_\n",
        table = config.table_marker,
        date = config.date_marker,
    )
}

/// Read the template at `config.template_path`, falling back to [`default_template`].
pub fn load_template(config: &OutputConfig) -> String {
    let path = &config.template_path;
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), "template loaded");
            content
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "template unavailable, using built-in default"
            );
            default_template(config)
        }
    }
}

/// Substitute both markers throughout the template.
///
/// The date marker is replaced first so listing text inside the table can
/// never be mistaken for a marker.
pub fn fill_template(template: &str, config: &OutputConfig, table: &str, updated_at: &str) -> String {
    template
        .replace(&config.date_marker, updated_at)
        .replace(&config.table_marker, table)
}

/// Format `now` with a chrono format string, rejecting invalid specifiers.
pub fn format_timestamp(now: DateTime<Utc>, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", now.format(format))
        .map_err(|_| JobFeedError::config(format!("invalid timestamp_format '{format}'")))?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Region injection
// ---------------------------------------------------------------------------

/// Content placed between the region markers.
pub fn region_block(table: &str, listing_count: usize, updated_at: &str) -> String {
    format!(
        "{REGION_START}\n\
         {table}\n\
         \n\
         _{listing_count} listings found. Updated: {updated_at}_\n\
         {REGION_END}"
    )
}

/// Replace the first marker region of `document` with `block`.
///
/// Returns `None` when the document has no region.
pub fn inject_region(document: &str, block: &str) -> Option<String> {
    if !REGION_RE.is_match(document) {
        return None;
    }
    Some(REGION_RE.replacen(document, 1, NoExpand(block)).into_owned())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Overwrite `path` with `contents`, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| JobFeedError::io(parent, e))?;
    }

    std::fs::write(path, contents).map_err(|e| JobFeedError::io(path, e))?;

    info!(path = %path.display(), bytes = contents.len(), "output written");
    Ok(())
}
