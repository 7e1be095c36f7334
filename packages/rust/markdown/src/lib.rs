//! Markdown table rendering for job listings.
//!
//! Turns listings into a fixed four-column table (Company, Job Title,
//! Location, Apply). Missing fields resolve to defaults, cell text is
//! truncated and escaped, and an empty input yields a single placeholder row.
//! Rendering never fails.

mod escape;

use tracing::{debug, instrument};

use jobfeed_shared::{JobListing, RenderConfig, first_present};

pub use escape::{escape_cell, escape_link, truncate};

// ---------------------------------------------------------------------------
// Table layout
// ---------------------------------------------------------------------------

/// Header row of the listings table.
pub const TABLE_HEADER: &str = "| Company | Job Title | Location | Apply |";

/// Alignment row under the header.
pub const TABLE_SEPARATOR: &str = "|---------|-----------|----------|-------|";

/// Row rendered in place of data when no listings remain.
pub const EMPTY_ROW: &str = "| **No jobs found** | Try again later | - | - |";

/// Shown when a listing has no company or title.
const MISSING: &str = "N/A";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Result of rendering a listings table.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Header, separator and rows, newline-separated, no trailing newline.
    pub markdown: String,
    /// Number of data rows (0 when the placeholder row was used).
    pub row_count: usize,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Render up to `config.max_rows` listings as a Markdown table, in input order.
#[instrument(skip_all, fields(listings = listings.len(), max_rows = config.max_rows))]
pub fn render_table(listings: &[JobListing], config: &RenderConfig) -> RenderResult {
    let mut lines = vec![TABLE_HEADER.to_string(), TABLE_SEPARATOR.to_string()];

    let rows: Vec<String> = listings
        .iter()
        .take(config.max_rows)
        .map(|job| render_row(job, config))
        .collect();
    let row_count = rows.len();

    if rows.is_empty() {
        lines.push(EMPTY_ROW.to_string());
    } else {
        lines.extend(rows);
    }

    debug!(row_count, "table rendered");

    RenderResult {
        markdown: lines.join("\n"),
        row_count,
    }
}

/// Render one listing as a table row.
pub fn render_row(job: &JobListing, config: &RenderConfig) -> String {
    let company = escape_cell(&truncate(
        job.company().unwrap_or(MISSING),
        config.max_company_len,
    ));
    let title = escape_cell(&truncate(
        job.title().unwrap_or(MISSING),
        config.max_title_len,
    ));
    let location = escape_cell(&resolve_location(job, &config.default_location));
    let apply = escape_link(&resolve_apply_link(job, &config.placeholder_link));

    let company_cell = match job.employer_website.as_deref().map(str::trim) {
        Some(site) if !site.is_empty() => format!("**[{company}]({})**", escape_link(site)),
        _ => format!("**{company}**"),
    };
    let title_cell = format!("**[{title}]({apply})**");
    let apply_cell = format!("[Apply]({apply})");

    let cells = [company_cell, title_cell, location, apply_cell];
    format!("| {} |", cells.join(" | "))
}

/// Location precedence: preformatted location, city/state, country, then `default`.
pub fn resolve_location(job: &JobListing, default: &str) -> String {
    first_present(
        [
            job.job_location.clone(),
            job.city_state(),
            job.job_country.clone(),
        ],
        default,
    )
}

/// Apply-link precedence: direct link, search-engine link, alternate listing, then `default`.
pub fn resolve_apply_link(job: &JobListing, default: &str) -> String {
    first_present(
        [
            job.job_apply_link.as_deref(),
            job.job_google_link.as_deref(),
            job.alternate_link(),
        ],
        default,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jobfeed_shared::{ApplyOption, SearchResponse};

    fn fixture_listings() -> Vec<JobListing> {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/json/jsearch-response.fixture.json");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        let resp: SearchResponse = serde_json::from_str(&content).expect("deserialize fixture");
        resp.into_listings()
    }

    fn job(title: &str) -> JobListing {
        JobListing {
            employer_name: Some("Acme".into()),
            job_title: Some(title.into()),
            job_apply_link: Some(format!("https://acme.example/{}", title.len())),
            ..Default::default()
        }
    }

    /// Split a row on unescaped pipes and return the inner cells.
    fn cells(row: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut prev_backslash = false;
        for ch in row.chars() {
            if ch == '|' && !prev_backslash {
                parts.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
            prev_backslash = ch == '\\';
        }
        parts.push(current);
        // Leading and trailing pipes produce empty outer parts
        parts[1..parts.len() - 1]
            .iter()
            .map(|c| c.trim().to_string())
            .collect()
    }

    #[test]
    fn empty_input_renders_placeholder() {
        let result = render_table(&[], &RenderConfig::default());
        assert_eq!(result.row_count, 0);
        assert_eq!(
            result.markdown,
            format!("{TABLE_HEADER}\n{TABLE_SEPARATOR}\n{EMPTY_ROW}")
        );
    }

    #[test]
    fn fixture_rows_have_four_non_empty_cells() {
        let listings = fixture_listings();
        let result = render_table(&listings, &RenderConfig::default());
        assert_eq!(result.row_count, 4);

        for row in result.markdown.lines().skip(2) {
            let row_cells = cells(row);
            assert_eq!(row_cells.len(), 4, "row: {row}");
            assert!(row_cells.iter().all(|c| !c.is_empty()), "row: {row}");
        }
    }

    #[test]
    fn pipe_in_company_is_escaped() {
        let listings = fixture_listings();
        let row = render_row(&listings[0], &RenderConfig::default());
        assert!(row.contains("Acme \\| Docs Co"));
        assert_eq!(cells(&row).len(), 4);
        assert!(row.starts_with("| **[Acme \\| Docs Co](https://acme.example.com)** |"));
    }

    #[test]
    fn pipe_in_title_is_escaped() {
        let row = render_row(&job("Writer | Editor"), &RenderConfig::default());
        assert!(row.contains("Writer \\| Editor"));
        assert_eq!(cells(&row).len(), 4);
    }

    #[test]
    fn markup_in_title_cannot_break_the_row() {
        let mut hostile = job("Writer <!-- ] \\");
        hostile.employer_name = Some("[Acme]".into());
        let row = render_row(&hostile, &RenderConfig::default());

        assert!(!row.contains("<!--"));
        assert!(row.contains("**[Writer &lt;!-- \\] \\\\](https://acme.example/"));
        assert!(row.starts_with("| **\\[Acme\\]** |"));
        assert_eq!(cells(&row).len(), 4);
    }

    #[test]
    fn newline_in_title_becomes_space() {
        let listings = fixture_listings();
        let row = render_row(&listings[3], &RenderConfig::default());
        assert!(!row.contains('\n'));
        assert!(row.contains("API Documentation Specialist"));
    }

    #[test]
    fn missing_fields_resolve_to_defaults() {
        let listings = fixture_listings();
        let row = render_row(&listings[3], &RenderConfig::default());
        assert_eq!(
            row,
            "| **N/A** | **[API Documentation Specialist](#)** | Remote | [Apply](#) |"
        );
    }

    #[test]
    fn location_precedence() {
        let listings = fixture_listings();
        assert_eq!(resolve_location(&listings[0], "Remote"), "Austin, TX");
        // No job_location, city only, so city wins over country
        assert_eq!(resolve_location(&listings[1], "Remote"), "Berlin");

        let country_only = JobListing {
            job_country: Some("DE".into()),
            ..Default::default()
        };
        assert_eq!(resolve_location(&country_only, "Remote"), "DE");
        assert_eq!(
            resolve_location(&JobListing::default(), "Remote/Worldwide"),
            "Remote/Worldwide"
        );
    }

    #[test]
    fn apply_link_precedence() {
        let mut job = JobListing {
            job_apply_link: Some("https://direct".into()),
            job_google_link: Some("https://google".into()),
            apply_options: Some(vec![ApplyOption {
                publisher: None,
                apply_link: Some("https://alt".into()),
            }]),
            ..Default::default()
        };
        assert_eq!(resolve_apply_link(&job, "#"), "https://direct");

        job.job_apply_link = Some("  ".into());
        assert_eq!(resolve_apply_link(&job, "#"), "https://google");

        job.job_google_link = None;
        assert_eq!(resolve_apply_link(&job, "#"), "https://alt");

        job.apply_options = None;
        assert_eq!(resolve_apply_link(&job, "#"), "#");
    }

    #[test]
    fn company_without_website_is_plain_bold() {
        let listings = fixture_listings();
        let row = render_row(&listings[1], &RenderConfig::default());
        assert!(row.starts_with("| **Example Org** |"));
        assert!(row.contains("[Apply](https://jobs.example.org/apply/2)"));
    }

    #[test]
    fn long_fields_are_truncated() {
        let config = RenderConfig {
            max_title_len: 10,
            max_company_len: 6,
            ..RenderConfig::default()
        };
        let mut long = job("Principal Technical Writer, Platform");
        long.employer_name = Some("Enormous Company Name".into());
        let row = render_row(&long, &config);
        assert!(row.contains("**Eno...**"));
        assert!(row.contains("[Princip...]"));
    }

    #[test]
    fn caps_rows_and_keeps_order() {
        let listings: Vec<JobListing> = (0..20).map(|i| job(&format!("Writer {i:02}"))).collect();
        let result = render_table(&listings, &RenderConfig::default());

        assert_eq!(result.row_count, 15);
        let rows: Vec<&str> = result.markdown.lines().skip(2).collect();
        assert_eq!(rows.len(), 15);
        for (i, row) in rows.iter().enumerate() {
            assert!(row.contains(&format!("Writer {i:02}")), "row {i}: {row}");
        }
        assert!(!result.markdown.contains("Writer 15"));
    }
}
