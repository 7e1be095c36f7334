//! End-to-end `update` pipeline: query → fetch → filter → render → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use jobfeed_markdown::render_table;
use jobfeed_search::{BoardFetcher, JobSearchClient};
use jobfeed_shared::{AppConfig, JobListing, OutputMode, Result};

use crate::filter::{PhraseFilter, filter_by_phrases};
use crate::query::build_query;
use crate::template;

/// Where listings come from. Built at the entry point, after credentials are resolved.
pub enum ListingSource {
    /// The keyed search API.
    Search(JobSearchClient),
    /// Public JSON job boards.
    Boards(BoardFetcher),
}

impl ListingSource {
    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search(_) => "jsearch",
            Self::Boards(_) => "boards",
        }
    }
}

/// Per-run switches that are not part of the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Render the document but do not touch the output file.
    pub dry_run: bool,
}

/// Result of the `update` pipeline.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Source used for this run.
    pub source: &'static str,
    /// Query string built from the target phrases.
    pub query: String,
    /// Listings received before local filtering.
    pub fetched: usize,
    /// Listings left after local filtering.
    pub kept: usize,
    /// Data rows in the rendered table.
    pub rendered: usize,
    /// Upstream problems that were absorbed instead of aborting the run.
    pub upstream_errors: Vec<String>,
    /// The document written (or, on a dry run, that would have been written).
    pub document: Option<String>,
    /// Output path, set only when the file was actually written.
    pub written_to: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once per source (or board) with the number of listings it produced.
    fn listings_fetched(&self, source: &str, count: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn listings_fetched(&self, _source: &str, _count: usize) {}
    fn done(&self, _report: &RunReport) {}
}

/// Run the full `update` pipeline.
///
/// 1. Build the query and timestamp
/// 2. Fetch listings (upstream failures degrade to an empty list)
/// 3. Filter titles against the target phrases
/// 4. Render the table
/// 5. Fill the template (or inject the region) and write the output
#[instrument(skip_all, fields(source = source.name(), dry_run = opts.dry_run))]
pub async fn run(
    config: &AppConfig,
    source: &ListingSource,
    opts: &RunOptions,
    now: DateTime<Utc>,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let start = Instant::now();

    // --- Phase 1: Query ---
    progress.phase("Building query");
    let query = build_query(&config.query);
    let updated_at = template::format_timestamp(now, &config.output.timestamp_format)?;
    info!(%query, %updated_at, "starting update pipeline");

    // --- Phase 2: Fetch ---
    progress.phase("Fetching listings");
    let mut upstream_errors = Vec::new();
    let (listings, fetched) =
        fetch_listings(config, source, &query, &mut upstream_errors, progress).await?;

    // --- Phase 3: Filter ---
    let listings = if config.filter.enabled {
        progress.phase("Filtering titles");
        filter_by_phrases(listings, config.filter_phrases())
    } else {
        listings
    };
    let kept = listings.len();

    // --- Phase 4: Render ---
    progress.phase("Rendering table");
    let table = render_table(&listings, &config.render);

    // --- Phase 5: Write ---
    progress.phase("Writing output");
    let output_path = &config.output.output_path;
    let document = match config.output.mode {
        OutputMode::Template => {
            let template_text = template::load_template(&config.output);
            Some(template::fill_template(
                &template_text,
                &config.output,
                &table.markdown,
                &updated_at,
            ))
        }
        OutputMode::Inject => {
            let block = template::region_block(&table.markdown, kept, &updated_at);
            match std::fs::read_to_string(output_path) {
                Ok(existing) => {
                    let injected = template::inject_region(&existing, &block);
                    if injected.is_none() {
                        warn!(
                            path = %output_path.display(),
                            "no JOBS-START/JOBS-END region found, leaving file untouched"
                        );
                    }
                    injected
                }
                Err(e) => {
                    warn!(
                        path = %output_path.display(),
                        error = %e,
                        "cannot read output file for injection, leaving it untouched"
                    );
                    None
                }
            }
        }
    };

    let written_to = match &document {
        Some(doc) if !opts.dry_run => {
            template::write_output(output_path, doc)?;
            Some(output_path.clone())
        }
        _ => None,
    };

    let report = RunReport {
        source: source.name(),
        query,
        fetched,
        kept,
        rendered: table.row_count,
        upstream_errors,
        document,
        written_to,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        fetched = report.fetched,
        kept = report.kept,
        rendered = report.rendered,
        degraded = !report.upstream_errors.is_empty(),
        elapsed_ms = report.elapsed.as_millis(),
        "update pipeline complete"
    );

    Ok(report)
}

/// Fetch from the configured source. Recoverable upstream errors are logged,
/// recorded, and replaced by whatever listings could still be collected.
///
/// Returns the listings and how many the source produced before any filtering.
async fn fetch_listings(
    config: &AppConfig,
    source: &ListingSource,
    query: &str,
    upstream_errors: &mut Vec<String>,
    progress: &dyn ProgressReporter,
) -> Result<(Vec<JobListing>, usize)> {
    let fetched = match source {
        ListingSource::Search(client) => match client.search(query).await {
            Ok(listings) => {
                progress.listings_fetched(source.name(), listings.len());
                let count = listings.len();
                (listings, count)
            }
            Err(e) if !e.is_recoverable() => return Err(e),
            Err(e) => {
                warn!(error = %e, "search failed, continuing with no listings");
                upstream_errors.push(e.to_string());
                progress.listings_fetched(source.name(), 0);
                (Vec::new(), 0)
            }
        },
        ListingSource::Boards(fetcher) => {
            let result = if config.filter.enabled {
                let filter = PhraseFilter::new(config.filter_phrases());
                fetcher.fetch_all(|job| filter.matches(job)).await
            } else {
                fetcher.fetch_all(|_| true).await
            };

            for board in &result.reports {
                progress.listings_fetched(&board.name, board.matched);
                if let Some(err) = &board.error {
                    upstream_errors.push(format!("{}: {err}", board.name));
                }
            }
            let count = result.reports.iter().map(|board| board.fetched).sum();
            (result.listings, count)
        }
    };
    Ok(fetched)
}
