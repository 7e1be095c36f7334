//! Local title filter.
//!
//! The search API matches loosely; this pass keeps only listings whose title
//! actually contains one of the target phrases.

use tracing::debug;

use jobfeed_shared::JobListing;

use crate::query::normalize_phrase;

/// Case-insensitive substring matcher over a fixed phrase list.
#[derive(Debug, Clone)]
pub struct PhraseFilter {
    /// Normalized, lower-cased, non-blank phrases.
    phrases: Vec<String>,
}

impl PhraseFilter {
    /// Build a filter. Phrases are normalized the same way as query terms;
    /// blank phrases are ignored, so they never match everything.
    pub fn new(phrases: &[String]) -> Self {
        Self {
            phrases: phrases
                .iter()
                .map(|p| normalize_phrase(p).to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Whether the listing's title contains any phrase. Untitled listings never match.
    pub fn matches(&self, job: &JobListing) -> bool {
        let Some(title) = job.title() else {
            return false;
        };
        let title = title.to_lowercase();
        self.phrases.iter().any(|p| title.contains(p.as_str()))
    }
}

/// Keep the listings matched by `phrases`, preserving order.
pub fn filter_by_phrases(listings: Vec<JobListing>, phrases: &[String]) -> Vec<JobListing> {
    let filter = PhraseFilter::new(phrases);
    let before = listings.len();
    let kept: Vec<JobListing> = listings.into_iter().filter(|j| filter.matches(j)).collect();
    debug!(before, kept = kept.len(), "title filter applied");
    kept
}
