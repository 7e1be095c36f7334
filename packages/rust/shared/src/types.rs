//! Core domain types for job listings.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JobListing
// ---------------------------------------------------------------------------

/// One job posting as returned by the search API.
///
/// Every field is optional: the API omits or nulls fields freely, and the
/// renderer resolves anything missing to a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default)]
    pub employer_name: Option<String>,
    #[serde(default)]
    pub employer_website: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    /// Preformatted location, preferred over the individual parts.
    #[serde(default)]
    pub job_location: Option<String>,
    #[serde(default)]
    pub job_city: Option<String>,
    #[serde(default)]
    pub job_state: Option<String>,
    #[serde(default)]
    pub job_country: Option<String>,
    /// Direct apply link.
    #[serde(default)]
    pub job_apply_link: Option<String>,
    /// Search-engine listing link.
    #[serde(default)]
    pub job_google_link: Option<String>,
    /// Alternate listings of the same job.
    #[serde(default)]
    pub apply_options: Option<Vec<ApplyOption>>,
}

/// An alternate place to apply for a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyOption {
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub apply_link: Option<String>,
}

impl JobListing {
    /// The title, if present and not blank.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.job_title.as_deref())
    }

    /// The employer name, if present and not blank.
    pub fn company(&self) -> Option<&str> {
        non_blank(self.employer_name.as_deref())
    }

    /// `"<city>, <state>"`, or whichever of the two is present.
    pub fn city_state(&self) -> Option<String> {
        match (
            non_blank(self.job_city.as_deref()),
            non_blank(self.job_state.as_deref()),
        ) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }

    /// First non-blank alternate apply link.
    pub fn alternate_link(&self) -> Option<&str> {
        self.apply_options
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find_map(|opt| non_blank(opt.apply_link.as_deref()))
    }
}

// ---------------------------------------------------------------------------
// SearchResponse
// ---------------------------------------------------------------------------

/// Envelope of a search API response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<JobListing>>,
}

impl SearchResponse {
    /// The listings, treating a missing or null `data` as empty.
    pub fn into_listings(self) -> Vec<JobListing> {
        self.data.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Fallback helpers
// ---------------------------------------------------------------------------

/// Return the first candidate that is present and not blank (trimmed), else `default`.
pub fn first_present<I, S>(candidates: I, default: &str) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| {
            let trimmed = candidate.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| default.to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_present_picks_first_non_blank() {
        let picked = first_present([None, Some(""), Some("  "), Some(" Berlin "), Some("Paris")], "Remote");
        assert_eq!(picked, "Berlin");
    }

    #[test]
    fn first_present_uses_default() {
        let none: [Option<&str>; 2] = [None, Some("")];
        assert_eq!(first_present(none, "#"), "#");
        assert_eq!(first_present(Vec::<Option<String>>::new(), "Remote"), "Remote");
    }

    #[test]
    fn first_present_accepts_owned_strings() {
        let picked = first_present([None, Some(String::from("Austin, TX"))], "Remote");
        assert_eq!(picked, "Austin, TX");
    }

    #[test]
    fn city_state_combinations() {
        let mut job = JobListing {
            job_city: Some("Austin".into()),
            job_state: Some("TX".into()),
            ..Default::default()
        };
        assert_eq!(job.city_state().as_deref(), Some("Austin, TX"));

        job.job_state = Some(" ".into());
        assert_eq!(job.city_state().as_deref(), Some("Austin"));

        job.job_city = None;
        assert_eq!(job.city_state(), None);
    }

    #[test]
    fn alternate_link_skips_blank_options() {
        let job = JobListing {
            apply_options: Some(vec![
                ApplyOption { publisher: Some("A".into()), apply_link: Some("".into()) },
                ApplyOption { publisher: Some("B".into()), apply_link: Some("https://b.example/job".into()) },
            ]),
            ..Default::default()
        };
        assert_eq!(job.alternate_link(), Some("https://b.example/job"));
    }

    #[test]
    fn response_tolerates_nulls() {
        let json = r#"{
            "status": "OK",
            "data": [
                {"employer_name": "Acme", "job_title": null, "job_city": null, "apply_options": null, "job_is_remote": true}
            ]
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).expect("deserialize");
        let listings = resp.into_listings();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].company(), Some("Acme"));
        assert_eq!(listings[0].title(), None);
    }

    #[test]
    fn response_without_data_is_empty() {
        let resp: SearchResponse = serde_json::from_str(r#"{"status": "ERROR"}"#).expect("deserialize");
        assert!(resp.into_listings().is_empty());
    }

    #[test]
    fn fixture_response_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/jsearch-response.fixture.json")
            .expect("read fixture");
        let resp: SearchResponse = serde_json::from_str(&fixture).expect("deserialize fixture");
        let listings = resp.into_listings();
        assert_eq!(listings.len(), 4);
        assert_eq!(listings[0].title(), Some("Senior Technical Writer"));
        assert_eq!(listings[1].alternate_link(), Some("https://jobs.example.org/apply/2"));
    }
}
