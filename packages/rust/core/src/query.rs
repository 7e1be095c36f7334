//! Search query construction.

use std::collections::HashSet;

use jobfeed_shared::QueryConfig;

/// Separator between OR-ed terms.
const OR: &str = " OR ";

/// Build the search query string from the configured target phrases.
///
/// Phrase terms come first, then (if enabled) each phrase's words.
/// Multi-word terms are quoted. Duplicates are dropped case-insensitively,
/// keeping the first spelling. The suffix does not count against `max_terms`.
pub fn build_query(config: &QueryConfig) -> String {
    let terms = collect_terms(config);
    let joined = terms
        .iter()
        .map(|term| {
            if term.contains(' ') {
                format!("\"{term}\"")
            } else {
                term.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(OR);

    match config.suffix.as_deref().map(str::trim) {
        Some(suffix) if !suffix.is_empty() => {
            if joined.is_empty() {
                suffix.to_string()
            } else {
                format!("{joined} {suffix}")
            }
        }
        _ => joined,
    }
}

/// Strip double quotes and collapse whitespace runs to single spaces.
/// Shared by the query builder and the title filter.
pub(crate) fn normalize_phrase(phrase: &str) -> String {
    phrase
        .replace('"', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered, deduplicated, truncated term list (unquoted).
fn collect_terms(config: &QueryConfig) -> Vec<String> {
    let phrases: Vec<String> = config
        .target_phrases
        .iter()
        .map(|p| normalize_phrase(p))
        .filter(|p| !p.is_empty())
        .collect();

    let mut candidates = phrases.clone();
    if config.expand_words {
        candidates.extend(phrases.iter().flat_map(|p| p.split(' ').map(String::from)));
    }

    let mut seen = HashSet::new();
    let mut terms: Vec<String> = candidates
        .into_iter()
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect();

    if config.max_terms > 0 {
        terms.truncate(config.max_terms);
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(phrases: &[&str]) -> QueryConfig {
        QueryConfig {
            target_phrases: phrases.iter().map(|p| p.to_string()).collect(),
            expand_words: true,
            max_terms: 0,
            suffix: None,
        }
    }

    #[test]
    fn default_query() {
        let query = build_query(&QueryConfig::default());
        assert_eq!(
            query,
            "\"technical writer\" OR \"technical writing\" OR documentation OR \"docs engineer\" \
             OR \"api documentation\" OR technical OR writer OR writing OR docs OR engineer OR api remote"
        );
    }

    #[test]
    fn phrases_only_when_expansion_off() {
        let mut cfg = config(&["technical writer", "docs engineer"]);
        cfg.expand_words = false;
        assert_eq!(build_query(&cfg), "\"technical writer\" OR \"docs engineer\"");
    }

    #[test]
    fn dedupe_is_case_insensitive_and_keeps_first_spelling() {
        let cfg = config(&["Documentation", "documentation", "API Documentation"]);
        assert_eq!(
            build_query(&cfg),
            "Documentation OR \"API Documentation\" OR API"
        );
    }

    #[test]
    fn truncates_to_max_terms() {
        let mut cfg = config(&["technical writer", "developer advocate"]);
        cfg.max_terms = 3;
        cfg.suffix = Some("remote".into());
        assert_eq!(
            build_query(&cfg),
            "\"technical writer\" OR \"developer advocate\" OR technical remote"
        );
    }

    #[test]
    fn whitespace_and_quotes_are_normalized() {
        let cfg = config(&["  \"staff   writer\" ", "   "]);
        assert_eq!(build_query(&cfg), "\"staff writer\" OR staff OR writer");
    }

    #[test]
    fn normalize_phrase_strips_quotes_and_spacing() {
        assert_eq!(normalize_phrase("  \"technical \t  writer\" "), "technical writer");
        assert_eq!(normalize_phrase(" \" \" "), "");
    }

    #[test]
    fn empty_phrases() {
        let mut cfg = config(&[]);
        assert_eq!(build_query(&cfg), "");
        cfg.suffix = Some("remote".into());
        assert_eq!(build_query(&cfg), "remote");
    }
}
