//! Normalization of raw provider results into [`Document`]s.
//!
//! This is the validation boundary: a result without a usable url is rejected
//! here, before scoring. Everything else degrades gracefully: dates stay raw
//! for the resolver, missing ids fall back to the url.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ranking::core::document::{DateCandidates, Document, parse_lenient};
use crate::ranking::core::errors::{RankingError, RankingResult};
use crate::ranking::core::provider::Provider;

/// Maximum snippet length in characters, ellipsis included.
pub const MAX_SNIPPET_CHARS: usize = 1000;

const ELLIPSIS: &str = "...";

/// A result as returned by a retrieval collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResult {
    /// Provider identifier; defaults to the url.
    #[serde(default)]
    pub id: Option<String>,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Url of the result.
    #[serde(default)]
    pub url: String,
    /// Snippet or full text.
    #[serde(default, alias = "snippet")]
    pub text: String,
    /// Raw relevance score on the provider's scale.
    #[serde(default)]
    pub score: Option<f64>,
    /// Online publication date.
    #[serde(default, alias = "publishedDate")]
    pub published_date: Option<String>,
    /// Issue/official publication date.
    #[serde(default, alias = "date", alias = "issueDate")]
    pub issue_date: Option<String>,
    /// Provider "last updated" timestamp.
    #[serde(default, alias = "lastUpdated")]
    pub last_updated: Option<String>,
    /// Author.
    #[serde(default)]
    pub author: Option<String>,
    /// Provider identifier (`exa`, `perplexity`, ...).
    pub provider: Provider,
}

/// A raw result rejected at the boundary.
#[derive(Debug)]
pub struct Rejected {
    /// Position in the input batch.
    pub index: usize,
    /// Why it was rejected.
    pub error: RankingError,
}

/// Outcome of normalizing a batch.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    /// Accepted documents, in input order.
    pub documents: Vec<Document>,
    /// Rejected results.
    pub rejected: Vec<Rejected>,
}

/// Normalize a single raw result.
///
/// # Errors
/// Returns `MissingField("url")` for a blank url and `InvalidUrl` for a url
/// that cannot be parsed even with an assumed `https://` scheme.
pub fn normalize_result(raw: RawSearchResult) -> RankingResult<Document> {
    let url = raw.url.trim().to_string();
    if url.is_empty() {
        return Err(RankingError::MissingField("url"));
    }
    parse_lenient(&url)?;

    let id = raw
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| url.clone());

    let dates = DateCandidates {
        last_updated: non_blank(raw.last_updated),
        online: non_blank(raw.published_date),
        issue: non_blank(raw.issue_date),
    };

    let mut document = Document::new(id, raw.title.trim(), url, raw.provider)
        .with_snippet(truncate_snippet(&raw.text, MAX_SNIPPET_CHARS))
        .with_dates(dates);

    if let Some(author) = non_blank(raw.author) {
        document = document.with_author(author);
    }
    if let Some(score) = raw.score {
        document = document.with_provider_score(score);
    }

    Ok(document)
}

/// Normalize a batch, collecting rejections instead of failing.
#[must_use]
pub fn normalize_batch(raw: Vec<RawSearchResult>) -> NormalizedBatch {
    collect_batch(raw.into_iter().map(normalize_result))
}

/// Normalize untyped JSON elements.
///
/// An element that does not deserialize into a [`RawSearchResult`] (wrong
/// types, missing `provider`) is rejected on its own with a
/// [`RankingError::Serialization`]; the rest of the batch is kept.
#[must_use]
pub fn normalize_json_batch(values: Vec<Value>) -> NormalizedBatch {
    collect_batch(values.into_iter().map(|value| {
        serde_json::from_value::<RawSearchResult>(value)
            .map_err(RankingError::from)
            .and_then(normalize_result)
    }))
}

fn collect_batch<I>(results: I) -> NormalizedBatch
where
    I: IntoIterator<Item = RankingResult<Document>>,
{
    let mut batch = NormalizedBatch::default();

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(document) => batch.documents.push(document),
            Err(error) => {
                tracing::warn!(index, %error, "rejected raw search result");
                batch.rejected.push(Rejected { index, error });
            }
        }
    }

    batch
}

/// Truncate text to at most `max_chars` characters, ellipsis included.
///
/// Cuts at the last word boundary when that keeps at least 80% of the budget.
#[must_use]
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let budget = max_chars.saturating_sub(ELLIPSIS.len());
    let cut: String = text.chars().take(budget).collect();

    let truncated = match cut.rfind(' ') {
        Some(space) if cut[..space].chars().count() * 5 > budget * 4 => &cut[..space],
        _ => cut.as_str(),
    };

    format!("{}{ELLIPSIS}", truncated.trim_end())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawSearchResult {
        RawSearchResult {
            id: Some("https://techcrunch.com/2025/01/04/ai-news".to_string()),
            title: "AI Breakthrough".to_string(),
            url: "https://techcrunch.com/2025/01/04/ai-news".to_string(),
            text: "Researchers announced a breakthrough.".to_string(),
            score: Some(0.92),
            published_date: Some("2025-01-04".to_string()),
            issue_date: None,
            last_updated: None,
            author: Some("Jane Smith".to_string()),
            provider: Provider::Exa,
        }
    }

    #[test]
    fn test_normalize_preserves_fields() {
        let doc = normalize_result(sample()).unwrap();
        assert_eq!(doc.id(), "https://techcrunch.com/2025/01/04/ai-news");
        assert_eq!(doc.title(), "AI Breakthrough");
        assert_eq!(doc.domain(), Some("techcrunch.com"));
        assert_eq!(doc.author(), Some("Jane Smith"));
        assert_eq!(doc.provider(), &Provider::Exa);
        assert_eq!(doc.provider_score(), Some(0.92));
        assert_eq!(doc.dates().online.as_deref(), Some("2025-01-04"));
    }

    #[test]
    fn test_missing_id_defaults_to_url() {
        let raw = RawSearchResult {
            id: None,
            ..sample()
        };
        let doc = normalize_result(raw).unwrap();
        assert_eq!(doc.id(), doc.url());
    }

    #[test]
    fn test_rejects_missing_or_invalid_url() {
        let blank = RawSearchResult {
            url: "  ".to_string(),
            ..sample()
        };
        assert!(matches!(
            normalize_result(blank),
            Err(RankingError::MissingField("url"))
        ));

        let invalid = RawSearchResult {
            url: "not a url".to_string(),
            ..sample()
        };
        assert!(matches!(
            normalize_result(invalid),
            Err(RankingError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_batch_collects_rejections() {
        let batch = normalize_batch(vec![
            sample(),
            RawSearchResult {
                url: String::new(),
                ..sample()
            },
            sample(),
        ]);
        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].index, 1);
    }

    #[test]
    fn test_json_batch_rejects_malformed_elements_individually() {
        let values: Vec<Value> = serde_json::from_str(
            r#"[
                {"url": "https://nature.com/x", "title": "Ok", "score": 0.8, "provider": "exa"},
                {"url": "https://example.org/y", "title": "No provider"},
                {"url": "https://example.org/z", "title": 42, "provider": "exa"},
                {"url": "", "title": "Blank url", "provider": "perplexity"}
            ]"#,
        )
        .unwrap();

        let batch = normalize_json_batch(values);
        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].title(), "Ok");

        let indices: Vec<usize> = batch.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(matches!(
            batch.rejected[0].error,
            RankingError::Serialization(_)
        ));
        assert!(matches!(
            batch.rejected[2].error,
            RankingError::MissingField("url")
        ));
    }

    #[test]
    fn test_blank_dates_are_dropped() {
        let raw = RawSearchResult {
            published_date: Some("   ".to_string()),
            last_updated: Some("2025-02-01".to_string()),
            ..sample()
        };
        let doc = normalize_result(raw).unwrap();
        assert_eq!(doc.dates().online, None);
        assert_eq!(doc.dates().last_updated.as_deref(), Some("2025-02-01"));
    }

    #[test]
    fn test_deserializes_provider_field_names() {
        let json = r#"[
            {"url": "https://nature.com/x", "title": "Exa", "text": "t", "score": 0.8,
             "publishedDate": "2025-01-04T10:00:00Z", "provider": "exa"},
            {"url": "https://arxiv.org/abs/1", "title": "Pplx", "snippet": "s",
             "date": "2025-03-01", "last_updated": "2025-01-02", "provider": "perplexity"}
        ]"#;
        let raw: Vec<RawSearchResult> = serde_json::from_str(json).unwrap();
        assert_eq!(raw[0].published_date.as_deref(), Some("2025-01-04T10:00:00Z"));
        assert_eq!(raw[1].text, "s");
        assert_eq!(raw[1].issue_date.as_deref(), Some("2025-03-01"));
        assert_eq!(raw[1].last_updated.as_deref(), Some("2025-01-02"));
        assert_eq!(raw[1].provider, Provider::Perplexity);
        assert_eq!(raw[1].id, None);
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_snippet("short text", 1000), "short text");
    }

    #[test]
    fn test_truncate_long_text_at_word_boundary() {
        let long = ["Lorem ipsum dolor sit amet."; 100].join(" ");
        let snippet = truncate_snippet(&long, MAX_SNIPPET_CHARS);
        assert!(snippet.chars().count() <= MAX_SNIPPET_CHARS);
        assert!(snippet.ends_with("..."));
        assert!(!snippet.ends_with(" ..."));
        assert!(snippet.chars().count() > 800);
    }

    #[test]
    fn test_truncate_without_spaces_cuts_hard() {
        let long = "x".repeat(1500);
        let snippet = truncate_snippet(&long, 100);
        assert_eq!(snippet.chars().count(), 100);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let long = "é".repeat(50);
        let snippet = truncate_snippet(&long, 10);
        assert_eq!(snippet, format!("{}...", "é".repeat(7)));
    }
}
