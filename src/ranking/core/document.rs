//! Normalized documents handed to the ranker.
//!
//! A document's domain is always derived from its url by [`domain_from_url`];
//! there is no setter for either, so two documents sharing a url always
//! classify identically.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ranking::core::provider::Provider;

/// Candidate timestamps as reported by the provider, kept unparsed.
///
/// The date resolver picks the first usable one in the order
/// `last_updated`, `online`, `issue`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DateCandidates {
    /// Provider-supplied "last updated" timestamp.
    pub last_updated: Option<String>,
    /// When the item first appeared online.
    pub online: Option<String>,
    /// Nominal issue/print date (journals may date issues months ahead).
    pub issue: Option<String>,
}

impl DateCandidates {
    /// Whether no candidate carries any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.last_updated, &self.online, &self.issue]
            .iter()
            .all(|field| field.as_deref().is_none_or(|raw| raw.trim().is_empty()))
    }
}

/// A content item normalized from a provider result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Document {
    id: String,
    title: String,
    url: String,
    domain: Option<String>,
    snippet: String,
    author: Option<String>,
    dates: DateCandidates,
    provider: Provider,
    provider_score: Option<f64>,
}

impl Document {
    /// Create a document; the domain is derived from `url`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        provider: Provider,
    ) -> Self {
        let url = url.into();
        let domain = domain_from_url(&url);
        Self {
            id: id.into(),
            title: title.into(),
            url,
            domain,
            snippet: String::new(),
            author: None,
            dates: DateCandidates::default(),
            provider,
            provider_score: None,
        }
    }

    /// Set the snippet text.
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the raw provider relevance score.
    #[must_use]
    pub const fn with_provider_score(mut self, score: f64) -> Self {
        self.provider_score = Some(score);
        self
    }

    /// Replace all candidate timestamps.
    #[must_use]
    pub fn with_dates(mut self, dates: DateCandidates) -> Self {
        self.dates = dates;
        self
    }

    /// Set the provider's "last updated" timestamp.
    #[must_use]
    pub fn with_last_updated(mut self, raw: impl Into<String>) -> Self {
        self.dates.last_updated = Some(raw.into());
        self
    }

    /// Set the online publication timestamp.
    #[must_use]
    pub fn with_online_date(mut self, raw: impl Into<String>) -> Self {
        self.dates.online = Some(raw.into());
        self
    }

    /// Set the issue publication timestamp.
    #[must_use]
    pub fn with_issue_date(mut self, raw: impl Into<String>) -> Self {
        self.dates.issue = Some(raw.into());
        self
    }

    /// Stable identifier (url or provider id).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Url as supplied.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Normalized source domain, if the url has a host.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Snippet text.
    #[must_use]
    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// Author, if known.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Candidate timestamps.
    #[must_use]
    pub const fn dates(&self) -> &DateCandidates {
        &self.dates
    }

    /// Provider the document came from.
    #[must_use]
    pub const fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Raw provider relevance score on the provider's native scale.
    #[must_use]
    pub const fn provider_score(&self) -> Option<f64> {
        self.provider_score
    }
}

/// Normalize a bare domain: trim, lower-case, drop a trailing dot and one leading `www.`.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.trim().trim_end_matches('.').to_lowercase();
    match lowered.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => lowered,
    }
}

/// Parse a url, assuming `https://` when the input has no usable scheme.
pub(crate) fn parse_lenient(url: &str) -> Result<Url, url::ParseError> {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => Ok(parsed),
        _ => Url::parse(&format!("https://{trimmed}")),
    }
}

/// Derive the normalized source domain of a url.
///
/// `HTTPS://WWW.Example.COM/x` and `example.com/x` both yield `example.com`.
/// Returns `None` when no host can be extracted.
#[must_use]
pub fn domain_from_url(url: &str) -> Option<String> {
    if url.trim().is_empty() {
        return None;
    }

    let parsed = parse_lenient(url).ok()?;
    parsed
        .host_str()
        .map(normalize_domain)
        .filter(|domain| !domain.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_from_url_normalizes_case_and_www() {
        assert_eq!(
            domain_from_url("HTTPS://WWW.Example.COM/x"),
            Some("example.com".to_string())
        );
        assert_eq!(domain_from_url("example.com/x"), Some("example.com".to_string()));
        assert_eq!(
            domain_from_url("http://blog.openai.com/post?id=1"),
            Some("blog.openai.com".to_string())
        );
    }

    #[test]
    fn test_domain_from_url_without_host() {
        assert_eq!(domain_from_url(""), None);
        assert_eq!(domain_from_url("   "), None);
        assert_eq!(domain_from_url("not a url"), None);
    }

    #[test]
    fn test_normalize_domain_strips_only_leading_www() {
        assert_eq!(normalize_domain("WWW.TechCrunch.com."), "techcrunch.com");
        assert_eq!(normalize_domain("awww.example.com"), "awww.example.com");
        assert_eq!(normalize_domain("www.www.example.com"), "www.example.com");
    }

    #[test]
    fn test_documents_sharing_url_share_domain() {
        let a = Document::new("a", "A", "https://www.arxiv.org/abs/1", Provider::Exa);
        let b = Document::new("b", "B", "https://www.arxiv.org/abs/1", Provider::Perplexity);
        assert_eq!(a.domain(), b.domain());
        assert_eq!(a.domain(), Some("arxiv.org"));
    }

    #[test]
    fn test_builder_sets_dates_and_score() {
        let doc = Document::new("1", "Title", "https://example.com", Provider::Exa)
            .with_snippet("text")
            .with_author("Jane")
            .with_provider_score(0.7)
            .with_online_date("2025-01-04")
            .with_issue_date("2025-03-01");

        assert_eq!(doc.snippet(), "text");
        assert_eq!(doc.author(), Some("Jane"));
        assert_eq!(doc.provider_score(), Some(0.7));
        assert_eq!(doc.dates().online.as_deref(), Some("2025-01-04"));
        assert_eq!(doc.dates().issue.as_deref(), Some("2025-03-01"));
        assert!(doc.dates().last_updated.is_none());
        assert!(!doc.dates().is_empty());
    }

    #[test]
    fn test_blank_dates_count_as_empty() {
        let dates = DateCandidates {
            last_updated: Some("  ".to_string()),
            online: None,
            issue: Some(String::new()),
        };
        assert!(dates.is_empty());
    }
}
