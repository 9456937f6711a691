//! Domain authority tiers.
//!
//! Source domains are classified into discrete trust tiers, each carrying a
//! fixed numeric score. The classification is data: a table from normalized
//! domain to tier. Lookups are exact after normalization (lower-case, leading
//! `www.` removed); anything not in the table is [`AuthorityTier::Unknown`].
//!
//! [`AuthorityLookup`] is the seam that lets a learned or per-user authority
//! source replace the static table without touching the ranker.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::ranking::core::document::normalize_domain;

/// Trust tier of a source domain.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityTier {
    /// Premium tech press and official lab/company sources.
    Premium,
    /// Universities and preprint servers.
    Academic,
    /// Academic publishers.
    Publisher,
    /// Respected general tech publications.
    Respected,
    /// Developer and practitioner communities.
    Community,
    /// Open contributor platforms with variable quality.
    Contributor,
    /// Mainstream and wire news.
    Mainstream,
    /// Encyclopedic reference material.
    Reference,
    /// Anything not in the table.
    Unknown,
}

impl AuthorityTier {
    /// All tiers, best first.
    pub const ALL: [Self; 9] = [
        Self::Premium,
        Self::Academic,
        Self::Publisher,
        Self::Respected,
        Self::Community,
        Self::Contributor,
        Self::Mainstream,
        Self::Reference,
        Self::Unknown,
    ];

    /// Numeric authority score in `[0, 1]`.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Premium => 1.0,
            Self::Academic => 0.95,
            Self::Publisher => 0.9,
            Self::Respected => 0.85,
            Self::Community => 0.8,
            Self::Contributor => 0.75,
            Self::Mainstream => 0.7,
            Self::Reference => 0.65,
            Self::Unknown => 0.5,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Premium => "Premium",
            Self::Academic => "Academic",
            Self::Publisher => "Publisher",
            Self::Respected => "Respected",
            Self::Community => "Community",
            Self::Contributor => "Contributor",
            Self::Mainstream => "Mainstream",
            Self::Reference => "Reference",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AuthorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Source of domain authority.
pub trait AuthorityLookup: Send + Sync {
    /// Tier for a domain. Implementations must normalize the input themselves
    /// and fall back to [`AuthorityTier::Unknown`] rather than fail.
    fn tier(&self, domain: &str) -> AuthorityTier;

    /// Numeric score for a domain. Defaults to the tier's score.
    fn score(&self, domain: &str) -> f64 {
        self.tier(domain).score()
    }
}

impl<T: AuthorityLookup + ?Sized> AuthorityLookup for &T {
    fn tier(&self, domain: &str) -> AuthorityTier {
        (**self).tier(domain)
    }

    fn score(&self, domain: &str) -> f64 {
        (**self).score(domain)
    }
}

/// Builtin classification.
const BUILTIN_DOMAINS: &[(&str, AuthorityTier)] = &[
    // Tech press
    ("techcrunch.com", AuthorityTier::Premium),
    ("theverge.com", AuthorityTier::Premium),
    ("arstechnica.com", AuthorityTier::Premium),
    ("wired.com", AuthorityTier::Premium),
    ("engadget.com", AuthorityTier::Premium),
    ("theinformation.com", AuthorityTier::Premium),
    ("stratechery.com", AuthorityTier::Premium),
    // Labs and company announcements
    ("openai.com", AuthorityTier::Premium),
    ("anthropic.com", AuthorityTier::Premium),
    ("deepmind.com", AuthorityTier::Premium),
    ("google.com", AuthorityTier::Premium),
    ("microsoft.com", AuthorityTier::Premium),
    ("apple.com", AuthorityTier::Premium),
    ("meta.com", AuthorityTier::Premium),
    ("nvidia.com", AuthorityTier::Premium),
    // Research institutions
    ("arxiv.org", AuthorityTier::Academic),
    ("scholar.google.com", AuthorityTier::Academic),
    ("mit.edu", AuthorityTier::Academic),
    ("stanford.edu", AuthorityTier::Academic),
    ("berkeley.edu", AuthorityTier::Academic),
    ("caltech.edu", AuthorityTier::Academic),
    ("ox.ac.uk", AuthorityTier::Academic),
    ("cam.ac.uk", AuthorityTier::Academic),
    // Publishers
    ("nature.com", AuthorityTier::Publisher),
    ("science.org", AuthorityTier::Publisher),
    ("sciencedirect.com", AuthorityTier::Publisher),
    ("springer.com", AuthorityTier::Publisher),
    ("ieee.org", AuthorityTier::Publisher),
    ("acm.org", AuthorityTier::Publisher),
    ("plos.org", AuthorityTier::Publisher),
    ("venturebeat.com", AuthorityTier::Respected),
    ("zdnet.com", AuthorityTier::Respected),
    ("cnet.com", AuthorityTier::Respected),
    ("technologyreview.com", AuthorityTier::Respected),
    ("theatlantic.com", AuthorityTier::Respected),
    ("newyorker.com", AuthorityTier::Respected),
    // Practitioner communities
    ("hackernews.com", AuthorityTier::Community),
    ("ycombinator.com", AuthorityTier::Community),
    ("news.ycombinator.com", AuthorityTier::Community),
    ("github.com", AuthorityTier::Community),
    ("stackoverflow.com", AuthorityTier::Community),
    ("dev.to", AuthorityTier::Community),
    ("medium.com", AuthorityTier::Contributor),
    ("reuters.com", AuthorityTier::Mainstream),
    ("bloomberg.com", AuthorityTier::Mainstream),
    ("wsj.com", AuthorityTier::Mainstream),
    ("nytimes.com", AuthorityTier::Mainstream),
    ("washingtonpost.com", AuthorityTier::Mainstream),
    ("theguardian.com", AuthorityTier::Mainstream),
    ("bbc.co.uk", AuthorityTier::Mainstream),
    ("bbc.com", AuthorityTier::Mainstream),
    ("wikipedia.org", AuthorityTier::Reference),
    ("en.wikipedia.org", AuthorityTier::Reference),
];

static BUILTIN_TABLE: LazyLock<DomainAuthorityTable> =
    LazyLock::new(|| DomainAuthorityTable::from_entries(BUILTIN_DOMAINS.iter().copied()));

/// Immutable mapping from normalized domain to authority tier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainAuthorityTable {
    entries: HashMap<String, AuthorityTier>,
}

impl DomainAuthorityTable {
    /// The builtin table, shared process-wide.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN_TABLE
    }

    /// A table with no entries; every domain resolves to `Unknown`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from `(domain, tier)` pairs. Keys are normalized; later
    /// duplicates win.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, AuthorityTier)>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(domain, tier)| (normalize_domain(domain.as_ref()), tier))
            .filter(|(domain, _)| !domain.is_empty())
            .collect();
        Self { entries }
    }

    /// Return a copy of this table with one more entry.
    #[must_use]
    pub fn with_entry(mut self, domain: &str, tier: AuthorityTier) -> Self {
        let domain = normalize_domain(domain);
        if !domain.is_empty() {
            self.entries.insert(domain, tier);
        }
        self
    }

    /// Exact lookup after normalization.
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<AuthorityTier> {
        self.entries.get(&normalize_domain(domain)).copied()
    }

    /// Number of classified domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AuthorityLookup for DomainAuthorityTable {
    fn tier(&self, domain: &str) -> AuthorityTier {
        self.get(domain).unwrap_or(AuthorityTier::Unknown)
    }
}
