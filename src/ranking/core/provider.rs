//! Search providers and their native relevance scales.
//!
//! Providers disagree about what a relevance score means. Each known provider
//! declares a [`ProviderScale`] describing how its raw numbers are mapped onto
//! `[0, 1]`; providers the ranker does not recognise keep their identifier and
//! are scored with a neutral provider signal.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of the search backend a document came from.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    /// Exa neural search.
    Exa,
    /// Perplexity search.
    Perplexity,
    /// Any provider this crate has no scale for (stored lower-cased).
    Unknown(String),
}

impl Provider {
    /// Stable string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exa => "exa",
            Self::Perplexity => "perplexity",
            Self::Unknown(name) => name,
        }
    }

    /// Native scale of this provider's raw relevance score, if known.
    #[must_use]
    pub const fn scale(&self) -> Option<ProviderScale> {
        match self {
            Self::Exa => Some(ProviderScale::UnitInterval),
            Self::Perplexity => Some(ProviderScale::RankDecay),
            Self::Unknown(_) => None,
        }
    }

    /// Whether this is a provider with a defined scale.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.scale().is_some()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "exa" => Self::Exa,
            "perplexity" => Self::Perplexity,
            _ => Self::Unknown(normalized),
        })
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(provider) => provider,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Provider {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> Self {
        value.as_str().to_string()
    }
}

/// How a provider's raw relevance score maps onto `[0, 1]`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderScale {
    /// Raw scores already live on `[0, 1]`; values outside are clamped.
    UnitInterval,
    /// Raw scores only carry an ordering. Within one batch, a document outranked
    /// by `k` same-provider documents scores `exp(-RANK_DECAY_RATE * k)`.
    RankDecay,
}

impl ProviderScale {
    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnitInterval => "unit_interval",
            Self::RankDecay => "rank_decay",
        }
    }
}

impl fmt::Display for ProviderScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_providers_case_insensitive() {
        assert_eq!(Provider::from("EXA"), Provider::Exa);
        assert_eq!(Provider::from(" Perplexity "), Provider::Perplexity);
    }

    #[test]
    fn test_unknown_provider_keeps_identifier() {
        let provider = Provider::from("Brave");
        assert_eq!(provider, Provider::Unknown("brave".to_string()));
        assert_eq!(provider.as_str(), "brave");
        assert!(!provider.is_known());
        assert_eq!(provider.scale(), None);
    }

    #[test]
    fn test_scales() {
        assert_eq!(Provider::Exa.scale(), Some(ProviderScale::UnitInterval));
        assert_eq!(Provider::Perplexity.scale(), Some(ProviderScale::RankDecay));
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&Provider::Perplexity).unwrap();
        assert_eq!(json, "\"perplexity\"");

        let parsed: Provider = serde_json::from_str("\"you.com\"").unwrap();
        assert_eq!(parsed, Provider::Unknown("you.com".to_string()));
    }
}
