//! Configuration for the heuristic ranker.
//!
//! Weights and the recency halflife are the only tunable parameters. They
//! travel with each ranking call so a personalization layer can vary them
//! per request without touching shared state.

use serde::{Deserialize, Serialize};

use crate::ranking::core::errors::{RankingError, RankingResult};

/// Days a resolved timestamp may sit ahead of "now" before it is clamped.
pub const FUTURE_HORIZON_DAYS: i64 = 14;

/// Default recency halflife in days.
pub const DEFAULT_HALFLIFE_DAYS: f64 = 7.0;

/// Top-level configuration for a ranking call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Fusion weights for the three signals.
    pub weights: FusionWeights,
    /// Days until the recency score decays to 0.5.
    pub recency_halflife_days: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            recency_halflife_days: DEFAULT_HALFLIFE_DAYS,
        }
    }
}

impl RankingConfig {
    /// Build a config from explicit weights and the default halflife.
    #[must_use]
    pub fn with_weights(weights: FusionWeights) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    /// Override the recency halflife.
    #[must_use]
    pub const fn with_halflife_days(mut self, days: f64) -> Self {
        self.recency_halflife_days = days;
        self
    }

    /// Parse and validate a JSON config document.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json_str(json: &str) -> RankingResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> RankingResult<()> {
        self.weights.validate()?;

        if !self.recency_halflife_days.is_finite() || self.recency_halflife_days <= 0.0 {
            return Err(RankingError::InvalidConfig(format!(
                "recency_halflife_days must be a positive number, got {}",
                self.recency_halflife_days
            )));
        }

        Ok(())
    }
}

/// Relative weights of the three ranking signals.
///
/// The weights do not need to sum to one; fusion divides by their sum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    /// Recency weight.
    pub recency: f64,
    /// Domain authority weight.
    pub authority: f64,
    /// Provider relevance weight.
    pub provider: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            recency: 0.4,
            authority: 0.3,
            provider: 0.3,
        }
    }
}

impl FusionWeights {
    /// Create a weight triple.
    #[must_use]
    pub const fn new(recency: f64, authority: f64, provider: f64) -> Self {
        Self {
            recency,
            authority,
            provider,
        }
    }

    /// Sum of the three weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.recency + self.authority + self.provider
    }

    /// Validate that every weight is finite and non-negative and that at least one is positive.
    ///
    /// # Errors
    /// Returns an error describing the first offending weight.
    pub fn validate(&self) -> RankingResult<()> {
        for (name, value) in [
            ("recency", self.recency),
            ("authority", self.authority),
            ("provider", self.provider),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RankingError::InvalidConfig(format!(
                    "weights.{name} must be a finite, non-negative number, got {value}"
                )));
            }
        }

        if self.total() <= 0.0 {
            return Err(RankingError::InvalidConfig(
                "at least one weight must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
