//! Ranked output with score breakdown.
//!
//! Every ranked document carries the three sub-scores, the weights that were
//! used, and each weighted contribution, so a caller can rebuild the fused
//! score without re-running the ranker:
//!
//! `score = 100 * sum(contribution) / total_weight`

use std::fmt;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ranking::authority::AuthorityTier;
use crate::ranking::core::config::FusionWeights;
use crate::ranking::core::document::Document;
use crate::ranking::dates::{DateField, ResolvedDate};

const EXPLAIN_TITLE_CHARS: usize = 60;

/// A ranking signal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Freshness of the effective date.
    Recency,
    /// Trust tier of the source domain.
    Authority,
    /// Provider relevance.
    Provider,
}

impl Signal {
    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recency => "recency",
            Self::Authority => "authority",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sub-scores of one document, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    /// Recency score.
    pub recency: f64,
    /// Authority score.
    pub authority: f64,
    /// Provider score.
    pub provider: f64,
}

impl SubScores {
    /// Sub-score for a given signal.
    #[must_use]
    pub const fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Recency => self.recency,
            Signal::Authority => self.authority,
            Signal::Provider => self.provider,
        }
    }
}

/// One signal's share of the fused score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Signal.
    pub signal: Signal,
    /// Weight applied.
    pub weight: f64,
    /// Sub-score in `[0, 1]`.
    pub sub_score: f64,
    /// `weight * sub_score`.
    pub contribution: f64,
}

/// Explain trace for a ranked document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Contributions in signal order: recency, authority, provider.
    pub contributions: [Contribution; 3],
    /// Sum of the weights; the fused score is normalized by it.
    pub total_weight: f64,
    /// Authority tier of the source domain.
    pub authority_tier: AuthorityTier,
    /// Effective date after clamping.
    pub effective_date: Option<DateTime<Utc>>,
    /// Candidate field that supplied the effective date.
    pub date_field: Option<DateField>,
    /// Whether the date was clamped from beyond the future horizon.
    pub date_clamped: bool,
    /// Age in days at ranking time.
    pub age_days: Option<f64>,
}

impl Explanation {
    pub(crate) fn new(
        sub_scores: &SubScores,
        weights: &FusionWeights,
        authority_tier: AuthorityTier,
        date: &ResolvedDate,
        age_days: Option<f64>,
    ) -> Self {
        let contribution = |signal: Signal, weight: f64| {
            let sub_score = sub_scores.get(signal);
            Contribution {
                signal,
                weight,
                sub_score,
                contribution: weight * sub_score,
            }
        };

        Self {
            contributions: [
                contribution(Signal::Recency, weights.recency),
                contribution(Signal::Authority, weights.authority),
                contribution(Signal::Provider, weights.provider),
            ],
            total_weight: weights.total(),
            authority_tier,
            effective_date: date.effective,
            date_field: date.field,
            date_clamped: date.clamped,
            age_days,
        }
    }

    /// Contribution of a given signal.
    #[must_use]
    pub fn contribution(&self, signal: Signal) -> &Contribution {
        match signal {
            Signal::Recency => &self.contributions[0],
            Signal::Authority => &self.contributions[1],
            Signal::Provider => &self.contributions[2],
        }
    }

    /// Fused score rebuilt from the contributions, on `[0, 100]`.
    #[must_use]
    pub fn fused_score(&self) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        let sum: f64 = self.contributions.iter().map(|c| c.contribution).sum();
        (100.0 * sum / self.total_weight).clamp(0.0, 100.0)
    }
}

/// A document with its fused score, sub-scores, rank and explain trace.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedDocument {
    rank: usize,
    score: f64,
    sub_scores: SubScores,
    explanation: Explanation,
    document: Document,
}

impl RankedDocument {
    pub(crate) fn new(document: Document, sub_scores: SubScores, explanation: Explanation) -> Self {
        let score = explanation.fused_score();
        Self {
            rank: 0,
            score,
            sub_scores,
            explanation,
            document,
        }
    }

    pub(crate) fn with_rank(self, rank: usize) -> Self {
        Self { rank, ..self }
    }

    /// 1-based position in the ranking.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Fused score on `[0, 100]`.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Sub-scores on `[0, 1]`.
    #[must_use]
    pub const fn sub_scores(&self) -> &SubScores {
        &self.sub_scores
    }

    /// Explain trace.
    #[must_use]
    pub const fn explanation(&self) -> &Explanation {
        &self.explanation
    }

    /// Wrapped document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Unwrap into the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Effective date used for recency and tie-breaking.
    #[must_use]
    pub const fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.explanation.effective_date
    }

    /// Human-readable explanation of the score.
    #[must_use]
    pub fn explain(&self) -> String {
        let doc = &self.document;
        let exp = &self.explanation;

        let title: String = doc.title().chars().take(EXPLAIN_TITLE_CHARS).collect();
        let ellipsis = if doc.title().chars().count() > EXPLAIN_TITLE_CHARS {
            "..."
        } else {
            ""
        };

        let age = match (exp.age_days, exp.date_clamped) {
            (_, true) => "future date clamped to now".to_string(),
            (Some(days), false) => format!("{days:.1} days old"),
            (None, false) => "unknown age".to_string(),
        };

        let mut out = String::new();
        let _ = writeln!(out, "Rank #{} - Score: {:.1}", self.rank, self.score);
        let _ = writeln!(out, "Title: \"{title}{ellipsis}\"");
        let _ = writeln!(
            out,
            "Domain: {} ({}, authority={:.2})",
            doc.domain().unwrap_or("unknown"),
            exp.authority_tier,
            self.sub_scores.authority
        );
        let _ = writeln!(
            out,
            "Recency: {age} (score={:.2})",
            self.sub_scores.recency
        );
        let _ = writeln!(
            out,
            "Provider: {} (score={:.2})",
            doc.provider().as_str().to_uppercase(),
            self.sub_scores.provider
        );
        let parts: Vec<String> = exp
            .contributions
            .iter()
            .map(|c| {
                format!(
                    "{} {:.2} x {:.2} = {:.3}",
                    c.signal, c.weight, c.sub_score, c.contribution
                )
            })
            .collect();
        let _ = write!(
            out,
            "Contributions: {} (total weight {:.2})",
            parts.join(", "),
            exp.total_weight
        );
        out
    }
}

impl fmt::Display for RankedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.explain())
    }
}
