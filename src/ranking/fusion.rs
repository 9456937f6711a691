//! Weighted fusion of sub-scores and deterministic ordering.
//!
//! `score = 100 * (w_r * recency + w_a * authority + w_p * provider) / (w_r + w_a + w_p)`
//!
//! Ordering is total: fused score descending (scores sharing a
//! [`SCORE_TOLERANCE`] bucket are equal), then authority descending, then
//! effective date newest first (unknown last), then input order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::ranking::authority::{AuthorityLookup, DomainAuthorityTable};
use crate::ranking::core::config::{FusionWeights, RankingConfig};
use crate::ranking::core::document::Document;
use crate::ranking::core::errors::RankingResult;
use crate::ranking::core::ranked::{Explanation, RankedDocument, SubScores};
use crate::ranking::dates::resolve_effective_date;
use crate::ranking::signals::{ProviderNormalizer, authority_score, recency_score};

/// Width of the grid fused scores are rounded to before comparison.
///
/// Scores that round to the same multiple of this value are tied and fall
/// through to the authority, date and input-order tie-breaks. Pairwise
/// "closer than the tolerance" is not transitive, so ties are decided by
/// bucket instead: two scores less than one tolerance apart still compare
/// unequal when they straddle a bucket boundary (for example `50.0` and
/// `50.0 + 6e-10`), and are then ordered by score alone.
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// Heuristic ranker bound to one configuration and authority source.
///
/// The ranker holds no mutable state; one instance can serve concurrent callers.
#[derive(Clone, Debug)]
pub struct Ranker<A = &'static DomainAuthorityTable> {
    config: RankingConfig,
    authority: A,
}

impl Ranker {
    /// Create a ranker using the builtin domain authority table.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: RankingConfig) -> RankingResult<Self> {
        Self::with_authority(config, DomainAuthorityTable::builtin())
    }
}

impl<A: AuthorityLookup> Ranker<A> {
    /// Create a ranker with a custom authority source.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_authority(config: RankingConfig, authority: A) -> RankingResult<Self> {
        config.validate()?;
        Ok(Self { config, authority })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Rank a batch at the given instant.
    ///
    /// Total over well-formed documents: unknown dates, domains and providers
    /// score neutrally. An empty batch yields an empty ranking.
    #[must_use]
    pub fn rank(&self, documents: Vec<Document>, now: DateTime<Utc>) -> Vec<RankedDocument> {
        if documents.is_empty() {
            return Vec::new();
        }

        tracing::debug!(
            documents = documents.len(),
            recency_weight = self.config.weights.recency,
            authority_weight = self.config.weights.authority,
            provider_weight = self.config.weights.provider,
            halflife_days = self.config.recency_halflife_days,
            "ranking batch"
        );

        let providers = ProviderNormalizer::from_documents(&documents);

        #[cfg(feature = "parallel")]
        let mut scored: Vec<(usize, RankedDocument)> = documents
            .into_par_iter()
            .enumerate()
            .map(|(index, document)| (index, self.score_document(document, &providers, now)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let mut scored: Vec<(usize, RankedDocument)> = documents
            .into_iter()
            .enumerate()
            .map(|(index, document)| (index, self.score_document(document, &providers, now)))
            .collect();

        scored.sort_by(|(ia, a), (ib, b)| compare_ranked(a, b).then_with(|| ia.cmp(ib)));

        scored
            .into_iter()
            .enumerate()
            .map(|(position, (_, ranked))| ranked.with_rank(position + 1))
            .collect()
    }

    /// Rank a batch at the current wall-clock time.
    #[must_use]
    pub fn rank_now(&self, documents: Vec<Document>) -> Vec<RankedDocument> {
        self.rank(documents, Utc::now())
    }

    fn score_document(
        &self,
        document: Document,
        providers: &ProviderNormalizer,
        now: DateTime<Utc>,
    ) -> RankedDocument {
        let date = resolve_effective_date(document.dates(), now);
        let (tier, authority) = authority_score(&self.authority, &document);
        let sub_scores = SubScores {
            recency: recency_score(&date, now, self.config.recency_halflife_days),
            authority,
            provider: providers.score(&document),
        };
        let explanation = Explanation::new(
            &sub_scores,
            &self.config.weights,
            tier,
            &date,
            date.age_days(now),
        );
        let ranked = RankedDocument::new(document, sub_scores, explanation);

        tracing::trace!(
            id = ranked.document().id(),
            score = ranked.score(),
            recency = sub_scores.recency,
            authority = sub_scores.authority,
            provider = sub_scores.provider,
            "scored document"
        );

        ranked
    }
}

/// Rank documents with the builtin authority table.
///
/// # Errors
/// Returns an error if the configuration is invalid.
pub fn rank_documents(
    documents: Vec<Document>,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> RankingResult<Vec<RankedDocument>> {
    Ok(Ranker::new(config.clone())?.rank(documents, now))
}

/// Fuse sub-scores into a `[0, 100]` score, normalizing by the weight sum.
///
/// Returns 0.0 when the weights sum to zero or less.
#[must_use]
pub fn fuse(sub_scores: &SubScores, weights: &FusionWeights) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted = weights.provider.mul_add(
        sub_scores.provider,
        weights
            .authority
            .mul_add(sub_scores.authority, weights.recency * sub_scores.recency),
    );
    (100.0 * weighted / total).clamp(0.0, 100.0)
}

#[allow(clippy::cast_possible_truncation)] // Scores are bounded to [0, 100]
fn score_bucket(score: f64) -> i64 {
    (score / SCORE_TOLERANCE).round() as i64
}

/// Ranking order of two scored documents, input order aside.
fn compare_ranked(a: &RankedDocument, b: &RankedDocument) -> Ordering {
    score_bucket(b.score())
        .cmp(&score_bucket(a.score()))
        .then_with(|| b.sub_scores().authority.total_cmp(&a.sub_scores().authority))
        .then_with(|| b.effective_date().cmp(&a.effective_date()))
}
