//! Per-document sub-scores, each on `[0, 1]`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::ranking::authority::{AuthorityLookup, AuthorityTier};
use crate::ranking::core::config::DEFAULT_HALFLIFE_DAYS;
use crate::ranking::core::document::Document;
use crate::ranking::core::provider::{Provider, ProviderScale};
use crate::ranking::dates::ResolvedDate;

/// Score used when a signal cannot be determined.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Decay rate of [`ProviderScale::RankDecay`] per outranking document.
pub const RANK_DECAY_RATE: f64 = 0.2;

/// Exponential recency decay: `0.5 ^ (age_days / halflife_days)`.
///
/// Unknown dates score [`NEUTRAL_SCORE`]; dates at or ahead of `now` score 1.0.
#[must_use]
pub fn recency_score(date: &ResolvedDate, now: DateTime<Utc>, halflife_days: f64) -> f64 {
    let Some(age_days) = date.age_days(now) else {
        return NEUTRAL_SCORE;
    };

    let halflife = if halflife_days.is_finite() && halflife_days > 0.0 {
        halflife_days
    } else {
        DEFAULT_HALFLIFE_DAYS
    };

    0.5_f64.powf(age_days / halflife).clamp(0.0, 1.0)
}

/// Authority tier and score for a document's domain.
///
/// Documents without a domain are `Unknown`. Scores from custom lookups are
/// clamped to `[0, 1]`, and a non-finite score falls back to the tier's score.
#[must_use]
pub fn authority_score<A: AuthorityLookup + ?Sized>(
    lookup: &A,
    document: &Document,
) -> (AuthorityTier, f64) {
    let Some(domain) = document.domain() else {
        return (AuthorityTier::Unknown, AuthorityTier::Unknown.score());
    };

    let tier = lookup.tier(domain);
    let score = lookup.score(domain);
    let score = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        tier.score()
    };
    (tier, score)
}

/// Maps raw provider scores onto `[0, 1]` for one ranking batch.
///
/// Only documents of the same provider influence each other; a provider's
/// scale never sees another provider's numbers. The mapping is strictly
/// increasing within a provider: a higher raw score never yields a lower
/// sub-score.
#[derive(Clone, Debug, Default)]
pub struct ProviderNormalizer {
    // Raw scores per rank-decay provider, sorted descending.
    rank_pools: HashMap<Provider, Vec<f64>>,
    // (min, max) raw score per unit-interval provider.
    unit_bounds: HashMap<Provider, (f64, f64)>,
}

impl ProviderNormalizer {
    /// Build the normalizer for a batch.
    #[must_use]
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut rank_pools: HashMap<Provider, Vec<f64>> = HashMap::new();
        let mut unit_bounds: HashMap<Provider, (f64, f64)> = HashMap::new();
        for document in documents {
            let Some(raw) = document.provider_score().filter(|raw| raw.is_finite()) else {
                continue;
            };
            match document.provider().scale() {
                Some(ProviderScale::RankDecay) => rank_pools
                    .entry(document.provider().clone())
                    .or_default()
                    .push(raw),
                Some(ProviderScale::UnitInterval) => {
                    let bounds = unit_bounds
                        .entry(document.provider().clone())
                        .or_insert((raw, raw));
                    *bounds = (bounds.0.min(raw), bounds.1.max(raw));
                }
                None => {}
            }
        }

        for pool in rank_pools.values_mut() {
            pool.sort_by(|a, b| b.total_cmp(a));
        }

        Self {
            rank_pools,
            unit_bounds,
        }
    }

    /// Provider sub-score for a document of this batch.
    ///
    /// Unknown providers and missing or non-finite raw scores are neutral.
    #[must_use]
    pub fn score(&self, document: &Document) -> f64 {
        let Some(scale) = document.provider().scale() else {
            return NEUTRAL_SCORE;
        };
        let Some(raw) = document.provider_score().filter(|raw| raw.is_finite()) else {
            return NEUTRAL_SCORE;
        };

        match scale {
            ProviderScale::UnitInterval => self
                .unit_bounds
                .get(document.provider())
                .map_or(raw, |&(min, max)| unit_interval(raw, min, max))
                .clamp(0.0, 1.0),
            ProviderScale::RankDecay => {
                let outranked_by = self
                    .rank_pools
                    .get(document.provider())
                    .map_or(0, |pool| pool.partition_point(|other| *other > raw));
                rank_decay(outranked_by)
            }
        }
    }
}

/// Identity while the provider's batch stays on `[0, 1]`, otherwise min-max
/// rescaling over that provider's scores. A single out-of-range value has no
/// spread to rescale and is clamped.
fn unit_interval(raw: f64, min: f64, max: f64) -> f64 {
    if (0.0..=1.0).contains(&min) && (0.0..=1.0).contains(&max) {
        raw
    } else if max > min {
        (raw - min) / (max - min)
    } else {
        raw.clamp(0.0, 1.0)
    }
}

#[allow(clippy::cast_precision_loss)] // Batch positions are small
fn rank_decay(outranked_by: usize) -> f64 {
    (-RANK_DECAY_RATE * outranked_by as f64).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::authority::DomainAuthorityTable;
    use crate::ranking::dates::DateField;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn dated(age: TimeDelta) -> ResolvedDate {
        ResolvedDate {
            effective: Some(now() - age),
            field: Some(DateField::Online),
            clamped: false,
        }
    }

    fn doc(provider: Provider, score: Option<f64>) -> Document {
        let doc = Document::new("id", "t", "https://example.com", provider);
        match score {
            Some(score) => doc.with_provider_score(score),
            None => doc,
        }
    }

    #[test]
    fn test_recency_today_is_one() {
        let score = recency_score(&dated(TimeDelta::zero()), now(), 7.0);
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recency_halflife_decay() {
        let week = recency_score(&dated(TimeDelta::days(7)), now(), 7.0);
        assert!((week - 0.5).abs() < 1e-12);

        let fortnight = recency_score(&dated(TimeDelta::days(14)), now(), 7.0);
        assert!((fortnight - 0.25).abs() < 1e-12);

        let custom = recency_score(&dated(TimeDelta::days(3)), now(), 3.0);
        assert!((custom - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_recency_old_content_stays_in_range() {
        let year = recency_score(&dated(TimeDelta::days(365)), now(), 7.0);
        assert!(year > 0.0 && year < 0.01);
    }

    #[test]
    fn test_recency_unknown_is_neutral() {
        let score = recency_score(&ResolvedDate::unknown(), now(), 7.0);
        assert!((score - NEUTRAL_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recency_future_date_is_one() {
        let ahead = ResolvedDate {
            effective: Some(now() + TimeDelta::days(3)),
            field: Some(DateField::Issue),
            clamped: false,
        };
        assert!((recency_score(&ahead, now(), 7.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_authority_score_uses_derived_domain() {
        let table = DomainAuthorityTable::builtin();
        let premium = Document::new("1", "t", "https://WWW.TechCrunch.com/a", Provider::Exa);
        assert_eq!(
            authority_score(table, &premium),
            (AuthorityTier::Premium, 1.0)
        );

        let hostless = Document::new("2", "t", "", Provider::Exa);
        assert_eq!(
            authority_score(table, &hostless),
            (AuthorityTier::Unknown, 0.5)
        );
    }

    #[test]
    fn test_unit_interval_in_range_is_identity() {
        let docs = [
            doc(Provider::Exa, Some(0.9)),
            doc(Provider::Exa, Some(0.25)),
            doc(Provider::Exa, Some(1.0)),
        ];
        let normalizer = ProviderNormalizer::from_documents(&docs);
        assert!((normalizer.score(&docs[0]) - 0.9).abs() < f64::EPSILON);
        assert!((normalizer.score(&docs[1]) - 0.25).abs() < f64::EPSILON);
        assert!((normalizer.score(&docs[2]) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_interval_out_of_range_keeps_order() {
        let docs = [doc(Provider::Exa, Some(1.2)), doc(Provider::Exa, Some(1.5))];
        let normalizer = ProviderNormalizer::from_documents(&docs);
        let low = normalizer.score(&docs[0]);
        let high = normalizer.score(&docs[1]);
        assert!(high > low);
        assert!(low.abs() < f64::EPSILON);
        assert!((high - 1.0).abs() < f64::EPSILON);

        let mixed = [
            doc(Provider::Exa, Some(-0.2)),
            doc(Provider::Exa, Some(0.9)),
            doc(Provider::Exa, Some(1.7)),
        ];
        let normalizer = ProviderNormalizer::from_documents(&mixed);
        let scores: Vec<f64> = mixed.iter().map(|d| normalizer.score(d)).collect();
        assert!(scores[0] < scores[1] && scores[1] < scores[2]);
        assert!((scores[1] - 1.1 / 1.9).abs() < 1e-12);
    }

    #[test]
    fn test_single_out_of_range_unit_score_is_clamped() {
        let docs = [doc(Provider::Exa, Some(3.0))];
        let normalizer = ProviderNormalizer::from_documents(&docs);
        assert!((normalizer.score(&docs[0]) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_interval_bounds_ignore_other_providers() {
        let docs = [
            doc(Provider::Exa, Some(0.4)),
            doc(Provider::Unknown("brave".to_string()), Some(40.0)),
            doc(Provider::Perplexity, Some(-7.0)),
        ];
        let normalizer = ProviderNormalizer::from_documents(&docs);
        assert!((normalizer.score(&docs[0]) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_decay_provider_orders_within_batch() {
        let docs = [
            doc(Provider::Perplexity, Some(3.0)),
            doc(Provider::Perplexity, Some(10.0)),
            doc(Provider::Perplexity, Some(3.0)),
            doc(Provider::Perplexity, Some(1.0)),
        ];
        let normalizer = ProviderNormalizer::from_documents(&docs);

        assert!((normalizer.score(&docs[1]) - 1.0).abs() < f64::EPSILON);
        let tied = normalizer.score(&docs[0]);
        assert!((tied - (-0.2_f64).exp()).abs() < 1e-12);
        assert!((normalizer.score(&docs[2]) - tied).abs() < f64::EPSILON);
        assert!((normalizer.score(&docs[3]) - (-0.6_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_rank_decay_ignores_other_providers() {
        let alone = [doc(Provider::Perplexity, Some(0.4))];
        let mixed = [
            doc(Provider::Perplexity, Some(0.4)),
            doc(Provider::Exa, Some(0.99)),
            doc(Provider::Unknown("brave".to_string()), Some(500.0)),
        ];
        let a = ProviderNormalizer::from_documents(&alone).score(&alone[0]);
        let b = ProviderNormalizer::from_documents(&mixed).score(&mixed[0]);
        assert!((a - b).abs() < f64::EPSILON);
        assert!((a - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_or_unknown_provider_is_neutral() {
        let docs = [
            doc(Provider::Exa, None),
            doc(Provider::Unknown("brave".to_string()), Some(0.99)),
            doc(Provider::Perplexity, Some(f64::NAN)),
        ];
        let normalizer = ProviderNormalizer::from_documents(&docs);
        for document in &docs {
            assert!((normalizer.score(document) - NEUTRAL_SCORE).abs() < f64::EPSILON);
        }
    }
}
