//! Heuristic ranking of retrieved content.
//!
//! This module turns heterogeneous provider results into one explainable
//! ordering, organized into:
//! - `core`: Configuration, errors, documents, providers and ranked output
//! - `normalize`: Boundary conversion of raw provider results into documents
//! - `dates`: Effective-date resolution and far-future clamping
//! - `authority`: Domain authority tiers and the lookup seam
//! - `signals`: Recency, authority and provider sub-scores
//! - `fusion`: Weighted fusion, deterministic ordering and rank assignment
//! - `pipeline`: Composable post-ranking stages
//!
//! Data flows `RawSearchResult -> Document -> RankedDocument -> Pipeline`.
//! Nothing in here performs I/O or holds shared mutable state.

pub mod authority;
pub mod core;
pub mod dates;
pub mod fusion;
pub mod normalize;
pub mod pipeline;
pub mod signals;

// Re-export commonly used types for convenience
pub use authority::{AuthorityLookup, AuthorityTier, DomainAuthorityTable};
pub use self::core::{
    Contribution, DateCandidates, Document, Explanation, FusionWeights, Provider, ProviderScale,
    RankedDocument, RankingConfig, RankingError, RankingResult, Signal, SubScores,
    domain_from_url, normalize_domain,
};
pub use dates::{DateField, ResolvedDate, parse_timestamp, resolve_effective_date};
pub use fusion::{Ranker, SCORE_TOLERANCE, fuse, rank_documents};
pub use normalize::{
    NormalizedBatch, RawSearchResult, Rejected, normalize_batch, normalize_json_batch,
    normalize_result,
};
pub use pipeline::{DedupeByUrl, MinScore, Pipeline, RankStage, TopK};
pub use signals::{NEUTRAL_SCORE, ProviderNormalizer, authority_score, recency_score};
