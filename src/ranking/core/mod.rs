//! Core ranking types: configuration, errors, documents, providers and ranked output.

pub mod config;
pub mod document;
pub mod errors;
pub mod provider;
pub mod ranked;

pub use config::{DEFAULT_HALFLIFE_DAYS, FUTURE_HORIZON_DAYS, FusionWeights, RankingConfig};
pub use document::{DateCandidates, Document, domain_from_url, normalize_domain};
pub use errors::{RankingError, RankingResult};
pub use provider::{Provider, ProviderScale};
pub use ranked::{Contribution, Explanation, RankedDocument, Signal, SubScores};
