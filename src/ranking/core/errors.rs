//! Error types for the ranking subsystem.

use thiserror::Error;

/// Ranking subsystem error type.
///
/// Scoring itself never fails; these errors come from configuration
/// validation and from the boundary where raw provider results are
/// turned into documents.
#[derive(Debug, Error)]
pub enum RankingError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A raw result is missing a field required to build a document.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// URL parse error.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for ranking operations.
pub type RankingResult<T> = Result<T, RankingError>;
