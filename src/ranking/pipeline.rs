//! Post-ranking stages.
//!
//! Later stages consume the ranker's output and produce a (usually pruned)
//! ranked list. Each stage is a pure `Vec<RankedDocument> -> Vec<RankedDocument>`
//! transform; a [`Pipeline`] applies them in order and renumbers ranks
//! afterwards. The ranker itself is never modified to add a stage.

use std::collections::HashSet;

use crate::ranking::core::document::{normalize_domain, parse_lenient};
use crate::ranking::core::ranked::RankedDocument;

/// A transform over a ranked list.
pub trait RankStage: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Apply the stage. Ranks are renumbered by the pipeline afterwards.
    fn apply(&self, ranked: Vec<RankedDocument>) -> Vec<RankedDocument>;
}

impl<F> RankStage for F
where
    F: Fn(Vec<RankedDocument>) -> Vec<RankedDocument> + Send + Sync,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn apply(&self, ranked: Vec<RankedDocument>) -> Vec<RankedDocument> {
        self(ranked)
    }
}

/// Ordered sequence of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn RankStage>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    #[must_use]
    pub fn then<S: RankStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order, then renumber ranks from 1.
    #[must_use]
    pub fn run(&self, ranked: Vec<RankedDocument>) -> Vec<RankedDocument> {
        let mut current = ranked;
        for stage in &self.stages {
            let before = current.len();
            current = stage.apply(current);
            tracing::debug!(
                stage = stage.name(),
                before,
                after = current.len(),
                "applied rank stage"
            );
        }
        renumber(current)
    }
}

/// Reassign 1-based ranks in list order.
#[must_use]
pub fn renumber(ranked: Vec<RankedDocument>) -> Vec<RankedDocument> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(position, doc)| doc.with_rank(position + 1))
        .collect()
}

/// Keep the first `n` documents.
#[derive(Clone, Copy, Debug)]
pub struct TopK(pub usize);

impl RankStage for TopK {
    fn name(&self) -> &str {
        "top_k"
    }

    fn apply(&self, mut ranked: Vec<RankedDocument>) -> Vec<RankedDocument> {
        ranked.truncate(self.0);
        ranked
    }
}

/// Drop documents whose fused score is below a threshold.
#[derive(Clone, Copy, Debug)]
pub struct MinScore(pub f64);

impl RankStage for MinScore {
    fn name(&self) -> &str {
        "min_score"
    }

    fn apply(&self, ranked: Vec<RankedDocument>) -> Vec<RankedDocument> {
        ranked
            .into_iter()
            .filter(|doc| doc.score() >= self.0)
            .collect()
    }
}

/// Keep only the best-ranked document among those sharing a canonical url.
#[derive(Clone, Copy, Debug, Default)]
pub struct DedupeByUrl;

impl RankStage for DedupeByUrl {
    fn name(&self) -> &str {
        "dedupe_by_url"
    }

    fn apply(&self, ranked: Vec<RankedDocument>) -> Vec<RankedDocument> {
        let mut seen = HashSet::new();
        ranked
            .into_iter()
            .filter(|doc| seen.insert(canonical_url(doc.document().url())))
            .collect()
    }
}

/// Canonical form of a url for duplicate detection.
///
/// Scheme and fragment are ignored, the host is normalized like a domain and a
/// trailing slash on the path is dropped. The query string is kept.
#[must_use]
pub fn canonical_url(url: &str) -> String {
    let Ok(parsed) = parse_lenient(url) else {
        return url.trim().to_lowercase();
    };

    let host = parsed.host_str().map(normalize_domain).unwrap_or_default();
    let path = parsed.path().trim_end_matches('/');
    match parsed.query() {
        Some(query) => format!("{host}{path}?{query}"),
        None => format!("{host}{path}"),
    }
}
