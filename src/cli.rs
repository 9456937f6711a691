//! Command-line driver: JSON results in, ranked JSON or explanations out.
//!
//! Logs go to stderr so stdout carries only the ranking.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::ranking::{
    DedupeByUrl, Pipeline, RankedDocument, Ranker, RankingConfig, RankingResult, TopK,
    normalize_json_batch,
};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "retrieval-rank",
    version,
    about = "Rank provider search results by recency, domain authority and relevance"
)]
pub struct Args {
    /// JSON file holding an array of raw search results.
    pub results: PathBuf,
    /// JSON ranking config (weights, recency_halflife_days).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Print human-readable explanations instead of JSON.
    #[arg(long)]
    pub explain: bool,
    /// Keep only the N best documents.
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
    /// Drop documents whose url duplicates a better-ranked one.
    #[arg(long)]
    pub dedupe: bool,
}

/// Parse arguments, rank, and print.
///
/// # Returns
/// `ExitCode::SUCCESS` on success, `1` on I/O, parse or config errors.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = execute(&args, &mut out, Utc::now()) {
        tracing::error!("Ranking failed: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Install a stderr `tracing` subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(io::stderr)
        .try_init();
}

/// Run one ranking from files at the given instant.
///
/// # Errors
/// Returns an error if a file cannot be read, the JSON is malformed, or the
/// config is invalid.
pub fn execute<W: Write>(args: &Args, out: &mut W, now: DateTime<Utc>) -> RankingResult<()> {
    let config = match &args.config {
        Some(path) => RankingConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => RankingConfig::default(),
    };
    let results = fs::read_to_string(&args.results)?;

    let ranked = rank_json(&results, &config, &build_pipeline(args), now)?;
    write_output(&ranked, args.explain, out)
}

/// Post-ranking stages requested on the command line.
#[must_use]
pub fn build_pipeline(args: &Args) -> Pipeline {
    let mut pipeline = Pipeline::new();
    if args.dedupe {
        pipeline = pipeline.then(DedupeByUrl);
    }
    if let Some(n) = args.top {
        pipeline = pipeline.then(TopK(n));
    }
    pipeline
}

/// Normalize, rank and post-process a JSON array of raw results.
///
/// Elements that fail to deserialize or normalize are logged and skipped.
///
/// # Errors
/// Returns an error if the input is not a JSON array or the config is invalid.
pub fn rank_json(
    json: &str,
    config: &RankingConfig,
    pipeline: &Pipeline,
    now: DateTime<Utc>,
) -> RankingResult<Vec<RankedDocument>> {
    let ranker = Ranker::new(config.clone())?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = raw.len();

    let batch = normalize_json_batch(raw);
    if !batch.rejected.is_empty() {
        tracing::info!(
            rejected = batch.rejected.len(),
            total,
            "Skipped results that failed normalization"
        );
    }

    let ranked = pipeline.run(ranker.rank(batch.documents, now));
    tracing::info!(ranked = ranked.len(), total, "Ranking complete");
    Ok(ranked)
}

/// Write the ranking as pretty JSON or as explanation blocks.
///
/// # Errors
/// Returns an error if writing or serialization fails.
pub fn write_output<W: Write>(
    ranked: &[RankedDocument],
    explain: bool,
    out: &mut W,
) -> RankingResult<()> {
    if explain {
        for doc in ranked {
            writeln!(out, "{}\n", doc.explain())?;
        }
    } else {
        serde_json::to_writer_pretty(&mut *out, ranked)?;
        writeln!(out)?;
    }
    Ok(())
}
