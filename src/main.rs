//! Binary entrypoint for the `retrieval-rank` command.

use std::process::ExitCode;

use retrieval_ranker::cli;

/// Rank a JSON file of provider results and print the ordering.
fn main() -> ExitCode {
    cli::run()
}
