//! clause-cli - thin command-line wrapper around the clause analysis engine
//!
//! Runs a single analysis job over a CSV/TSV export and prints advice rows.
//! Everything upstream of the flat table (document parsing, spreadsheet
//! ingestion) is out of scope (spec.md §1 Non-goals) and left to the
//! caller's own exporter.

mod cli;
mod error;
mod output;
mod table;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    clause_observe::init_tracing(cli.verbose, cli.trace);
    if let Err(err) = cli.run() {
        output::print_error(&err.to_string());
        std::process::exit(1);
    }
    Ok(())
}
