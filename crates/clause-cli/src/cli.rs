//! CLI definition and the single `analyze` command's plumbing.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use clause_core::{EngineConfig, Mode};
use clause_engine::{AnalysisJob, ClauseEngine, JobSettings};
use clause_llm::NoopOracle;
use clause_observe::NoopProgressSink;

use crate::error::CliResult;
use crate::output::{print_json, print_table};
use crate::table::{
    input_rows_from_table, parse_as_of, read_table, reference_table, sections_from_table, standard_clauses_from_table, synonym_pairs_from_table,
};

/// Runs the clause analysis engine over a CSV/TSV export and prints one
/// advice row per input clause (§6 External Interfaces). Document parsing
/// and spreadsheet ingestion beyond this flat table are out of scope
/// (spec.md §1 Non-goals): bring your own exporter.
#[derive(Parser)]
#[command(name = "clause-cli")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable trace-level logging.
    #[arg(long, global = true)]
    pub trace: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Analyse a clause export and print advice rows.
    Analyze {
        /// Input table: one clause per row (`Id`, `Tekst`/`Text`, optional
        /// `Polisnummer`). CSV or TSV, sniffed from the header line.
        #[arg(short, long)]
        input: PathBuf,

        /// Performance/quality preset.
        #[arg(long, value_enum, default_value_t = ModeArg::Balanced)]
        mode: ModeArg,

        /// Policy conditions table (`Artikel`, `Titel`, `Tekst`) for the
        /// conditions-match strategy (4.I.2).
        #[arg(long)]
        conditions: Option<PathBuf>,

        /// Standard-clause library table (`Code`, `Tekst`, `Categorie`) for
        /// the clause-library strategy (4.I.1).
        #[arg(long)]
        library: Option<PathBuf>,

        /// Prior run's export, re-ingested for the frequency/standardise
        /// fallback check (4.I.3, §9 anti-regression).
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Free-form custom-instruction file (§6), parsed as TSV lines or
        /// arrow blocks.
        #[arg(long)]
        instructions: Option<PathBuf>,

        /// Two-column `variant,canonical` synonym table (4.D).
        #[arg(long)]
        synonyms: Option<PathBuf>,

        /// Reference date for admin/hygiene expiry checks (4.I.0), ISO
        /// `YYYY-MM-DD`. Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Skip the policy-conditions-match strategy even if `--conditions`
        /// was supplied.
        #[arg(long)]
        no_conditions: bool,

        /// Force fuzzy-only scoring, skipping lemma/synonym/TF-IDF/embedding
        /// methods regardless of the mode preset.
        #[arg(long)]
        no_semantic: bool,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write output here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    Fast,
    Balanced,
    Accurate,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Fast => Mode::Fast,
            ModeArg::Balanced => Mode::Balanced,
            ModeArg::Accurate => Mode::Accurate,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    pub fn run(self) -> CliResult<()> {
        match self.command {
            Commands::Analyze { input, mode, conditions, library, reference, instructions, synonyms, as_of, no_conditions, no_semantic, format, output } => {
                run_analyze(input, mode, conditions, library, reference, instructions, synonyms, as_of, no_conditions, no_semantic, format, output)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    input: PathBuf,
    mode: ModeArg,
    conditions: Option<PathBuf>,
    library: Option<PathBuf>,
    reference: Option<PathBuf>,
    instructions: Option<PathBuf>,
    synonyms: Option<PathBuf>,
    as_of: Option<String>,
    no_conditions: bool,
    no_semantic: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let (headers, rows) = read_table(&input)?;
    let input_rows = input_rows_from_table(&headers, &rows);
    tracing::info!(count = input_rows.len(), "loaded input rows");

    let as_of_date: NaiveDate = match as_of {
        Some(raw) => parse_as_of(&raw)?,
        None => Local::now().date_naive(),
    };

    let config = EngineConfig::preset(mode.into());
    let mut settings = JobSettings::new(as_of_date);
    if no_conditions {
        settings = settings.without_conditions();
    }
    if no_semantic {
        settings = settings.without_semantic();
    }
    if let Some(path) = &instructions {
        let blob = std::fs::read_to_string(path).map_err(|source| crate::error::CliError::Io { path: path.display().to_string(), source })?;
        settings = settings.with_extra_instructions(blob);
    }

    let mut job = AnalysisJob::new(config, settings, input_rows);

    if let Some(path) = &conditions {
        let (headers, rows) = read_table(path)?;
        job = job.with_sections(sections_from_table(&headers, &rows));
    }
    if let Some(path) = &library {
        let (headers, rows) = read_table(path)?;
        job = job.with_standard_clauses(standard_clauses_from_table(&headers, &rows));
    }
    if let Some(path) = &reference {
        let (headers, rows) = read_table(path)?;
        job = job.with_reference_table(reference_table(headers, rows));
    }
    if let Some(path) = &synonyms {
        let (_, rows) = read_table(path)?;
        job = job.with_synonym_pairs(synonym_pairs_from_table(&rows));
    }
    job = job.with_llm_oracle(Arc::new(NoopOracle));

    let engine = ClauseEngine::new();
    let result = engine.run(job, &NoopProgressSink)?;

    match format {
        OutputFormat::Text => print_table(&result, output.as_deref())?,
        OutputFormat::Json => print_json(&result, output.as_deref())?,
    }
    Ok(())
}
