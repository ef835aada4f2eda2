//! Rendering an [`AnalysisResult`] as a plain-text table or JSON (§6).

use std::io::Write;
use std::path::Path;

use clause_engine::AnalysisResult;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::{CliError, CliResult};

#[derive(Serialize)]
struct JsonResult<'a> {
    rows: &'a [clause_engine::OutputRow],
    statistics: &'a clause_engine::JobStatistics,
}

/// One output row rendered for the `tabled` table (§6's flat advice table).
#[derive(Tabled)]
struct RowSummary {
    #[tabled(rename = "Row")]
    row_id: String,
    #[tabled(rename = "Cluster")]
    cluster_id: String,
    #[tabled(rename = "Advice")]
    advice_code: String,
    #[tabled(rename = "Freq")]
    frequency: usize,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Status")]
    action_status: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl RowSummary {
    fn from_row(row: &clause_engine::OutputRow) -> Self {
        Self {
            row_id: row.row_id.clone(),
            cluster_id: row.cluster_id.clone(),
            advice_code: row.advice_code.clone(),
            frequency: row.frequency,
            confidence: row.confidence.clone(),
            action_status: row.action_status.to_string(),
            reason: row.reason.clone(),
        }
    }
}

pub fn print_json(result: &AnalysisResult, output: Option<&Path>) -> CliResult<()> {
    let payload = JsonResult { rows: &result.rows, statistics: &result.statistics };
    let json = serde_json::to_string_pretty(&payload)?;
    write_output(&json, output, false)
}

pub fn print_table(result: &AnalysisResult, output: Option<&Path>) -> CliResult<()> {
    let summaries: Vec<RowSummary> = result.rows.iter().map(RowSummary::from_row).collect();
    let mut buffer = Table::new(&summaries).to_string();
    buffer.push('\n');

    let stats = &result.statistics;
    buffer.push_str(&format!(
        "\n{} rows -> {} clusters ({}% reduction), {} found in conditions, avg cluster size {:.1}\n",
        stats.total_rows, stats.unique_clusters, stats.reduction_percentage, stats.found_in_conditions, stats.avg_cluster_size
    ));
    write_output(&buffer, output, true)
}

fn write_output(content: &str, output: Option<&Path>, colored_summary: bool) -> CliResult<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).map_err(|source| CliError::Io { path: path.display().to_string(), source })?;
            print_success(&format!("Written to {}", path.display()));
        }
        None => {
            print!("{content}");
            std::io::stdout().flush().ok();
            if colored_summary {
                print_success("Analysis complete");
            }
        }
    }
    Ok(())
}

/// Prints a green checkmark status line to stdout.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints a red cross status line to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}
