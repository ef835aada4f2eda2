//! Minimal CSV/TSV ingestion for the CLI's file flags.
//!
//! The engine itself never parses files (§1 Non-goals: "File I/O, document
//! parsing ... are out of scope"); this module is the thin boundary that
//! turns a spreadsheet export into the headers+rows shape
//! `clause_reference::parse_reference_table` and the job builders below
//! already expect.

use std::path::Path;

use chrono::NaiveDate;
use clause_core::{Section, StandardClause};
use clause_engine::InputRow;

use crate::error::{CliError, CliResult};

/// Reads a delimited file into a header row and data rows. The delimiter is
/// sniffed from the header line: a literal tab wins over a comma, since
/// clause texts routinely contain commas but rarely tabs.
pub fn read_table(path: &Path) -> CliResult<(Vec<String>, Vec<Vec<String>>)> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.display().to_string(), source })?;
    let mut lines = content.lines();
    let header_line = lines.next().ok_or_else(|| CliError::EmptyTable { path: path.display().to_string() })?;
    let delimiter = if header_line.contains('\t') { '\t' } else { ',' };

    let headers = split_row(header_line, delimiter);
    let rows: Vec<Vec<String>> = content
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_row(line, delimiter))
        .collect();
    Ok((headers, rows))
}

/// Splits one row on `delimiter`, honouring double-quoted fields (a doubled
/// quote `""` inside a quoted field is an escaped literal quote).
fn split_row(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn column_index(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| aliases.contains(&h.trim().to_lowercase().as_str()))
}

fn cell<'a>(row: &'a [String], idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|idx| row.get(idx)).map(String::as_str).filter(|s| !s.is_empty())
}

/// Builds input rows from a `Id, Tekst, Polisnummer` (or English-alias)
/// table. Missing `Id` cells fall back to a 1-based `row_N` synthetic id so
/// every row still has one (§3: every `Clause` needs a stable id).
pub fn input_rows_from_table(headers: &[String], rows: &[Vec<String>]) -> Vec<InputRow> {
    let id_idx = column_index(headers, &["id", "rij", "row_id"]);
    let text_idx = column_index(headers, &["tekst", "text", "clausule", "clausuletekst"]);
    let policy_idx = column_index(headers, &["polisnummer", "policy_number", "polis_nummer"]);

    rows.iter()
        .enumerate()
        .filter_map(|(n, row)| {
            let text = text_idx.and_then(|idx| row.get(idx)).cloned().unwrap_or_default();
            if text.trim().is_empty() {
                return None;
            }
            let id = cell(row, id_idx).map(str::to_string).unwrap_or_else(|| format!("row_{}", n + 1));
            let mut input = InputRow::new(id, text);
            if let Some(policy) = cell(row, policy_idx) {
                input = input.with_policy_number(policy);
            }
            Some(input)
        })
        .collect()
}

/// Builds policy condition sections from an `Artikel, Titel, Tekst` table.
pub fn sections_from_table(headers: &[String], rows: &[Vec<String>]) -> Vec<Section> {
    let id_idx = column_index(headers, &["artikel", "id", "article"]);
    let title_idx = column_index(headers, &["titel", "title"]);
    let text_idx = column_index(headers, &["tekst", "text"]);

    rows.iter()
        .enumerate()
        .filter_map(|(n, row)| {
            let text = text_idx.and_then(|idx| row.get(idx)).cloned().unwrap_or_default();
            if text.trim().is_empty() {
                return None;
            }
            let id = cell(row, id_idx).map(str::to_string).unwrap_or_else(|| format!("art_{}", n + 1));
            let title = cell(row, title_idx).map(str::to_string).unwrap_or_default();
            let normalised_text = clause_normalize::normalise(&text);
            Some(Section { id, title, raw_text: text, normalised_text })
        })
        .collect()
}

/// Builds the standard-clause library from a `Code, Tekst, Categorie` table.
pub fn standard_clauses_from_table(headers: &[String], rows: &[Vec<String>]) -> Vec<StandardClause> {
    let code_idx = column_index(headers, &["code", "clausurecode", "clausecode"]);
    let text_idx = column_index(headers, &["tekst", "text"]);
    let category_idx = column_index(headers, &["categorie", "category"]);

    rows.iter()
        .filter_map(|row| {
            let text = text_idx.and_then(|idx| row.get(idx)).cloned().unwrap_or_default();
            let code = code_idx.and_then(|idx| row.get(idx)).cloned().unwrap_or_default();
            if text.trim().is_empty() || code.trim().is_empty() {
                return None;
            }
            let category = cell(row, category_idx).map(str::to_string).unwrap_or_else(|| "ONBEKEND".to_string());
            let normalised_text = clause_normalize::normalise(&text);
            Some(StandardClause { code, text, normalised_text, category })
        })
        .collect()
}

/// Builds `(variant, canonical)` synonym pairs from a two-column table; any
/// extra columns beyond the first two are ignored.
pub fn synonym_pairs_from_table(rows: &[Vec<String>]) -> Vec<(String, String)> {
    rows.iter()
        .filter_map(|row| {
            let variant = row.first()?.trim();
            let canonical = row.get(1)?.trim();
            if variant.is_empty() || canonical.is_empty() {
                return None;
            }
            Some((variant.to_string(), canonical.to_string()))
        })
        .collect()
}

pub fn parse_as_of(raw: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| CliError::InvalidDate(raw.to_string(), err))
}

/// Used by `--reference`, which re-ingests a prior run's export via
/// `clause_reference::parse_reference_table` directly.
pub fn reference_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> clause_engine::ReferenceTable {
    clause_engine::ReferenceTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn sniffs_tab_delimiter_over_comma() {
        let file = write_temp("Id\tTekst\nrow_1\tDekking, van brandschade");
        let (headers, rows) = read_table(file.path()).unwrap();
        assert_eq!(headers, vec!["Id", "Tekst"]);
        assert_eq!(rows[0][1], "Dekking, van brandschade");
    }

    #[test]
    fn quoted_comma_field_stays_intact() {
        let file = write_temp("Id,Tekst\nrow_1,\"Dekking, van brandschade\"");
        let (headers, rows) = read_table(file.path()).unwrap();
        assert_eq!(headers, vec!["Id", "Tekst"]);
        assert_eq!(rows[0][1], "Dekking, van brandschade");
    }

    #[test]
    fn missing_id_falls_back_to_row_number() {
        let headers = vec!["Tekst".to_string()];
        let rows = vec![vec!["Dekking van brandschade".to_string()]];
        let input_rows = input_rows_from_table(&headers, &rows);
        assert_eq!(input_rows[0].id, "row_1");
    }

    #[test]
    fn blank_text_rows_are_skipped() {
        let headers = vec!["Id".to_string(), "Tekst".to_string()];
        let rows = vec![vec!["row_1".to_string(), "  ".to_string()], vec!["row_2".to_string(), "Dekking van brandschade".to_string()]];
        let input_rows = input_rows_from_table(&headers, &rows);
        assert_eq!(input_rows.len(), 1);
        assert_eq!(input_rows[0].id, "row_2");
    }

    #[test]
    fn standard_clause_rows_need_both_code_and_text() {
        let headers = vec!["Code".to_string(), "Tekst".to_string()];
        let rows = vec![vec!["9NX3".to_string(), String::new()], vec![String::new(), "tekst zonder code".to_string()]];
        assert!(standard_clauses_from_table(&headers, &rows).is_empty());
    }

    #[test]
    fn parses_iso_as_of_date() {
        assert_eq!(parse_as_of("2026-01-15").unwrap(), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn rejects_malformed_as_of_date() {
        assert!(parse_as_of("15-01-2026").is_err());
    }
}
