//! Reference-export ingestion (4.J boundary, spec.md §7): turns a raw
//! header + row table into typed [`ReferenceClause`]s, resolving Dutch/
//! English column aliases via [`crate::columns::resolve_column`].
//!
//! Grounded in
//! `original_source/hienfeld/services/reference_analysis_service.py`'s
//! `load_reference_data`, which already tolerates missing optional columns
//! but refuses a table without a text or advice column.

use thiserror::Error;

use clause_core::ReferenceClause;

use crate::columns::{resolve_column, CanonicalColumn};

#[derive(Debug, Error)]
pub enum ReferenceIngestError {
    #[error("reference table is missing a text column (Tekst/Text/Clausule)")]
    MissingTextColumn,
    #[error("reference table is missing an advice column (Advies/Advice/Actie)")]
    MissingAdviceColumn,
}

/// Parses a reference export into [`ReferenceClause`]s. `headers` and each
/// row in `rows` are aligned by index; short rows are treated as having
/// empty trailing cells.
///
/// Fails only when the table lacks both a text and an advice column —
/// every other column is optional and simply left at its default (spec.md
/// §7's "malformed reference table" case).
pub fn parse_reference_table(headers: &[String], rows: &[Vec<String>]) -> Result<Vec<ReferenceClause>, ReferenceIngestError> {
    let mut text_idx = None;
    let mut advice_idx = None;
    let mut frequency_idx = None;
    let mut policy_idx = None;
    let mut cluster_name_idx = None;
    let mut status_idx = None;

    for (idx, header) in headers.iter().enumerate() {
        match resolve_column(header) {
            Some(CanonicalColumn::Text) => text_idx.get_or_insert(idx),
            Some(CanonicalColumn::Advice) => advice_idx.get_or_insert(idx),
            Some(CanonicalColumn::Frequency) => frequency_idx.get_or_insert(idx),
            Some(CanonicalColumn::PolicyNumber) => policy_idx.get_or_insert(idx),
            Some(CanonicalColumn::ClusterName) => cluster_name_idx.get_or_insert(idx),
            Some(CanonicalColumn::Status) => status_idx.get_or_insert(idx),
            _ => continue,
        };
    }

    let text_idx = text_idx.ok_or(ReferenceIngestError::MissingTextColumn)?;
    let advice_idx = advice_idx.ok_or(ReferenceIngestError::MissingAdviceColumn)?;

    let cell = |row: &[String], idx: usize| -> String { row.get(idx).cloned().unwrap_or_default() };

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let text = cell(row, text_idx);
        let advice = cell(row, advice_idx);
        if text.trim().is_empty() {
            continue;
        }
        let frequency = frequency_idx.and_then(|idx| cell(row, idx).trim().parse::<usize>().ok()).unwrap_or(1);

        let mut entry = ReferenceClause::new(text, advice, frequency);
        if let Some(idx) = policy_idx {
            let value = cell(row, idx);
            if !value.trim().is_empty() {
                entry.policy_number = Some(value);
            }
        }
        if let Some(idx) = cluster_name_idx {
            entry.cluster_name = cell(row, idx);
        }
        if let Some(idx) = status_idx {
            let value = cell(row, idx);
            if !value.trim().is_empty() {
                entry.status = Some(value);
            }
        }
        entries.push(entry);
    }

    Ok(entries)
}
