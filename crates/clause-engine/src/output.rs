//! Output rows and aggregate statistics (§6 External Interfaces).

use std::collections::HashMap;

use serde::Serialize;

const ORIGINAL_TEXT_MAX_LEN: usize = 500;
const DONE_STATUS_CUES: &[&str] = &["ja", "yes", "gedaan", "done", "x", "\u{2713}", "\u{2705}", "afgerond", "klaar"];

/// One row of the engine's output, one per *input* row (§6) — several rows
/// may share a `cluster_id` when they clustered together.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRow {
    pub row_id: String,
    pub cluster_id: String,
    pub cluster_name: String,
    pub frequency: usize,
    pub advice_code: String,
    pub confidence: String,
    pub reason: String,
    pub reference: String,
    pub original_text: String,
    pub row_type: &'static str,
    pub parent_id: Option<String>,
    pub action_status: &'static str,
}

/// `"\u{1f195} Nieuw"`, `"\u{2705} Afgerond"`, or `"\u{1f532} Open"` (§6),
/// driven by whether a matched reference entry's `Status` column contains
/// one of the "done" cues.
pub fn action_status(reference_status: Option<&str>) -> &'static str {
    match reference_status {
        None => "\u{1f195} Nieuw",
        Some(status) => {
            let lower = status.to_lowercase();
            if DONE_STATUS_CUES.iter().any(|cue| lower.contains(cue)) {
                "\u{2705} Afgerond"
            } else {
                "\u{1f532} Open"
            }
        }
    }
}

pub fn truncate_original_text(text: &str) -> String {
    clause_normalize::truncate_text(text, ORIGINAL_TEXT_MAX_LEN)
}

/// Aggregate statistics over one job's output rows (§6).
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobStatistics {
    pub total_rows: usize,
    pub unique_clusters: usize,
    pub reduction_percentage: u32,
    pub advice_distribution: HashMap<String, usize>,
    pub category_distribution: HashMap<String, usize>,
    pub found_in_conditions: usize,
    pub avg_cluster_size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reference_entry_is_new() {
        assert_eq!(action_status(None), "\u{1f195} Nieuw");
    }

    #[test]
    fn done_cue_marks_afgerond() {
        assert_eq!(action_status(Some("Ja, gedaan op 1-1")), "\u{2705} Afgerond");
        assert_eq!(action_status(Some("x")), "\u{2705} Afgerond");
    }

    #[test]
    fn anything_else_is_open() {
        assert_eq!(action_status(Some("in behandeling")), "\u{1f532} Open");
    }

    #[test]
    fn original_text_is_truncated_at_500_chars() {
        let long = "a".repeat(600);
        assert!(truncate_original_text(&long).chars().count() <= 500);
    }
}
