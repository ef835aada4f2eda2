//! Comparison status between a current cluster's advice and its reference
//! match (supplemented feature, `SPEC_FULL.md` item 4).
//!
//! Richer than the `action_status` three-state spec.md keeps for output
//! rows: `action_status` is still computed exactly as specified elsewhere;
//! this is additional, grounded in
//! `original_source/hienfeld/services/reference_analysis_service.py::get_comparison_status`.

use clause_core::ReferenceClause;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonStatus {
    /// No reference entry matched this clause at all.
    New,
    /// Matched, and the advice is the same as last time.
    Unchanged,
    /// Matched, but the advice has changed since the reference export.
    Changed,
    /// A reference entry that no current clause matched.
    Gone,
}

/// Computes the status for a clause that *did* get a chance to match
/// (use [`ComparisonStatus::Gone`] directly for entries from
/// `ReferenceMatcher::gone_texts`).
pub fn compute_status(current_advice_code: &str, matched_reference: Option<&ReferenceClause>) -> ComparisonStatus {
    match matched_reference {
        None => ComparisonStatus::New,
        Some(reference) if reference.advice_code == current_advice_code => ComparisonStatus::Unchanged,
        Some(_) => ComparisonStatus::Changed,
    }
}

/// Whether a cluster should be recommended for standardisation purely on
/// the strength of its reference history, independent of the current run's
/// frequency (grounded in `should_standardize_from_reference`).
pub fn should_standardize_from_reference(reference: &ReferenceClause, frequency_threshold: usize) -> bool {
    reference.frequency >= frequency_threshold
}

/// The higher of the current run's frequency and the reference's recorded
/// frequency (grounded in `get_combined_frequency`): a clause that has been
/// seen often historically should not look rare just because this run's
/// input happens to be small.
pub fn combined_frequency(current_frequency: usize, reference: Option<&ReferenceClause>) -> usize {
    match reference {
        Some(r) => current_frequency.max(r.frequency),
        None => current_frequency,
    }
}
