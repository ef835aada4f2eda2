//! Convenience constructor bridging raw ingestion rows to [`clause_core::Clause`].

use clause_core::Clause;

use crate::base::normalise;

/// Builds a [`Clause`] from a raw spreadsheet cell, applying the base
/// normalisation pipeline (4.A) to populate `normalised_text`. Ingestion
/// itself (reading the spreadsheet) is out of scope (§1 Non-goals); this is
/// the seam where an ingested row becomes the engine's typed model.
pub fn build_clause(id: impl Into<String>, raw_text: impl Into<String>) -> Clause {
    let raw_text = raw_text.into();
    let normalised_text = normalise(&raw_text);
    Clause::new(id, raw_text, normalised_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_clause_with_normalised_text_populated() {
        let clause = build_clause("row_1", "Dekking, Brand!");
        assert_eq!(clause.raw_text, "Dekking, Brand!");
        assert_eq!(clause.normalised_text, "dekking brand");
    }
}
