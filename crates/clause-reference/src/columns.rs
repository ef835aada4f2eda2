//! Column-alias table for ingesting a reference export (4.J boundary).
//!
//! The reference export is a prior run's output, re-ingested. Its header
//! row uses Dutch column names and has accumulated casing/spelling variants
//! over time; this table absorbs that at the ingestion boundary so nothing
//! downstream of [`crate::matcher::ReferenceMatcher`] ever has to know
//! about Dutch column names. Grounded in
//! `original_source/hienfeld/services/reference_analysis_service.py`'s
//! `COLUMN_MAPPINGS`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Canonical field identified by a reference-export column, independent of
/// whichever header spelling was actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalColumn {
    Text,
    Frequency,
    OrigFrequency,
    Advice,
    ClusterName,
    Confidence,
    Reason,
    Article,
    PolicyNumber,
    Status,
}

static ALIASES: Lazy<HashMap<&'static str, CanonicalColumn>> = Lazy::new(|| {
    use CanonicalColumn::*;
    let mut map = HashMap::new();
    for alias in ["tekst", "text", "clausule", "clausuletekst"] {
        map.insert(alias, Text);
    }
    for alias in ["frequentie", "frequency", "freq"] {
        map.insert(alias, Frequency);
    }
    for alias in ["oorspronkelijke frequentie", "orig_frequency", "origfrequentie"] {
        map.insert(alias, OrigFrequency);
    }
    for alias in ["advies", "advice", "actie"] {
        map.insert(alias, Advice);
    }
    for alias in ["clusternaam", "cluster_name", "clustername"] {
        map.insert(alias, ClusterName);
    }
    for alias in ["betrouwbaarheid", "confidence", "zekerheid"] {
        map.insert(alias, Confidence);
    }
    for alias in ["reden", "reason", "toelichting"] {
        map.insert(alias, Reason);
    }
    for alias in ["artikel", "article", "art"] {
        map.insert(alias, Article);
    }
    for alias in ["polisnummer", "policy_number", "polis_nummer"] {
        map.insert(alias, PolicyNumber);
    }
    for alias in ["status", "vergelijkingsstatus"] {
        map.insert(alias, Status);
    }
    map
});

/// Resolves a raw header to a canonical column, matching case- and
/// whitespace-insensitively.
pub fn resolve_column(header: &str) -> Option<CanonicalColumn> {
    let key = header.trim().to_lowercase();
    ALIASES.get(key.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_dutch_and_english_text_headers() {
        assert_eq!(resolve_column("Tekst"), Some(CanonicalColumn::Text));
        assert_eq!(resolve_column("Text"), Some(CanonicalColumn::Text));
    }

    #[test]
    fn resolves_case_and_whitespace_insensitively() {
        assert_eq!(resolve_column("  POLISNUMMER "), Some(CanonicalColumn::PolicyNumber));
    }

    #[test]
    fn unknown_header_resolves_to_none() {
        assert_eq!(resolve_column("onbekende kolom"), None);
    }

    #[test]
    fn prefers_orig_frequency_over_frequency_when_both_present() {
        assert_eq!(resolve_column("oorspronkelijke frequentie"), Some(CanonicalColumn::OrigFrequency));
        assert_eq!(resolve_column("frequentie"), Some(CanonicalColumn::Frequency));
    }
}
