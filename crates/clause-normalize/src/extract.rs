//! Clause-code and article-reference extraction.
//!
//! Two distinct code patterns are kept deliberately (spec's open question on
//! clause-code patterns, resolved in `SPEC_FULL.md`): a strict pattern for
//! detecting genuine standard-clause codes, and a looser pattern, owned by
//! `clause-cluster`, for cluster display names.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strict standard-clause code: one digit, two uppercase letters, one digit
/// (e.g. `9NX3`). Used to detect how many distinct standard clauses are
/// concatenated inside a single free-text cell (4.I step 1, `SPLIT` logic).
static CLAUSE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9][A-Z]{2}[0-9]\b").unwrap());

/// `Art 2.14`, `Artikel 9.1` style references to the policy conditions
/// document.
static ARTICLE_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:art(?:ikel)?\.?)\s*(\d+(?:\.\d+)?)\b").unwrap());

/// Returns every strict clause code found in `text`, in order of
/// appearance, duplicates included.
pub fn extract_clause_codes(text: &str) -> Vec<String> {
    CLAUSE_CODE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Returns every article number referenced in `text` (e.g. `"2.14"` from
/// `"zie Art 2.14"`), in order of appearance.
pub fn extract_article_references(text: &str) -> Vec<String> {
    ARTICLE_REF_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_strict_clause_codes() {
        let codes = extract_clause_codes("Clausules 9NX3 en 1AB2 zijn van toepassing.");
        assert_eq!(codes, vec!["9NX3".to_string(), "1AB2".to_string()]);
    }

    #[test]
    fn ignores_non_matching_tokens() {
        let codes = extract_clause_codes("ABCD en 12345 zijn geen geldige codes.");
        assert!(codes.is_empty());
    }

    #[test]
    fn extracts_article_references_both_spellings() {
        let refs = extract_article_references("Zie Art 2.14 en Artikel 9.1 voor details.");
        assert_eq!(refs, vec!["2.14".to_string(), "9.1".to_string()]);
    }
}
