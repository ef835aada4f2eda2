//! Clustering-specific normalisation (4.A, clustering variant): masks the
//! parts of a clause that vary between otherwise-identical instances
//! (amounts, dates, policy numbers, ...) so the leader algorithm (4.H)
//! groups them together instead of treating each as a unique clause.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::base::{normalize_unicode, normalize_whitespace};

static NON_WORD_KEEP_BRACKETS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\[\]]").unwrap());

struct Mask {
    pattern: &'static Regex,
    placeholder: &'static str,
}

static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:€|eur\.?)\s?\d[\d.,]*").unwrap());
static PERCENTAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?\s?%").unwrap());
static DATE_NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b").unwrap());
static DATE_ISO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());
static DATE_TEXTUAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}\s(januari|februari|maart|april|mei|juni|juli|augustus|september|oktober|november|december)\s\d{4}\b").unwrap()
});
static POSTCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\s?[a-z]{2}\b").unwrap());
static HUISNR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bhuisnummer\s?\d{1,4}[a-z]?\b").unwrap());
static POLISNR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:dl|ren|pol|polis)-?\d{5,10}[a-z]?\b").unwrap());
static TELEFOON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:0|\+31[-\s]?)\d[\d\s-]{7,9}\d\b").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").unwrap());
static ITEMNR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]{2,3}-\d{3,}\b").unwrap());
static REFNR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{5,}\b").unwrap());

/// Order matters: more specific patterns (currency, dates, postcodes) run
/// before the generic long-digit-run fallback (`REFNR`) so a date or policy
/// number is never swallowed by it first.
fn masks() -> Vec<Mask> {
    vec![
        Mask { pattern: &CURRENCY_RE, placeholder: "[BEDRAG]" },
        Mask { pattern: &PERCENTAGE_RE, placeholder: "[PERCENTAGE]" },
        Mask { pattern: &DATE_ISO_RE, placeholder: "[DATUM]" },
        Mask { pattern: &DATE_TEXTUAL_RE, placeholder: "[DATUM]" },
        Mask { pattern: &DATE_NUMERIC_RE, placeholder: "[DATUM]" },
        Mask { pattern: &POSTCODE_RE, placeholder: "[POSTCODE]" },
        Mask { pattern: &HUISNR_RE, placeholder: "[HUISNR]" },
        Mask { pattern: &POLISNR_RE, placeholder: "[POLISNR]" },
        Mask { pattern: &TELEFOON_RE, placeholder: "[TELEFOON]" },
        Mask { pattern: &EMAIL_RE, placeholder: "[EMAIL]" },
        Mask { pattern: &ITEMNR_RE, placeholder: "[ITEMNR]" },
        Mask { pattern: &REFNR_RE, placeholder: "[REFNR]" },
    ]
}

/// Collapses a run of the same placeholder separated only by whitespace or
/// punctuation (e.g. "[BEDRAG] tot [BEDRAG]" keeps both, but
/// "[BEDRAG] [BEDRAG]" becomes a single "[BEDRAG]") down to one occurrence.
/// Only `BEDRAG` and `DATUM` ranges are prone to this (amount/date ranges
/// written as two adjacent literals after masking).
fn collapse_adjacent(text: &str, placeholder: &str) -> String {
    let doubled = format!("{placeholder} {placeholder}");
    let mut out = text.to_string();
    while out.contains(&doubled) {
        out = out.replace(&doubled, placeholder);
    }
    out
}

/// Masks variable substrings so structurally-identical clauses normalise to
/// the same string regardless of the specific amount, date, or reference
/// number they mention.
///
/// Order matters (§4.A): masking runs on the lowercased string *before* the
/// general punctuation strip, because the mask patterns themselves depend
/// on punctuation that the base `normalise` pipeline would otherwise have
/// already removed (`€`, `%`, `-`, `.`, `@`, thousands separators). Only
/// after every placeholder has been substituted in do we fall through to
/// the same strip-and-collapse tail `normalise` uses, with one exception:
/// the strip here preserves `[` and `]` so placeholder tokens survive
/// intact.
pub fn normalise_for_clustering(text: &str) -> String {
    let unicoded = normalize_unicode(text);
    let mut result = unicoded.to_lowercase();
    for mask in masks() {
        result = mask.pattern.replace_all(&result, mask.placeholder).to_string();
    }
    result = collapse_adjacent(&result, "[BEDRAG]");
    result = collapse_adjacent(&result, "[DATUM]");
    result = NON_WORD_KEEP_BRACKETS_RE.replace_all(&result, "").to_string();
    normalize_whitespace(&result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_currency_amounts() {
        let out = normalise_for_clustering("Het eigen risico bedraagt € 250,00 per schade.");
        assert!(out.contains("[BEDRAG]"));
        assert!(!out.contains("250"));
    }

    #[test]
    fn masks_percentages() {
        let out = normalise_for_clustering("Een korting van 10% wordt toegepast.");
        assert!(out.contains("[PERCENTAGE]"));
    }

    #[test]
    fn masks_iso_dates() {
        let out = normalise_for_clustering("Geldig vanaf 2024-01-15.");
        assert!(out.contains("[DATUM]"));
    }

    #[test]
    fn masks_numeric_dates() {
        let out = normalise_for_clustering("Geldig vanaf 15-01-2024.");
        assert!(out.contains("[DATUM]"));
    }

    #[test]
    fn collapses_adjacent_amount_placeholders() {
        let out = normalise_for_clustering("Van € 100 tot € 200 per dag.");
        assert!(!out.contains("[BEDRAG] [BEDRAG]"));
    }

    #[test]
    fn masks_email_and_policy_number() {
        let out = normalise_for_clustering("Neem contact op via info@voorbeeld.nl voor polis POL123456.");
        assert!(out.contains("[EMAIL]"));
        assert!(out.contains("[POLISNR]"));
    }

    #[test]
    fn masks_realistic_policy_number() {
        let out = normalise_for_clustering("Uw polisnummer POL2024001234 staat vermeld op het certificaat.");
        assert!(out.contains("[POLISNR]"));
        assert!(!out.contains("2024001234"));
    }

    #[test]
    fn two_structurally_identical_clauses_normalise_equal() {
        let a = normalise_for_clustering("Het eigen risico bedraagt € 100,00.");
        let b = normalise_for_clustering("Het eigen risico bedraagt € 500,00.");
        assert_eq!(a, b);
    }
}
