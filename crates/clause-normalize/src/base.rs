//! Base text normalisation (4.A): whitespace, punctuation, unicode, casing.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PUNCTUATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Collapses runs of whitespace to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Strips everything that is neither a word character nor whitespace.
pub fn remove_punctuation(text: &str) -> String {
    PUNCTUATION_RE.replace_all(text, "").to_string()
}

/// NFKC normalisation (compatibility decomposition + canonical composition),
/// which folds things like full-width digits and ligatures to their plain
/// equivalents before any further processing.
pub fn normalize_unicode(text: &str) -> String {
    text.nfkc().collect()
}

/// The full base pipeline (§4.A): unicode fold, lowercase, strip
/// punctuation, collapse whitespace. This is what gets stored as
/// `Clause::normalised_text` and is the input to every similarity scorer.
///
/// Idempotent: `normalise(normalise(x)) == normalise(x)` for all `x`.
pub fn normalise(text: &str) -> String {
    let unicoded = normalize_unicode(text);
    let lowered = unicoded.to_lowercase();
    let stripped = remove_punctuation(&lowered);
    normalize_whitespace(&stripped)
}

/// Truncates `text` to at most `max_len` characters, preferring to break on
/// a word boundary and appending an ellipsis when truncation actually
/// happened. Operates on characters, not bytes, to stay UTF-8 safe.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }
    let mut cut = max_len;
    while cut > 0 && !chars[cut - 1].is_whitespace() {
        cut -= 1;
    }
    if cut == 0 {
        cut = max_len;
    }
    let truncated: String = chars[..cut].iter().collect();
    format!("{}...", truncated.trim_end())
}
