//! Cluster naming (4.H naming step).
//!
//! Resolves the clause-code open question for the *naming* side: a loose
//! pattern, distinct from `clause_normalize::extract_clause_codes`'s strict
//! detection pattern, since a display name only needs something that looks
//! code-like, not a verified standard-clause code.

use clause_core::ClusterNamingConfig;
use once_cell::sync::Lazy;
use regex::Regex;

/// Loose code-like token for display purposes only (§9 open question,
/// naming side). Matches more broadly than
/// `clause_normalize::extract_clause_codes`'s strict detection pattern.
static LOOSE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z0-9]{3,4}\b").unwrap());

/// Derives a human-readable name for a new cluster from its leader clause.
///
/// Priority order, grounded in `ClusteringService._generate_cluster_name`:
/// 1. the `premie` + `naverrekening` special case (common enough in the
///    source data to warrant its own name rather than falling through to
///    the generic `premie` theme),
/// 2. a loose code-like token found in the raw (cased) text,
/// 3. the first matching theme pattern,
/// 4. a fallback of the first `fallback_word_count` words, ellipsised.
pub fn generate_cluster_name(normalised_text: &str, raw_text: &str, config: &ClusterNamingConfig) -> String {
    if normalised_text.contains("premie") && normalised_text.contains("naverrekening") {
        return "Premie naverrekening".to_string();
    }

    if let Some(m) = LOOSE_CODE_RE.find(raw_text) {
        return format!("Clausule {}", m.as_str());
    }

    for (theme, patterns) in &config.theme_patterns {
        if patterns.iter().any(|pattern| normalised_text.contains(pattern.as_str())) {
            return capitalise(theme);
        }
    }

    fallback_name(normalised_text, config.fallback_word_count)
}

fn fallback_name(normalised_text: &str, word_count: usize) -> String {
    let words: Vec<&str> = normalised_text.split_whitespace().collect();
    let truncated = words.iter().take(word_count).cloned().collect::<Vec<_>>().join(" ");
    let name = capitalise(&truncated);
    if words.len() > word_count {
        format!("{name}...")
    } else {
        name
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
