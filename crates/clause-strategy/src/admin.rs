//! Admin/hygiene strategy (4.I.0): fast rule-based checks that run before
//! any similarity-based matching.
//!
//! Grounded in
//! `original_source/hienfeld/services/admin_check_service.py` and its
//! `_find_past_date` context-window heuristic, generalised to `spec.md`
//! §4.I.0's exact priority order and cue lists (the distilled spec is
//! authoritative where it narrows the original's behaviour).

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use clause_core::{Advice, AdviceCode, Cluster, Confidence};

use crate::context::AnalysisContext;
use crate::pipeline::Strategy;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[invullen\]|XXX+|___+|\.{4,}|€\s*[-_]{2,}|\?{3,}").unwrap()
});

static ENCODING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Ã©|Ã«|Ã¶|Ã¼|â€™|â€œ|ï»¿|[\x00-\x08\x0b\x0c\x0d\x0e-\x1f]").unwrap());

static DATE_DMY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[-/](\d{1,2})[-/]((?:19|20)\d{2})\b").unwrap());
static DATE_YMD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})[-/](\d{1,2})[-/](\d{1,2})\b").unwrap());
static DATE_TEXTUAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+(januari|februari|maart|april|mei|juni|juli|augustus|september|oktober|november|december)\s+((?:19|20)\d{2})\b").unwrap()
});

const WHITELIST_CUES: &[&str] = &[
    "d.d.", "specificatie", "christie", "overzicht", "conform", "opgesteld", "geboren",
    "geboortedatum", "wet van", "artikel", "bw", "versie", "model", "gedeponeerd",
    "voorwaarden", "polisvoorwaarden",
];
const TAXATION_CUES: &[&str] = &["taxatie", "rapport", "waardebepaling", "7:960"];
const EXPIRY_CUES: &[&str] = &["uiterlijk", "geldig tot", "vervalt per", "einddatum", "deadline"];

fn month_number(name: &str) -> u32 {
    match name.to_lowercase().as_str() {
        "januari" => 1,
        "februari" => 2,
        "maart" => 3,
        "april" => 4,
        "mei" => 5,
        "juni" => 6,
        "juli" => 7,
        "augustus" => 8,
        "september" => 9,
        "oktober" => 10,
        "november" => 11,
        "december" => 12,
        _ => 0,
    }
}

enum DateFinding {
    Expired(String),
    TaxationOld(String),
}

/// Scans `text` for a past date and classifies it per §4.I.0's date policy.
/// Returns `None` when no date qualifies (including the "default: do not
/// flag" case and dates whitelisted by their surrounding context).
fn find_past_date(text: &str, as_of: NaiveDate) -> Option<DateFinding> {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();

    let mut candidates: Vec<(usize, usize, NaiveDate, String)> = Vec::new();

    for caps in DATE_DMY_RE.captures_iter(&lower) {
        let whole = caps.get(0).unwrap();
        if let (Ok(d), Ok(m), Ok(y)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>(), caps[3].parse::<i32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                candidates.push((whole.start(), whole.end(), date, whole.as_str().to_string()));
            }
        }
    }
    for caps in DATE_YMD_RE.captures_iter(&lower) {
        let whole = caps.get(0).unwrap();
        if let (Ok(y), Ok(m), Ok(d)) = (caps[1].parse::<i32>(), caps[2].parse::<u32>(), caps[3].parse::<u32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                candidates.push((whole.start(), whole.end(), date, whole.as_str().to_string()));
            }
        }
    }
    for caps in DATE_TEXTUAL_RE.captures_iter(&lower) {
        let whole = caps.get(0).unwrap();
        let month = month_number(&caps[2]);
        if let (Ok(d), Ok(y)) = (caps[1].parse::<u32>(), caps[3].parse::<i32>()) {
            if month != 0 {
                if let Some(date) = NaiveDate::from_ymd_opt(y, month, d) {
                    candidates.push((whole.start(), whole.end(), date, whole.as_str().to_string()));
                }
            }
        }
    }

    for (byte_start, byte_end, date, date_str) in candidates {
        if date >= as_of {
            continue;
        }
        let start = lower[..byte_start].chars().count();
        let end = lower[..byte_end].chars().count();
        let ctx_start = start.saturating_sub(100);
        let ctx_end = (end + 100).min(chars.len());
        let context: String = chars[ctx_start..ctx_end].iter().collect();

        if WHITELIST_CUES.iter().any(|cue| context.contains(cue)) {
            continue;
        }

        let age_in_years = as_of.year() - date.year();

        if TAXATION_CUES.iter().any(|cue| context.contains(cue)) {
            if age_in_years <= 3 {
                continue;
            }
            return Some(DateFinding::TaxationOld(date_str));
        }

        if EXPIRY_CUES.iter().any(|cue| context.contains(cue)) {
            return Some(DateFinding::Expired(date_str));
        }
    }
    None
}

/// Step 0 of the waterfall (order 0.0): hygiene/administrative checks that
/// run on every cluster before any similarity-based strategy.
pub struct AdminHygieneStrategy;

impl Strategy for AdminHygieneStrategy {
    fn order(&self) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "admin_hygiene"
    }

    fn can_handle(&self, _cluster: &Cluster, _ctx: &AnalysisContext) -> bool {
        true
    }

    fn analyse(&self, cluster: &Cluster, ctx: &AnalysisContext) -> Option<Advice> {
        let text = &cluster.leader_raw_text;

        if text.trim().is_empty() {
            return Some(Advice::new(cluster.id.clone(), AdviceCode::Empty, "empty", Confidence::High).with_category("ADMIN_CHECK"));
        }

        if text.trim().chars().count() < 10 {
            return Some(
                Advice::new(cluster.id.clone(), AdviceCode::ManualCheck, "text too short", Confidence::High)
                    .with_category("ADMIN_CHECK"),
            );
        }

        if let Some(m) = PLACEHOLDER_RE.find(text) {
            return Some(
                Advice::new(
                    cluster.id.clone(),
                    AdviceCode::FillIn,
                    format!("contains placeholder: '{}'", m.as_str()),
                    Confidence::High,
                )
                .with_category("ADMIN_CHECK"),
            );
        }

        if let Some(m) = ENCODING_RE.find(text) {
            return Some(
                Advice::new(
                    cluster.id.clone(),
                    AdviceCode::Clean,
                    format!("contains encoding corruption: '{}'", m.as_str()),
                    Confidence::High,
                )
                .with_category("ADMIN_CHECK"),
            );
        }

        match find_past_date(text, ctx.as_of_date) {
            Some(DateFinding::Expired(date_str)) => Some(
                Advice::new(
                    cluster.id.clone(),
                    AdviceCode::DeleteExpired,
                    format!("expired date found: {date_str}"),
                    Confidence::High,
                )
                .with_category("ADMIN_CHECK"),
            ),
            Some(DateFinding::TaxationOld(date_str)) => Some(
                Advice::new(
                    cluster.id.clone(),
                    AdviceCode::ManualCheck,
                    format!("taxation older than 3 years ({date_str})"),
                    Confidence::High,
                )
                .with_category("ADMIN_CHECK"),
            ),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_text_is_flagged() {
        assert!(matches!(find_past_date("", date(2026, 1, 1)), None));
    }

    #[test]
    fn expired_deadline_is_flagged() {
        let finding = find_past_date("Deze dekking is geldig tot 31-12-2015.", date(2026, 1, 1));
        assert!(matches!(finding, Some(DateFinding::Expired(_))));
    }

    #[test]
    fn taxation_within_three_years_is_not_flagged() {
        let finding = find_past_date("Taxatierapport d.d. 15-06-2022 conform 7:960 BW.", date(2025, 1, 1));
        assert!(finding.is_none());
    }

    #[test]
    fn taxation_older_than_three_years_is_manual_check() {
        let finding = find_past_date("Taxatierapport 15-06-2020 conform 7:960 BW, ouder dan gedacht.", date(2025, 1, 1));
        assert!(matches!(finding, Some(DateFinding::TaxationOld(_))));
    }

    #[test]
    fn birth_date_is_never_flagged() {
        let finding = find_past_date("Verzekerde is geboren op 1 januari 1980.", date(2026, 1, 1));
        assert!(finding.is_none());
    }

    #[test]
    fn legal_reference_is_never_flagged() {
        let finding = find_past_date("Conform artikel 7:960 BW, wet van 1-1-1990.", date(2026, 1, 1));
        assert!(finding.is_none());
    }

    #[test]
    fn bare_past_date_without_context_is_not_flagged() {
        let finding = find_past_date("Er werd iets genoemd op 1-1-2015 zonder verdere context.", date(2026, 1, 1));
        assert!(finding.is_none());
    }
}
