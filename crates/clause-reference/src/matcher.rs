//! Reference matcher (4.J): matches a current clause against a prior run's
//! exported reference table.
//!
//! Three tiers, cheapest first: exact text + policy number, exact text
//! alone, then fuzzy. Grounded in
//! `original_source/hienfeld/services/reference_analysis_service.py::find_match`,
//! including its documented fix: querying the same reference entry twice
//! must return the match both times, never `None` on the second query just
//! because it was already matched once. This matcher never gates on the
//! `matched` flag at all, so that bug has no way to resurface.

use std::collections::HashMap;

use clause_core::ReferenceClause;
use clause_similarity::fuzzy_ratio;

pub const DEFAULT_MIN_FUZZY_SCORE: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    ExactWithPolicy,
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchResult {
    pub index: usize,
    pub tier: MatchTier,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceStatistics {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub match_rate: f64,
}

pub struct ReferenceMatcher {
    entries: Vec<ReferenceClause>,
    exact_with_policy: HashMap<(String, String), usize>,
    exact_only: HashMap<String, usize>,
    min_fuzzy_score: f64,
}

impl ReferenceMatcher {
    pub fn new(entries: Vec<ReferenceClause>) -> Self {
        Self::with_min_fuzzy_score(entries, DEFAULT_MIN_FUZZY_SCORE)
    }

    pub fn with_min_fuzzy_score(entries: Vec<ReferenceClause>, min_fuzzy_score: f64) -> Self {
        let mut exact_with_policy = HashMap::new();
        let mut exact_only = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            exact_only.entry(entry.normalised_text.clone()).or_insert(idx);
            if let Some(policy) = &entry.policy_number {
                exact_with_policy
                    .entry((entry.normalised_text.clone(), policy.clone()))
                    .or_insert(idx);
            }
        }
        Self {
            entries,
            exact_with_policy,
            exact_only,
            min_fuzzy_score,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> &ReferenceClause {
        &self.entries[index]
    }

    /// Looks up `normalised_text` (optionally scoped to `policy_number`)
    /// against the reference table, tier by tier. Marks the matched entry
    /// as seen (for [`Self::gone_texts`]) and always returns it, regardless
    /// of whether it had already been matched by an earlier call.
    pub fn find_match(&mut self, normalised_text: &str, policy_number: Option<&str>) -> Option<MatchResult> {
        if let Some(policy) = policy_number {
            let key = (normalised_text.to_string(), policy.to_string());
            if let Some(&idx) = self.exact_with_policy.get(&key) {
                self.entries[idx].matched = true;
                return Some(MatchResult { index: idx, tier: MatchTier::ExactWithPolicy, score: 1.0 });
            }
        }

        if let Some(&idx) = self.exact_only.get(normalised_text) {
            self.entries[idx].matched = true;
            return Some(MatchResult { index: idx, tier: MatchTier::Exact, score: 1.0 });
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            let score = fuzzy_ratio(normalised_text, &entry.normalised_text);
            if score >= self.min_fuzzy_score && best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, score)| {
            self.entries[idx].matched = true;
            MatchResult { index: idx, tier: MatchTier::Fuzzy, score }
        })
    }

    /// Reference entries that were never matched by any call to
    /// [`find_match`](Self::find_match) during this run: clauses present in
    /// the prior export but absent from the current input.
    pub fn gone_texts(&self) -> Vec<&ReferenceClause> {
        self.entries.iter().filter(|e| !e.matched).collect()
    }

    pub fn statistics(&self) -> ReferenceStatistics {
        let total = self.entries.len();
        let matched = self.entries.iter().filter(|e| e.matched).count();
        ReferenceStatistics {
            total,
            matched,
            unmatched: total - matched,
            match_rate: if total == 0 { 0.0 } else { matched as f64 / total as f64 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, advice: &str, freq: usize) -> ReferenceClause {
        ReferenceClause::new(text, advice, freq)
    }

    #[test]
    fn exact_match_is_found() {
        let mut matcher = ReferenceMatcher::new(vec![entry("dekking brand", "DELETE", 3)]);
        let result = matcher.find_match("dekking brand", None).unwrap();
        assert_eq!(result.tier, MatchTier::Exact);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn exact_with_policy_takes_priority() {
        let mut entries = vec![entry("dekking brand", "DELETE", 3)];
        entries[0].policy_number = Some("POL-1".to_string());
        let mut matcher = ReferenceMatcher::new(entries);
        let result = matcher.find_match("dekking brand", Some("POL-1")).unwrap();
        assert_eq!(result.tier, MatchTier::ExactWithPolicy);
    }

    #[test]
    fn fuzzy_tier_catches_near_misses_above_floor() {
        let mut matcher = ReferenceMatcher::new(vec![entry("dekking van brandschade", "DELETE", 1)]);
        let result = matcher.find_match("dekking van brandschadee", None).unwrap();
        assert_eq!(result.tier, MatchTier::Fuzzy);
    }

    #[test]
    fn below_floor_yields_no_match() {
        let mut matcher = ReferenceMatcher::new(vec![entry("dekking van brandschade", "DELETE", 1)]);
        assert!(matcher.find_match("volledig andere inhoud zonder overlap", None).is_none());
    }

    #[test]
    fn querying_an_already_matched_entry_again_still_returns_it() {
        let mut matcher = ReferenceMatcher::new(vec![entry("dekking brand", "DELETE", 1)]);
        let first = matcher.find_match("dekking brand", None);
        let second = matcher.find_match("dekking brand", None);
        assert!(first.is_some());
        assert!(second.is_some(), "second lookup of an already-matched reference must still match");
    }

    #[test]
    fn unmatched_entries_show_up_as_gone() {
        let mut matcher = ReferenceMatcher::new(vec![
            entry("dekking brand", "DELETE", 1),
            entry("uitsluiting molest", "HANDMATIG_CHECKEN", 1),
        ]);
        matcher.find_match("dekking brand", None);
        let gone = matcher.gone_texts();
        assert_eq!(gone.len(), 1);
        assert_eq!(gone[0].normalised_text, "uitsluiting molest");
    }

    #[test]
    fn statistics_report_match_rate() {
        let mut matcher = ReferenceMatcher::new(vec![
            entry("a", "DELETE", 1),
            entry("b", "DELETE", 1),
        ]);
        matcher.find_match("a", None);
        let stats = matcher.statistics();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.unmatched, 1);
        assert!((stats.match_rate - 0.5).abs() < 1e-9);
    }
}
