//! Domain-specific synonym similarity scorer (4.D).
//!
//! Optional per spec: the hybrid fusion (4.G) omits this method's
//! contribution when no synonym table is loaded (`is_loaded() == false`).

use std::collections::{HashMap, HashSet};

/// Maps variant words onto a single canonical term, and scores two texts by
/// how many of the first text's tokens have a synonym-set overlap with the
/// second text's tokens (§4.D): `|{tokens of a whose synonym set intersects
/// tokens of b}| / min(|tokens a|, |tokens b|)`.
#[derive(Debug, Clone, Default)]
pub struct SynonymService {
    /// variant -> canonical term.
    canonical: HashMap<String, String>,
    /// canonical term -> every member of its synonym group, canonical term
    /// included, so `synonym_set` never needs a fallback branch.
    groups: HashMap<String, HashSet<String>>,
}

impl SynonymService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a service from `(variant, canonical)` pairs. Later pairs for
    /// the same variant overwrite its canonical mapping; all variants of a
    /// shared canonical term end up in the same synonym group.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut service = Self::default();
        for (variant, target) in pairs {
            service.insert(variant.into(), target.into());
        }
        service
    }

    fn insert(&mut self, variant: String, target: String) {
        let group = self.groups.entry(target.clone()).or_default();
        group.insert(target.clone());
        group.insert(variant.clone());
        self.canonical.insert(variant, target);
    }

    pub fn is_loaded(&self) -> bool {
        !self.canonical.is_empty()
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// The canonical form of `word` (§4.D); identity if `word` is unknown.
    pub fn canonical(&self, word: &str) -> &str {
        self.canonical.get(word).map(String::as_str).unwrap_or(word)
    }

    /// Every word belonging to the same synonym group as `word`, `word`
    /// itself always included.
    fn synonym_set(&self, word: &str) -> HashSet<&str> {
        let canon = self.canonical(word);
        let mut set: HashSet<&str> = self
            .groups
            .get(canon)
            .map(|members| members.iter().map(String::as_str).collect())
            .unwrap_or_default();
        set.insert(word);
        set.insert(canon);
        set
    }

    /// `synonym_similarity` per §4.D: the fraction of `a`'s tokens whose
    /// synonym set intersects `b`'s token set, normalised by the shorter
    /// token count. `0.0` if either text tokenises to nothing.
    pub fn synonym_similarity(&self, a: &str, b: &str) -> f64 {
        let tokens_a: Vec<&str> = a.split_whitespace().collect();
        let tokens_b: Vec<&str> = b.split_whitespace().collect();
        let denom = tokens_a.len().min(tokens_b.len());
        if denom == 0 {
            return 0.0;
        }
        let set_b: HashSet<&str> = tokens_b.iter().copied().collect();
        let matches = tokens_a
            .iter()
            .filter(|token| self.synonym_set(token).iter().any(|syn| set_b.contains(syn)))
            .count();
        (matches as f64 / denom as f64).clamp(0.0, 1.0)
    }

    /// Returns `None` when no synonym table is loaded, signalling the
    /// hybrid fusion to skip this method's contribution entirely.
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        if !self.is_loaded() {
            return None;
        }
        Some(self.synonym_similarity(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_service_returns_none() {
        let service = SynonymService::new();
        assert_eq!(service.score("brand", "vuur"), None);
    }

    #[test]
    fn canonical_is_identity_for_unknown_words() {
        let service = SynonymService::from_pairs([("vuur", "brand")]);
        assert_eq!(service.canonical("onbekend"), "onbekend");
        assert_eq!(service.canonical("vuur"), "brand");
    }

    #[test]
    fn synonym_groups_bring_variants_into_agreement() {
        let service = SynonymService::from_pairs([("vuur", "brand"), ("brandje", "brand")]);
        let score = service.score("schade door brand", "schade door vuur").unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn partial_overlap_is_normalised_by_shorter_token_count() {
        let service = SynonymService::from_pairs([("vuur", "brand")]);
        // "schade door vuur" (3 tokens) vs "brand" (1 token): only "vuur"
        // matches via the synonym group, denominator is min(3, 1) = 1.
        let score = service.score("schade door vuur", "brand").unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn disjoint_texts_score_zero() {
        let service = SynonymService::from_pairs([("vuur", "brand")]);
        let score = service.score("aap noot mies", "schade claim polis").unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn empty_text_scores_zero() {
        let service = SynonymService::from_pairs([("vuur", "brand")]);
        assert_eq!(service.score("", "brand").unwrap(), 0.0);
    }
}
