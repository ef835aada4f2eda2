//! Lemmatised-token similarity scorer (4.C).
//!
//! The original system delegates to a full Dutch morphological model; this
//! workspace carries a lightweight rule-based lemmatiser (common
//! plural/diminutive/verb suffix stripping) behind the same interface, so
//! the scorer degrades gracefully without a model dependency while keeping
//! the same comparison semantics: lemmatise both texts to token sets, then
//! score by Dice coefficient.
//!
//! Optional per spec: the hybrid fusion (4.G) simply omits this method's
//! contribution when [`LemmaScorer`] is disabled in [`clause_core::SemanticConfig`].

use std::sync::Mutex;

use lru::LruCache;
use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

const DEFAULT_CACHE_SIZE: usize = 4096;

static SUFFIXES: &[&str] = &["heden", "heid", "aties", "atie", "en", "je", "tje", "s"];

fn lemmatise_word(word: &str) -> String {
    if word.chars().count() <= 3 {
        return word.to_string();
    }
    for suffix in SUFFIXES {
        if let Some(stripped) = word.strip_suffix(suffix) {
            if stripped.chars().count() >= 3 {
                return stripped.to_string();
            }
        }
    }
    word.to_string()
}

fn lemma_tokens(text: &str) -> Vec<String> {
    text.unicode_words().map(lemmatise_word).collect()
}

/// Rule-based lemmatiser with an LRU cache over already-seen input texts,
/// mirroring the original's caching of the (expensive) model call.
pub struct LemmaScorer {
    cache: Mutex<LruCache<String, Vec<String>>>,
}

impl LemmaScorer {
    pub fn new() -> Self {
        Self::with_cache_size(DEFAULT_CACHE_SIZE)
    }

    pub fn with_cache_size(size: usize) -> Self {
        let capacity = std::num::NonZeroUsize::new(size.max(1)).unwrap();
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn tokens_for(&self, text: &str) -> Vec<String> {
        let mut cache = self.cache.lock().unwrap();
        if let Some(hit) = cache.get(text) {
            return hit.clone();
        }
        let tokens = lemma_tokens(text);
        cache.put(text.to_string(), tokens.clone());
        tokens
    }

    /// Dice coefficient over the lemma token sets of `a` and `b`, in `[0, 1]`.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let tokens_a = self.tokens_for(a);
        let tokens_b = self.tokens_for(b);
        dice_coefficient(&tokens_a, &tokens_b)
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }
}

impl Default for LemmaScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn dice_coefficient(a: &[String], b: &[String]) -> f64 {
    use std::collections::HashSet;
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let set_a: HashSet<&String> = a.iter().collect();
    let set_b: HashSet<&String> = b.iter().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    (2.0 * intersection as f64) / (set_a.len() + set_b.len()) as f64
}

/// Process-wide default instance for callers that don't need a dedicated
/// cache (e.g. one-off scoring calls outside the hybrid pipeline).
pub static SHARED: Lazy<LemmaScorer> = Lazy::new(LemmaScorer::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_common_plural_suffix() {
        assert_eq!(lemmatise_word("verzekeringen"), "verzekering");
    }

    #[test]
    fn leaves_short_words_untouched() {
        assert_eq!(lemmatise_word("een"), "een");
    }

    #[test]
    fn identical_texts_score_one() {
        let scorer = LemmaScorer::new();
        assert_eq!(scorer.score("dekking van brandschade", "dekking van brandschade"), 1.0);
    }

    #[test]
    fn disjoint_texts_score_zero() {
        let scorer = LemmaScorer::new();
        assert_eq!(scorer.score("appel peer", "auto fiets"), 0.0);
    }

    #[test]
    fn caches_repeated_lookups() {
        let scorer = LemmaScorer::with_cache_size(2);
        let _ = scorer.score("dekking van brandschade", "dekking van waterschade");
        let _ = scorer.score("dekking van brandschade", "dekking van stormschade");
        assert_eq!(scorer.cache.lock().unwrap().len(), 2);
    }
}
