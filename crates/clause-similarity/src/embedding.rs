//! Embedding-based similarity scorer (4.F) — the heaviest, most optional
//! method in the hybrid fusion.
//!
//! The model identity is an opaque config string (resolved open question,
//! see `SPEC_FULL.md`): the engine never validates it against anything, it
//! is only a label threaded through to whichever [`EmbeddingProvider`] is
//! wired in. The provided [`HashingEmbeddingProvider`] is a deterministic
//! character n-gram feature-hashing projection — good enough to exercise
//! the fusion pipeline without pulling in a transformer runtime; production
//! deployments swap in a real model behind the same trait.

use std::collections::HashMap;
use std::sync::Mutex;

use lru::LruCache;

const DEFAULT_DIMS: usize = 256;
const DEFAULT_CACHE_SIZE: usize = 2048;

/// Produces a fixed-length embedding vector for a piece of text.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
    fn model_id(&self) -> &str;
}

/// Deterministic character-trigram feature-hashing embedding. Not a
/// semantic model; stands in for one behind the same interface.
pub struct HashingEmbeddingProvider {
    model_id: String,
    dims: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            dims: DEFAULT_DIMS,
        }
    }

    pub fn with_dims(model_id: impl Into<String>, dims: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dims: dims.max(1),
        }
    }
}

impl EmbeddingProvider for HashingEmbeddingProvider {
    fn embed(&self, text: &str) -> Vec<f32> {
        let chars: Vec<char> = text.chars().collect();
        let mut vector = vec![0.0f32; self.dims];
        if chars.is_empty() {
            return vector;
        }
        let window = 3.min(chars.len());
        for i in 0..=chars.len() - window {
            let trigram: String = chars[i..i + window].iter().collect();
            let bucket = fnv1a(&trigram) as usize % self.dims;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn fnv1a(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for byte in text.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

const EPSILON: f64 = 1e-10;

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;
    if denom < EPSILON {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0)
}

/// Wraps an [`EmbeddingProvider`] with an LRU cache over already-embedded
/// texts, mirroring the original's caching of the (expensive) model call.
pub struct EmbeddingScorer {
    provider: Box<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
    index: Mutex<HashMap<String, Vec<f32>>>,
}

impl EmbeddingScorer {
    pub fn new(provider: Box<dyn EmbeddingProvider>) -> Self {
        let capacity = std::num::NonZeroUsize::new(DEFAULT_CACHE_SIZE).unwrap();
        Self {
            provider,
            cache: Mutex::new(LruCache::new(capacity)),
            index: Mutex::new(HashMap::new()),
        }
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut cache = self.cache.lock().unwrap();
        if let Some(hit) = cache.get(text) {
            return hit.clone();
        }
        let vector = self.provider.embed(text);
        cache.put(text.to_string(), vector.clone());
        vector
    }

    pub fn score(&self, a: &str, b: &str) -> f64 {
        cosine_similarity(&self.vector_for(a), &self.vector_for(b))
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }

    /// Pre-computes embeddings for a batch of `id -> text` pairs (§4.F).
    /// Subsequent [`find_similar`](Self::find_similar) calls scan this
    /// index instead of re-embedding every candidate on every query.
    pub fn index(&self, texts: &HashMap<String, String>) {
        let mut index = self.index.lock().unwrap();
        index.clear();
        for (id, text) in texts {
            index.insert(id.clone(), self.vector_for(text));
        }
    }

    /// Returns up to `k` indexed ids scoring at or above `min_score` against
    /// `query`, sorted by score descending (§4.F). Ties keep the indexed
    /// ordering of [`index`](Self::index)'s input map.
    pub fn find_similar(&self, query: &str, k: usize, min_score: f64) -> Vec<(String, f64)> {
        let query_vector = self.vector_for(query);
        let index = self.index.lock().unwrap();
        let mut scored: Vec<(String, f64)> = index
            .iter()
            .map(|(id, vector)| (id.clone(), cosine_similarity(&query_vector, vector)))
            .filter(|(_, score)| *score >= min_score)
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_score_one() {
        let scorer = EmbeddingScorer::new(Box::new(HashingEmbeddingProvider::new("test-model")));
        let score = scorer.score("dekking van brandschade", "dekking van brandschade");
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_texts_do_not_divide_by_zero() {
        let scorer = EmbeddingScorer::new(Box::new(HashingEmbeddingProvider::new("test-model")));
        assert_eq!(scorer.score("", ""), 0.0);
    }

    #[test]
    fn model_id_is_carried_through_opaquely() {
        let scorer = EmbeddingScorer::new(Box::new(HashingEmbeddingProvider::new("sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2")));
        assert_eq!(scorer.model_id(), "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2");
    }

    #[test]
    fn similar_texts_score_higher_than_unrelated() {
        let scorer = EmbeddingScorer::new(Box::new(HashingEmbeddingProvider::new("test-model")));
        let close = scorer.score("eigen risico bedraagt honderd euro", "eigen risico bedraagt tweehonderd euro");
        let far = scorer.score("eigen risico bedraagt honderd euro", "uitsluiting van molestschade volledig");
        assert!(close > far);
    }

    #[test]
    fn find_similar_returns_top_k_above_floor() {
        let scorer = EmbeddingScorer::new(Box::new(HashingEmbeddingProvider::new("test-model")));
        let mut sections = HashMap::new();
        sections.insert("Art 2.8".to_string(), "fraude is uitgesloten van dekking".to_string());
        sections.insert("Art 3.1".to_string(), "eigen risico bedraagt honderd euro".to_string());
        sections.insert("Art 4.2".to_string(), "volledig ongerelateerde inhoud over iets anders".to_string());
        scorer.index(&sections);
        let matches = scorer.find_similar("fraude is uitgesloten van dekking", 2, 0.5);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].0, "Art 2.8");
        assert!(matches.len() <= 2);
    }

    #[test]
    fn find_similar_respects_min_score_floor() {
        let scorer = EmbeddingScorer::new(Box::new(HashingEmbeddingProvider::new("test-model")));
        let mut sections = HashMap::new();
        sections.insert("Art 9.9".to_string(), "volledig ongerelateerde inhoud over iets anders".to_string());
        scorer.index(&sections);
        let matches = scorer.find_similar("fraude is uitgesloten van dekking", 5, 0.99);
        assert!(matches.is_empty());
    }
}
