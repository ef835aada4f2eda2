//! TF-IDF cosine similarity scorer (4.E): train/score phases.
//!
//! Must be trained on a representative corpus before it can score anything;
//! callers that skip training get `None` back, which the hybrid fusion
//! (4.G) treats exactly like a disabled optional method.

use std::collections::HashMap;

/// Numerical stability guard for the cosine-similarity denominator, so two
/// vectors of all-zero magnitude never produce a `NaN` or `Inf` score.
const EPSILON: f64 = 1e-10;

/// Terms appearing in more than this fraction of training documents are
/// dropped as uninformative (§4.E).
const MAX_DOC_FREQUENCY_RATIO: f64 = 0.90;

/// Vocabulary size cap (§4.E).
const MAX_VOCABULARY_SIZE: usize = 10_000;

/// Tokens shorter than this are dropped by the tokeniser (§4.E).
const MIN_TOKEN_LENGTH: usize = 3;

/// Tokenise: lowercase, split on whitespace, drop tokens shorter than 3
/// characters (§4.E). Distinct from `clause-normalize`'s unicode-aware word
/// splitting — this tokeniser is intentionally the simple whitespace split
/// the spec calls for.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_LENGTH)
        .map(|w| w.to_string())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct TfIdfScorer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_trained(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Builds the vocabulary and inverse-document-frequency table from a
    /// corpus of already-normalised texts. Re-training replaces any
    /// previous vocabulary. Terms appearing in more than
    /// [`MAX_DOC_FREQUENCY_RATIO`] of documents are filtered out as
    /// uninformative, and the vocabulary is capped at
    /// [`MAX_VOCABULARY_SIZE`] terms, keeping the rarest (highest-IDF) ones
    /// first — the terms that actually discriminate between clauses (§4.E).
    pub fn train(&mut self, corpus: &[String]) {
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in corpus {
            let unique_terms: std::collections::HashSet<String> =
                tokenize(doc).into_iter().collect();
            for term in unique_terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }
        let n_docs = corpus.len().max(1) as f64;
        let max_df = (n_docs * MAX_DOC_FREQUENCY_RATIO).ceil() as usize;

        let mut kept: Vec<(String, f64)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df <= max_df)
            .map(|(term, df)| {
                // Smoothed IDF, never zero or negative even when a term
                // appears in every document.
                let idf = (n_docs / df as f64).ln() + 1.0;
                (term, idf)
            })
            .collect();
        // Rarest terms (highest IDF) carry the most discriminative signal;
        // when the vocabulary exceeds the cap, keep those first.
        kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        kept.truncate(MAX_VOCABULARY_SIZE);

        self.vocabulary.clear();
        self.idf.clear();
        for (term, idf) in kept {
            let idx = self.vocabulary.len();
            self.vocabulary.insert(term, idx);
            self.idf.push(idf);
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f64> {
        let mut term_counts: HashMap<usize, usize> = HashMap::new();
        let words = tokenize(text);
        for word in &words {
            if let Some(&idx) = self.vocabulary.get(word) {
                *term_counts.entry(idx).or_insert(0) += 1;
            }
        }
        let total = words.len().max(1) as f64;
        let mut vector = vec![0.0; self.vocabulary.len()];
        for (idx, count) in term_counts {
            let tf = count as f64 / total;
            vector[idx] = tf * self.idf[idx];
        }
        vector
    }

    /// Cosine similarity between the TF-IDF vectors of `a` and `b`. Returns
    /// `None` if [`train`](Self::train) has not been called yet.
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        if !self.is_trained() {
            return None;
        }
        let vec_a = self.vectorize(a);
        let vec_b = self.vectorize(b);
        Some(cosine_similarity(&vec_a, &vec_b))
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;
    if denom < EPSILON {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0)
}
