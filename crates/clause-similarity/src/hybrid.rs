//! Hybrid similarity fusion (4.G): combines fuzzy, lemma, synonym, TF-IDF
//! and embedding scores into a single weighted verdict, with dynamic weight
//! redistribution and an early exit for the common cheap case.

use std::time::Instant;

use clause_core::SemanticConfig;

use crate::embedding::{EmbeddingScorer, HashingEmbeddingProvider};
use crate::fuzzy::fuzzy_ratio;
use crate::lemma::LemmaScorer;
use crate::scorer::Method;
use crate::synonym::SynonymService;
use crate::tfidf::TfIdfScorer;

/// A highly-similar verdict (used by [`HybridSimilarityService::is_highly_similar`])
/// sits above the ordinary similarity threshold; grounded in the original's
/// distinct "exact"-tier threshold used by the reference matcher and the
/// conditions-match strategy.
pub const HIGHLY_SIMILAR_THRESHOLD: f64 = 0.95;

/// Above this fuzzy score, the embedding model call is skipped and its
/// contribution is inferred as equal to the fuzzy score instead (§4.G).
pub const SKIP_EMBEDDING_MODEL_THRESHOLD: f64 = 0.90;

/// Per-method breakdown of one similarity computation (§4.G).
#[derive(Debug, Clone, Default)]
pub struct SimilarityBreakdown {
    pub rapidfuzz: Option<f64>,
    pub lemmatized: Option<f64>,
    pub synonyms: Option<f64>,
    pub tfidf: Option<f64>,
    pub embeddings: Option<f64>,
    pub final_score: f64,
    pub methods_used: Vec<Method>,
    pub computation_time_ms: f64,
}

impl SimilarityBreakdown {
    pub fn to_map(&self) -> std::collections::BTreeMap<String, f64> {
        let mut map = std::collections::BTreeMap::new();
        if let Some(v) = self.rapidfuzz {
            map.insert("rapidfuzz".to_string(), v);
        }
        if let Some(v) = self.lemmatized {
            map.insert("lemmatized".to_string(), v);
        }
        if let Some(v) = self.synonyms {
            map.insert("synonyms".to_string(), v);
        }
        if let Some(v) = self.tfidf {
            map.insert("tfidf".to_string(), v);
        }
        if let Some(v) = self.embeddings {
            map.insert("embeddings".to_string(), v);
        }
        map.insert("final_score".to_string(), self.final_score);
        map
    }
}

/// Combines every enabled scoring method behind one interface (4.G).
///
/// Construction reads [`SemanticConfig`] once: which methods are enabled,
/// their weights, the early-exit threshold, and the embedding model id.
/// TF-IDF additionally needs [`train_tfidf`](Self::train_tfidf) before it
/// contributes anything; until then it behaves as if disabled.
pub struct HybridSimilarityService {
    config: SemanticConfig,
    lemma: LemmaScorer,
    synonyms: SynonymService,
    tfidf: TfIdfScorer,
    embeddings: Option<EmbeddingScorer>,
}

impl HybridSimilarityService {
    pub fn new(config: SemanticConfig) -> Self {
        let embeddings = if config.enable_embeddings {
            Some(EmbeddingScorer::new(Box::new(HashingEmbeddingProvider::new(
                config.embedding_model.clone(),
            ))))
        } else {
            None
        };
        Self {
            config,
            lemma: LemmaScorer::new(),
            synonyms: SynonymService::new(),
            tfidf: TfIdfScorer::new(),
            embeddings,
        }
    }

    /// Loads a synonym table (4.D). A no-op call with an empty table leaves
    /// the synonym method disabled, same as never calling this at all.
    pub fn load_synonyms(&mut self, service: SynonymService) {
        self.synonyms = service;
    }

    /// Trains the TF-IDF vocabulary (4.E) on a representative corpus of
    /// already-normalised texts. Must run before TF-IDF contributes to any
    /// score; callers typically pass every clause's normalised text.
    pub fn train_tfidf(&mut self, corpus: &[String]) {
        self.tfidf.train(corpus);
    }

    /// Fast path (§4.G): only the methods actually needed to reach a
    /// verdict run; no per-method breakdown is retained. Prefer this over
    /// [`similarity_detailed`](Self::similarity_detailed) in hot loops
    /// (clustering, bulk reference matching).
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        if !self.config.enable_fuzzy {
            return self.similarity_detailed(a, b).final_score;
        }
        let fuzzy = fuzzy_ratio(a, b);
        if let Some(threshold) = self.config.early_exit_threshold {
            if fuzzy >= threshold {
                return fuzzy;
            }
        }
        self.similarity_detailed(a, b).final_score
    }

    /// Full path (§4.G): computes every enabled method and fuses them with
    /// dynamic weight redistribution, recording which methods actually
    /// contributed and how long the computation took.
    pub fn similarity_detailed(&self, a: &str, b: &str) -> SimilarityBreakdown {
        let start = Instant::now();
        let mut breakdown = SimilarityBreakdown::default();
        let mut contributions: Vec<(Method, f64, f64)> = Vec::new();

        if self.config.enable_fuzzy {
            let score = fuzzy_ratio(a, b);
            breakdown.rapidfuzz = Some(score);
            contributions.push((Method::Fuzzy, score, self.config.weight_fuzzy));

            if let Some(threshold) = self.config.early_exit_threshold {
                if score >= threshold {
                    breakdown.final_score = score;
                    breakdown.methods_used = vec![Method::Fuzzy];
                    breakdown.computation_time_ms = elapsed_ms(start);
                    return breakdown;
                }
            }
        }

        if self.config.enable_lemma {
            let score = self.lemma.score(a, b);
            breakdown.lemmatized = Some(score);
            contributions.push((Method::Lemma, score, self.config.weight_lemma));
        }

        if self.config.enable_synonyms {
            if let Some(score) = self.synonyms.score(a, b) {
                breakdown.synonyms = Some(score);
                contributions.push((Method::Synonym, score, self.config.weight_synonyms));
            }
        }

        if self.config.enable_tfidf {
            if let Some(score) = self.tfidf.score(a, b) {
                breakdown.tfidf = Some(score);
                contributions.push((Method::TfIdf, score, self.config.weight_tfidf));
            }
        }

        if self.config.enable_embeddings {
            if let Some(embeddings) = &self.embeddings {
                // §4.G: once fuzzy already clears this bar, skip the model
                // call entirely and record the fuzzy score as the inferred
                // embedding contribution, so the breakdown stays explainable
                // without paying for a redundant encode.
                let score = match breakdown.rapidfuzz {
                    Some(fuzzy) if fuzzy >= SKIP_EMBEDDING_MODEL_THRESHOLD => fuzzy,
                    _ => embeddings.score(a, b),
                };
                breakdown.embeddings = Some(score);
                contributions.push((Method::Embedding, score, self.config.weight_embeddings));
            }
        }

        breakdown.final_score = fuse(&contributions);
        breakdown.methods_used = contributions.iter().map(|(m, _, _)| *m).collect();
        breakdown.computation_time_ms = elapsed_ms(start);
        breakdown
    }

    pub fn is_similar(&self, a: &str, b: &str, threshold: f64) -> bool {
        self.similarity(a, b) >= threshold
    }

    pub fn is_highly_similar(&self, a: &str, b: &str) -> bool {
        self.is_similar(a, b, HIGHLY_SIMILAR_THRESHOLD)
    }

    /// Scans `candidates` for the single best match to `query`, returning
    /// its index and score. `None` if `candidates` is empty.
    pub fn find_best_match(&self, query: &str, candidates: &[String]) -> Option<(usize, f64)> {
        candidates
            .iter()
            .enumerate()
            .map(|(idx, candidate)| (idx, self.similarity(query, candidate)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Every candidate scoring at or above `min_score`, sorted by score
    /// descending.
    pub fn find_all_matches(&self, query: &str, candidates: &[String], min_score: f64) -> Vec<(usize, f64)> {
        let mut matches: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(idx, candidate)| (idx, self.similarity(query, candidate)))
            .filter(|(_, score)| *score >= min_score)
            .collect();
        matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        matches
    }

    pub fn clear_caches(&self) {
        self.lemma.clear_cache();
        if let Some(embeddings) = &self.embeddings {
            embeddings.clear_cache();
        }
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }
}

/// Weighted fusion with dynamic redistribution (§4.G): the configured
/// weights only apply to methods that actually contributed a score, so a
/// disabled or not-yet-trained method never silently drags the average
/// down. A single contributor is returned as-is, sidestepping the
/// zero-weight-sum edge case entirely (mirrors the original's explicit
/// "only rapidfuzz contributed" fallback, generalised to any lone method).
fn fuse(contributions: &[(Method, f64, f64)]) -> f64 {
    match contributions.len() {
        0 => 0.0,
        1 => contributions[0].1,
        _ => {
            let weight_sum: f64 = contributions.iter().map(|(_, _, w)| w).sum();
            if weight_sum <= f64::EPSILON {
                let n = contributions.len() as f64;
                contributions.iter().map(|(_, s, _)| s).sum::<f64>() / n
            } else {
                contributions.iter().map(|(_, s, w)| s * w).sum::<f64>() / weight_sum
            }
        }
    }
    .clamp(0.0, 1.0)
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
