//! Hybrid text similarity for the clause analysis engine (4.B-4.G).

pub mod embedding;
pub mod fuzzy;
pub mod hybrid;
pub mod lemma;
pub mod scorer;
pub mod synonym;
pub mod tfidf;

pub use embedding::{EmbeddingProvider, EmbeddingScorer, HashingEmbeddingProvider};
pub use fuzzy::fuzzy_ratio;
pub use hybrid::{
    HybridSimilarityService, SimilarityBreakdown, HIGHLY_SIMILAR_THRESHOLD,
    SKIP_EMBEDDING_MODEL_THRESHOLD,
};
pub use lemma::LemmaScorer;
pub use scorer::Method;
pub use synonym::SynonymService;
pub use tfidf::TfIdfScorer;
