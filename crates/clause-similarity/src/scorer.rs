//! Shared vocabulary for the individual similarity methods (4.B-4.F).

/// Name of a scoring method, used as the key in [`crate::hybrid::SimilarityBreakdown::methods_used`]
/// and for per-method weight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Fuzzy,
    Lemma,
    Synonym,
    TfIdf,
    Embedding,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Fuzzy => "fuzzy",
            Method::Lemma => "lemma",
            Method::Synonym => "synonym",
            Method::TfIdf => "tfidf",
            Method::Embedding => "embedding",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
