//! Engine configuration: thresholds, rule tables, and mode presets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};

/// Coarse performance/quality preset (§6). Each mode fixes a weight table and
/// a set of enabled scorers for the hybrid similarity service; `Custom`
/// leaves every field as loaded from TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Fast,
    Balanced,
    Accurate,
    Custom,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Balanced
    }
}

/// Weights and feature toggles for the hybrid similarity fusion (4.G).
///
/// Weights are not required to sum to 1.0 up front: the fusion step
/// normalises by the sum of weights of the methods that actually produced a
/// score (§4.G, dynamic weight redistribution).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticConfig {
    pub enable_fuzzy: bool,
    pub enable_lemma: bool,
    pub enable_synonyms: bool,
    pub enable_tfidf: bool,
    pub enable_embeddings: bool,
    pub weight_fuzzy: f64,
    pub weight_lemma: f64,
    pub weight_synonyms: f64,
    pub weight_tfidf: f64,
    pub weight_embeddings: f64,
    /// Short-circuit: skip remaining scorers once fuzzy alone clears this
    /// (§4.G early-exit). `None` disables the early exit.
    pub early_exit_threshold: Option<f64>,
    pub embedding_model: String,
}

impl SemanticConfig {
    /// `fast`: fuzzy-only, no early exit needed because nothing else runs.
    pub fn fast() -> Self {
        Self {
            enable_fuzzy: true,
            enable_lemma: false,
            enable_synonyms: false,
            enable_tfidf: false,
            enable_embeddings: false,
            weight_fuzzy: 1.0,
            weight_lemma: 0.0,
            weight_synonyms: 0.0,
            weight_tfidf: 0.0,
            weight_embeddings: 0.0,
            early_exit_threshold: None,
            embedding_model: default_embedding_model(),
        }
    }

    /// `balanced`: fuzzy + lemma + tf-idf, embeddings disabled (the
    /// heaviest, least portable method), early exit at a high fuzzy score.
    pub fn balanced() -> Self {
        Self {
            enable_fuzzy: true,
            enable_lemma: true,
            enable_synonyms: true,
            enable_tfidf: true,
            enable_embeddings: false,
            weight_fuzzy: 0.35,
            weight_lemma: 0.25,
            weight_synonyms: 0.15,
            weight_tfidf: 0.25,
            weight_embeddings: 0.0,
            early_exit_threshold: Some(0.98),
            embedding_model: default_embedding_model(),
        }
    }

    /// `accurate`: every method enabled, no early exit so the full
    /// breakdown is always computed.
    pub fn accurate() -> Self {
        Self {
            enable_fuzzy: true,
            enable_lemma: true,
            enable_synonyms: true,
            enable_tfidf: true,
            enable_embeddings: true,
            weight_fuzzy: 0.20,
            weight_lemma: 0.20,
            weight_synonyms: 0.10,
            weight_tfidf: 0.20,
            weight_embeddings: 0.30,
            early_exit_threshold: None,
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_embedding_model() -> String {
    "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".to_string()
}

/// Clustering thresholds (4.H).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    pub min_text_length: usize,
    pub similarity_threshold: f64,
    pub leader_window_size: usize,
    pub length_tolerance: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_text_length: 5,
            similarity_threshold: 0.90,
            leader_window_size: 100,
            length_tolerance: 0.2,
        }
    }
}

/// Multi-clause splitting thresholds, used by the clause-library strategy
/// (4.I) to decide between `SPLIT` and `SPLIT_CHECK`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiClauseConfig {
    pub max_text_length: usize,
    pub min_codes_for_split: usize,
}

impl Default for MultiClauseConfig {
    fn default() -> Self {
        Self {
            max_text_length: 1000,
            min_codes_for_split: 2,
        }
    }
}

/// Thresholds for the policy-conditions-match strategy (4.I step 2.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsMatchConfig {
    pub exact_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub min_text_length: usize,
    /// Minimum sentence length considered for the fragment heuristic (4.I
    /// step 2.0): sentences shorter than this are too generic to count as
    /// evidence of a match on their own.
    pub fragment_min_sentence_length: usize,
    /// Fraction of a cluster's qualifying sentences that must be found
    /// verbatim in the concatenated sections for the fragment heuristic to
    /// fire.
    pub fragment_match_ratio: f64,
}

impl Default for ConditionsMatchConfig {
    fn default() -> Self {
        Self {
            exact_threshold: 0.95,
            high_threshold: 0.85,
            medium_threshold: 0.75,
            min_text_length: 20,
            fragment_min_sentence_length: 20,
            fragment_match_ratio: 0.5,
        }
    }
}

/// Thresholds for the standard-clause-library strategy (4.I step 1.0).
///
/// Distinct from [`ConditionsMatchConfig`]: the original keeps both tables
/// at the same numeric values but as separate named settings, so an
/// operator can retune the library's bar independently of the conditions
/// document's bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseLibraryConfig {
    pub exact_threshold: f64,
    pub check_threshold: f64,
}

impl Default for ClauseLibraryConfig {
    fn default() -> Self {
        Self {
            exact_threshold: 0.95,
            check_threshold: 0.85,
        }
    }
}

/// A single keyword-triggered rule for the fallback strategy (4.I step 3.0).
///
/// `inclusion_keywords`, when non-empty, gates the rule: at least one keyword
/// from `keywords` AND at least one from `inclusion_keywords` must appear,
/// preventing broad terms (e.g. "molest") from over-triggering on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub inclusion_keywords: Vec<String>,
    pub advice: String,
    pub reason: String,
    pub confidence: String,
    #[serde(default)]
    pub article_mapping: Option<String>,
    /// Only applies below this text length, when set (§4.I.3).
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// Fallback-strategy rule tables (4.I step 3.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRuleConfig {
    pub frequency_standardize_threshold: usize,
    pub keyword_rules: Vec<KeywordRule>,
    #[serde(default)]
    pub article_mapping: HashMap<String, String>,
}

impl Default for AnalysisRuleConfig {
    fn default() -> Self {
        Self {
            frequency_standardize_threshold: 20,
            keyword_rules: default_keyword_rules(),
            article_mapping: HashMap::new(),
        }
    }
}

fn default_keyword_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule {
            name: "fraude".to_string(),
            keywords: vec!["fraude".to_string(), "frauduleus".to_string()],
            inclusion_keywords: Vec::new(),
            advice: "HANDMATIG_CHECKEN".to_string(),
            reason: "Clausule raakt fraude; vereist juridische toetsing.".to_string(),
            confidence: "MEDIUM".to_string(),
            article_mapping: None,
            max_length: None,
        },
        KeywordRule {
            name: "rangorde".to_string(),
            keywords: vec!["rangorde".to_string(), "rangregeling".to_string()],
            inclusion_keywords: Vec::new(),
            advice: "HANDMATIG_CHECKEN".to_string(),
            reason: "Clausule regelt rangorde tussen verzekeringen.".to_string(),
            confidence: "MEDIUM".to_string(),
            article_mapping: None,
            max_length: None,
        },
        KeywordRule {
            name: "molest".to_string(),
            keywords: vec!["molest".to_string()],
            inclusion_keywords: vec!["uitsluiting".to_string(), "uitgesloten".to_string()],
            advice: "HANDMATIG_CHECKEN".to_string(),
            reason: "Molestuitsluiting; vereist juridische toetsing.".to_string(),
            confidence: "HIGH".to_string(),
            article_mapping: None,
            max_length: None,
        },
    ]
}

/// Cluster-naming rules (4.H naming step).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNamingConfig {
    pub theme_patterns: HashMap<String, Vec<String>>,
    pub fallback_word_count: usize,
}

impl Default for ClusterNamingConfig {
    fn default() -> Self {
        let mut theme_patterns = HashMap::new();
        theme_patterns.insert(
            "premie".to_string(),
            vec!["premie".to_string(), "naverrekening".to_string()],
        );
        theme_patterns.insert("eigen risico".to_string(), vec!["eigen risico".to_string()],
        );
        theme_patterns.insert(
            "dekking".to_string(),
            vec!["dekking".to_string(), "gedekt".to_string()],
        );
        Self {
            theme_patterns,
            fallback_word_count: 5,
        }
    }
}

/// Top-level engine configuration (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: Mode,
    pub semantic: SemanticConfig,
    pub clustering: ClusteringConfig,
    pub multi_clause: MultiClauseConfig,
    pub conditions_match: ConditionsMatchConfig,
    pub clause_library: ClauseLibraryConfig,
    pub analysis_rules: AnalysisRuleConfig,
    pub cluster_naming: ClusterNamingConfig,
}

impl EngineConfig {
    /// Build a config from a named preset (§6). `Custom` falls back to
    /// `balanced`'s semantic weights as a starting point for callers that
    /// intend to override individual fields afterwards.
    pub fn preset(mode: Mode) -> Self {
        let semantic = match mode {
            Mode::Fast => SemanticConfig::fast(),
            Mode::Balanced | Mode::Custom => SemanticConfig::balanced(),
            Mode::Accurate => SemanticConfig::accurate(),
        };
        Self {
            mode,
            semantic,
            clustering: ClusteringConfig::default(),
            multi_clause: MultiClauseConfig::default(),
            conditions_match: ConditionsMatchConfig::default(),
            clause_library: ClauseLibraryConfig::default(),
            analysis_rules: AnalysisRuleConfig::default(),
            cluster_naming: ClusterNamingConfig::default(),
        }
    }

    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        toml::from_str(input).map_err(ConfigError::from)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(ConfigError::from)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::preset(Mode::Balanced)
    }
}
