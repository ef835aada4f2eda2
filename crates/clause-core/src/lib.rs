//! Core data model and configuration for the clause analysis engine.
//!
//! This crate has no knowledge of text normalisation, similarity scoring, or
//! strategy dispatch — it only defines the shapes those crates pass around,
//! plus the configuration tree that parameterises them (§6).

pub mod config;
pub mod error;
pub mod model;

pub use config::{
    AnalysisRuleConfig, ClauseLibraryConfig, ClusterNamingConfig, ClusteringConfig,
    ConditionsMatchConfig, EngineConfig, KeywordRule, Mode, MultiClauseConfig, SemanticConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use model::{Advice, AdviceCode, Clause, Cluster, Confidence, ReferenceClause, Section, StandardClause};
