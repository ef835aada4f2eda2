//! Inputs to one analysis job (§4.L phase 1, §6 External Interfaces).

use chrono::NaiveDate;
use std::sync::Arc;

use clause_core::{EngineConfig, Section, StandardClause};
use clause_llm::{LlmOracle, NoopOracle};

/// One row of the input spreadsheet, as handed over by the ingestion
/// collaborator (out of scope, §1 Non-goals).
#[derive(Debug, Clone)]
pub struct InputRow {
    pub id: String,
    pub raw_text: String,
    pub policy_number: Option<String>,
}

impl InputRow {
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self { id: id.into(), raw_text: raw_text.into(), policy_number: None }
    }

    pub fn with_policy_number(mut self, policy_number: impl Into<String>) -> Self {
        self.policy_number = Some(policy_number.into());
        self
    }
}

/// A raw prior-run export, header row plus data rows, ahead of the
/// `Tekst`/`Advies` alias resolution performed by
/// `clause_reference::parse_reference_table` (§6, §7 "malformed reference
/// table").
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Per-job overrides and toggles (§4.L phase 1). Distinct from
/// [`EngineConfig`], which holds the tunable thresholds a *mode preset*
/// fixes; these are the switches a caller flips per run.
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Whether the policy-conditions-match strategy (4.I.2) is consulted
    /// at all, independent of whether sections were supplied.
    pub use_conditions: bool,
    /// Whether the semantic stack (lemma/synonym/TF-IDF/embeddings) is
    /// built at all; `false` forces fuzzy-only scoring regardless of the
    /// mode preset's flags.
    pub use_semantic: bool,
    /// Free-form custom-instruction blob (§6), may be empty.
    pub extra_instructions: String,
    /// Reference date admin/hygiene date checks compare against (§4.I.0).
    pub as_of_date: NaiveDate,
}

impl JobSettings {
    pub fn new(as_of_date: NaiveDate) -> Self {
        Self { use_conditions: true, use_semantic: true, extra_instructions: String::new(), as_of_date }
    }

    pub fn without_conditions(mut self) -> Self {
        self.use_conditions = false;
        self
    }

    pub fn without_semantic(mut self) -> Self {
        self.use_semantic = false;
        self
    }

    pub fn with_extra_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.extra_instructions = instructions.into();
        self
    }
}

/// Everything one call to [`crate::ClauseEngine::run`] needs (§4.L, §6).
pub struct AnalysisJob {
    pub config: EngineConfig,
    pub settings: JobSettings,
    pub rows: Vec<InputRow>,
    pub sections: Vec<Section>,
    pub standard_clauses: Vec<StandardClause>,
    pub reference_table: Option<ReferenceTable>,
    /// `(variant, canonical)` pairs for the synonym scorer (4.D); empty
    /// leaves the scorer unloaded, which the hybrid fusion treats as
    /// "not contributing" rather than an error.
    pub synonym_pairs: Vec<(String, String)>,
    pub llm_oracle: Arc<dyn LlmOracle>,
}

impl AnalysisJob {
    pub fn new(config: EngineConfig, settings: JobSettings, rows: Vec<InputRow>) -> Self {
        Self {
            config,
            settings,
            rows,
            sections: Vec::new(),
            standard_clauses: Vec::new(),
            reference_table: None,
            synonym_pairs: Vec::new(),
            llm_oracle: Arc::new(NoopOracle),
        }
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_standard_clauses(mut self, standard_clauses: Vec<StandardClause>) -> Self {
        self.standard_clauses = standard_clauses;
        self
    }

    pub fn with_reference_table(mut self, reference_table: ReferenceTable) -> Self {
        self.reference_table = Some(reference_table);
        self
    }

    pub fn with_synonym_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.synonym_pairs = pairs;
        self
    }

    pub fn with_llm_oracle(mut self, oracle: Arc<dyn LlmOracle>) -> Self {
        self.llm_oracle = oracle;
        self
    }
}
