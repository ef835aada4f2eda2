//! Shared context threaded through every strategy's `can_handle`/`analyse`
//! call (4.I).

use std::collections::HashMap;

use chrono::NaiveDate;
use clause_core::{EngineConfig, ReferenceClause, Section, StandardClause};
use clause_llm::LlmOracle;
use clause_similarity::HybridSimilarityService;

use crate::custom::CustomInstructionService;

/// Everything a strategy needs to decide whether it applies and, if so,
/// what to recommend. Read-only: strategies never mutate shared state, they
/// only read off it and return an `Advice`.
pub struct AnalysisContext<'a> {
    pub config: &'a EngineConfig,
    /// Whether a policy conditions document was supplied for this job at
    /// all (gates the conditions-match strategy, 4.I step 2.0).
    pub has_conditions: bool,
    pub policy_sections: &'a [Section],
    /// All normalised section texts joined with a space, precomputed once
    /// by the orchestrator so the conditions-match substring fast path and
    /// fragment heuristic don't rebuild it per cluster.
    pub concatenated_sections: &'a str,
    pub standard_clauses: &'a [StandardClause],
    pub similarity: &'a HybridSimilarityService,
    pub custom_instructions: &'a CustomInstructionService,
    /// Prior-run reference matches, keyed by cluster id. Populated ahead of
    /// time by the orchestrator because `ReferenceMatcher::find_match`
    /// needs `&mut self` while strategies only ever see a shared context.
    pub reference_matches: &'a HashMap<String, ReferenceClause>,
    /// Last-resort collaborator for the fallback strategy (4.I.3). `&dyn`
    /// so a `clause_llm::NoopOracle` can stand in when no real integration
    /// is configured, without the fallback strategy needing to know that.
    pub llm_oracle: &'a dyn LlmOracle,
    /// Reference date admin/hygiene checks compare expiry dates against.
    /// Threaded in explicitly rather than read from the wall clock so a
    /// run is reproducible.
    pub as_of_date: NaiveDate,
}
