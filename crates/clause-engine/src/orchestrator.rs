//! The orchestrator (4.L): wires normalisation, clustering and the
//! strategy waterfall into one job, reporting progress along the way.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use clause_cache::ServiceRegistry;
use clause_cluster::ClusteringEngine;
use clause_core::{AdviceCode, Clause, Cluster, Confidence, ReferenceClause};
use clause_observe::{MonotonicProgress, PhaseTimer, ProgressSink};
use clause_reference::{parse_reference_table, ReferenceMatcher};
use clause_similarity::HybridSimilarityService;
use clause_similarity::SynonymService;
use clause_strategy::{default_pipeline, AnalysisContext, CustomInstructionService, StrategyPipeline};

use crate::error::{EngineError, EngineResult};
use crate::job::AnalysisJob;
use crate::output::{action_status, truncate_original_text, JobStatistics, OutputRow};

/// Result of running one job to completion (§6).
pub struct AnalysisResult {
    pub rows: Vec<OutputRow>,
    pub advice_by_cluster: HashMap<String, clause_core::Advice>,
    pub statistics: JobStatistics,
}

/// Runs analysis jobs; holds a process-wide [`ServiceRegistry`] so the
/// expensive parts of the semantic stack (TF-IDF training, embedding
/// indexing) are reused across jobs run against the same conditions
/// document (§4.K, §5 "shared, read-only instances of A-F held in K").
pub struct ClauseEngine {
    registry: Arc<ServiceRegistry>,
    pipeline: StrategyPipeline,
}

impl Default for ClauseEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClauseEngine {
    pub fn new() -> Self {
        Self { registry: Arc::new(ServiceRegistry::new()), pipeline: default_pipeline() }
    }

    pub fn with_registry(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry, pipeline: default_pipeline() }
    }

    pub fn run(&self, job: AnalysisJob, progress: &dyn ProgressSink) -> EngineResult<AnalysisResult> {
        let monitor = MonotonicProgress::new(progress);

        // Phase 1-2: normalise rows into Clauses.
        let timer = PhaseTimer::start("normalise");
        let mut clauses: Vec<Clause> = job
            .rows
            .iter()
            .map(|row| {
                let mut clause = clause_normalize::build_clause(row.id.clone(), row.raw_text.clone());
                if let Some(policy) = &row.policy_number {
                    clause = clause.with_policy_number(policy.clone());
                }
                clause
            })
            .collect();
        timer.finish();
        monitor.advance(10, "rows normalised");

        if clauses.is_empty() {
            monitor.advance(100, "empty input");
            return Ok(AnalysisResult { rows: Vec::new(), advice_by_cluster: HashMap::new(), statistics: JobStatistics::default() });
        }

        // Phase 3: sections are handed in already parsed (document parsing
        // is out of scope, §1 Non-goals); just precompute the substring
        // concatenation the conditions-match strategy needs.
        let concatenated_sections = job.sections.iter().map(|s| s.normalised_text.as_str()).collect::<Vec<_>>().join(" ");
        monitor.advance(15, "conditions prepared");

        // Phase 4: initialise the semantic stack, reusing a previously
        // trained instance from the registry when the same conditions
        // corpus and mode have been seen before.
        let timer = PhaseTimer::start("semantic_stack");
        let semantic_config = if job.settings.use_semantic {
            job.config.semantic.clone()
        } else {
            clause_core::SemanticConfig::fast()
        };
        if !semantic_config.enable_lemma && !semantic_config.enable_synonyms && !semantic_config.enable_tfidf && !semantic_config.enable_embeddings {
            tracing::debug!("no optional scorers enabled, job runs on fuzzy matching only");
        }
        let corpus: Vec<String> = job.sections.iter().map(|s| s.normalised_text.clone()).collect();
        let synonym_pairs = job.synonym_pairs.clone();
        let cache_key = similarity_cache_key(&job.config.mode, &semantic_config.embedding_model, &corpus, &synonym_pairs);
        let similarity: Arc<HybridSimilarityService> = self.registry.get_or_create(&cache_key, Some(Duration::from_secs(3600)), false, move || {
            let mut service = HybridSimilarityService::new(semantic_config);
            if !synonym_pairs.is_empty() {
                service.load_synonyms(SynonymService::from_pairs(synonym_pairs));
            }
            if !corpus.is_empty() {
                service.train_tfidf(&corpus);
            }
            service
        });
        timer.finish();
        monitor.advance(25, "semantic stack ready");

        // Phase 5: attach optional collaborators.
        let custom_instructions = CustomInstructionService::new(&job.settings.extra_instructions);
        let mut reference_matcher = match &job.reference_table {
            Some(table) => match parse_reference_table(&table.headers, &table.rows) {
                Ok(entries) => Some(ReferenceMatcher::new(entries)),
                Err(err) => {
                    tracing::warn!(error = %err, "reference attachment failed, proceeding without reference matching");
                    None
                }
            },
            None => None,
        };
        monitor.advance(30, "collaborators attached");

        // Phase 6-7: cluster.
        let timer = PhaseTimer::start("cluster");
        let clustering_engine = ClusteringEngine::new(job.config.clustering.clone(), job.config.cluster_naming.clone());
        let clusters = clustering_engine.cluster_clauses(&mut clauses, &similarity);
        timer.finish();
        validate_clusters(&clusters)?;
        monitor.advance(55, "clustering complete");

        let clause_by_id: HashMap<&str, &Clause> = clauses.iter().map(|c| (c.id.as_str(), c)).collect();

        // Precompute reference matches per cluster id (J needs `&mut self`,
        // strategies only ever see a shared context).
        let reference_matches: HashMap<String, ReferenceClause> = match reference_matcher.as_mut() {
            Some(matcher) => clusters
                .iter()
                .filter_map(|cluster| {
                    let policy = clause_by_id.get(cluster.leader_id.as_str()).and_then(|c| c.source_policy_number.as_deref());
                    matcher.find_match(&cluster.leader_text, policy).map(|result| (cluster.id.clone(), matcher.entry(result.index).clone()))
                })
                .collect(),
            None => HashMap::new(),
        };

        // Phase 8: run the strategy waterfall per cluster.
        let timer = PhaseTimer::start("strategies");
        let has_conditions = job.settings.use_conditions;
        let mut advice_by_cluster: HashMap<String, clause_core::Advice> = HashMap::new();
        let mut found_in_conditions = 0usize;
        for cluster in &clusters {
            let ctx = AnalysisContext {
                config: &job.config,
                has_conditions,
                policy_sections: &job.sections,
                concatenated_sections: &concatenated_sections,
                standard_clauses: &job.standard_clauses,
                similarity: &similarity,
                custom_instructions: &custom_instructions,
                reference_matches: &reference_matches,
                llm_oracle: job.llm_oracle.as_ref(),
                as_of_date: job.settings.as_of_date,
            };
            let (advice, strategy_name) = self.pipeline.run_traced(cluster, &ctx);
            if strategy_name == Some("conditions_match") {
                found_in_conditions += 1;
            }
            advice_by_cluster.insert(cluster.id.clone(), advice);
        }
        timer.finish();

        // Phase 9: every cluster must have an advice; clauses assigned the
        // reserved NVT id share one synthetic verdict (4.H step 1).
        for cluster in &clusters {
            if !advice_by_cluster.contains_key(&cluster.id) {
                return Err(EngineError::MissingAdvice { cluster_id: cluster.id.clone() });
            }
        }
        let nvt_advice = clause_core::Advice::new(Clause::NVT_CLUSTER_ID, AdviceCode::ManualCheck, "too short to cluster", Confidence::Low).with_category("NVT");
        advice_by_cluster.insert(Clause::NVT_CLUSTER_ID.to_string(), nvt_advice);
        monitor.advance(85, "advice assigned");

        // Phase 10: emit one output row per input row.
        let cluster_by_id: HashMap<&str, &Cluster> = clusters.iter().map(|c| (c.id.as_str(), c)).collect();
        let nvt_frequency = clauses.iter().filter(|c| c.is_not_applicable()).count();
        let mut rows = Vec::with_capacity(clauses.len());
        let mut advice_distribution: HashMap<String, usize> = HashMap::new();
        let mut category_distribution: HashMap<String, usize> = HashMap::new();

        for clause in &clauses {
            let cluster_id = clause.cluster_id.clone().unwrap_or_else(|| Clause::NVT_CLUSTER_ID.to_string());
            let advice = advice_by_cluster.get(&cluster_id).expect("every cluster id has an advice by phase 9");
            let (cluster_name, frequency) = match cluster_by_id.get(cluster_id.as_str()) {
                Some(cluster) => (cluster.name.clone(), cluster.frequency()),
                None => ("NVT".to_string(), nvt_frequency),
            };
            let reference_status = reference_matches.get(&cluster_id).and_then(|r| r.status.as_deref());

            *advice_distribution.entry(advice.code.as_str().into_owned()).or_insert(0) += 1;
            *category_distribution.entry(advice.category.clone()).or_insert(0) += 1;

            rows.push(OutputRow {
                row_id: clause.id.clone(),
                cluster_id: cluster_id.clone(),
                cluster_name,
                frequency,
                advice_code: advice.code.as_str().into_owned(),
                confidence: advice.confidence.to_string(),
                reason: advice.reason.clone(),
                reference: advice.reference.clone(),
                original_text: truncate_original_text(&clause.raw_text),
                row_type: "SINGLE",
                parent_id: None,
                action_status: action_status(reference_status),
            });
        }

        let unique_clusters = clusters.len();
        let total_rows = clauses.len();
        let reduction_percentage = if total_rows == 0 { 0 } else { (100.0 * (1.0 - unique_clusters as f64 / total_rows as f64)).floor().max(0.0) as u32 };
        let avg_cluster_size = if unique_clusters == 0 { 0.0 } else { clusters.iter().map(|c| c.frequency()).sum::<usize>() as f64 / unique_clusters as f64 };

        let statistics = JobStatistics {
            total_rows,
            unique_clusters,
            reduction_percentage,
            advice_distribution,
            category_distribution,
            found_in_conditions,
            avg_cluster_size,
        };

        monitor.advance(100, "job complete");
        Ok(AnalysisResult { rows, advice_by_cluster, statistics })
    }
}

fn similarity_cache_key(mode: &clause_core::Mode, embedding_model: &str, corpus: &[String], synonym_pairs: &[(String, String)]) -> String {
    let mut hasher = DefaultHasher::new();
    corpus.hash(&mut hasher);
    synonym_pairs.hash(&mut hasher);
    format!("similarity::{mode:?}::{embedding_model}::{:x}", hasher.finish())
}

fn validate_clusters(clusters: &[Cluster]) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for cluster in clusters {
        if !cluster.is_consistent() {
            return Err(EngineError::InvariantViolation { cluster_id: cluster.id.clone(), detail: "leader is not a member of its own cluster".to_string() });
        }
        if !seen.insert(cluster.id.as_str()) {
            return Err(EngineError::InvariantViolation { cluster_id: cluster.id.clone(), detail: "duplicate cluster id".to_string() });
        }
    }
    Ok(())
}
