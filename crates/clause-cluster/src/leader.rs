//! Leader clustering algorithm (4.H).
//!
//! Single pass over clauses sorted by normalised-text length descending,
//! with an exact-match cache and a bounded backward search window so the
//! algorithm stays near-linear instead of comparing every clause against
//! every existing cluster.

use std::collections::HashMap;

use clause_core::{Clause, Cluster, ClusterNamingConfig, ClusteringConfig};
use clause_similarity::HybridSimilarityService;

use crate::naming::generate_cluster_name;

pub struct ClusteringEngine {
    config: ClusteringConfig,
    naming: ClusterNamingConfig,
}

impl ClusteringEngine {
    pub fn new(config: ClusteringConfig, naming: ClusterNamingConfig) -> Self {
        Self { config, naming }
    }

    /// Retunes the similarity threshold between runs without rebuilding the
    /// engine (supplemented feature, grounded in `update_similarity_threshold`).
    pub fn set_threshold(&mut self, threshold: f64) {
        self.config.similarity_threshold = threshold;
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Clusters `clauses` in place (assigning `cluster_id` on each) and
    /// returns the resulting clusters. Clauses whose normalised text is
    /// shorter than `min_text_length` are assigned the reserved `NVT`
    /// cluster and never compared against anything (step 1 of 4.H).
    ///
    /// The grouping decision (exact-match cache, leader comparison) runs
    /// against each clause's plain `normalised_text`, not the fully
    /// variable-masked form (`clause_normalize::normalise_for_clustering`):
    /// masking collapses an entire amount/date/reference run to one
    /// placeholder token irrespective of its value, which would make
    /// clauses differing only in, say, an insured amount compare as
    /// *identical* at every threshold — collapsing the worked example in
    /// spec.md §8 scenario 2 (threshold 0.85 → 1 cluster, 0.98 → 3
    /// clusters) into a single cluster regardless of threshold. Comparing
    /// on the plain normalised text instead preserves the graded
    /// similarity a tight threshold needs to tell "100.000" apart from
    /// "250.000" while a loose one still merges them. `normalise_for_clustering`
    /// remains available to ingestion-side callers that want a masked
    /// dedup key ahead of this step; the Leader algorithm itself does not
    /// force it.
    pub fn cluster_clauses(&self, clauses: &mut [Clause], similarity: &HybridSimilarityService) -> Vec<Cluster> {
        let mut order: Vec<usize> = (0..clauses.len()).collect();
        order.sort_by(|&a, &b| {
            let len_a = clauses[a].normalised_text.chars().count();
            let len_b = clauses[b].normalised_text.chars().count();
            len_b.cmp(&len_a).then(a.cmp(&b))
        });

        let mut clusters: Vec<Cluster> = Vec::new();
        let mut cluster_index: HashMap<String, usize> = HashMap::new();
        let mut exact_cache: HashMap<String, String> = HashMap::new();
        let mut next_id: usize = 1;

        for idx in order {
            let normalised = clauses[idx].normalised_text.clone();

            if normalised.chars().count() < self.config.min_text_length {
                clauses[idx].cluster_id = Some(Clause::NVT_CLUSTER_ID.to_string());
                continue;
            }

            if let Some(cluster_id) = exact_cache.get(&normalised).cloned() {
                self.assign(&mut clauses[idx], &cluster_id, &mut clusters, &cluster_index);
                continue;
            }

            // A window size of 0 means "unlimited" (§4.H step 4): compare
            // against every leader seen so far instead of none of them.
            let window_start = if self.config.leader_window_size == 0 {
                0
            } else {
                clusters.len().saturating_sub(self.config.leader_window_size)
            };
            let mut matched: Option<String> = None;
            for cluster in &clusters[window_start..] {
                if !within_length_tolerance(
                    normalised.chars().count(),
                    cluster.leader_text.chars().count(),
                    self.config.length_tolerance,
                ) {
                    continue;
                }
                if similarity.similarity(&normalised, &cluster.leader_text) >= self.config.similarity_threshold {
                    matched = Some(cluster.id.clone());
                    break;
                }
            }

            match matched {
                Some(cluster_id) => {
                    exact_cache.insert(normalised, cluster_id.clone());
                    self.assign(&mut clauses[idx], &cluster_id, &mut clusters, &cluster_index);
                }
                None => {
                    let cluster_id = format!("CL-{next_id:04}");
                    next_id += 1;
                    let name = generate_cluster_name(&normalised, &clauses[idx].raw_text, &self.naming);
                    let cluster = Cluster::new(
                        cluster_id.clone(),
                        clauses[idx].id.clone(),
                        normalised.clone(),
                        clauses[idx].raw_text.clone(),
                        name,
                    );
                    clauses[idx].cluster_id = Some(cluster_id.clone());
                    exact_cache.insert(normalised, cluster_id.clone());
                    cluster_index.insert(cluster_id, clusters.len());
                    clusters.push(cluster);
                }
            }
        }

        clusters
    }

    fn assign(&self, clause: &mut Clause, cluster_id: &str, clusters: &mut [Cluster], cluster_index: &HashMap<String, usize>) {
        clause.cluster_id = Some(cluster_id.to_string());
        if let Some(&pos) = cluster_index.get(cluster_id) {
            clusters[pos].add_member(clause.id.clone());
        }
    }
}

fn within_length_tolerance(len_a: usize, len_b: usize, tolerance: f64) -> bool {
    if len_b == 0 {
        return len_a == 0;
    }
    let ratio = (len_a as f64 - len_b as f64).abs() / len_b as f64;
    ratio <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use clause_core::SemanticConfig;

    fn clause(id: &str, text: &str) -> Clause {
        Clause::new(id, text, clause_normalize::normalise(text))
    }

    #[test]
    fn identical_clauses_cluster_together() {
        let engine = ClusteringEngine::new(ClusteringConfig::default(), ClusterNamingConfig::default());
        let similarity = HybridSimilarityService::new(SemanticConfig::fast());
        let mut clauses = vec![
            clause("row_1", "Dekking van brandschade tot 10000 euro."),
            clause("row_2", "Dekking van brandschade tot 10000 euro."),
        ];
        let clusters = engine.cluster_clauses(&mut clauses, &similarity);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].frequency(), 2);
        assert_eq!(clauses[0].cluster_id, clauses[1].cluster_id);
    }

    #[test]
    fn short_clauses_are_marked_not_applicable() {
        let engine = ClusteringEngine::new(ClusteringConfig::default(), ClusterNamingConfig::default());
        let similarity = HybridSimilarityService::new(SemanticConfig::fast());
        let mut clauses = vec![clause("row_1", "Ja.")];
        let clusters = engine.cluster_clauses(&mut clauses, &similarity);
        assert!(clusters.is_empty());
        assert!(clauses[0].is_not_applicable());
    }

    #[test]
    fn dissimilar_clauses_get_separate_clusters() {
        let engine = ClusteringEngine::new(ClusteringConfig::default(), ClusterNamingConfig::default());
        let similarity = HybridSimilarityService::new(SemanticConfig::fast());
        let mut clauses = vec![
            clause("row_1", "Dekking van brandschade tot 10000 euro per jaar."),
            clause("row_2", "Uitsluiting van molestschade in alle gevallen."),
        ];
        let clusters = engine.cluster_clauses(&mut clauses, &similarity);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn masked_amounts_cluster_together_at_a_loose_threshold() {
        let mut config = ClusteringConfig::default();
        config.similarity_threshold = 0.85;
        let engine = ClusteringEngine::new(config, ClusterNamingConfig::default());
        let similarity = HybridSimilarityService::new(SemanticConfig::balanced());
        let mut clauses = vec![
            clause("row_1", "Verzekerd bedrag EUR 100.000"),
            clause("row_2", "Verzekerd bedrag EUR 250.000"),
            clause("row_3", "Verzekerd bedrag EUR 500.000"),
        ];
        let clusters = engine.cluster_clauses(&mut clauses, &similarity);
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn masked_amounts_split_at_a_tight_threshold() {
        let mut config = ClusteringConfig::default();
        config.similarity_threshold = 0.98;
        let engine = ClusteringEngine::new(config, ClusterNamingConfig::default());
        let similarity = HybridSimilarityService::new(SemanticConfig::balanced());
        let mut clauses = vec![
            clause("row_1", "Verzekerd bedrag EUR 100.000"),
            clause("row_2", "Verzekerd bedrag EUR 250.000"),
            clause("row_3", "Verzekerd bedrag EUR 500.000"),
        ];
        let clusters = engine.cluster_clauses(&mut clauses, &similarity);
        assert_eq!(clusters.len(), 3);
    }

    #[test]
    fn zero_window_size_compares_against_every_prior_leader() {
        let mut config = ClusteringConfig::default();
        config.leader_window_size = 0;
        config.similarity_threshold = 0.80;
        let engine = ClusteringEngine::new(config, ClusterNamingConfig::default());
        let similarity = HybridSimilarityService::new(SemanticConfig::fast());
        // Intentionally push more than a typical small window's worth of
        // distinct leaders in front of the clause that should still match
        // the very first one.
        let mut clauses = vec![
            clause("row_1", "Dekking van brandschade tot tienduizend euro per jaar."),
            clause("row_2", "Uitsluiting van molestschade in alle gevallen zonder."),
            clause("row_3", "Eigen risico bedraagt tweehonderdvijftig euro per schade."),
            clause("row_4", "Rangorde tussen verzekeringen wordt hierbij vastgesteld."),
            clause("row_5", "Dekking van brandschade tot tienduizend euro per jaar!"),
        ];
        let clusters = engine.cluster_clauses(&mut clauses, &similarity);
        assert_eq!(clauses[0].cluster_id, clauses[4].cluster_id);
        assert_eq!(clusters.len(), 4);
    }

    #[test]
    fn every_cluster_is_internally_consistent() {
        let engine = ClusteringEngine::new(ClusteringConfig::default(), ClusterNamingConfig::default());
        let similarity = HybridSimilarityService::new(SemanticConfig::fast());
        let mut clauses = vec![
            clause("row_1", "Dekking van brandschade tot 10000 euro per jaar."),
            clause("row_2", "Dekking van brandschade tot 20000 euro per jaar."),
            clause("row_3", "Uitsluiting van molestschade in alle gevallen."),
        ];
        let clusters = engine.cluster_clauses(&mut clauses, &similarity);
        for cluster in &clusters {
            assert!(cluster.is_consistent());
        }
    }
}
