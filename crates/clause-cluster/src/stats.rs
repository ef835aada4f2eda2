//! Cluster statistics (supplemented feature, `SPEC_FULL.md` item 1).
//!
//! A pure function of `&[Cluster]`, distinct from the orchestrator-level
//! aggregate statistics (4.L) which report on the whole job; this is usable
//! by any caller that only has clustering output in hand. Grounded in
//! `ClusteringService.get_cluster_statistics`.

use clause_core::Cluster;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterStatistics {
    pub total_clusters: usize,
    pub total_clauses: usize,
    pub avg_frequency: f64,
    pub max_frequency: usize,
    pub singletons: usize,
}

pub fn compute(clusters: &[Cluster]) -> ClusterStatistics {
    if clusters.is_empty() {
        return ClusterStatistics::default();
    }
    let total_clusters = clusters.len();
    let total_clauses: usize = clusters.iter().map(|c| c.frequency()).sum();
    let max_frequency = clusters.iter().map(|c| c.frequency()).max().unwrap_or(0);
    let singletons = clusters.iter().filter(|c| c.frequency() == 1).count();
    ClusterStatistics {
        total_clusters,
        total_clauses,
        avg_frequency: total_clauses as f64 / total_clusters as f64,
        max_frequency,
        singletons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_zeroed_statistics() {
        assert_eq!(compute(&[]), ClusterStatistics::default());
    }

    #[test]
    fn computes_averages_and_extremes() {
        let mut a = Cluster::new("CL-0001", "row_1", "tekst een", "Tekst een", "A");
        a.add_member("row_2");
        let b = Cluster::new("CL-0002", "row_3", "tekst twee", "Tekst twee", "B");
        let stats = compute(&[a, b]);
        assert_eq!(stats.total_clusters, 2);
        assert_eq!(stats.total_clauses, 3);
        assert_eq!(stats.max_frequency, 2);
        assert_eq!(stats.singletons, 1);
        assert!((stats.avg_frequency - 1.5).abs() < 1e-9);
    }
}
