//! Five-step waterfall pipeline (4.I): an ordered list of strategies, first
//! match wins.

use clause_core::{Advice, Cluster, Confidence};

use crate::context::AnalysisContext;

/// One step of the waterfall. `order` fixes dispatch order (ascending);
/// `can_handle` gates whether the strategy is even consulted; `analyse`
/// returns `None` to yield to the next strategy.
pub trait Strategy: Send + Sync {
    fn order(&self) -> f64;
    fn name(&self) -> &str;
    fn can_handle(&self, cluster: &Cluster, ctx: &AnalysisContext) -> bool;
    fn analyse(&self, cluster: &Cluster, ctx: &AnalysisContext) -> Option<Advice>;
}

/// Runs every registered strategy in ascending `order`, first match wins.
/// If no strategy's `analyse` returns `Some`, emits the implicit fallback
/// advice (`MANUAL_CHECK`, LOW, "no strategy matched") spec.md §4.I
/// requires as the pipeline's own safety net — distinct from
/// `FallbackStrategy`, which always handles and always returns `Some`
/// itself, so this net only ever fires if a caller builds a pipeline
/// without a fallback strategy registered.
pub struct StrategyPipeline {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyPipeline {
    pub fn new(mut strategies: Vec<Box<dyn Strategy>>) -> Self {
        strategies.sort_by(|a, b| a.order().partial_cmp(&b.order()).unwrap_or(std::cmp::Ordering::Equal));
        Self { strategies }
    }

    pub fn run(&self, cluster: &Cluster, ctx: &AnalysisContext) -> Advice {
        self.run_traced(cluster, ctx).0
    }

    /// Same as [`Self::run`], but also returns the name of the strategy
    /// that produced the advice (`None` for the pipeline's own safety net).
    /// The orchestrator (4.L) uses this to compute the `found_in_conditions`
    /// output statistic (§6) without the cluster/advice model needing to
    /// carry a strategy tag of its own.
    pub fn run_traced(&self, cluster: &Cluster, ctx: &AnalysisContext) -> (Advice, Option<&str>) {
        for strategy in &self.strategies {
            if !strategy.can_handle(cluster, ctx) {
                continue;
            }
            if let Some(advice) = strategy.analyse(cluster, ctx) {
                tracing::debug!(cluster_id = %cluster.id, strategy = strategy.name(), "strategy matched");
                return (advice, Some(strategy.name()));
            }
        }
        tracing::warn!(cluster_id = %cluster.id, "no strategy matched, falling back");
        (Advice::new(cluster.id.clone(), clause_core::AdviceCode::ManualCheck, "no strategy matched", Confidence::Low), None)
    }
}
