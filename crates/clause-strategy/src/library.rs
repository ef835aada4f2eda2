//! Clause-library strategy (4.I.1): matches a cluster's leader text against
//! a library of pre-approved standard-clause texts.
//!
//! Grounded in
//! `original_source/hienfeld/services/analysis/strategies/clause_library_strategy.py`.

use clause_core::{Advice, AdviceCode, Cluster, Confidence};

use crate::context::AnalysisContext;
use crate::pipeline::Strategy;

/// Step 1 of the waterfall (order 1.0): only runs when a standard-clause
/// library was loaded.
pub struct ClauseLibraryStrategy;

impl Strategy for ClauseLibraryStrategy {
    fn order(&self) -> f64 {
        1.0
    }

    fn name(&self) -> &str {
        "clause_library"
    }

    fn can_handle(&self, _cluster: &Cluster, ctx: &AnalysisContext) -> bool {
        !ctx.standard_clauses.is_empty()
    }

    fn analyse(&self, cluster: &Cluster, ctx: &AnalysisContext) -> Option<Advice> {
        let candidates: Vec<String> = ctx.standard_clauses.iter().map(|c| c.normalised_text.clone()).collect();
        let (idx, score) = ctx.similarity.find_best_match(&cluster.leader_text, &candidates)?;
        let thresholds = &ctx.config.clause_library;
        if score < thresholds.check_threshold {
            return None;
        }
        let best = &ctx.standard_clauses[idx];

        if score >= thresholds.exact_threshold {
            Some(
                Advice::new(
                    cluster.id.clone(),
                    AdviceCode::Delete,
                    format!("exact match to standard clause ({:.0}%): {}", score * 100.0, best.code),
                    Confidence::High,
                )
                .with_reference(best.code.clone())
                .with_category(best.category.clone()),
            )
        } else {
            Some(
                Advice::new(
                    cluster.id.clone(),
                    AdviceCode::ManualCheck,
                    format!("similar to standard clause ({:.0}%): {}", score * 100.0, best.code),
                    Confidence::Medium,
                )
                .with_reference(best.code.clone())
                .with_category(best.category.clone()),
            )
        }
    }
}
