//! Fallback strategy (4.I.3): always runs when every earlier strategy
//! yielded, and always returns an advice.
//!
//! Grounded in
//! `original_source/hienfeld/services/analysis/strategies/fallback_strategy.py`,
//! extended with reference-driven standardisation and the LLM last-resort
//! consult per `spec.md` §4.I.3/§7.

use clause_core::{Advice, AdviceCode, Cluster, Confidence};
use clause_reference::should_standardize_from_reference;

use crate::context::AnalysisContext;
use crate::pipeline::Strategy;

/// Below this normalised length, a cluster is too short to analyse at all
/// (§4.I.3), independent of the admin/hygiene raw-text floor (10 on
/// `raw_text`, order 0.0 — this one runs on `normalised_text` at the very
/// end of the waterfall).
const SHORT_TEXT_THRESHOLD: usize = 10;

/// Step 3 of the waterfall (order 3.0): always handles, never yields.
pub struct FallbackStrategy;

impl Strategy for FallbackStrategy {
    fn order(&self) -> f64 {
        3.0
    }

    fn name(&self) -> &str {
        "fallback"
    }

    fn can_handle(&self, _cluster: &Cluster, _ctx: &AnalysisContext) -> bool {
        true
    }

    fn analyse(&self, cluster: &Cluster, ctx: &AnalysisContext) -> Option<Advice> {
        let leader = &cluster.leader_text;
        let raw = &cluster.leader_raw_text;

        if leader.chars().count() < SHORT_TEXT_THRESHOLD {
            return Some(
                Advice::new(cluster.id.clone(), AdviceCode::ManualCheck, "very short text", Confidence::Low).with_category("SHORT_TEXT"),
            );
        }

        if raw.chars().count() > ctx.config.multi_clause.max_text_length {
            return Some(if ctx.has_conditions {
                Advice::new(cluster.id.clone(), AdviceCode::SplitCheck, "long text, conditions consulted", Confidence::Medium).with_category("LENGTH")
            } else {
                Advice::new(cluster.id.clone(), AdviceCode::ManualCheck, "long text", Confidence::Low).with_category("LENGTH")
            });
        }

        if let Some(advice) = check_keyword_rules(cluster, ctx) {
            return Some(advice);
        }

        let min_frequency = ctx.config.analysis_rules.frequency_standardize_threshold;

        if let Some(reference) = ctx.reference_matches.get(&cluster.id) {
            if should_standardize_from_reference(reference, min_frequency) {
                return Some(
                    Advice::new(cluster.id.clone(), AdviceCode::Standardise, "reference frequency meets standardisation threshold", Confidence::High)
                        .with_category("FREQUENTIE"),
                );
            }
        }

        if cluster.frequency() >= min_frequency {
            return Some(
                Advice::new(
                    cluster.id.clone(),
                    AdviceCode::Standardise,
                    format!("occurs {}x - candidate for standardisation", cluster.frequency()),
                    Confidence::High,
                )
                .with_category("FREQUENTIE"),
            );
        }

        if !ctx.has_conditions {
            let frequency = cluster.frequency();
            if frequency == 1 {
                return Some(Advice::new(cluster.id.clone(), AdviceCode::Unique, "occurs once", Confidence::Medium).with_category("FREQUENTIE"));
            }
            if (2..=5).contains(&frequency) {
                return Some(
                    Advice::new(cluster.id.clone(), AdviceCode::ConsistencyCheck, format!("occurs {frequency}x"), Confidence::Medium)
                        .with_category("FREQUENTIE"),
                );
            }
            if frequency >= 6 && frequency < min_frequency {
                return Some(
                    Advice::new(cluster.id.clone(), AdviceCode::FrequencyInfo, format!("occurs {frequency}x"), Confidence::Medium)
                        .with_category("FREQUENTIE"),
                );
            }
        }

        if let Ok(Some(verdict)) = ctx.llm_oracle.classify(leader, "fallback_last_resort") {
            return Some(
                Advice::new(cluster.id.clone(), verdict.advice_code, verdict.reason, verdict.confidence).with_category("LLM"),
            );
        }

        let reason = if ctx.has_conditions { "no match with policy conditions found" } else { "internal analysis - manual check recommended" };
        Some(Advice::new(cluster.id.clone(), AdviceCode::ManualCheck, reason, Confidence::Low).with_category("ONBEKEND"))
    }
}

fn check_keyword_rules(cluster: &Cluster, ctx: &AnalysisContext) -> Option<Advice> {
    let text_lower = cluster.leader_text.to_lowercase();
    for rule in &ctx.config.analysis_rules.keyword_rules {
        if let Some(max_length) = rule.max_length {
            if cluster.leader_text.chars().count() >= max_length {
                continue;
            }
        }

        let keyword_hit = rule.keywords.iter().any(|k| text_lower.contains(k.to_lowercase().as_str()));
        if !keyword_hit {
            continue;
        }

        if !rule.inclusion_keywords.is_empty() {
            let inclusion_hit = rule.inclusion_keywords.iter().any(|k| text_lower.contains(k.to_lowercase().as_str()));
            if !inclusion_hit {
                continue;
            }
        }

        let confidence = match rule.confidence.to_uppercase().as_str() {
            "HIGH" => Confidence::High,
            "LOW" => Confidence::Low,
            _ => Confidence::Medium,
        };
        let advice_code = if rule.advice == "HANDMATIG_CHECKEN" {
            AdviceCode::ManualCheck
        } else {
            AdviceCode::Custom(rule.advice.clone())
        };

        let mut advice = Advice::new(cluster.id.clone(), advice_code, rule.reason.clone(), confidence).with_category(rule.name.to_uppercase());
        if let Some(reference) = &rule.article_mapping {
            advice = advice.with_reference(reference.clone());
        }
        return Some(advice);
    }
    None
}
