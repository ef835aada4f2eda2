//! Policy-conditions-match strategy (4.I.2): compares a cluster's leader
//! text against the parsed policy conditions document.
//!
//! Grounded in
//! `original_source/hienfeld/services/analysis/strategies/conditions_match_strategy.py`
//! and `.../formatters/reference_formatter.py`.

use clause_core::{Advice, AdviceCode, Cluster, Confidence, Section};
use clause_normalize::extract_article_references;

use crate::context::AnalysisContext;
use crate::pipeline::Strategy;

/// Step 2 of the waterfall (order 2.0): only runs when policy sections are
/// available.
pub struct ConditionsMatchStrategy;

impl Strategy for ConditionsMatchStrategy {
    fn order(&self) -> f64 {
        2.0
    }

    fn name(&self) -> &str {
        "conditions_match"
    }

    fn can_handle(&self, _cluster: &Cluster, ctx: &AnalysisContext) -> bool {
        ctx.has_conditions && !ctx.policy_sections.is_empty()
    }

    fn analyse(&self, cluster: &Cluster, ctx: &AnalysisContext) -> Option<Advice> {
        let leader = &cluster.leader_text;

        // Substring fast path (§4.I.2): the whole leader appears verbatim
        // in the concatenated sections.
        if !leader.is_empty() && ctx.concatenated_sections.contains(leader.as_str()) {
            if let Some(section) = ctx.policy_sections.iter().find(|s| s.normalised_text.contains(leader.as_str())) {
                return Some(
                    Advice::new(cluster.id.clone(), AdviceCode::Delete, "substring match in policy conditions", Confidence::High)
                        .with_reference(format_reference(section))
                        .with_category(extract_category(section)),
                );
            }
        }

        let thresholds = &ctx.config.conditions_match;
        let best = ctx
            .policy_sections
            .iter()
            .map(|section| (section, ctx.similarity.similarity(leader, &section.normalised_text)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        if let Some((section, score)) = best {
            if score >= thresholds.exact_threshold {
                return Some(
                    Advice::new(cluster.id.clone(), AdviceCode::Delete, format!("exact match ({:.0}%)", score * 100.0), Confidence::High)
                        .with_reference(format_reference(section))
                        .with_category(extract_category(section)),
                );
            }
            if score >= thresholds.high_threshold {
                return Some(
                    Advice::new(cluster.id.clone(), AdviceCode::Delete, format!("strong similarity ({:.0}%)", score * 100.0), Confidence::Medium)
                        .with_reference(format_reference(section))
                        .with_category(extract_category(section)),
                );
            }
            if score >= thresholds.medium_threshold {
                return Some(
                    Advice::new(cluster.id.clone(), AdviceCode::ManualCheck, format!("partial similarity ({:.0}%)", score * 100.0), Confidence::Low)
                        .with_reference(format_reference(section))
                        .with_category(extract_category(section)),
                );
            }
        }

        // Fragment heuristic (§4.I.2): enough of the leader's sentences
        // appear verbatim in the conditions even though no single section
        // scored high enough on its own.
        fragment_match(cluster, leader, ctx)
    }
}

fn fragment_match(cluster: &Cluster, leader: &str, ctx: &AnalysisContext) -> Option<Advice> {
    let thresholds = &ctx.config.conditions_match;
    let sentences: Vec<&str> = leader
        .split(|c| c == '.' || c == '!' || c == '?')
        .map(|s| s.trim())
        .filter(|s| s.chars().count() >= thresholds.fragment_min_sentence_length)
        .collect();

    if sentences.len() < 2 {
        return None;
    }

    let mut matching_sections: Vec<&str> = Vec::new();
    let mut matched = 0usize;
    for sentence in &sentences {
        if let Some(section) = ctx.policy_sections.iter().find(|s| s.normalised_text.contains(sentence)) {
            matched += 1;
            if !matching_sections.contains(&section.id.as_str()) {
                matching_sections.push(section.id.as_str());
            }
        }
    }

    let ratio = matched as f64 / sentences.len() as f64;
    if matched >= 2 && ratio >= thresholds.fragment_match_ratio {
        let reference = matching_sections.join(", ");
        return Some(
            Advice::new(
                cluster.id.clone(),
                AdviceCode::Delete,
                format!("{matched}/{} sentence fragments found verbatim in policy conditions", sentences.len()),
                Confidence::Medium,
            )
            .with_reference(reference),
        );
    }
    None
}

/// `"Art X.Y"` or `"Art X.Y - <truncated title>"` (§4.I.2).
fn format_reference(section: &Section) -> String {
    let article = extract_article_references(&section.title)
        .into_iter()
        .next()
        .or_else(|| extract_article_references(&section.id).into_iter().next());
    let article_ref = match article {
        Some(number) => format!("Art {number}"),
        None => "Art ?".to_string(),
    };

    let title = section.title.trim();
    if title.is_empty() {
        return article_ref;
    }
    let truncated = if title.chars().count() > 80 {
        let truncated: String = title.chars().take(77).collect();
        format!("{}...", truncated.trim_end())
    } else {
        title.to_string()
    };
    format!("{article_ref} - {truncated}")
}

/// Derives a category from the section's title (§4.I.2). The original also
/// consults a source filename, which this model doesn't carry; title
/// keywords cover the same ground for this workspace's `Section`.
fn extract_category(section: &Section) -> String {
    let title = section.title.to_lowercase();
    if title.contains("brand") {
        return "BRAND".to_string();
    }
    if title.contains("aansprak") {
        return "AANSPRAKELIJKHEID".to_string();
    }
    if title.contains("diefstal") {
        return "DIEFSTAL".to_string();
    }
    if title.contains("molest") {
        return "MOLEST".to_string();
    }
    if title.contains("fraude") {
        return "FRAUDE".to_string();
    }
    if title.contains("uitsluit") || title.contains("geen dekking") {
        return "UITSLUITINGEN".to_string();
    }
    if title.contains("dekking") {
        return "DEKKING".to_string();
    }
    "VOORWAARDEN".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clause_core::{EngineConfig, Mode, ReferenceClause, StandardClause};
    use clause_llm::NoopOracle;
    use clause_similarity::HybridSimilarityService;
    use std::collections::HashMap;

    use crate::custom::CustomInstructionService;

    fn section(id: &str, title: &str, text: &str) -> Section {
        Section { id: id.to_string(), title: title.to_string(), raw_text: text.to_string(), normalised_text: text.to_string() }
    }

    fn ctx<'a>(
        config: &'a EngineConfig,
        sections: &'a [Section],
        concatenated: &'a str,
        similarity: &'a HybridSimilarityService,
        custom_instructions: &'a CustomInstructionService,
        reference_matches: &'a HashMap<String, ReferenceClause>,
        oracle: &'a NoopOracle,
    ) -> AnalysisContext<'a> {
        AnalysisContext {
            config,
            has_conditions: true,
            policy_sections: sections,
            concatenated_sections: concatenated,
            standard_clauses: &[],
            similarity,
            custom_instructions,
            reference_matches,
            llm_oracle: oracle,
            as_of_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    #[test]
    fn substring_fast_path_deletes_with_high_confidence() {
        let config = EngineConfig::preset(Mode::Fast);
        let sections = vec![section("SEC-001-2.8", "Uitsluitingen fraude", "fraude is uitgesloten van dekking en meer tekst eromheen")];
        let concatenated = sections[0].normalised_text.clone();
        let similarity = HybridSimilarityService::new(config.semantic.clone());
        let custom_instructions = CustomInstructionService::new("");
        let reference_matches = HashMap::new();
        let oracle = NoopOracle;
        let context = ctx(&config, &sections, &concatenated, &similarity, &custom_instructions, &reference_matches, &oracle);

        let cluster = Cluster::new("CL-0001", "row_1", "fraude is uitgesloten van dekking", "Fraude is uitgesloten van dekking.", "Fraude");
        let advice = ConditionsMatchStrategy.analyse(&cluster, &context).unwrap();
        assert_eq!(advice.code.as_str(), "DELETE");
        assert_eq!(advice.confidence, Confidence::High);
        assert_eq!(advice.category, "FRAUDE");
    }

    #[test]
    fn below_medium_threshold_yields() {
        let config = EngineConfig::preset(Mode::Fast);
        let sections = vec![section("SEC-001-1.1", "Dekking", "dekking van waterschade in huis")];
        let concatenated = sections[0].normalised_text.clone();
        let similarity = HybridSimilarityService::new(config.semantic.clone());
        let custom_instructions = CustomInstructionService::new("");
        let reference_matches = HashMap::new();
        let oracle = NoopOracle;
        let context = ctx(&config, &sections, &concatenated, &similarity, &custom_instructions, &reference_matches, &oracle);

        let cluster = Cluster::new("CL-0002", "row_2", "volledig andere inhoud zonder enige overlap", "Volledig andere inhoud zonder enige overlap", "Onbekend");
        assert!(ConditionsMatchStrategy.analyse(&cluster, &context).is_none());
    }
}
