//! End-to-end scenarios run through [`ClauseEngine::run`] against the
//! default strategy waterfall, seeded from the concrete examples that
//! guided the orchestrator's design.

use chrono::NaiveDate;

use clause_core::{EngineConfig, Mode, Section};
use clause_engine::{AnalysisJob, ClauseEngine, InputRow, JobSettings};
use clause_observe::NoopProgressSink;

fn job(config: EngineConfig, settings: JobSettings, rows: Vec<InputRow>) -> AnalysisJob {
    AnalysisJob::new(config, settings, rows)
}

fn settings_on(date: NaiveDate) -> JobSettings {
    JobSettings::new(date).without_conditions()
}

#[test]
fn exact_duplicates_cluster_together_and_stay_below_standardise_threshold() {
    let config = EngineConfig::preset(Mode::Fast);
    let rows = vec![
        InputRow::new("row_1", "Premie is EUR 100"),
        InputRow::new("row_2", "Premie is EUR 100"),
        InputRow::new("row_3", "Premie is EUR 100"),
    ];
    let settings = settings_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let result = ClauseEngine::new().run(job(config, settings, rows), &NoopProgressSink).unwrap();

    assert_eq!(result.statistics.unique_clusters, 1);
    assert_eq!(result.rows.len(), 3);
    let cluster_id = &result.rows[0].cluster_id;
    assert!(result.rows.iter().all(|r| &r.cluster_id == cluster_id));
    assert_eq!(result.rows[0].frequency, 3);

    // Default frequency_standardize_threshold is 20: a 3x cluster without a
    // conditions document lands in the 2..=5 consistency-check band, not
    // STANDARDISE.
    let advice = result.advice_by_cluster.get(cluster_id).unwrap();
    assert_eq!(advice.code.as_str(), "CONSISTENCY_CHECK");
}

#[test]
fn variable_masking_clusters_at_a_loose_threshold_and_splits_at_a_tight_one() {
    let rows = vec![
        InputRow::new("row_1", "Verzekerd bedrag EUR 100.000"),
        InputRow::new("row_2", "Verzekerd bedrag EUR 250.000"),
        InputRow::new("row_3", "Verzekerd bedrag EUR 500.000"),
    ];

    let mut loose = EngineConfig::preset(Mode::Balanced);
    loose.clustering.similarity_threshold = 0.85;
    let settings = settings_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let result = ClauseEngine::new().run(job(loose, settings.clone(), rows.clone()), &NoopProgressSink).unwrap();
    assert_eq!(result.statistics.unique_clusters, 1);

    let mut tight = EngineConfig::preset(Mode::Balanced);
    tight.clustering.similarity_threshold = 0.98;
    let result = ClauseEngine::new().run(job(tight, settings, rows), &NoopProgressSink).unwrap();
    assert_eq!(result.statistics.unique_clusters, 3);
}

#[test]
fn substring_match_against_policy_conditions_deletes_with_high_confidence() {
    let config = EngineConfig::preset(Mode::Fast);
    let rows = vec![InputRow::new("row_1", "Fraude is uitgesloten van dekking.")];
    let sections = vec![Section {
        id: "SEC-001-2.8".to_string(),
        title: "Uitsluitingen fraude".to_string(),
        raw_text: "Fraude is uitgesloten van dekking en nog wat tekst eromheen.".to_string(),
        normalised_text: "fraude is uitgesloten van dekking en nog wat tekst eromheen".to_string(),
    }];
    let settings = JobSettings::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let result = ClauseEngine::new()
        .run(job(config, settings, rows).with_sections(sections), &NoopProgressSink)
        .unwrap();

    let advice = &result.advice_by_cluster[&result.rows[0].cluster_id];
    assert_eq!(advice.code.as_str(), "DELETE");
    assert_eq!(advice.confidence.to_string(), "HIGH");
    assert_eq!(advice.category, "FRAUDE");
}

#[test]
fn expired_date_wins_regardless_of_conditions() {
    let config = EngineConfig::preset(Mode::Fast);
    let rows = vec![InputRow::new("row_1", "Deze dekking is geldig tot 31-12-2015.")];
    let sections = vec![Section {
        id: "SEC-001-1.0".to_string(),
        title: "Dekking".to_string(),
        raw_text: "Deze dekking is geldig tot 31-12-2015.".to_string(),
        normalised_text: "deze dekking is geldig tot 31-12-2015".to_string(),
    }];
    let settings = JobSettings::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let result = ClauseEngine::new()
        .run(job(config, settings, rows).with_sections(sections), &NoopProgressSink)
        .unwrap();

    let advice = &result.advice_by_cluster[&result.rows[0].cluster_id];
    assert_eq!(advice.code.as_str(), "DELETE_EXPIRED");
    assert_eq!(advice.confidence.to_string(), "HIGH");
}

#[test]
fn recent_taxation_report_is_not_flagged_as_expired() {
    let config = EngineConfig::preset(Mode::Fast);
    let rows = vec![InputRow::new("row_1", "Taxatierapport d.d. 15-06-2022 conform 7:960 BW.")];
    let settings = settings_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    let result = ClauseEngine::new().run(job(config, settings, rows), &NoopProgressSink).unwrap();

    let advice = &result.advice_by_cluster[&result.rows[0].cluster_id];
    assert_ne!(advice.code.as_str(), "DELETE_EXPIRED");
}

#[test]
fn custom_instruction_wins_over_the_fallback_keyword_rule() {
    let config = EngineConfig::preset(Mode::Fast);
    let rows = vec![InputRow::new("row_1", "Bepaling omtrent sanctieclausule EU 2023")];
    let settings = settings_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        .with_extra_instructions("sanctieclausule\tVerwijderen - mag weg");
    let result = ClauseEngine::new().run(job(config, settings, rows), &NoopProgressSink).unwrap();

    let advice = &result.advice_by_cluster[&result.rows[0].cluster_id];
    assert_eq!(advice.code.as_str(), "\u{1F4CB} Verwijderen - mag weg");
    assert_eq!(advice.category, "CUSTOM");
    assert_eq!(advice.confidence.to_string(), "HIGH");
}

#[test]
fn empty_input_produces_empty_output() {
    let config = EngineConfig::preset(Mode::Fast);
    let settings = settings_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let result = ClauseEngine::new().run(job(config, settings, Vec::new()), &NoopProgressSink).unwrap();

    assert!(result.rows.is_empty());
    assert_eq!(result.statistics.total_rows, 0);
}

#[test]
fn output_row_count_always_equals_input_row_count() {
    let config = EngineConfig::preset(Mode::Fast);
    let rows = vec![
        InputRow::new("row_1", "Ja."),
        InputRow::new("row_2", "Dekking van brandschade tot 10000 euro per jaar."),
        InputRow::new("row_3", "Uitsluiting van molestschade in alle gevallen."),
    ];
    let settings = settings_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let result = ClauseEngine::new().run(job(config, settings, rows), &NoopProgressSink).unwrap();
    assert_eq!(result.rows.len(), 3);
}
