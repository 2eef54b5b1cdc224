//! End-to-end pipeline tests: normalize → resolve → assemble

use chrono::{TimeZone, Utc};
use scriba_core::{
    Category, ConflictDetector, EmpiricalRuleInput, EngineConfig, HybridEngine, OfficialRuleInput,
    RuleRecord, SourceTier, WeightCalculator,
};

fn official_inputs() -> Vec<OfficialRuleInput> {
    vec![
        OfficialRuleInput::new("Always use active voice"),
        OfficialRuleInput::new("Cite every dataset with a persistent identifier"),
        OfficialRuleInput::new("Margins are 2.5 cm on all sides").with_category("FORMAT"),
        OfficialRuleInput::new("Authors must number all equations"),
    ]
}

fn empirical_inputs() -> Vec<EmpiricalRuleInput> {
    vec![
        EmpiricalRuleInput::new("Avoid active voice in the methods section", 0.9),
        EmpiricalRuleInput::new("Use the term 'examine' for analyses", 0.85),
        EmpiricalRuleInput::new("Avoid the term 'examine' in titles", 0.3),
        EmpiricalRuleInput::new("Keep sentence length under 30 words", 0.92),
        EmpiricalRuleInput::new("Open each paragraph with a topic sentence", 0.7),
        EmpiricalRuleInput::new("Connect sections with explicit transitions", 0.55),
        EmpiricalRuleInput::new("Prefer recent references", 0.4),
        EmpiricalRuleInput::new("Mention funding sources", 0.2).without_frequency(),
        EmpiricalRuleInput::default(),
    ]
}

fn ids(rules: &[RuleRecord]) -> Vec<&str> {
    rules.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn test_pipeline_is_deterministic() {
    let engine = HybridEngine::default();
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap();

    let run = || {
        let report = engine.normalize_and_categorize(&official_inputs(), &empirical_inputs());
        engine
            .assemble_at(engine.resolve(report), at)
            .to_json_pretty()
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_generated_at_is_the_only_difference() {
    let engine = HybridEngine::default();
    let a = engine.integrate(&official_inputs(), &empirical_inputs());
    let mut b = engine.integrate(&official_inputs(), &empirical_inputs());
    b.generated_at = a.generated_at;
    assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());
}

#[test]
fn test_official_rules_always_survive() {
    let engine = HybridEngine::default();
    let report = engine.normalize_and_categorize(&official_inputs(), &empirical_inputs());
    let official_ids: Vec<String> = report
        .rules
        .iter()
        .filter(|r| r.is_official())
        .map(|r| r.id.clone())
        .collect();

    let resolution = engine.resolve(report);
    for id in &official_ids {
        assert!(resolution.rules.iter().any(|r| &r.id == id), "{id} was dropped");
    }
}

#[test]
fn test_resolved_set_is_conflict_free() {
    let engine = HybridEngine::default();
    let guide = engine.integrate(&official_inputs(), &empirical_inputs());
    let detector = engine.detector();

    for (i, a) in guide.rules.iter().enumerate() {
        for b in &guide.rules[i + 1..] {
            assert!(
                !detector.conflicts(&a.description, &b.description),
                "'{}' conflicts with '{}'",
                a.id,
                b.id
            );
        }
    }
    assert!(guide.resolution.unresolved_official_conflicts.is_empty());
}

#[test]
fn test_every_resolved_rule_is_annotated() {
    let guide = HybridEngine::default().integrate(&official_inputs(), &empirical_inputs());
    assert!(!guide.rules.is_empty());
    for rule in &guide.rules {
        assert!(rule.enforcement_level.is_some(), "{}", rule.id);
        assert!(rule.weight.is_some_and(|w| w > 0.0), "{}", rule.id);
    }
}

#[test]
fn test_ids_unique_within_guide() {
    let guide = HybridEngine::default().integrate(&official_inputs(), &empirical_inputs());
    let mut seen = std::collections::HashSet::new();
    for rule in &guide.rules {
        assert!(seen.insert(rule.id.as_str()), "duplicate id {}", rule.id);
    }
}

#[test]
fn test_weight_monotonic_in_frequency() {
    let calc = WeightCalculator::default();
    let base = RuleRecord::new("r", SourceTier::Optional, Category::Other, "Same rule", 0.8);
    let mut previous = 0.0;
    for frequency in [0.0, 0.25, 0.5, 0.65, 0.8, 0.95, 1.0] {
        let weight = calc.weight(&base.clone().with_frequency(frequency));
        assert!(weight >= previous, "weight fell at frequency {frequency}");
        previous = weight;
    }
}

#[test]
fn test_tier_ratios_sum_to_one() {
    let guide = HybridEngine::default().integrate(&official_inputs(), &empirical_inputs());
    let metrics = guide.quality_metrics;
    assert!((metrics.official_ratio + metrics.empirical_ratio - 1.0).abs() < 1e-9);
}

#[test]
fn test_header_counts_match_rules() {
    let guide = HybridEngine::default().integrate(&official_inputs(), &empirical_inputs());
    assert_eq!(guide.total_rules, guide.rules.len());
    assert_eq!(guide.tier_counts.total(), guide.total_rules);
    assert_eq!(guide.official_rules + guide.empirical_rules, guide.total_rules);
    let indexed: usize = guide.categories.values().map(Vec::len).sum();
    assert_eq!(indexed, guide.total_rules);
    assert_eq!(guide.rules_in_category(Category::Format).len(), 1);
}

#[test]
fn test_scenario_official_beats_core() {
    let engine = HybridEngine::default();
    let guide = engine.integrate(
        &[OfficialRuleInput::new("Always use active voice")],
        &[EmpiricalRuleInput::new("Avoid active voice", 0.9)],
    );
    assert_eq!(ids(&guide.rules), vec!["official-rule-001"]);
    assert_eq!(guide.tier_counts.official, 1);
    assert_eq!(guide.tier_counts.core, 0);
    assert_eq!(guide.resolution.dropped[0].id, "empirical-rule-001");
    assert_eq!(guide.resolution.dropped[0].displaced_by, "official-rule-001");
}

#[test]
fn test_scenario_higher_frequency_wins() {
    let guide = HybridEngine::default().integrate(
        &[],
        &[
            EmpiricalRuleInput::new("Use the term 'examine'", 0.85),
            EmpiricalRuleInput::new("Avoid the term 'examine'", 0.3),
        ],
    );
    assert_eq!(guide.total_rules, 1);
    assert_eq!(guide.rules[0].description, "Use the term 'examine'");
}

#[test]
fn test_scenario_non_conflicting_rules_kept() {
    let guide = HybridEngine::default().integrate(
        &[],
        &[
            EmpiricalRuleInput::new("Keep sentences under 25 words", 0.9),
            EmpiricalRuleInput::new("Open paragraphs with a topic sentence", 0.6),
        ],
    );
    let tiers: Vec<SourceTier> = guide.rules.iter().map(|r| r.source_tier).collect();
    assert_eq!(tiers, vec![SourceTier::Core, SourceTier::Optional]);
}

#[test]
fn test_scenario_empty_input() {
    let guide = HybridEngine::default().integrate(&[], &[]);
    assert_eq!(guide.total_rules, 0);
    assert_eq!(guide.quality_metrics.coverage_score, 0.0);
    assert_eq!(guide.quality_metrics.official_ratio, 0.0);
    assert!(guide.source_rules.is_empty());
}

#[test]
fn test_malformed_records_reported_not_fatal() {
    let engine = HybridEngine::default();
    let report = engine.normalize_and_categorize(&official_inputs(), &empirical_inputs());
    assert_eq!(report.malformed_count(), 1);
    assert_eq!(report.rules.len(), official_inputs().len() + empirical_inputs().len() - 1);
}

#[test]
fn test_parallel_detection_matches_sequential() {
    let engine = HybridEngine::default();
    let report = engine.normalize_and_categorize(&official_inputs(), &empirical_inputs());

    let config = EngineConfig::default();
    let sequential = ConflictDetector::from_config(&config)
        .with_parallel_threshold(usize::MAX)
        .detect(&report.rules);
    let parallel = ConflictDetector::from_config(&config)
        .with_parallel_threshold(1)
        .detect(&report.rules);
    assert_eq!(sequential, parallel);
}
