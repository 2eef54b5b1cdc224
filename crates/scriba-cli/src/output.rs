//! Terminal rendering of guides, issues and conflicts

use colored::*;
use scriba_core::{HybridGuide, NormalizationIssue, RuleRecord, SourceTier};

fn tier_label(tier: SourceTier) -> ColoredString {
    match tier {
        SourceTier::Official => tier.as_str().red().bold(),
        SourceTier::Core => tier.as_str().yellow().bold(),
        SourceTier::Optional => tier.as_str().blue(),
        SourceTier::Suggested => tier.as_str().dimmed(),
    }
}

pub fn print_guide_summary(guide: &HybridGuide) {
    println!(
        "{} v{} ({})",
        "Hybrid style guide".bold(),
        guide.version,
        guide.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Rules: {} ({} official, {} empirical)",
        guide.total_rules, guide.official_rules, guide.empirical_rules
    );
    println!("  Tiers: {}", guide.tier_counts);

    if !guide.categories.is_empty() {
        println!("  Categories:");
        for (category, ids) in &guide.categories {
            println!("    {:<24} {}", category.label(), ids.len());
        }
    }

    let metrics = &guide.quality_metrics;
    println!(
        "  Quality: coverage {:.2}, reliability {:.2}, {} high-confidence rules",
        metrics.coverage_score, metrics.reliability_score, metrics.high_confidence_count
    );

    let log = &guide.resolution;
    if log.conflict_count > 0 {
        println!(
            "  Conflicts: {} detected, {} rules dropped",
            log.conflict_count,
            log.dropped.len()
        );
    }
    for conflict in &log.unresolved_official_conflicts {
        println!(
            "  {} official rules '{}' and '{}' conflict on '{}'/'{}'",
            "warning:".yellow().bold(),
            conflict.first,
            conflict.second,
            conflict.pair.positive,
            conflict.pair.negative
        );
    }
}

pub fn print_rules(rules: &[&RuleRecord]) {
    for rule in rules {
        let weight = rule.weight.map(|w| format!("{w:.2}")).unwrap_or_default();
        println!(
            "  {:<10} {:<22} {:>5}  {}",
            tier_label(rule.source_tier),
            rule.id.cyan(),
            weight,
            rule.description
        );
    }
    if rules.is_empty() {
        println!("  {}", "No rules match.".dimmed());
    }
}

pub fn print_issues(issues: &[NormalizationIssue]) {
    for issue in issues {
        let label = if issue.is_malformed() {
            "skipped:".red().bold()
        } else {
            "note:".yellow().bold()
        };
        eprintln!("{label} {issue}");
    }
}
