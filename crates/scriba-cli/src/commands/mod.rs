//! Command implementations

pub mod config;

use anyhow::{Context, Result, anyhow, bail};
use colored::*;
use scriba_core::{Category, ConfigLoader, HybridEngine, RuleRecord, SourceTier, UpdateOutcome};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::OutputFormat;
use crate::input::{read_empirical, read_guide, read_official, write_guide};
use crate::output::{print_guide_summary, print_issues, print_rules};

fn build_engine(config_path: Option<&Path>) -> Result<HybridEngine> {
    let config = ConfigLoader::load(config_path, None)?;
    Ok(HybridEngine::new(config)?)
}

/// Integrate command implementation
pub fn integrate_command(
    official_path: PathBuf,
    empirical_path: PathBuf,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let engine = build_engine(config_path.as_deref())?;
    let official = read_official(&official_path)?;
    let empirical = read_empirical(&empirical_path)?;
    debug!(
        "Integrating {} official and {} empirical records",
        official.len(),
        empirical.len()
    );

    let report = engine.normalize_and_categorize(&official, &empirical);
    print_issues(&report.issues);
    let guide = engine.assemble(engine.resolve(report));

    match output {
        Some(path) => {
            write_guide(&path, &guide)?;
            match format.unwrap_or(OutputFormat::Human) {
                OutputFormat::Human => {
                    print_guide_summary(&guide);
                    println!("{} Wrote {}", "✓".green(), path.display());
                }
                OutputFormat::Json => println!("{}", summary_json(&guide, &path)?),
            }
        }
        None => match format.unwrap_or(OutputFormat::Json) {
            OutputFormat::Json => println!("{}", guide.to_json_pretty()?),
            OutputFormat::Human => {
                print_guide_summary(&guide);
                println!();
                print_rules(&guide.rules.iter().collect::<Vec<_>>());
            }
        },
    }

    Ok(())
}

fn summary_json(guide: &scriba_core::HybridGuide, path: &Path) -> Result<String> {
    Ok(serde_json::to_string_pretty(&json!({
        "output": path.display().to_string(),
        "total_rules": guide.total_rules,
        "tier_counts": guide.tier_counts,
        "quality_metrics": guide.quality_metrics,
        "dropped": guide.resolution.dropped.len(),
    }))?)
}

/// Update command implementation
pub fn update_command(
    guide_path: PathBuf,
    official_path: Option<PathBuf>,
    empirical_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let engine = build_engine(config_path.as_deref())?;
    let previous = read_guide(&guide_path)?;
    let official = official_path
        .as_deref()
        .map(read_official)
        .transpose()?
        .unwrap_or_default();
    let empirical = empirical_path
        .as_deref()
        .map(read_empirical)
        .transpose()?
        .unwrap_or_default();

    let guide = match engine.update(Some(&previous), &official, &empirical) {
        UpdateOutcome::Applied(guide) => guide,
        UpdateOutcome::Rejected { error, .. } => {
            bail!("{error}; {} left unchanged", guide_path.display())
        }
    };

    let target = output.unwrap_or(guide_path);
    write_guide(&target, &guide)?;

    match format {
        OutputFormat::Human => {
            print_guide_summary(&guide);
            let delta = guide.total_rules as i64 - previous.total_rules as i64;
            println!(
                "{} Wrote {} ({:+} rules)",
                "✓".green(),
                target.display(),
                delta
            );
        }
        OutputFormat::Json => println!("{}", summary_json(&guide, &target)?),
    }

    Ok(())
}

/// Conflicts command implementation
pub fn conflicts_command(
    official_path: PathBuf,
    empirical_path: PathBuf,
    format: OutputFormat,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let engine = build_engine(config_path.as_deref())?;
    let official = read_official(&official_path)?;
    let empirical = read_empirical(&empirical_path)?;

    let report = engine.normalize_and_categorize(&official, &empirical);
    print_issues(&report.issues);
    let resolution = engine.resolve(report);
    let conflicts = engine.detector().detect(&resolution.candidates);
    let kept = |id: &str| resolution.rules.iter().any(|r| r.id == id);

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = conflicts
                .iter()
                .map(|c| {
                    let kept_ids: Vec<&String> = [&c.first, &c.second]
                        .into_iter()
                        .filter(|id| kept(id))
                        .collect();
                    json!({
                        "first": c.first,
                        "second": c.second,
                        "pair": c.pair,
                        "kept": kept_ids,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Human => {
            if conflicts.is_empty() {
                println!("{} No conflicts detected", "✓".green());
                return Ok(());
            }
            for conflict in conflicts.iter() {
                let mark = |id: &str| {
                    if kept(id) {
                        id.green().to_string()
                    } else {
                        id.red().strikethrough().to_string()
                    }
                };
                println!(
                    "  {} <> {}  [{}/{}]",
                    mark(&conflict.first),
                    mark(&conflict.second),
                    conflict.pair.positive,
                    conflict.pair.negative
                );
            }
            println!(
                "\n{} conflicts, {} rules dropped",
                conflicts.len(),
                resolution.dropped.len()
            );
        }
    }

    Ok(())
}

/// Inspect command implementation
pub fn inspect_command(
    guide_path: PathBuf,
    category: Option<String>,
    tier: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let guide = read_guide(&guide_path)?;

    let category = category
        .map(|c| c.parse::<Category>().map_err(|e| anyhow!(e)))
        .transpose()
        .context("Invalid --category")?;
    let tier = tier
        .map(|t| t.parse::<SourceTier>().map_err(|e| anyhow!(e)))
        .transpose()
        .context("Invalid --tier")?;

    let mut rules: Vec<&RuleRecord> = match category {
        Some(category) => guide.rules_in_category(category),
        None => guide.rules.iter().collect(),
    };
    if let Some(tier) = tier {
        rules.retain(|r| r.source_tier == tier);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rules)?),
        OutputFormat::Human => {
            print_guide_summary(&guide);
            println!();
            print_rules(&rules);
        }
    }

    Ok(())
}
