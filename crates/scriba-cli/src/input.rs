//! Reading rule files and guides from disk

use anyhow::{Context, Result};
use indexmap::IndexMap;
use scriba_core::{EmpiricalRuleInput, HybridGuide, OfficialRuleInput};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum OfficialDocument {
    List(Vec<OfficialRuleInput>),
    Wrapped { rules: Vec<OfficialRuleInput> },
}

#[derive(Deserialize)]
struct CategoryBlock {
    #[serde(default)]
    rules: Vec<EmpiricalRuleInput>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EmpiricalDocument {
    List(Vec<EmpiricalRuleInput>),
    Wrapped { rules: Vec<EmpiricalRuleInput> },
    Categorized {
        rule_categories: IndexMap<String, CategoryBlock>,
    },
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn read_official(path: &Path) -> Result<Vec<OfficialRuleInput>> {
    let document: OfficialDocument = serde_json::from_str(&read(path)?).with_context(|| {
        format!(
            "{} is not an official rule list (expected an array or {{\"rules\": [...]}})",
            path.display()
        )
    })?;
    Ok(match document {
        OfficialDocument::List(rules) | OfficialDocument::Wrapped { rules } => rules,
    })
}

/// Empirical rules; the `rule_categories` layout is flattened in document
/// order and each block name becomes the category of rules that lack one.
pub fn read_empirical(path: &Path) -> Result<Vec<EmpiricalRuleInput>> {
    let document: EmpiricalDocument = serde_json::from_str(&read(path)?).with_context(|| {
        format!(
            "{} is not an empirical rule list (expected an array, {{\"rules\": [...]}} or {{\"rule_categories\": {{...}}}})",
            path.display()
        )
    })?;
    Ok(match document {
        EmpiricalDocument::List(rules) | EmpiricalDocument::Wrapped { rules } => rules,
        EmpiricalDocument::Categorized { rule_categories } => rule_categories
            .into_iter()
            .flat_map(|(name, block)| {
                block.rules.into_iter().map(move |mut rule| {
                    rule.category.get_or_insert_with(|| name.clone());
                    rule
                })
            })
            .collect(),
    })
}

pub fn read_guide(path: &Path) -> Result<HybridGuide> {
    HybridGuide::from_json(&read(path)?)
        .with_context(|| format!("{} is not a scriba guide", path.display()))
}

pub fn write_guide(path: &Path, guide: &HybridGuide) -> Result<()> {
    fs::write(path, guide.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
