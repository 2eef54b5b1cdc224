//! Hybrid guide assembly
//!
//! A [`HybridGuide`] is an immutable snapshot: updates always build a new
//! value. Apart from `generated_at`, assembly is a pure function of the
//! resolution and the configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::EngineConfig;
use crate::conflict::Conflict;
use crate::metrics::QualityMetrics;
use crate::model::{Category, RuleRecord, SourceTier};
use crate::resolver::{DroppedRule, Resolution};

/// Rule counts per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub official: usize,
    pub core: usize,
    pub optional: usize,
    pub suggested: usize,
}

impl TierCounts {
    pub fn from_rules(rules: &[RuleRecord]) -> Self {
        let mut counts = Self::default();
        for rule in rules {
            match rule.source_tier {
                SourceTier::Official => counts.official += 1,
                SourceTier::Core => counts.core += 1,
                SourceTier::Optional => counts.optional += 1,
                SourceTier::Suggested => counts.suggested += 1,
            }
        }
        counts
    }

    pub fn get(&self, tier: SourceTier) -> usize {
        match tier {
            SourceTier::Official => self.official,
            SourceTier::Core => self.core,
            SourceTier::Optional => self.optional,
            SourceTier::Suggested => self.suggested,
        }
    }

    pub fn empirical(&self) -> usize {
        self.core + self.optional + self.suggested
    }

    pub fn total(&self) -> usize {
        self.official + self.empirical()
    }
}

impl fmt::Display for TierCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "official={} core={} optional={} suggested={}",
            self.official, self.core, self.optional, self.suggested
        )
    }
}

/// How each tier is meant to be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageGuidelines {
    pub official_rules: String,
    pub core_rules: String,
    pub optional_rules: String,
    pub suggested_rules: String,
    pub conflict_resolution: String,
}

impl UsageGuidelines {
    pub fn for_config(config: &EngineConfig) -> Self {
        let core = percent(config.tiers.core);
        let optional = percent(config.tiers.optional);
        Self {
            official_rules: "Official rules: journal requirements that must be strictly followed"
                .to_string(),
            core_rules: format!(
                "Core rules: followed by {core}%+ of analyzed papers, strongly recommended"
            ),
            optional_rules: format!(
                "Optional rules: followed by {optional}%-{core}% of analyzed papers, choose as appropriate"
            ),
            suggested_rules: format!(
                "Suggested rules: followed by fewer than {optional}% of analyzed papers, for reference only"
            ),
            conflict_resolution: "When rules conflict, official rules take priority over empirical \
                                  rules, and among empirical rules the more frequent one wins"
                .to_string(),
        }
    }
}

fn percent(ratio: f64) -> String {
    format!("{}", (ratio * 100.0).round() as i64)
}

/// What conflict resolution removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionLog {
    pub conflict_count: usize,
    #[serde(default)]
    pub dropped: Vec<DroppedRule>,
    #[serde(default)]
    pub unresolved_official_conflicts: Vec<Conflict>,
}

/// The merged, conflict-free rule catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridGuide {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub total_rules: usize,
    pub official_rules: usize,
    pub empirical_rules: usize,
    pub tier_counts: TierCounts,
    /// Category → rule ids, in priority order
    pub categories: BTreeMap<Category, Vec<String>>,
    /// Accepted rules in priority order
    pub rules: Vec<RuleRecord>,
    pub quality_metrics: QualityMetrics,
    pub usage_guidelines: UsageGuidelines,
    #[serde(default)]
    pub resolution: ResolutionLog,
    /// De-duplicated candidate pool the rules were resolved from
    #[serde(default)]
    pub source_rules: Vec<RuleRecord>,
}

impl HybridGuide {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, id: &str) -> Option<&RuleRecord> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rules_in_category(&self, category: Category) -> Vec<&RuleRecord> {
        self.categories
            .get(&category)
            .map(|ids| ids.iter().filter_map(|id| self.rule(id)).collect())
            .unwrap_or_default()
    }

    pub fn rules_in_tier(&self, tier: SourceTier) -> Vec<&RuleRecord> {
        self.rules.iter().filter(|r| r.source_tier == tier).collect()
    }

    pub fn core_rules(&self) -> Vec<&RuleRecord> {
        self.rules_in_tier(SourceTier::Core)
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Builds guides from resolutions
#[derive(Debug, Clone, Copy)]
pub struct GuideAssembler<'a> {
    config: &'a EngineConfig,
}

impl<'a> GuideAssembler<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn assemble(&self, resolution: Resolution) -> HybridGuide {
        self.assemble_at(resolution, Utc::now())
    }

    pub fn assemble_at(&self, resolution: Resolution, generated_at: DateTime<Utc>) -> HybridGuide {
        let Resolution {
            candidates,
            rules,
            dropped,
            unresolved_official_conflicts,
            conflict_count,
        } = resolution;

        let mut categories: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for rule in &rules {
            categories.entry(rule.category).or_default().push(rule.id.clone());
        }

        let tier_counts = TierCounts::from_rules(&rules);
        let quality_metrics = QualityMetrics::compute(&rules, self.config);

        tracing::info!(
            "Assembled guide v{} with {} rules ({})",
            self.config.version,
            rules.len(),
            tier_counts
        );

        HybridGuide {
            version: self.config.version.clone(),
            generated_at,
            total_rules: rules.len(),
            official_rules: tier_counts.official,
            empirical_rules: tier_counts.empirical(),
            tier_counts,
            categories,
            rules,
            quality_metrics,
            usage_guidelines: UsageGuidelines::for_config(self.config),
            resolution: ResolutionLog {
                conflict_count,
                dropped,
                unresolved_official_conflicts,
            },
            source_rules: candidates,
        }
    }
}
