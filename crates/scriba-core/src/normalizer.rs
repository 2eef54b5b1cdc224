//! Rule normalization
//!
//! Turns raw official and empirical records into [`RuleRecord`]s. Every
//! output record has an id, a category, a tier and a confidence. Records
//! that cannot be normalized are dropped and reported as
//! [`NormalizationIssue`]s, never failing the batch.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::categorizer::Categorizer;
use crate::config::EngineConfig;
use crate::error::ScribaError;
use crate::model::{
    EmpiricalRuleInput, EnforcementLevel, OfficialRuleInput, PriorityHint, RuleOrigin, RuleRecord,
    SourceTier,
};

/// Suffix appended to an empirical id that clashes with an official one
const COLLISION_SUFFIX: &str = "-e";

/// Non-fatal problem found while normalizing a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationIssue {
    /// Record dropped; `position` is 1-based within its source list
    MalformedRule {
        origin: RuleOrigin,
        position: usize,
        reason: String,
    },
    /// Empirical id renamed away from an official id
    IdCollision { original: String, resolved: String },
    /// Id repeated inside one source list; the last record was kept
    DuplicateId { id: String, origin: RuleOrigin },
}

impl NormalizationIssue {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRule { .. })
    }

    pub fn to_error(&self) -> ScribaError {
        match self {
            Self::MalformedRule {
                origin,
                position,
                reason,
            } => ScribaError::malformed_rule(*origin, *position, reason.clone()),
            Self::IdCollision { original, resolved } => {
                ScribaError::id_collision(original.clone(), resolved.clone())
            }
            Self::DuplicateId { id, origin } => ScribaError::duplicate_id(id.clone(), *origin),
        }
    }
}

impl From<NormalizationIssue> for ScribaError {
    fn from(issue: NormalizationIssue) -> Self {
        issue.to_error()
    }
}

impl fmt::Display for NormalizationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error())
    }
}

/// Normalized rules plus everything that was dropped or renamed on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    /// Official rules first, then empirical, each in input order
    pub rules: Vec<RuleRecord>,
    pub issues: Vec<NormalizationIssue>,
}

impl NormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn malformed_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_malformed()).count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<NormalizationReport> for Vec<RuleRecord> {
    fn from(report: NormalizationReport) -> Self {
        report.rules
    }
}

/// Synthesized id for the `sequence`-th record of a source
pub fn synthesized_id(origin: RuleOrigin, sequence: usize) -> String {
    format!("{}-rule-{:03}", origin.tag(), sequence)
}

/// Sequence number of a synthesized id, if `id` has that shape
fn parse_sequence(id: &str, origin: RuleOrigin) -> Option<usize> {
    id.strip_prefix(origin.tag())?
        .strip_prefix("-rule-")?
        .parse()
        .ok()
}

fn explicit_id(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|id| !id.is_empty())
}

/// Hands out ids for records that do not bring their own.
///
/// The sequence is the record's position in its list. When an existing pool
/// already holds synthesized ids for an origin, a record whose description
/// matches a pool rule of that origin gets the rule's id back, and new ids
/// continue after the highest sequence in use. A positional id that clashes
/// with another id is left to the collision and duplicate handling.
#[derive(Debug, Default)]
struct IdAllocator {
    taken: HashSet<String>,
    reuse: HashMap<(RuleOrigin, String), String>,
    next: HashMap<RuleOrigin, usize>,
}

impl IdAllocator {
    fn positional() -> Self {
        Self::default()
    }

    fn seeded<'a>(pool: &[RuleRecord], explicit: impl IntoIterator<Item = &'a str>) -> Self {
        let mut allocator = Self {
            taken: explicit.into_iter().map(str::to_string).collect(),
            ..Default::default()
        };

        for rule in pool {
            allocator.taken.insert(rule.id.clone());
            allocator
                .reuse
                .entry((rule.origin(), rule.description.clone()))
                .or_insert_with(|| rule.id.clone());
            for origin in [RuleOrigin::Official, RuleOrigin::Empirical] {
                if let Some(seq) = parse_sequence(&rule.id, origin) {
                    let entry = allocator.next.entry(origin).or_insert(1);
                    *entry = (*entry).max(seq + 1);
                }
            }
        }

        allocator
    }

    fn assign(
        &mut self,
        origin: RuleOrigin,
        position: usize,
        explicit: Option<&str>,
        description: &str,
    ) -> String {
        if let Some(id) = explicit {
            return id.to_string();
        }
        if let Some(id) = self.reuse.get(&(origin, description.to_string())) {
            return id.clone();
        }

        let id = match self.next.get_mut(&origin) {
            Some(next) => loop {
                let candidate = synthesized_id(origin, *next);
                *next += 1;
                if !self.taken.contains(&candidate) {
                    break candidate;
                }
            },
            None => synthesized_id(origin, position),
        };
        self.taken.insert(id.clone());
        id
    }
}

/// Converts raw input records into canonical rules
#[derive(Debug, Clone)]
pub struct RuleNormalizer<'a> {
    config: &'a EngineConfig,
    categorizer: Categorizer,
    existing: Option<&'a [RuleRecord]>,
}

impl<'a> RuleNormalizer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            categorizer: Categorizer::new(),
            existing: None,
        }
    }

    /// Allocate ids against an existing rule pool (incremental updates)
    pub fn with_existing(mut self, pool: &'a [RuleRecord]) -> Self {
        self.existing = Some(pool);
        self
    }

    pub fn normalize(
        &self,
        official: &[OfficialRuleInput],
        empirical: &[EmpiricalRuleInput],
    ) -> NormalizationReport {
        let mut issues = Vec::new();
        let mut ids = match self.existing {
            Some(pool) => {
                let explicit = official
                    .iter()
                    .filter_map(|r| explicit_id(&r.rule_id))
                    .chain(empirical.iter().filter_map(|r| explicit_id(&r.rule_id)));
                IdAllocator::seeded(pool, explicit)
            }
            None => IdAllocator::positional(),
        };

        let mut official_rules: IndexMap<String, RuleRecord> = IndexMap::new();
        for (idx, input) in official.iter().enumerate() {
            let position = idx + 1;
            match self.official_record(position, input) {
                Ok(mut record) => {
                    record.id = ids.assign(
                        RuleOrigin::Official,
                        position,
                        explicit_id(&input.rule_id),
                        &record.description,
                    );
                    insert_last_wins(&mut official_rules, record, &mut issues);
                }
                Err(issue) => report(issue, &mut issues),
            }
        }

        let mut official_ids: HashSet<&str> = official_rules.keys().map(String::as_str).collect();
        if let Some(pool) = self.existing {
            official_ids.extend(pool.iter().filter(|r| r.is_official()).map(|r| r.id.as_str()));
        }
        let empirical_explicit: HashSet<&str> = empirical
            .iter()
            .filter_map(|r| explicit_id(&r.rule_id))
            .collect();

        let mut empirical_rules: IndexMap<String, RuleRecord> = IndexMap::new();
        for (idx, input) in empirical.iter().enumerate() {
            let position = idx + 1;
            match self.empirical_record(position, input) {
                Ok(mut record) => {
                    let mut id = ids.assign(
                        RuleOrigin::Empirical,
                        position,
                        explicit_id(&input.rule_id),
                        &record.description,
                    );
                    if official_ids.contains(id.as_str()) {
                        let original = id.clone();
                        while official_ids.contains(id.as_str())
                            || empirical_explicit.contains(id.as_str())
                        {
                            id.push_str(COLLISION_SUFFIX);
                        }
                        report(
                            NormalizationIssue::IdCollision {
                                original,
                                resolved: id.clone(),
                            },
                            &mut issues,
                        );
                    }
                    record.id = id;
                    insert_last_wins(&mut empirical_rules, record, &mut issues);
                }
                Err(issue) => report(issue, &mut issues),
            }
        }

        tracing::debug!(
            "Normalized {} official and {} empirical rules ({} issues)",
            official_rules.len(),
            empirical_rules.len(),
            issues.len()
        );

        NormalizationReport {
            rules: official_rules
                .into_values()
                .chain(empirical_rules.into_values())
                .collect(),
            issues,
        }
    }

    fn official_record(
        &self,
        position: usize,
        input: &OfficialRuleInput,
    ) -> Result<RuleRecord, NormalizationIssue> {
        let origin = RuleOrigin::Official;
        let description = required_description(origin, position, input.description.as_deref())?;
        let confidence = self.confidence(origin, position, input.confidence)?;

        let priority_hint = input
            .priority_hint
            .as_deref()
            .and_then(PriorityHint::from_hint)
            .unwrap_or_else(|| PriorityHint::from_description(&description));

        let mut record = RuleRecord::new(
            String::new(),
            SourceTier::Official,
            self.categorizer
                .categorize_with_hint(&description, input.category.as_deref()),
            description,
            confidence,
        );
        record.requirements = input.requirements.clone();
        record.prohibitions = input.prohibitions.clone();
        record.examples = input.examples.iter().cloned().map(Into::into).collect();
        record.enforcement_level = Some(EnforcementLevel::Mandatory);
        record.context = input.context.clone().unwrap_or_default();
        record.priority_hint = Some(priority_hint);
        record.section = input.section.clone();
        record.page_reference = input.page_reference.clone();
        Ok(record)
    }

    fn empirical_record(
        &self,
        position: usize,
        input: &EmpiricalRuleInput,
    ) -> Result<RuleRecord, NormalizationIssue> {
        let origin = RuleOrigin::Empirical;
        let description = required_description(origin, position, input.description.as_deref())?;
        let frequency = unit_ratio(origin, position, "frequency", input.frequency)?;
        let confidence = self.confidence(origin, position, input.confidence)?;

        let mut record = RuleRecord::new(
            String::new(),
            SourceTier::from_frequency(frequency, &self.config.tiers),
            self.categorizer
                .categorize_with_hint(&description, input.category.as_deref()),
            description,
            confidence,
        );
        record.frequency = frequency;
        record.requirements = input.requirements.clone();
        record.prohibitions = input.prohibitions.clone();
        record.examples = input.examples.iter().cloned().map(Into::into).collect();
        record.context = input.context.clone().unwrap_or_default();
        record.statistics = input.statistics.clone();
        Ok(record)
    }

    fn confidence(
        &self,
        origin: RuleOrigin,
        position: usize,
        value: Option<f64>,
    ) -> Result<f64, NormalizationIssue> {
        Ok(unit_ratio(origin, position, "confidence", value)?
            .unwrap_or(self.config.default_confidence))
    }
}

fn required_description(
    origin: RuleOrigin,
    position: usize,
    description: Option<&str>,
) -> Result<String, NormalizationIssue> {
    match description.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        Some(_) => Err(malformed(origin, position, "empty description")),
        None => Err(malformed(origin, position, "missing description")),
    }
}

fn unit_ratio(
    origin: RuleOrigin,
    position: usize,
    field: &str,
    value: Option<f64>,
) -> Result<Option<f64>, NormalizationIssue> {
    match value {
        Some(v) if !v.is_finite() || !(0.0..=1.0).contains(&v) => Err(malformed(
            origin,
            position,
            format!("{field} {v} outside [0, 1]"),
        )),
        other => Ok(other),
    }
}

fn malformed(origin: RuleOrigin, position: usize, reason: impl Into<String>) -> NormalizationIssue {
    NormalizationIssue::MalformedRule {
        origin,
        position,
        reason: reason.into(),
    }
}

fn report(issue: NormalizationIssue, issues: &mut Vec<NormalizationIssue>) {
    tracing::warn!("{}", issue);
    issues.push(issue);
}

fn insert_last_wins(
    rules: &mut IndexMap<String, RuleRecord>,
    record: RuleRecord,
    issues: &mut Vec<NormalizationIssue>,
) {
    if rules.contains_key(&record.id) {
        report(
            NormalizationIssue::DuplicateId {
                id: record.id.clone(),
                origin: record.origin(),
            },
            issues,
        );
    }
    rules.insert(record.id.clone(), record);
}
