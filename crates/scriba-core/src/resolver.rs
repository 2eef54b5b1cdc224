//! Priority resolution
//!
//! Candidates are ordered by `(tier rank, frequency descending)` with a
//! stable sort, then accepted greedily: a rule is dropped when it conflicts
//! with a rule accepted before it. OFFICIAL rules sort first and are always
//! accepted. Two conflicting OFFICIAL rules are both kept and reported.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conflict::{Conflict, ConflictDetector, ContrastPair};
use crate::model::{RuleRecord, SourceTier};
use crate::weight::WeightCalculator;

/// A candidate removed by conflict resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRule {
    pub id: String,
    pub source_tier: SourceTier,
    /// Highest-priority accepted rule it conflicted with
    pub displaced_by: String,
    pub pair: ContrastPair,
}

/// Outcome of resolving one candidate pool
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Candidate pool after id de-duplication, in input order
    pub candidates: Vec<RuleRecord>,
    /// Accepted rules in priority order, weighted
    pub rules: Vec<RuleRecord>,
    pub dropped: Vec<DroppedRule>,
    /// Conflicts between two OFFICIAL rules, both of which were kept
    pub unresolved_official_conflicts: Vec<Conflict>,
    /// Number of conflicting pairs detected among the candidates
    pub conflict_count: usize,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Collapse duplicate ids, keeping the last record at the first position
pub fn dedup_by_id(rules: Vec<RuleRecord>) -> Vec<RuleRecord> {
    let mut by_id: IndexMap<String, RuleRecord> = IndexMap::with_capacity(rules.len());
    for rule in rules {
        by_id.insert(rule.id.clone(), rule);
    }
    by_id.into_values().collect()
}

/// Stable priority sort: tier rank, then frequency descending
pub fn sort_by_priority(rules: &mut [RuleRecord]) {
    rules.sort_by(|a, b| {
        a.source_tier
            .rank()
            .cmp(&b.source_tier.rank())
            .then_with(|| b.frequency_or_zero().total_cmp(&a.frequency_or_zero()))
    });
}

pub struct PriorityResolver<'a> {
    detector: &'a ConflictDetector,
    weights: WeightCalculator,
}

impl<'a> PriorityResolver<'a> {
    pub fn new(detector: &'a ConflictDetector, weights: WeightCalculator) -> Self {
        Self { detector, weights }
    }

    pub fn resolve(&self, candidates: Vec<RuleRecord>) -> Resolution {
        let candidates = dedup_by_id(candidates);
        let conflicts = self.detector.detect(&candidates);

        let mut partners: HashMap<String, Vec<(String, ContrastPair)>> = HashMap::new();
        for conflict in conflicts.iter() {
            partners
                .entry(conflict.first.clone())
                .or_default()
                .push((conflict.second.clone(), conflict.pair.clone()));
            partners
                .entry(conflict.second)
                .or_default()
                .push((conflict.first, conflict.pair));
        }

        let mut ordered = candidates.clone();
        sort_by_priority(&mut ordered);

        let mut accepted_rank: HashMap<String, usize> = HashMap::new();
        let mut rules = Vec::with_capacity(ordered.len());
        let mut dropped = Vec::new();
        let mut unresolved_official_conflicts = Vec::new();

        for mut rule in ordered {
            let blocker = partners.get(&rule.id).and_then(|list| {
                list.iter()
                    .filter_map(|(other, pair)| {
                        accepted_rank.get(other).map(|rank| (*rank, other, pair))
                    })
                    .min_by_key(|(rank, _, _)| *rank)
            });

            match blocker {
                Some((_, other, pair)) if rule.is_official() => {
                    tracing::warn!(
                        "Official rules '{}' and '{}' conflict on '{}'/'{}'; keeping both",
                        other,
                        rule.id,
                        pair.positive,
                        pair.negative
                    );
                    unresolved_official_conflicts.push(Conflict {
                        first: other.clone(),
                        second: rule.id.clone(),
                        pair: pair.clone(),
                    });
                }
                Some((_, other, pair)) => {
                    tracing::debug!("Dropping '{}' in favour of '{}'", rule.id, other);
                    dropped.push(DroppedRule {
                        id: rule.id.clone(),
                        source_tier: rule.source_tier,
                        displaced_by: other.clone(),
                        pair: pair.clone(),
                    });
                    continue;
                }
                None => {}
            }

            self.weights.apply(&mut rule);
            accepted_rank.insert(rule.id.clone(), rules.len());
            rules.push(rule);
        }

        tracing::debug!(
            "Resolved {} candidates: {} accepted, {} dropped, {} conflicts",
            candidates.len(),
            rules.len(),
            dropped.len(),
            conflicts.len()
        );

        Resolution {
            candidates,
            rules,
            dropped,
            unresolved_official_conflicts,
            conflict_count: conflicts.len(),
        }
    }
}
