//! Incremental re-integration
//!
//! An update never edits the previous guide. It merges the delta into the
//! previous guide's source pool and re-runs resolution and assembly from
//! there, so a rule dropped earlier can come back when its competitor
//! disappears or is outranked.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::engine::HybridEngine;
use crate::error::ScribaError;
use crate::guide::HybridGuide;
use crate::model::{EmpiricalRuleInput, OfficialRuleInput, RuleRecord};

/// Result of an update call
#[derive(Debug)]
pub enum UpdateOutcome {
    Applied(HybridGuide),
    /// The delta was unusable; `previous` is the unchanged prior guide
    Rejected {
        previous: HybridGuide,
        error: ScribaError,
    },
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn guide(&self) -> &HybridGuide {
        match self {
            Self::Applied(guide) => guide,
            Self::Rejected { previous, .. } => previous,
        }
    }

    pub fn error(&self) -> Option<&ScribaError> {
        match self {
            Self::Applied(_) => None,
            Self::Rejected { error, .. } => Some(error),
        }
    }

    /// The guide to keep using, whether or not the delta applied
    pub fn into_guide(self) -> HybridGuide {
        match self {
            Self::Applied(guide) => guide,
            Self::Rejected { previous, .. } => previous,
        }
    }

    pub fn into_result(self) -> crate::Result<HybridGuide> {
        match self {
            Self::Applied(guide) => Ok(guide),
            Self::Rejected { error, .. } => Err(error),
        }
    }
}

/// Merge normalized delta rules into an existing pool.
///
/// Delta rules replace pool rules with the same id in place. An official
/// delta rule whose id is held by an empirical pool rule moves that rule to
/// a suffixed id first, so the official rule never overwrites it.
pub fn merge_pool(pool: &[RuleRecord], delta: Vec<RuleRecord>) -> Vec<RuleRecord> {
    let mut merged: IndexMap<String, RuleRecord> =
        pool.iter().map(|r| (r.id.clone(), r.clone())).collect();
    let delta_ids: HashSet<String> = delta.iter().map(|r| r.id.clone()).collect();

    for rule in delta {
        let displaces_empirical = rule.is_official()
            && merged.get(&rule.id).is_some_and(|existing| !existing.is_official());
        if displaces_empirical {
            if let Some(mut displaced) = merged.shift_remove(&rule.id) {
                let mut id = format!("{}-e", displaced.id);
                while merged.contains_key(&id) || delta_ids.contains(&id) {
                    id.push_str("-e");
                }
                tracing::warn!("{}", ScribaError::id_collision(&displaced.id, &id));
                displaced.id = id;
                merged.insert(displaced.id.clone(), displaced);
            }
        }
        merged.insert(rule.id.clone(), rule);
    }

    merged.into_values().collect()
}

pub struct IncrementalUpdater<'a> {
    engine: &'a HybridEngine,
}

impl<'a> IncrementalUpdater<'a> {
    pub fn new(engine: &'a HybridEngine) -> Self {
        Self { engine }
    }

    pub fn update(
        &self,
        previous: Option<&HybridGuide>,
        delta_official: &[OfficialRuleInput],
        delta_empirical: &[EmpiricalRuleInput],
    ) -> UpdateOutcome {
        let pool: &[RuleRecord] = previous.map(|g| g.source_rules.as_slice()).unwrap_or(&[]);
        let submitted = delta_official.len() + delta_empirical.len();

        let report = self.engine.normalize_against(pool, delta_official, delta_empirical);
        if submitted > 0 && report.rules.is_empty() {
            let error = ScribaError::update_delta_invalid(submitted);
            tracing::warn!("{}", error);
            let previous = match previous {
                Some(guide) => guide.clone(),
                None => self.engine.assemble(self.engine.resolve(Vec::<RuleRecord>::new())),
            };
            return UpdateOutcome::Rejected { previous, error };
        }

        let delta_size = report.rules.len();
        let candidates = merge_pool(pool, report.rules);
        tracing::info!(
            "Applying delta of {} rules to a pool of {} ({} candidates)",
            delta_size,
            pool.len(),
            candidates.len()
        );

        UpdateOutcome::Applied(self.engine.assemble(self.engine.resolve(candidates)))
    }
}
