//! Engine facade
//!
//! [`HybridEngine`] owns a validated configuration and the compiled contrast
//! table and exposes the four operations collaborators use:
//! [`normalize_and_categorize`](HybridEngine::normalize_and_categorize),
//! [`resolve`](HybridEngine::resolve), [`assemble`](HybridEngine::assemble)
//! and [`update`](HybridEngine::update). The engine holds no mutable state;
//! one instance can serve any number of threads.

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::conflict::ConflictDetector;
use crate::guide::{GuideAssembler, HybridGuide};
use crate::model::{EmpiricalRuleInput, OfficialRuleInput, RuleRecord};
use crate::normalizer::{NormalizationReport, RuleNormalizer};
use crate::resolver::{PriorityResolver, Resolution};
use crate::updater::{IncrementalUpdater, UpdateOutcome};
use crate::weight::WeightCalculator;

#[derive(Debug, Clone)]
pub struct HybridEngine {
    config: EngineConfig,
    detector: ConflictDetector,
}

impl HybridEngine {
    /// Build an engine, rejecting invalid configuration
    pub fn new(config: EngineConfig) -> crate::Result<Self> {
        config.validate()?;
        let detector = ConflictDetector::from_config(&config);
        tracing::debug!(
            "Engine ready with {} contrast pairs",
            detector.table().len()
        );
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    /// Normalize and categorize both input lists into one candidate pool
    pub fn normalize_and_categorize(
        &self,
        official: &[OfficialRuleInput],
        empirical: &[EmpiricalRuleInput],
    ) -> NormalizationReport {
        RuleNormalizer::new(&self.config).normalize(official, empirical)
    }

    pub(crate) fn normalize_against(
        &self,
        pool: &[RuleRecord],
        official: &[OfficialRuleInput],
        empirical: &[EmpiricalRuleInput],
    ) -> NormalizationReport {
        RuleNormalizer::new(&self.config)
            .with_existing(pool)
            .normalize(official, empirical)
    }

    /// Drop conflicting lower-priority rules and weight the rest
    pub fn resolve(&self, candidates: impl Into<Vec<RuleRecord>>) -> Resolution {
        let weights = WeightCalculator::new(self.config.tiers);
        PriorityResolver::new(&self.detector, weights).resolve(candidates.into())
    }

    pub fn assemble(&self, resolution: Resolution) -> HybridGuide {
        GuideAssembler::new(&self.config).assemble(resolution)
    }

    /// Assemble with a fixed generation time
    pub fn assemble_at(&self, resolution: Resolution, generated_at: DateTime<Utc>) -> HybridGuide {
        GuideAssembler::new(&self.config).assemble_at(resolution, generated_at)
    }

    /// Full pipeline over fresh inputs
    pub fn integrate(
        &self,
        official: &[OfficialRuleInput],
        empirical: &[EmpiricalRuleInput],
    ) -> HybridGuide {
        self.assemble(self.resolve(self.normalize_and_categorize(official, empirical)))
    }

    /// Re-integrate a previous guide with a delta of new records
    pub fn update(
        &self,
        previous: Option<&HybridGuide>,
        delta_official: &[OfficialRuleInput],
        delta_empirical: &[EmpiricalRuleInput],
    ) -> UpdateOutcome {
        IncrementalUpdater::new(self).update(previous, delta_official, delta_empirical)
    }
}

impl Default for HybridEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            detector: ConflictDetector::from_config(&config),
            config,
        }
    }
}
