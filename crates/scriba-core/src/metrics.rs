//! Aggregate quality metrics over a resolved rule set

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;
use crate::model::RuleRecord;

/// Snapshot of guide quality. An empty rule set yields all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean frequency over rules that carry one
    pub average_frequency: f64,
    pub official_ratio: f64,
    pub empirical_ratio: f64,
    /// Rules whose frequency reaches the core threshold
    pub high_confidence_count: usize,
    /// `min(1, total / coverage target)`
    pub coverage_score: f64,
    pub reliability_score: f64,
}

impl QualityMetrics {
    pub fn compute(rules: &[RuleRecord], config: &EngineConfig) -> Self {
        if rules.is_empty() {
            return Self::default();
        }

        let total = rules.len() as f64;
        let frequencies: Vec<f64> = rules.iter().filter_map(|r| r.frequency).collect();
        let average_frequency = if frequencies.is_empty() {
            0.0
        } else {
            frequencies.iter().sum::<f64>() / frequencies.len() as f64
        };

        let official = rules.iter().filter(|r| r.is_official()).count() as f64;
        let official_ratio = official / total;
        let high_confidence_count = frequencies
            .iter()
            .filter(|f| **f >= config.tiers.core)
            .count();

        Self {
            average_frequency,
            official_ratio,
            empirical_ratio: 1.0 - official_ratio,
            high_confidence_count,
            coverage_score: (total / config.coverage_target.max(1) as f64).min(1.0),
            reliability_score: average_frequency,
        }
    }
}

impl fmt::Display for QualityMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg_frequency={:.3} official={:.1}% empirical={:.1}% high_confidence={} coverage={:.3} reliability={:.3}",
            self.average_frequency,
            self.official_ratio * 100.0,
            self.empirical_ratio * 100.0,
            self.high_confidence_count,
            self.coverage_score,
            self.reliability_score
        )
    }
}
