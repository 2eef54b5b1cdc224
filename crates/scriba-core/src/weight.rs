//! Rule weights
//!
//! `weight = 1.0 × tier multiplier × frequency multiplier × confidence`.
//! Weights only rank rules against each other and have no upper bound.

use crate::config::TierThresholds;
use crate::model::{EnforcementLevel, RuleRecord};

const BASE_WEIGHT: f64 = 1.0;
const OFFICIAL_MULTIPLIER: f64 = 2.0;
const CORE_FREQUENCY_MULTIPLIER: f64 = 1.5;
const OPTIONAL_FREQUENCY_MULTIPLIER: f64 = 1.2;

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightCalculator {
    thresholds: TierThresholds,
}

impl WeightCalculator {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn tier_multiplier(&self, rule: &RuleRecord) -> f64 {
        if rule.is_official() {
            OFFICIAL_MULTIPLIER
        } else {
            1.0
        }
    }

    /// A missing frequency gets no boost
    pub fn frequency_multiplier(&self, frequency: Option<f64>) -> f64 {
        match frequency {
            Some(f) if f >= self.thresholds.core => CORE_FREQUENCY_MULTIPLIER,
            Some(f) if f >= self.thresholds.optional => OPTIONAL_FREQUENCY_MULTIPLIER,
            _ => 1.0,
        }
    }

    pub fn weight(&self, rule: &RuleRecord) -> f64 {
        BASE_WEIGHT
            * self.tier_multiplier(rule)
            * self.frequency_multiplier(rule.frequency)
            * rule.confidence
    }

    /// Fill the derived fields of a resolved rule
    pub fn apply(&self, rule: &mut RuleRecord) {
        rule.weight = Some(self.weight(rule));
        rule.enforcement_level = Some(EnforcementLevel::for_tier(rule.source_tier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, SourceTier};

    fn rule(tier: SourceTier, frequency: Option<f64>, confidence: f64) -> RuleRecord {
        let mut rule = RuleRecord::new("r", tier, Category::Other, "Some rule", confidence);
        rule.frequency = frequency;
        rule
    }

    #[test]
    fn test_formula() {
        let calc = WeightCalculator::default();
        let cases = [
            (SourceTier::Official, None, 0.8, 1.6),
            (SourceTier::Core, Some(0.9), 0.8, 1.2),
            (SourceTier::Optional, Some(0.6), 1.0, 1.2),
            (SourceTier::Suggested, Some(0.3), 0.5, 0.5),
            (SourceTier::Suggested, None, 0.5, 0.5),
        ];
        for (tier, frequency, confidence, expected) in cases {
            let weight = calc.weight(&rule(tier, frequency, confidence));
            assert!((weight - expected).abs() < 1e-9, "{tier}: {weight} != {expected}");
        }
    }

    #[test]
    fn test_monotonic_in_frequency_and_confidence() {
        let calc = WeightCalculator::default();
        let frequencies = [
            None,
            Some(0.0),
            Some(0.49),
            Some(0.5),
            Some(0.79),
            Some(0.8),
            Some(1.0),
        ];
        for pair in frequencies.windows(2) {
            let low = calc.weight(&rule(SourceTier::Suggested, pair[0], 0.7));
            let high = calc.weight(&rule(SourceTier::Suggested, pair[1], 0.7));
            assert!(high >= low);
        }
        let low = calc.weight(&rule(SourceTier::Core, Some(0.9), 0.6));
        let high = calc.weight(&rule(SourceTier::Core, Some(0.9), 0.7));
        assert!(high >= low);
    }

    #[test]
    fn test_official_outweighs_equal_empirical() {
        let calc = WeightCalculator::default();
        let official = rule(SourceTier::Official, Some(0.9), 0.8);
        let empirical = rule(SourceTier::Core, Some(0.9), 0.8);
        assert!(calc.weight(&official) > calc.weight(&empirical));
    }

    #[test]
    fn test_apply_sets_enforcement() {
        let calc = WeightCalculator::default();
        let mut optional = rule(SourceTier::Optional, Some(0.6), 0.8);
        calc.apply(&mut optional);
        assert_eq!(optional.enforcement_level, Some(EnforcementLevel::Recommended));
        assert!(optional.weight.is_some());
    }
}
