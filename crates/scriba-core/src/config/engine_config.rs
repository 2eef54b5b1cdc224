//! Engine configuration types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::conflict::ContrastPair;
use crate::error::ScribaError;
use crate::result::Result;

/// Frequency thresholds that split empirical rules into tiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TierThresholds {
    /// Minimum adherence for a CORE rule
    #[schemars(description = "Minimum frequency for a CORE rule (default 0.8)")]
    pub core: f64,

    /// Minimum adherence for an OPTIONAL rule
    #[schemars(description = "Minimum frequency for an OPTIONAL rule (default 0.5)")]
    pub optional: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            core: 0.8,
            optional: 0.5,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Version tag stamped on every assembled guide
    #[schemars(description = "Version tag written into assembled guides")]
    pub version: String,

    /// Tier thresholds
    #[schemars(description = "Frequency thresholds for CORE and OPTIONAL tiers")]
    pub tiers: TierThresholds,

    /// Confidence given to records that do not state one
    #[schemars(description = "Confidence assigned when a record omits it")]
    pub default_confidence: f64,

    /// Rule count at which coverage saturates
    #[schemars(description = "Number of rules that yields a coverage score of 1.0")]
    pub coverage_target: usize,

    /// Contrast pairs added to the seed table
    #[schemars(description = "Additional contrast pairs for conflict detection")]
    pub contrast_pairs: Vec<ContrastPair>,

    /// Use only `contrast_pairs`, dropping the seed table
    #[schemars(description = "Replace the seed contrast table instead of extending it")]
    pub replace_seed_contrast_pairs: bool,

    /// Candidate count from which conflict detection runs in parallel
    #[schemars(description = "Candidate count at which pairwise detection is parallelized")]
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            tiers: TierThresholds::default(),
            default_confidence: 0.8,
            coverage_target: 50,
            contrast_pairs: Vec::new(),
            replace_seed_contrast_pairs: false,
            parallel_threshold: 512,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file, dispatching on its extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ScribaError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ScribaError::config_error(format!("{}: {e}", path.display())))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ScribaError::config_error(format!("{}: {e}", path.display())))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| ScribaError::config_error(format!("{}: {e}", path.display())))?,
            _ => {
                return Err(ScribaError::config_error(format!(
                    "Unsupported config file extension for {} (expected .json, .toml, .yaml or .yml)",
                    path.display()
                )));
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and contrast pairs
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| v > 0.0 && v <= 1.0;
        if !in_unit(self.tiers.core) || !in_unit(self.tiers.optional) {
            return Err(ScribaError::config_error(
                "Tier thresholds must lie in (0, 1]",
            ));
        }
        if self.tiers.optional > self.tiers.core {
            return Err(ScribaError::config_error(format!(
                "Optional threshold {} exceeds core threshold {}",
                self.tiers.optional, self.tiers.core
            )));
        }
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(ScribaError::config_error(
                "Default confidence must lie in [0, 1]",
            ));
        }
        if self.coverage_target == 0 {
            return Err(ScribaError::config_error(
                "Coverage target must be at least 1",
            ));
        }
        for pair in &self.contrast_pairs {
            pair.validate()?;
        }
        Ok(())
    }

    /// Serialize as pretty JSON (used by `config init` / `config show`)
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ScribaError::serialization_error(e.to_string()))
    }

    /// JSON Schema describing this configuration
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(EngineConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tiers.core, 0.8);
        assert_eq!(config.tiers.optional, 0.5);
        assert_eq!(config.coverage_target, 50);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"coverageTarget": 20}"#).unwrap();
        assert_eq!(config.coverage_target, 20);
        assert_eq!(config.default_confidence, 0.8);
        assert_eq!(config.version, "2.0");
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = EngineConfig {
            tiers: TierThresholds {
                core: 0.4,
                optional: 0.6,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_contrast_pair_rejected() {
        let config = EngineConfig {
            contrast_pairs: vec![ContrastPair::new("omit", "omit")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig {
            contrast_pairs: vec![ContrastPair::new("include", "omit")],
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = EngineConfig::json_schema().unwrap();
        assert!(schema.contains("coverageTarget"));
        assert!(schema.contains("contrastPairs"));
    }
}
