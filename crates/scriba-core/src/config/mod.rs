//! Configuration system for scriba
//!
//! Engine configuration is optional: every field defaults to the values the
//! integration rules are defined with (core tier at 80% adherence, optional
//! tier at 50%, default confidence 0.8, coverage saturating at 50 rules).
//!
//! ## Configuration Files
//!
//! Supported file names, searched upward from the working directory:
//! - `.scribarc.json`
//! - `.scribarc.toml`
//! - `scriba.yaml` / `scriba.yml`
//! - `scriba.json`
//!
//! ## Example Configuration
//!
//! ```json
//! {
//!   "version": "2.0",
//!   "tiers": { "core": 0.8, "optional": 0.5 },
//!   "defaultConfidence": 0.8,
//!   "coverageTarget": 50,
//!   "contrastPairs": [
//!     { "positive": "include", "negative": "omit" }
//!   ],
//!   "parallelThreshold": 512
//! }
//! ```

mod engine_config;
mod loader;

pub use engine_config::{EngineConfig, TierThresholds};
pub use loader::ConfigLoader;
