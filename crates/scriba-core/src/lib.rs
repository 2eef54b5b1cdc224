//! Scriba Core
//!
//! Hybrid rule integration engine. Merges writing rules extracted from an
//! official style document with rules mined from a corpus of published
//! papers into one conflict-free, prioritized and queryable style guide.
//!
//! The pipeline runs normalizer → categorizer → conflict detector →
//! priority resolver → weight calculator → metrics + assembler, and
//! [`HybridEngine`] wraps it behind four operations.

pub mod categorizer;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod guide;
pub mod metrics;
pub mod model;
pub mod normalizer;
pub mod resolver;
pub mod result;
pub mod updater;
pub mod weight;

pub use categorizer::{CATEGORY_KEYWORDS, Categorizer, tokenize};
pub use config::{ConfigLoader, EngineConfig, TierThresholds};
pub use conflict::{
    Conflict, ConflictDetector, ConflictSet, ContrastPair, ContrastTable, SEED_CONTRAST_PAIRS,
};
pub use engine::HybridEngine;
pub use error::{ErrorKind, ScribaError};
pub use guide::{GuideAssembler, HybridGuide, ResolutionLog, TierCounts, UsageGuidelines};
pub use metrics::QualityMetrics;
pub use model::{
    Category, EmpiricalRuleInput, EnforcementLevel, ExampleInput, OfficialRuleInput,
    PriorityHint, RuleExample, RuleOrigin, RuleRecord, SourceTier,
};
pub use normalizer::{NormalizationIssue, NormalizationReport, RuleNormalizer};
pub use resolver::{DroppedRule, PriorityResolver, Resolution};
pub use result::Result;
pub use updater::{IncrementalUpdater, UpdateOutcome, merge_pool};
pub use weight::WeightCalculator;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scriba=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
