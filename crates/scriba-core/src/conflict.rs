//! Contrast-pair conflict detection
//!
//! Two rules conflict when one description contains the positive term of a
//! contrast pair and the other contains the negative term of the same pair.
//! Matching is literal: terms are compared as lower-case token sequences,
//! nothing more. The table is curated so that false positives stay rare;
//! missed conflicts are acceptable.
//!
//! A term that is a prefix of its partner ("should" / "should not") only
//! counts where the longer term does not also start, so two "should not"
//! rules never conflict with each other.
//!
//! The upstream style analyzer also paired "examine" with "investigate".
//! That pair is not part of [`SEED_CONTRAST_PAIRS`]; add it through
//! `contrastPairs` in the configuration where a journal needs it.

use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::categorizer::tokenize;
use crate::config::EngineConfig;
use crate::error::ScribaError;
use crate::model::RuleRecord;
use crate::result::Result;

/// Seed table of opposing instruction terms
pub const SEED_CONTRAST_PAIRS: &[(&str, &str)] = &[
    ("use", "avoid"),
    ("always", "never"),
    ("active", "passive"),
    ("prefer", "avoid"),
    ("should", "should not"),
];

/// A pair of terms whose co-occurrence across two rules signals opposition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct ContrastPair {
    pub positive: String,
    pub negative: String,
}

impl ContrastPair {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = tokenize(&self.positive);
        let negative = tokenize(&self.negative);
        if positive.is_empty() || negative.is_empty() {
            return Err(ScribaError::config_error(format!(
                "Contrast pair '{}'/'{}' has an empty term",
                self.positive, self.negative
            )));
        }
        if positive == negative {
            return Err(ScribaError::config_error(format!(
                "Contrast pair '{}'/'{}' has identical terms",
                self.positive, self.negative
            )));
        }
        Ok(())
    }
}

/// Ordered, de-duplicated list of contrast pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContrastTable {
    pairs: Vec<ContrastPair>,
}

impl ContrastTable {
    /// The shipped seed table
    pub fn seed() -> Self {
        Self::from_pairs(
            SEED_CONTRAST_PAIRS
                .iter()
                .map(|(positive, negative)| ContrastPair::new(*positive, *negative)),
        )
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = ContrastPair>) -> Self {
        let mut table = Self { pairs: Vec::new() };
        for pair in pairs {
            table.push(pair);
        }
        table
    }

    /// Seed table extended (or replaced) by configured pairs
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut table = if config.replace_seed_contrast_pairs {
            Self { pairs: Vec::new() }
        } else {
            Self::seed()
        };
        for pair in &config.contrast_pairs {
            table.push(pair.clone());
        }
        table
    }

    /// Append a pair unless it is already present
    pub fn push(&mut self, pair: ContrastPair) {
        if !self.pairs.contains(&pair) {
            self.pairs.push(pair);
        }
    }

    pub fn pairs(&self) -> &[ContrastPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Default for ContrastTable {
    fn default() -> Self {
        Self::seed()
    }
}

/// One detected conflict between two rule ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub first: String,
    pub second: String,
    pub pair: ContrastPair,
}

/// Set of unordered conflicting id pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictSet {
    conflicts: BTreeMap<(String, String), ContrastPair>,
}

impl ConflictSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// Record a conflict; the first contrast pair recorded for an id pair wins
    pub fn insert(&mut self, a: &str, b: &str, pair: ContrastPair) {
        self.conflicts.entry(Self::key(a, b)).or_insert(pair);
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.conflicts.contains_key(&Self::key(a, b))
    }

    /// Contrast pair that made `a` and `b` conflict
    pub fn pair_for(&self, a: &str, b: &str) -> Option<&ContrastPair> {
        self.conflicts.get(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Conflicts ordered by id pair
    pub fn iter(&self) -> impl Iterator<Item = Conflict> + '_ {
        self.conflicts.iter().map(|((first, second), pair)| Conflict {
            first: first.clone(),
            second: second.clone(),
            pair: pair.clone(),
        })
    }
}

/// Contrast pair compiled to token sequences
#[derive(Debug, Clone)]
struct CompiledPair {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl CompiledPair {
    fn compile(pair: &ContrastPair) -> Self {
        Self {
            positive: tokenize(&pair.positive),
            negative: tokenize(&pair.negative),
        }
    }

    /// (has positive, has negative) for one tokenized description
    fn presence(&self, tokens: &[String]) -> (bool, bool) {
        (
            contains_term(tokens, &self.positive, &self.negative),
            contains_term(tokens, &self.negative, &self.positive),
        )
    }
}

/// True when `term` occurs in `tokens` at a position where the longer
/// `partner` term (if `term` is its prefix) does not also start.
fn contains_term(tokens: &[String], term: &[String], partner: &[String]) -> bool {
    if term.is_empty() || term.len() > tokens.len() {
        return false;
    }
    let shadowed_by_partner = partner.len() > term.len() && partner.starts_with(term);
    (0..=tokens.len() - term.len()).any(|i| {
        let rest = &tokens[i..];
        rest.starts_with(term) && !(shadowed_by_partner && rest.starts_with(partner))
    })
}

/// Pairwise conflict detector over a contrast table
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    table: ContrastTable,
    compiled: Vec<CompiledPair>,
    parallel_threshold: usize,
}

impl ConflictDetector {
    pub fn new(table: ContrastTable) -> Self {
        let compiled = table.pairs().iter().map(CompiledPair::compile).collect();
        Self {
            table,
            compiled,
            parallel_threshold: EngineConfig::default().parallel_threshold,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(ContrastTable::from_config(config))
            .with_parallel_threshold(config.parallel_threshold)
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn table(&self) -> &ContrastTable {
        &self.table
    }

    fn signature(&self, description: &str) -> Vec<(bool, bool)> {
        let tokens = tokenize(description);
        self.compiled.iter().map(|c| c.presence(&tokens)).collect()
    }

    fn matching_pair(&self, a: &[(bool, bool)], b: &[(bool, bool)]) -> Option<&ContrastPair> {
        a.iter()
            .zip(b)
            .position(|(&(a_pos, a_neg), &(b_pos, b_neg))| (a_pos && b_neg) || (a_neg && b_pos))
            .map(|idx| &self.table.pairs()[idx])
    }

    /// Contrast pair that makes two descriptions conflict, if any
    pub fn conflicting_pair(&self, a: &str, b: &str) -> Option<&ContrastPair> {
        self.matching_pair(&self.signature(a), &self.signature(b))
    }

    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        self.conflicting_pair(a, b).is_some()
    }

    /// All conflicting pairs among `rules`.
    ///
    /// Large inputs are compared on the rayon pool; the resulting set is the
    /// same either way.
    pub fn detect(&self, rules: &[RuleRecord]) -> ConflictSet {
        let signatures: Vec<Vec<(bool, bool)>> =
            rules.iter().map(|r| self.signature(&r.description)).collect();
        let n = rules.len();

        let signatures = &signatures;
        let compare = move |i: usize| {
            (i + 1..n).filter_map(move |j| {
                if rules[i].id == rules[j].id {
                    return None;
                }
                self.matching_pair(&signatures[i], &signatures[j])
                    .map(|pair| (i, j, pair.clone()))
            })
        };

        let found: Vec<(usize, usize, ContrastPair)> = if n >= self.parallel_threshold {
            tracing::debug!(
                "Comparing {} candidates on {} threads",
                n,
                rayon::current_num_threads()
            );
            (0..n).into_par_iter().flat_map_iter(compare).collect()
        } else {
            (0..n).flat_map(compare).collect()
        };

        let mut set = ConflictSet::new();
        for (i, j, pair) in found {
            set.insert(&rules[i].id, &rules[j].id, pair);
        }

        tracing::debug!("Detected {} conflicts among {} candidates", set.len(), n);
        set
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(ContrastTable::seed())
    }
}
