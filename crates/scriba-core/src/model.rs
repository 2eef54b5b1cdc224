//! Rule data model
//!
//! [`RuleRecord`] is the canonical in-memory form of one writing rule. Every
//! pipeline stage reads it; stages only ever fill the derived fields
//! (`category`, `enforcement_level`, `weight`) and never touch
//! `description`, `source_tier` or `frequency` once normalization is done.
//!
//! The raw boundary shapes accepted from collaborators are
//! [`OfficialRuleInput`] and [`EmpiricalRuleInput`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::TierThresholds;

/// Which input list a rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrigin {
    Official,
    Empirical,
}

impl RuleOrigin {
    /// Tag used when synthesizing ids (`official-rule-001`)
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Empirical => "empirical",
        }
    }
}

impl fmt::Display for RuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Authority tier of a rule.
///
/// Declaration order is priority order: OFFICIAL outranks CORE, which
/// outranks OPTIONAL, which outranks SUGGESTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTier {
    /// Extracted from the authoritative style document
    Official,
    /// Followed by at least the core share of analyzed papers
    Core,
    /// Followed by at least the optional share of analyzed papers
    Optional,
    /// Everything else mined from the corpus
    Suggested,
}

impl SourceTier {
    pub const ALL: [SourceTier; 4] = [Self::Official, Self::Core, Self::Optional, Self::Suggested];

    /// Rank used by the priority order (0 = highest)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Official => 0,
            Self::Core => 1,
            Self::Optional => 2,
            Self::Suggested => 3,
        }
    }

    pub fn is_official(&self) -> bool {
        matches!(self, Self::Official)
    }

    pub fn origin(&self) -> RuleOrigin {
        if self.is_official() {
            RuleOrigin::Official
        } else {
            RuleOrigin::Empirical
        }
    }

    /// Provisional tier of an empirical rule from its corpus frequency.
    /// A missing frequency lands in SUGGESTED.
    pub fn from_frequency(frequency: Option<f64>, thresholds: &TierThresholds) -> Self {
        match frequency {
            Some(f) if f >= thresholds.core => Self::Core,
            Some(f) if f >= thresholds.optional => Self::Optional,
            _ => Self::Suggested,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Official => "OFFICIAL",
            Self::Core => "CORE",
            Self::Optional => "OPTIONAL",
            Self::Suggested => "SUGGESTED",
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "official" => Ok(Self::Official),
            "core" => Ok(Self::Core),
            "optional" => Ok(Self::Optional),
            "suggested" => Ok(Self::Suggested),
            other => Err(format!("unknown tier '{other}'")),
        }
    }
}

/// Semantic category of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Format,
    SentenceStructure,
    Vocabulary,
    ParagraphOrganization,
    Transitions,
    AcademicVoice,
    Citation,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Format,
        Self::SentenceStructure,
        Self::Vocabulary,
        Self::ParagraphOrganization,
        Self::Transitions,
        Self::AcademicVoice,
        Self::Citation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "FORMAT",
            Self::SentenceStructure => "SENTENCE_STRUCTURE",
            Self::Vocabulary => "VOCABULARY",
            Self::ParagraphOrganization => "PARAGRAPH_ORGANIZATION",
            Self::Transitions => "TRANSITIONS",
            Self::AcademicVoice => "ACADEMIC_VOICE",
            Self::Citation => "CITATION",
            Self::Other => "OTHER",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Format => "Format",
            Self::SentenceStructure => "Sentence structure",
            Self::Vocabulary => "Vocabulary",
            Self::ParagraphOrganization => "Paragraph organization",
            Self::Transitions => "Transitions",
            Self::AcademicVoice => "Academic voice",
            Self::Citation => "Citation",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts `SENTENCE_STRUCTURE`, `sentence-structure`, `Sentence structure`
    /// and the labels used by the upstream Chinese-language analyzer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        let category = match normalized.as_str() {
            "FORMAT" | "格式规范" => Self::Format,
            "SENTENCE_STRUCTURE" | "句式结构" => Self::SentenceStructure,
            "VOCABULARY" | "词汇选择" => Self::Vocabulary,
            "PARAGRAPH_ORGANIZATION" | "段落组织" => Self::ParagraphOrganization,
            "TRANSITIONS" | "段落衔接" => Self::Transitions,
            "ACADEMIC_VOICE" | "学术表达" => Self::AcademicVoice,
            "CITATION" | "引用论证" => Self::Citation,
            "OTHER" | "其他" => Self::Other,
            _ => return Err(format!("unknown category '{}'", s.trim())),
        };
        Ok(category)
    }
}

/// How strictly a rule should be applied downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnforcementLevel {
    Mandatory,
    StronglyRecommended,
    Recommended,
    Suggested,
}

impl EnforcementLevel {
    /// Enforcement level implied by a tier
    pub fn for_tier(tier: SourceTier) -> Self {
        match tier {
            SourceTier::Official => Self::Mandatory,
            SourceTier::Core => Self::StronglyRecommended,
            SourceTier::Optional => Self::Recommended,
            SourceTier::Suggested => Self::Suggested,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mandatory => "MANDATORY",
            Self::StronglyRecommended => "STRONGLY_RECOMMENDED",
            Self::Recommended => "RECOMMENDED",
            Self::Suggested => "SUGGESTED",
        }
    }
}

impl fmt::Display for EnforcementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational strength hint carried by official rules.
///
/// Never influences tier, enforcement level or weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityHint {
    Highest,
    High,
    Medium,
}

const HIGHEST_HINT_WORDS: &[&str] = &["must", "required", "mandatory", "shall", "always", "never"];
const HIGH_HINT_WORDS: &[&str] = &["should", "recommended", "preferred", "typically", "usually"];
const MEDIUM_HINT_WORDS: &[&str] = &["may", "can", "optional", "sometimes", "occasionally"];

impl PriorityHint {
    /// Map caller-supplied hint text ("must", "should", "may", ...)
    pub fn from_hint(text: &str) -> Option<Self> {
        Self::match_words(&crate::categorizer::tokenize(text))
    }

    /// Derive a hint from the rule description, defaulting to HIGH
    pub fn from_description(description: &str) -> Self {
        Self::match_words(&crate::categorizer::tokenize(description)).unwrap_or(Self::High)
    }

    fn match_words(tokens: &[String]) -> Option<Self> {
        let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
        if has(HIGHEST_HINT_WORDS) {
            Some(Self::Highest)
        } else if has(HIGH_HINT_WORDS) {
            Some(Self::High)
        } else if has(MEDIUM_HINT_WORDS) {
            Some(Self::Medium)
        } else {
            None
        }
    }
}

/// A (correct, incorrect, explanation) illustration of a rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleExample {
    #[serde(default)]
    pub correct: String,
    #[serde(default)]
    pub incorrect: String,
    #[serde(default)]
    pub explanation: String,
}

impl RuleExample {
    pub fn new(
        correct: impl Into<String>,
        incorrect: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            correct: correct.into(),
            incorrect: incorrect.into(),
            explanation: explanation.into(),
        }
    }
}

/// Example as found in raw input: either a full triple or a bare sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleInput {
    Text(String),
    Triple(RuleExample),
}

impl From<ExampleInput> for RuleExample {
    fn from(input: ExampleInput) -> Self {
        match input {
            ExampleInput::Text(correct) => RuleExample {
                correct,
                ..Default::default()
            },
            ExampleInput::Triple(example) => example,
        }
    }
}

/// Canonical representation of one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Unique within a guide, stable across re-integration runs
    pub id: String,
    pub source_tier: SourceTier,
    pub category: Category,
    /// The only field conflict detection and categorization read
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<RuleExample>,
    /// Share of analyzed papers following the pattern (empirical rules only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforcement_level: Option<EnforcementLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// When the rule applies; only used for downstream relevance matching
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_hint: Option<PriorityHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_reference: Option<String>,
    /// Opaque upstream statistics, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
}

impl RuleRecord {
    /// Bare record with defaults for every optional field
    pub fn new(
        id: impl Into<String>,
        source_tier: SourceTier,
        category: Category,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source_tier,
            category,
            description: description.into(),
            requirements: Vec::new(),
            prohibitions: Vec::new(),
            examples: Vec::new(),
            frequency: None,
            confidence,
            enforcement_level: None,
            weight: None,
            context: String::new(),
            priority_hint: None,
            section: None,
            page_reference: None,
            statistics: None,
        }
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn origin(&self) -> RuleOrigin {
        self.source_tier.origin()
    }

    pub fn is_official(&self) -> bool {
        self.source_tier.is_official()
    }

    pub fn frequency_or_zero(&self) -> f64 {
        self.frequency.unwrap_or(0.0)
    }
}

/// Raw record from the official-guide extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficialRuleInput {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, alias = "priority", skip_serializing_if = "Option::is_none")]
    pub priority_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleInput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl OfficialRuleInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.rule_id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Raw record mined from the historical corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalRuleInput {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "consistency_rate", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleInput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibitions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
}

impl EmpiricalRuleInput {
    pub fn new(description: impl Into<String>, frequency: f64) -> Self {
        Self {
            description: Some(description.into()),
            frequency: Some(frequency),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.rule_id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn without_frequency(mut self) -> Self {
        self.frequency = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_matches_rank() {
        let mut tiers = vec![
            SourceTier::Suggested,
            SourceTier::Official,
            SourceTier::Optional,
            SourceTier::Core,
        ];
        tiers.sort();
        assert_eq!(tiers, SourceTier::ALL.to_vec());
        for (i, tier) in SourceTier::ALL.iter().enumerate() {
            assert_eq!(tier.rank() as usize, i);
        }
    }

    #[test]
    fn test_tier_from_frequency() {
        let thresholds = TierThresholds::default();
        assert_eq!(
            SourceTier::from_frequency(Some(0.8), &thresholds),
            SourceTier::Core
        );
        assert_eq!(
            SourceTier::from_frequency(Some(0.79), &thresholds),
            SourceTier::Optional
        );
        assert_eq!(
            SourceTier::from_frequency(Some(0.5), &thresholds),
            SourceTier::Optional
        );
        assert_eq!(
            SourceTier::from_frequency(Some(0.49), &thresholds),
            SourceTier::Suggested
        );
        assert_eq!(
            SourceTier::from_frequency(None, &thresholds),
            SourceTier::Suggested
        );
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "SENTENCE_STRUCTURE".parse::<Category>(),
            Ok(Category::SentenceStructure)
        );
        assert_eq!("academic-voice".parse::<Category>(), Ok(Category::AcademicVoice));
        assert_eq!(
            "Paragraph organization".parse::<Category>(),
            Ok(Category::ParagraphOrganization)
        );
        assert_eq!("句式结构".parse::<Category>(), Ok(Category::SentenceStructure));
        assert!("grammar".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::ParagraphOrganization).unwrap();
        assert_eq!(json, "\"PARAGRAPH_ORGANIZATION\"");
        let json = serde_json::to_string(&EnforcementLevel::StronglyRecommended).unwrap();
        assert_eq!(json, "\"STRONGLY_RECOMMENDED\"");
    }

    #[test]
    fn test_priority_hint() {
        assert_eq!(PriorityHint::from_hint("MUST"), Some(PriorityHint::Highest));
        assert_eq!(PriorityHint::from_hint("should"), Some(PriorityHint::High));
        assert_eq!(PriorityHint::from_hint("may"), Some(PriorityHint::Medium));
        assert_eq!(PriorityHint::from_hint("whatever"), None);
        assert_eq!(
            PriorityHint::from_description("Titles are never abbreviated"),
            PriorityHint::Highest
        );
        assert_eq!(
            PriorityHint::from_description("Figures appear after first mention"),
            PriorityHint::High
        );
    }

    #[test]
    fn test_example_input_accepts_text_or_triple() {
        let examples: Vec<ExampleInput> = serde_json::from_str(
            r#"["We examine the data.", {"correct": "a", "incorrect": "b", "explanation": "c"}]"#,
        )
        .unwrap();
        let examples: Vec<RuleExample> = examples.into_iter().map(Into::into).collect();
        assert_eq!(examples[0].correct, "We examine the data.");
        assert!(examples[0].incorrect.is_empty());
        assert_eq!(examples[1], RuleExample::new("a", "b", "c"));
    }

    #[test]
    fn test_empirical_input_accepts_consistency_rate() {
        let input: EmpiricalRuleInput = serde_json::from_str(
            r#"{"description": "Use short sentences", "consistency_rate": 0.7}"#,
        )
        .unwrap();
        assert_eq!(input.frequency, Some(0.7));
    }
}
