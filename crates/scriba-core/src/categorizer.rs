//! Keyword categorizer
//!
//! Assigns a [`Category`] to a rule from its description alone. The table is
//! checked top to bottom and the first category whose keyword set shares a
//! token with the description wins, so a rule mentioning both "sentence" and
//! "citation" lands in SENTENCE_STRUCTURE.

use crate::model::Category;

/// Ordered (category, keywords) table. FORMAT has no keywords and is only
/// reachable through an explicit category on the input record.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::SentenceStructure,
        &[
            "sentence",
            "sentences",
            "length",
            "structure",
            "compound",
            "clause",
            "clauses",
        ],
    ),
    (
        Category::Vocabulary,
        &[
            "word",
            "words",
            "vocabulary",
            "term",
            "terms",
            "terminology",
            "academic",
        ],
    ),
    (
        Category::ParagraphOrganization,
        &["paragraph", "paragraphs", "topic", "organization"],
    ),
    (
        Category::Transitions,
        &[
            "transition",
            "transitions",
            "coherence",
            "connect",
            "connective",
            "connectives",
            "flow",
        ],
    ),
    (
        Category::AcademicVoice,
        &["passive", "voice", "person", "first", "tone"],
    ),
    (
        Category::Citation,
        &[
            "citation",
            "citations",
            "cite",
            "reference",
            "references",
            "argument",
        ],
    ),
];

/// Lower-case word tokens of a description.
///
/// Splits on anything that is not alphanumeric or an apostrophe, then trims
/// quote characters so `'examine'` and `examine` are the same token.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pure keyword categorizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Categorizer;

impl Categorizer {
    pub fn new() -> Self {
        Self
    }

    /// Category for a description; OTHER when nothing matches
    pub fn categorize(&self, description: &str) -> Category {
        let tokens = tokenize(description);
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| tokens.iter().any(|t| keywords.contains(&t.as_str())))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }

    /// Explicit category when it names a known one, keyword match otherwise
    pub fn categorize_with_hint(&self, description: &str, hint: Option<&str>) -> Category {
        match hint.map(str::parse::<Category>) {
            Some(Ok(category)) => category,
            Some(Err(e)) => {
                tracing::debug!("Ignoring category hint: {}", e);
                self.categorize(description)
            }
            None => self.categorize(description),
        }
    }
}
