//! Parsed keyword query types.

use super::parser::QueryParser;
use super::text_match::{fold_case, wildcard_contains};

/// One member of an OR-group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPattern {
    /// Plain substring.
    Literal(String),
    /// Pattern containing at least one `*`.
    Wildcard(String),
}

impl QueryPattern {
    pub(crate) fn new(term: String) -> Self {
        if term.contains('*') {
            Self::Wildcard(term)
        } else {
            Self::Literal(term)
        }
    }

    /// Matches against lowercased text.
    pub fn matches(&self, folded_text: &str) -> bool {
        match self {
            Self::Literal(value) => folded_text.contains(value.as_str()),
            Self::Wildcard(pattern) => wildcard_contains(pattern, folded_text),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(value) | Self::Wildcard(value) => value,
        }
    }
}

/// A keyword query decomposed into its boolean parts.
///
/// Every stored term is already lowercased. A query is built once per search
/// invocation and never mutated afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordQuery {
    /// Quoted literal substrings, all required.
    pub phrases: Vec<String>,
    /// `+term` tokens, all required.
    pub must_include: Vec<String>,
    /// `-term` tokens, none allowed.
    pub must_exclude: Vec<String>,
    /// Each group needs at least one hit. A bare term is a one-member group.
    pub or_groups: Vec<Vec<QueryPattern>>,
}

impl KeywordQuery {
    pub fn parse(raw: &str) -> Self {
        QueryParser::parse(raw)
    }

    /// Evaluates the query against `text`, ignoring case.
    pub fn evaluate(&self, text: &str) -> bool {
        self.is_empty() || self.evaluate_folded(&fold_case(text))
    }

    /// Returns true when the query places no constraint on the text.
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
            && self.must_include.is_empty()
            && self.must_exclude.is_empty()
            && self.or_groups.is_empty()
    }

    /// Evaluates the query against text that is already lowercased.
    pub fn evaluate_folded(&self, folded_text: &str) -> bool {
        if !self
            .phrases
            .iter()
            .all(|phrase| folded_text.contains(phrase.as_str()))
        {
            return false;
        }

        if !self
            .must_include
            .iter()
            .all(|term| folded_text.contains(term.as_str()))
        {
            return false;
        }

        if self
            .must_exclude
            .iter()
            .any(|term| folded_text.contains(term.as_str()))
        {
            return false;
        }

        self.or_groups
            .iter()
            .all(|group| group.iter().any(|pattern| pattern.matches(folded_text)))
    }
}
