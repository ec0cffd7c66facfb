//! Compiled keyword matchers used by the traversal engine.

use serde::{Deserialize, Serialize};

use super::exact::exact_stem_matches;
use super::expression::KeywordQuery;
use super::parser::QueryParser;
use super::text_match::fold_case;

/// How keywords are compared against candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Boolean query language, substring semantics.
    #[default]
    Fuzzy,
    /// Whole-stem equality on names only.
    Exact,
}

impl MatchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy",
            Self::Exact => "exact",
        }
    }
}

/// A keyword compiled for one search invocation.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: String,
    kind: KeywordMatcherKind,
}

#[derive(Debug, Clone)]
enum KeywordMatcherKind {
    Query(KeywordQuery),
    ExactStem,
}

impl KeywordMatcher {
    /// Compiles `keyword` under `strategy`.
    pub fn compile(keyword: &str, strategy: MatchStrategy) -> Self {
        let kind = match strategy {
            MatchStrategy::Fuzzy => KeywordMatcherKind::Query(QueryParser::parse(keyword)),
            MatchStrategy::Exact => KeywordMatcherKind::ExactStem,
        };
        Self {
            keyword: keyword.to_string(),
            kind,
        }
    }

    /// The raw keyword as configured.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Whether this matcher may look at file content at all.
    pub fn supports_content(&self) -> bool {
        matches!(self.kind, KeywordMatcherKind::Query(_))
    }

    /// Matches a file or folder name.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.kind {
            KeywordMatcherKind::Query(query) => query.evaluate_folded(&fold_case(name)),
            KeywordMatcherKind::ExactStem => exact_stem_matches(name, &self.keyword),
        }
    }

    /// Matches extracted content that the caller already lowercased.
    ///
    /// Exact matchers never match content.
    pub fn matches_folded_content(&self, folded_content: &str) -> bool {
        match &self.kind {
            KeywordMatcherKind::Query(query) => query.evaluate_folded(folded_content),
            KeywordMatcherKind::ExactStem => false,
        }
    }
}

/// Evaluates the raw query `query` against `text`, ignoring case.
///
/// An empty or whitespace-only query matches everything.
pub fn evaluate(text: &str, query: &str) -> bool {
    QueryParser::parse(query).evaluate_folded(&fold_case(text))
}
