//! Keyword query parser and tokenizer.
//!
//! Grammar, applied in order:
//! 1. `"..."` spans become exact phrases and are cut out of the input.
//! 2. The remainder is split on whitespace.
//! 3. `+term` is required, `-term` is excluded. Prefixes win over `|`, so
//!    `+a|b` requires the literal text `a|b`.
//! 4. Any other token is an OR-group; `a|b|c` expands into three members.

use super::expression::{KeywordQuery, QueryPattern};
use super::text_match::fold_case;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryTokenKind {
    Include(String),
    Exclude(String),
    AnyOf(Vec<String>),
}

// ---------------------------------------------------------------------------
// Query parser
// ---------------------------------------------------------------------------

pub struct QueryParser;

impl QueryParser {
    /// Parses one keyword's raw text. Never fails: every input has a reading.
    pub fn parse(input: &str) -> KeywordQuery {
        let folded = fold_case(input);
        let (phrases, remainder) = extract_phrases(&folded);

        let mut query = KeywordQuery {
            phrases,
            ..KeywordQuery::default()
        };

        for token in tokenize_remainder(&remainder) {
            match token {
                QueryTokenKind::Include(term) => query.must_include.push(term),
                QueryTokenKind::Exclude(term) => query.must_exclude.push(term),
                QueryTokenKind::AnyOf(terms) => query
                    .or_groups
                    .push(terms.into_iter().map(QueryPattern::new).collect()),
            }
        }

        query
    }
}

// ---------------------------------------------------------------------------
// Phrase extraction
// ---------------------------------------------------------------------------

/// Pulls every closed `"..."` span out of `input`.
///
/// Each removed span is replaced by a single space so the text on either side
/// stays in separate tokens. An unmatched quote is left in place as a literal.
fn extract_phrases(input: &str) -> (Vec<String>, String) {
    let mut phrases = Vec::new();
    let mut remainder = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('"') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('"') else {
            break;
        };
        remainder.push_str(&rest[..open]);
        remainder.push(' ');
        phrases.push(after_open[..close].to_string());
        rest = &after_open[close + 1..];
    }
    remainder.push_str(rest);

    (phrases, remainder)
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

fn tokenize_remainder(remainder: &str) -> Vec<QueryTokenKind> {
    remainder
        .split_whitespace()
        .filter_map(classify_token)
        .collect()
}

fn classify_token(raw: &str) -> Option<QueryTokenKind> {
    if let Some(term) = raw.strip_prefix('+') {
        return (!term.is_empty()).then(|| QueryTokenKind::Include(term.to_string()));
    }
    if let Some(term) = raw.strip_prefix('-') {
        return (!term.is_empty()).then(|| QueryTokenKind::Exclude(term.to_string()));
    }

    let terms = raw
        .split('|')
        .filter(|term| !term.is_empty())
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    if terms.is_empty() {
        None
    } else {
        Some(QueryTokenKind::AnyOf(terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(value: &str) -> QueryPattern {
        QueryPattern::Literal(value.to_string())
    }

    #[test]
    fn empty_input_yields_empty_query() {
        assert!(QueryParser::parse("").is_empty());
        assert!(QueryParser::parse("  \n\t ").is_empty());
    }

    #[test]
    fn classifies_prefixes_and_groups() {
        let query = QueryParser::parse("+Project -Draft report|Summary");
        assert_eq!(query.must_include, vec!["project"]);
        assert_eq!(query.must_exclude, vec!["draft"]);
        assert_eq!(
            query.or_groups,
            vec![vec![literal("report"), literal("summary")]]
        );
    }

    #[test]
    fn bare_terms_form_separate_groups() {
        let query = QueryParser::parse("alpha beta");
        assert_eq!(
            query.or_groups,
            vec![vec![literal("alpha")], vec![literal("beta")]]
        );
    }

    #[test]
    fn prefix_takes_priority_over_pipe() {
        let query = QueryParser::parse("+a|b -c|d");
        assert_eq!(query.must_include, vec!["a|b"]);
        assert_eq!(query.must_exclude, vec!["c|d"]);
        assert!(query.or_groups.is_empty());
    }

    #[test]
    fn phrases_are_removed_before_tokenizing() {
        let query = QueryParser::parse("\"Q3 +results | x\" memo");
        assert_eq!(query.phrases, vec!["q3 +results | x"]);
        assert!(query.must_include.is_empty());
        assert_eq!(query.or_groups, vec![vec![literal("memo")]]);
    }

    #[test]
    fn phrase_splits_adjacent_text() {
        let query = QueryParser::parse("left\"mid\"right");
        assert_eq!(query.phrases, vec!["mid"]);
        assert_eq!(
            query.or_groups,
            vec![vec![literal("left")], vec![literal("right")]]
        );
    }

    #[test]
    fn unmatched_quote_is_literal() {
        let query = QueryParser::parse("say\"hi");
        assert!(query.phrases.is_empty());
        assert_eq!(query.or_groups, vec![vec![literal("say\"hi")]]);
    }

    #[test]
    fn wildcard_members_are_detected() {
        let query = QueryParser::parse("rep*t|memo");
        assert_eq!(
            query.or_groups,
            vec![vec![
                QueryPattern::Wildcard("rep*t".to_string()),
                literal("memo")
            ]]
        );
    }

    #[test]
    fn bare_operators_and_empty_pieces_are_dropped() {
        let query = QueryParser::parse("+ - || a||b");
        assert!(query.must_include.is_empty());
        assert!(query.must_exclude.is_empty());
        assert_eq!(query.or_groups, vec![vec![literal("a"), literal("b")]]);
    }
}
