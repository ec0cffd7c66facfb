//! Keyword query parsing and matching.
//!
//! This module provides the small query language used for both filenames and
//! extracted content:
//! - `"exact phrase"` literal substrings
//! - `+required` and `-excluded` terms
//! - `a|b` OR-groups, where a bare term is a one-member group
//! - `*` wildcards inside OR-group members
//!
//! It also provides the stricter exact-stem predicate used by exact searches.

mod exact;
mod expression;
mod matcher;
mod parser;
mod text_match;

pub use exact::exact_stem_matches;
pub use expression::{KeywordQuery, QueryPattern};
pub use matcher::{evaluate, KeywordMatcher, MatchStrategy};
pub use parser::QueryParser;
pub use text_match::{fold_case, wildcard_contains};
