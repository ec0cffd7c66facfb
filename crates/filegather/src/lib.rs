//! Keyword-driven file gathering.
//!
//! This crate provides the core of a batch file finder:
//! - A small boolean query language matched against names and content
//! - Bounded text extraction from plain text, PDF, Word, and spreadsheet files
//! - Size, date, extension, and readability filters
//! - A cancellable, progress-reporting traversal over one or more roots

pub mod cancel;
pub mod config;
pub mod content;
pub mod error;
pub mod filter;
pub mod progress;
pub mod query;
pub mod search;
pub mod types;
pub mod walk;

// Re-export main types
pub use cancel::CancellationToken;
pub use config::GatherConfig;
pub use content::{ContentExtractor, ContentFamily};
pub use error::{GatherError, Result};
pub use filter::{CandidateEntry, CandidateFilter, DateRange, ExtensionFilter, SizeRange};
pub use progress::{ProgressReporter, ProgressSnapshot};
pub use query::{evaluate, exact_stem_matches, KeywordMatcher, KeywordQuery, MatchStrategy};
pub use search::{SearchEngine, SearchHandle};
pub use types::{
    split_keywords, FileRecord, GatherMode, KeywordMatches, MatchTargets, SearchCriteria,
    SearchCriteriaBuilder, SearchMode, SearchResult, SearchState, SearchStats,
};
