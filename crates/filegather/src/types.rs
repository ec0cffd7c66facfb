//! Search inputs and outputs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{GatherError, Result};
use crate::filter::{CandidateEntry, DateRange, ExtensionFilter, SizeRange};
use crate::query::MatchStrategy;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

bitflags! {
    /// Which parts of a candidate a keyword is matched against.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MatchTargets: u8 {
        const NAME = 1 << 0;
        const CONTENT = 1 << 1;
    }
}

/// Where fuzzy keywords look.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Filename,
    Content,
    Both,
}

impl SearchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Content => "content",
            Self::Both => "both",
        }
    }

    pub fn targets(self) -> MatchTargets {
        match self {
            Self::Filename => MatchTargets::NAME,
            Self::Content => MatchTargets::CONTENT,
            Self::Both => MatchTargets::NAME | MatchTargets::CONTENT,
        }
    }
}

impl FromStr for SearchMode {
    type Err = GatherError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "filename" | "name" => Ok(Self::Filename),
            "content" => Ok(Self::Content),
            "both" | "all" => Ok(Self::Both),
            other => Err(GatherError::Parse(format!("unknown search mode: {other}"))),
        }
    }
}

/// What the traversal enumerates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatherMode {
    #[default]
    Files,
    /// Immediate subdirectories of each root.
    Folders,
}

impl GatherMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Folders => "folders",
        }
    }
}

impl FromStr for GatherMode {
    type Err = GatherError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "files" | "file" => Ok(Self::Files),
            "folders" | "folder" | "dirs" | "directories" => Ok(Self::Folders),
            other => Err(GatherError::Parse(format!("unknown gather mode: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Everything needed to run one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub folders: Vec<PathBuf>,
    pub keywords: Vec<String>,
    pub mode: SearchMode,
    pub strategy: MatchStrategy,
    pub gather: GatherMode,
    pub extensions: ExtensionFilter,
    pub size: SizeRange,
    pub modified: DateRange,
    pub recursive: bool,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            keywords: Vec::new(),
            mode: SearchMode::default(),
            strategy: MatchStrategy::default(),
            gather: GatherMode::default(),
            extensions: ExtensionFilter::all(),
            size: SizeRange::any(),
            modified: DateRange::any(),
            recursive: true,
        }
    }
}

impl SearchCriteria {
    pub fn builder() -> SearchCriteriaBuilder {
        SearchCriteriaBuilder::default()
    }

    /// Rejects criteria that cannot produce a meaningful search.
    pub fn validate(&self) -> Result<()> {
        if self.folders.is_empty() {
            return Err(GatherError::InvalidCriteria(
                "at least one folder is required".to_string(),
            ));
        }
        if self.keywords.iter().all(|keyword| keyword.trim().is_empty()) {
            return Err(GatherError::InvalidCriteria(
                "at least one keyword is required".to_string(),
            ));
        }
        if self.size.min > self.size.max {
            return Err(GatherError::InvalidCriteria(format!(
                "minimum size {} exceeds maximum size {}",
                self.size.min, self.size.max
            )));
        }
        if let (Some(start), Some(end)) = (self.modified.start, self.modified.end) {
            if start > end {
                return Err(GatherError::InvalidCriteria(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(())
    }

    /// Targets actually used for matching. Exact and folder searches only look at names.
    pub fn effective_targets(&self) -> MatchTargets {
        if self.strategy == MatchStrategy::Exact || self.gather == GatherMode::Folders {
            MatchTargets::NAME
        } else {
            self.mode.targets()
        }
    }
}

/// Splits free text into keywords on whitespace, keeping quoted phrases intact.
///
/// Quote characters stay in the keyword so the query parser still sees a phrase.
/// Duplicates are dropped, first occurrence wins.
pub fn split_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
        } else if ch.is_whitespace() && !in_quotes {
            flush(&mut current, &mut keywords);
        } else {
            current.push(ch);
        }
    }
    flush(&mut current, &mut keywords);
    keywords
}

fn flush(current: &mut String, keywords: &mut Vec<String>) {
    if !current.is_empty() {
        let keyword = std::mem::take(current);
        if !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchCriteriaBuilder {
    criteria: SearchCriteria,
}

impl SearchCriteriaBuilder {
    /// Adds a root folder. Repeated folders are ignored.
    pub fn folder(mut self, folder: impl Into<PathBuf>) -> Self {
        let folder = folder.into();
        if !self.criteria.folders.contains(&folder) {
            self.criteria.folders.push(folder);
        }
        self
    }

    pub fn folders<I, P>(self, folders: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        folders
            .into_iter()
            .fold(self, |builder, folder| builder.folder(folder))
    }

    /// Adds a keyword. Blank and repeated keywords are ignored.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !keyword.trim().is_empty() && !self.criteria.keywords.contains(&keyword) {
            self.criteria.keywords.push(keyword);
        }
        self
    }

    pub fn keywords<I, S>(self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        keywords
            .into_iter()
            .fold(self, |builder, keyword| builder.keyword(keyword))
    }

    /// Adds every keyword found in `text` by [`split_keywords`].
    pub fn keyword_text(self, text: &str) -> Self {
        self.keywords(split_keywords(text))
    }

    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.criteria.mode = mode;
        self
    }

    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.criteria.strategy = strategy;
        self
    }

    pub fn gather(mut self, gather: GatherMode) -> Self {
        self.criteria.gather = gather;
        self
    }

    pub fn extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.criteria.extensions = extensions;
        self
    }

    pub fn size(mut self, size: SizeRange) -> Self {
        self.criteria.size = size;
        self
    }

    pub fn modified(mut self, modified: DateRange) -> Self {
        self.criteria.modified = modified;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.criteria.recursive = recursive;
        self
    }

    pub fn build(self) -> Result<SearchCriteria> {
        self.criteria.validate()?;
        Ok(self.criteria)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A matched file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path; the record's identity.
    pub path: String,
    pub name: String,
    pub size: u64,
    pub modified: NaiveDate,
}

impl FileRecord {
    pub fn from_candidate(entry: &CandidateEntry) -> Self {
        Self {
            path: entry.path.to_string_lossy().into_owned(),
            name: entry.name.clone(),
            size: entry.size,
            modified: entry.modified,
        }
    }
}

/// Records matched by one keyword, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatches {
    pub keyword: String,
    pub records: Vec<FileRecord>,
}

/// Lifecycle of a search. Idle → Running → Completed | Cancelled.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchState {
    #[default]
    Idle = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
}

impl SearchState {
    /// Loads the state from an atomic.
    pub fn load(atomic: &AtomicU8) -> Self {
        match atomic.load(Ordering::Acquire) {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Idle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Counters for everything the walk saw, including recovered errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub scanned_files: usize,
    pub scanned_folders: usize,
    /// Candidates rejected by the size, date, extension, or readability filter.
    pub skipped_files: usize,
    pub folder_errors: usize,
    pub file_errors: usize,
    pub content_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Every matched record, unique by path.
    pub records: BTreeMap<String, FileRecord>,
    /// One entry per configured keyword, in keyword order.
    pub keyword_matches: Vec<KeywordMatches>,
    pub unfound_keywords: Vec<String>,
    pub multi_result_keywords: Vec<(String, usize)>,
    pub state: SearchState,
    pub stats: SearchStats,
}

impl SearchResult {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            records: BTreeMap::new(),
            keyword_matches: keywords
                .iter()
                .map(|keyword| KeywordMatches {
                    keyword: keyword.clone(),
                    records: Vec::new(),
                })
                .collect(),
            unfound_keywords: Vec::new(),
            multi_result_keywords: Vec::new(),
            state: SearchState::Running,
            stats: SearchStats::default(),
        }
    }

    /// Records a match for the keyword at `keyword_index`.
    ///
    /// The caller guarantees the path is not already in that keyword's list.
    pub(crate) fn push_match(&mut self, keyword_index: usize, record: FileRecord) {
        self.records
            .entry(record.path.clone())
            .or_insert_with(|| record.clone());
        if let Some(matches) = self.keyword_matches.get_mut(keyword_index) {
            matches.records.push(record);
        }
    }

    /// Computes the derived keyword lists and settles the terminal state.
    pub(crate) fn finalize(&mut self, state: SearchState) {
        self.unfound_keywords = self
            .keyword_matches
            .iter()
            .filter(|matches| matches.records.is_empty())
            .map(|matches| matches.keyword.clone())
            .collect();
        self.multi_result_keywords = self
            .keyword_matches
            .iter()
            .filter(|matches| matches.records.len() > 1)
            .map(|matches| (matches.keyword.clone(), matches.records.len()))
            .collect();
        self.state = state;
    }

    pub fn matches_for(&self, keyword: &str) -> Option<&[FileRecord]> {
        self.keyword_matches
            .iter()
            .find(|matches| matches.keyword == keyword)
            .map(|matches| matches.records.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            size: 1,
            modified: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    #[test]
    fn split_keywords_keeps_phrases_and_drops_duplicates() {
        let keywords = split_keywords("report  \"q3 results\"\nbudget report -draft");
        assert_eq!(
            keywords,
            vec![
                "report".to_string(),
                "\"q3 results\"".to_string(),
                "budget".to_string(),
                "-draft".to_string(),
            ]
        );
        assert!(split_keywords(" \n\t ").is_empty());
    }

    #[test]
    fn builder_dedups_and_validates() {
        let criteria = SearchCriteria::builder()
            .folder("/data")
            .folder("/data")
            .keywords(["alpha", "alpha", "  ", "beta"])
            .build()
            .unwrap();
        assert_eq!(criteria.folders, vec![PathBuf::from("/data")]);
        assert_eq!(criteria.keywords, vec!["alpha".to_string(), "beta".to_string()]);
        assert!(criteria.recursive);
    }

    #[test]
    fn invalid_criteria_are_rejected() {
        assert!(matches!(
            SearchCriteria::builder().keyword("a").build(),
            Err(GatherError::InvalidCriteria(_))
        ));
        assert!(matches!(
            SearchCriteria::builder().folder("/data").build(),
            Err(GatherError::InvalidCriteria(_))
        ));
        assert!(matches!(
            SearchCriteria::builder()
                .folder("/data")
                .keyword("a")
                .size(SizeRange::new(10, 1))
                .build(),
            Err(GatherError::InvalidCriteria(_))
        ));
        let later = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(matches!(
            SearchCriteria::builder()
                .folder("/data")
                .keyword("a")
                .modified(DateRange::new(Some(later), Some(earlier)))
                .build(),
            Err(GatherError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn exact_and_folder_searches_only_match_names() {
        let mut criteria = SearchCriteria {
            mode: SearchMode::Both,
            ..SearchCriteria::default()
        };
        assert_eq!(
            criteria.effective_targets(),
            MatchTargets::NAME | MatchTargets::CONTENT
        );
        criteria.strategy = MatchStrategy::Exact;
        assert_eq!(criteria.effective_targets(), MatchTargets::NAME);
        criteria.strategy = MatchStrategy::Fuzzy;
        criteria.gather = GatherMode::Folders;
        assert_eq!(criteria.effective_targets(), MatchTargets::NAME);
    }

    #[test]
    fn finalize_derives_keyword_lists() {
        let keywords = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut result = SearchResult::new(&keywords);
        result.push_match(0, record("/x/one"));
        result.push_match(2, record("/x/one"));
        result.push_match(2, record("/x/two"));
        result.finalize(SearchState::Completed);

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.unfound_keywords, vec!["b".to_string()]);
        assert_eq!(result.multi_result_keywords, vec![("c".to_string(), 2)]);
        assert_eq!(result.matches_for("a").map(<[FileRecord]>::len), Some(1));
        assert_eq!(result.state, SearchState::Completed);
    }

    #[test]
    fn modes_parse_from_cli_strings() {
        assert_eq!("Both".parse::<SearchMode>().unwrap(), SearchMode::Both);
        assert_eq!("folders".parse::<GatherMode>().unwrap(), GatherMode::Folders);
        assert!("everything".parse::<SearchMode>().is_err());
    }
}
