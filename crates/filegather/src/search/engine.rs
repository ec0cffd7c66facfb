//! Single-threaded search over the configured roots.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use fnv::FnvHashSet;

use crate::cancel::CancellationToken;
use crate::config::GatherConfig;
use crate::content::ContentExtractor;
use crate::error::{canonicalize_existing_path, Result};
use crate::filter::{CandidateEntry, CandidateFilter};
use crate::progress::ProgressReporter;
use crate::query::{fold_case, KeywordMatcher};
use crate::types::{
    FileRecord, GatherMode, MatchTargets, SearchCriteria, SearchResult, SearchState, SearchStats,
};
use crate::walk::{walk_root, WalkItem, WalkOptions};

/// Runs searches with a fixed configuration.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    config: GatherConfig,
    extractor: ContentExtractor,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(GatherConfig::default())
    }
}

impl SearchEngine {
    pub fn new(config: GatherConfig) -> Self {
        let extractor = ContentExtractor::from_config(&config);
        Self { config, extractor }
    }

    pub fn config(&self) -> &GatherConfig {
        &self.config
    }

    /// Runs one search to completion or cancellation.
    ///
    /// Only invalid criteria produce an error; everything the walk trips
    /// over is counted in the result's stats instead.
    pub fn run(
        &self,
        criteria: &SearchCriteria,
        token: &CancellationToken,
        progress: &ProgressReporter,
    ) -> Result<SearchResult> {
        self.run_observed(criteria, token, progress, &mut |_| {})
    }

    /// Same as [`run`](Self::run), calling `observe` with the running stats
    /// after every candidate has been evaluated.
    pub(crate) fn run_observed(
        &self,
        criteria: &SearchCriteria,
        token: &CancellationToken,
        progress: &ProgressReporter,
        observe: &mut dyn FnMut(&SearchStats),
    ) -> Result<SearchResult> {
        criteria.validate()?;

        let started = Instant::now();
        log::info!(
            "search started roots={} keywords={} mode={} strategy={} gather={} recursive={} size_filter={} modified_filter={}",
            criteria.folders.len(),
            criteria.keywords.len(),
            criteria.mode.as_str(),
            criteria.strategy.as_str(),
            criteria.gather.as_str(),
            criteria.recursive,
            !criteria.size.is_unbounded(),
            !criteria.modified.is_unbounded()
        );

        let mut run = SearchRun::new(criteria, &self.extractor, progress, observe);
        let state = match run.walk_roots(token) {
            Some(()) => SearchState::Completed,
            None => SearchState::Cancelled,
        };

        let mut result = run.result;
        result.finalize(state);
        progress.finish(
            result.stats.scanned_files + result.stats.scanned_folders,
            result.records.len(),
        );

        log::info!(
            "search finished state={} records={} unfound={} scanned_files={} scanned_folders={} skipped={} errors={} elapsed_ms={}",
            result.state.as_str(),
            result.records.len(),
            result.unfound_keywords.len(),
            result.stats.scanned_files,
            result.stats.scanned_folders,
            result.stats.skipped_files,
            result.stats.folder_errors + result.stats.file_errors + result.stats.content_errors,
            started.elapsed().as_millis()
        );
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Per-invocation state
// ---------------------------------------------------------------------------

enum ContentState {
    NotLoaded,
    Loaded(String),
    Unavailable,
}

struct SearchRun<'a> {
    criteria: &'a SearchCriteria,
    extractor: &'a ContentExtractor,
    progress: &'a ProgressReporter,
    observe: &'a mut dyn FnMut(&SearchStats),
    matchers: Vec<KeywordMatcher>,
    filter: CandidateFilter,
    targets: MatchTargets,
    result: SearchResult,
    /// Paths already recorded per keyword.
    seen: Vec<FnvHashSet<String>>,
}

impl<'a> SearchRun<'a> {
    fn new(
        criteria: &'a SearchCriteria,
        extractor: &'a ContentExtractor,
        progress: &'a ProgressReporter,
        observe: &'a mut dyn FnMut(&SearchStats),
    ) -> Self {
        let matchers: Vec<KeywordMatcher> = criteria
            .keywords
            .iter()
            .map(|keyword| KeywordMatcher::compile(keyword, criteria.strategy))
            .collect();
        Self {
            criteria,
            extractor,
            progress,
            observe,
            seen: vec![FnvHashSet::default(); matchers.len()],
            matchers,
            filter: CandidateFilter::from_criteria(criteria),
            targets: criteria.effective_targets(),
            result: SearchResult::new(&criteria.keywords),
        }
    }

    /// Canonical roots in request order, without duplicates.
    ///
    /// When the walk descends, a root inside another requested root is
    /// dropped as well, since the outer walk already covers it. Flat walks
    /// of distinct roots never overlap.
    fn plan_roots(&self, options: WalkOptions) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::with_capacity(self.criteria.folders.len());
        for folder in &self.criteria.folders {
            if !folder.is_dir() {
                log::info!("search root skipped root={} reason=missing", folder.display());
                continue;
            }
            let root = canonicalize_existing_path(folder.clone());
            if roots.contains(&root) {
                log::debug!("search root skipped root={} reason=duplicate", root.display());
                continue;
            }
            roots.push(root);
        }

        if !options.descends() {
            return roots;
        }
        let nested: Vec<bool> = roots
            .iter()
            .map(|root| roots.iter().any(|outer| outer != root && root.starts_with(outer)))
            .collect();
        roots
            .into_iter()
            .zip(nested)
            .filter_map(|(root, nested)| {
                if nested {
                    log::debug!("search root skipped root={} reason=nested", root.display());
                    None
                } else {
                    Some(root)
                }
            })
            .collect()
    }

    /// Returns `None` if cancelled.
    fn walk_roots(&mut self, token: &CancellationToken) -> Option<()> {
        let options = WalkOptions {
            gather: self.criteria.gather,
            recursive: self.criteria.recursive,
        };

        for root in self.plan_roots(options) {
            token.is_cancelled()?;

            self.result.stats.scanned_folders += 1;
            log::debug!("search root started root={}", root.display());
            walk_root(&root, options, token, |item| self.visit(&root, item))?;
        }

        Some(())
    }

    fn visit(&mut self, root: &Path, item: WalkItem) {
        match item {
            WalkItem::Directory(path) => {
                self.result.stats.scanned_folders += 1;
                self.report(&path);
            }
            WalkItem::Candidate(path) => self.visit_candidate(path),
            WalkItem::Error(error) => {
                self.result.stats.folder_errors += 1;
                log::warn!("search walk error root={} error={}", root.display(), error);
            }
        }
    }

    fn visit_candidate(&mut self, path: PathBuf) {
        self.evaluate_candidate(path);
        (self.observe)(&self.result.stats);
    }

    fn evaluate_candidate(&mut self, path: PathBuf) {
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(error) => {
                self.result.stats.file_errors += 1;
                log::debug!("search stat failed path={} error={}", path.display(), error);
                return;
            }
        };
        let wanted = match self.criteria.gather {
            GatherMode::Files => metadata.is_file(),
            GatherMode::Folders => metadata.is_dir(),
        };
        if !wanted {
            return;
        }
        match self.criteria.gather {
            GatherMode::Files => self.result.stats.scanned_files += 1,
            GatherMode::Folders => self.result.stats.scanned_folders += 1,
        }

        let entry = CandidateEntry::from_metadata(path, &metadata);
        self.report(&entry.path);
        if !self.filter.passes(&entry) {
            self.result.stats.skipped_files += 1;
            return;
        }
        self.match_entry(&entry);
    }

    fn match_entry(&mut self, entry: &CandidateEntry) {
        let record = FileRecord::from_candidate(entry);
        let mut content = ContentState::NotLoaded;

        for index in 0..self.matchers.len() {
            let matcher = &self.matchers[index];
            let name_hit =
                self.targets.contains(MatchTargets::NAME) && matcher.matches_name(&entry.name);
            let hit = name_hit
                || (self.targets.contains(MatchTargets::CONTENT)
                    && matcher.supports_content()
                    && self.content_matches(entry, &mut content, index));
            if hit && self.seen[index].insert(record.path.clone()) {
                self.result.push_match(index, record.clone());
            }
        }
    }

    /// Loads the snippet on first use and matches keyword `index` against it.
    fn content_matches(
        &mut self,
        entry: &CandidateEntry,
        content: &mut ContentState,
        index: usize,
    ) -> bool {
        if let ContentState::NotLoaded = content {
            *content = match self.extractor.extract_snippet(&entry.path) {
                Ok(Some(snippet)) => ContentState::Loaded(fold_case(&snippet)),
                Ok(None) => ContentState::Unavailable,
                Err(error) => {
                    self.result.stats.content_errors += 1;
                    log::debug!(
                        "content extraction failed path={} family={} error={}",
                        entry.path.display(),
                        self.extractor
                            .family_for(&entry.path)
                            .map_or("unknown", |family| family.as_str()),
                        error
                    );
                    ContentState::Unavailable
                }
            };
        }
        match content {
            ContentState::Loaded(folded) => self.matchers[index].matches_folded_content(folded),
            ContentState::NotLoaded | ContentState::Unavailable => false,
        }
    }

    fn report(&self, path: &Path) {
        let stats = &self.result.stats;
        self.progress.report(
            path,
            stats.scanned_files + stats.scanned_folders,
            self.result.records.len(),
        );
    }
}
