//! Background search control surface.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::engine::SearchEngine;
use crate::cancel::CancellationToken;
use crate::config::GatherConfig;
use crate::error::{GatherError, Result};
use crate::progress::{ProgressReporter, ProgressSnapshot};
use crate::types::{SearchCriteria, SearchResult, SearchState};

#[derive(Debug)]
struct HandleShared {
    state: AtomicU8,
    outcome: Mutex<Option<Result<SearchResult>>>,
}

/// A search running on its own thread.
#[derive(Debug)]
pub struct SearchHandle {
    token: CancellationToken,
    progress: watch::Receiver<ProgressSnapshot>,
    shared: Arc<HandleShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl SearchHandle {
    /// Validates `criteria` and starts searching in the background.
    pub fn start(criteria: SearchCriteria, config: GatherConfig) -> Result<Self> {
        criteria.validate()?;

        let token = CancellationToken::new();
        let (reporter, progress) = ProgressReporter::new(config.progress_interval());
        let shared = Arc::new(HandleShared {
            state: AtomicU8::new(SearchState::Running as u8),
            outcome: Mutex::new(None),
        });

        let worker_token = token.clone();
        let worker_shared = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name("filegather-search".to_string())
            .spawn(move || {
                let engine = SearchEngine::new(config);
                let outcome = engine.run(&criteria, &worker_token, &reporter);
                let state = match &outcome {
                    Ok(result) => result.state,
                    Err(error) => {
                        log::warn!("search failed error={error}");
                        SearchState::Completed
                    }
                };
                *worker_shared.outcome.lock() = Some(outcome);
                worker_shared.state.store(state as u8, Ordering::Release);
            })
            .map_err(|error| {
                GatherError::Internal(format!("failed to spawn search thread: {error}"))
            })?;

        Ok(Self {
            token,
            progress,
            shared,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Requests cancellation. The search stops at its next check.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// A clone of the token behind [`cancel`](Self::cancel), for signal handlers.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn state(&self) -> SearchState {
        SearchState::load(&self.shared.state)
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    pub fn progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.clone()
    }

    /// Blocks until the search ends and returns its result.
    pub fn wait(self) -> Result<SearchResult> {
        if let Some(thread) = self.thread.lock().take() {
            thread
                .join()
                .map_err(|_| GatherError::Internal("search thread panicked".to_string()))?;
        }
        let outcome = self.shared.outcome.lock().take();
        outcome.unwrap_or_else(|| Err(GatherError::Internal("search produced no result".to_string())))
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn criteria_for(root: &std::path::Path, keyword: &str) -> SearchCriteria {
        SearchCriteria::builder()
            .folder(root)
            .keyword(keyword)
            .build()
            .unwrap()
    }

    #[test]
    fn invalid_criteria_fail_before_starting() {
        let outcome = SearchHandle::start(SearchCriteria::default(), GatherConfig::default());
        assert!(matches!(outcome, Err(GatherError::InvalidCriteria(_))));
    }

    #[test]
    fn completed_search_reports_result_and_progress() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("invoice_2025.txt"), "total").unwrap();
        fs::write(temp.path().join("notes.txt"), "misc").unwrap();

        let handle =
            SearchHandle::start(criteria_for(temp.path(), "invoice"), GatherConfig::default())
                .unwrap();
        let progress = handle.progress();
        let result = handle.wait().unwrap();

        assert_eq!(result.state, SearchState::Completed);
        assert_eq!(result.records.len(), 1);
        assert_eq!(progress.borrow().matched, 1);
        assert_eq!(
            progress.borrow().scanned,
            result.stats.scanned_files + result.stats.scanned_folders
        );
    }

    #[test]
    fn cancellation_token_cancels_the_running_search() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file_a.txt"), "x").unwrap();

        let handle =
            SearchHandle::start(criteria_for(temp.path(), "file"), GatherConfig::default())
                .unwrap();
        let token = handle.cancellation_token();
        assert!(!handle.token.was_cancelled());
        token.cancel();
        assert!(handle.token.was_cancelled());

        let result = handle.wait().unwrap();
        assert!(result.state.is_finished());
    }

    #[test]
    fn cancelled_search_ends_cancelled_or_completed() {
        let temp = TempDir::new().unwrap();
        for index in 0..50 {
            fs::write(temp.path().join(format!("file_{index}.txt")), "x").unwrap();
        }

        let handle =
            SearchHandle::start(criteria_for(temp.path(), "file"), GatherConfig::default())
                .unwrap();
        handle.cancel();
        let result = handle.wait().unwrap();

        assert!(result.state.is_finished());
        if result.state == SearchState::Cancelled {
            assert!(result.records.len() <= 50);
        } else {
            assert_eq!(result.records.len(), 50);
        }
    }
}
