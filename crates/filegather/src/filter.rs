//! Non-textual candidate filtering.
//!
//! A candidate passes when every configured predicate holds:
//! - size within an inclusive byte range
//! - modified date within an inclusive day range
//! - extension in an allow-list
//! - the entry can actually be opened at evaluation time

mod date;
mod extension;
mod size;

use std::fs::{self, File, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate};

pub use date::DateRange;
pub use extension::{
    dotted_extension, lookup_extension_category, ExtensionFilter, ARCHIVE_EXTENSIONS,
    AUDIO_EXTENSIONS, DOCUMENT_EXTENSIONS, EXECUTABLE_EXTENSIONS, IMAGE_EXTENSIONS,
    VIDEO_EXTENSIONS,
};
pub use size::SizeRange;

use crate::types::{GatherMode, SearchCriteria};

/// A file or folder considered by the traversal engine.
#[derive(Debug, Clone)]
pub struct CandidateEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    /// Zero for folders.
    pub size: u64,
    pub modified: NaiveDate,
}

impl CandidateEntry {
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let is_dir = metadata.is_dir();
        let size = if is_dir { 0 } else { metadata.len() };
        let modified = metadata
            .modified()
            .map(local_date)
            .unwrap_or(NaiveDate::MIN);
        Self {
            path,
            name,
            is_dir,
            size,
            modified,
        }
    }
}

/// Converts a timestamp to its calendar day in the local timezone.
pub fn local_date(time: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

// ---------------------------------------------------------------------------
// Candidate filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    size: SizeRange,
    modified: DateRange,
    extensions: ExtensionFilter,
}

impl CandidateFilter {
    pub fn for_files(size: SizeRange, modified: DateRange, extensions: ExtensionFilter) -> Self {
        Self {
            size,
            modified,
            extensions,
        }
    }

    /// Folders are only checked for readability.
    pub fn for_folders() -> Self {
        Self::default()
    }

    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        match criteria.gather {
            GatherMode::Files => Self::for_files(
                criteria.size,
                criteria.modified,
                criteria.extensions.clone(),
            ),
            GatherMode::Folders => Self::for_folders(),
        }
    }

    pub fn passes(&self, entry: &CandidateEntry) -> bool {
        if !entry.is_dir {
            if !self.size.contains(entry.size) {
                return false;
            }
            if !self.extensions.allows(&entry.path) {
                return false;
            }
        }
        if !self.modified.contains(entry.modified) {
            return false;
        }
        is_readable(&entry.path, entry.is_dir)
    }
}

fn is_readable(path: &Path, is_dir: bool) -> bool {
    if is_dir {
        fs::read_dir(path).is_ok()
    } else {
        File::open(path).is_ok()
    }
}
