//! Sequential enumeration of search candidates below one root.
//!
//! Walking uses `ignore::WalkBuilder` with every ignore-file filter turned
//! off, so hidden and git-ignored entries are visited like any other.
//! Symlinks are reported but never descended into.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::cancel::CancellationToken;
use crate::types::GatherMode;

/// What a walk reports back to its caller.
#[derive(Debug)]
pub enum WalkItem {
    /// A directory below the root that the walk is about to enter.
    Directory(PathBuf),
    /// An entry that may become a candidate. The caller stats it.
    Candidate(PathBuf),
    /// A listing or entry error. The walk continues.
    Error(String),
}

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub gather: GatherMode,
    pub recursive: bool,
}

impl WalkOptions {
    /// Folder gathering never looks past the root's direct children.
    pub(crate) fn descends(self) -> bool {
        self.recursive && self.gather == GatherMode::Files
    }
}

/// Walks `root` depth-first in file-name order, feeding `visit`.
///
/// Returns `None` if cancelled.
pub fn walk_root(
    root: &Path,
    options: WalkOptions,
    token: &CancellationToken,
    mut visit: impl FnMut(WalkItem),
) -> Option<()> {
    token.is_cancelled()?;

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));
    if !options.descends() {
        builder.max_depth(Some(1));
    }

    for result in builder.build() {
        token.is_cancelled()?;

        let entry = match result {
            Ok(entry) => entry,
            Err(error) => {
                visit(WalkItem::Error(error.to_string()));
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let is_dir = entry.file_type().is_some_and(|file_type| file_type.is_dir());
        match options.gather {
            GatherMode::Files if is_dir => {
                if options.descends() {
                    visit(WalkItem::Directory(entry.into_path()));
                }
            }
            GatherMode::Files | GatherMode::Folders => {
                visit(WalkItem::Candidate(entry.into_path()));
            }
        }
    }

    Some(())
}
