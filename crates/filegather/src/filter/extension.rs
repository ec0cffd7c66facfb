//! Extension allow-lists and named extension categories.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GatherError, Result};

// ---------------------------------------------------------------------------
// Extension category constants
// ---------------------------------------------------------------------------

pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".doc", ".docx", ".txt", ".pdf", ".xls", ".xlsx", ".ppt", ".pptx",
];

pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp",
];

pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".mkv", ".flv", ".wmv", ".mpg"];

pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma"];

pub const EXECUTABLE_EXTENSIONS: &[&str] = &[".exe", ".msi", ".bat", ".cmd"];

pub const ARCHIVE_EXTENSIONS: &[&str] = &[".zip", ".rar", ".7z", ".tar", ".gz"];

/// Looks up a named category.
pub fn lookup_extension_category(name: &str) -> Option<&'static [&'static str]> {
    match name.trim().to_ascii_lowercase().as_str() {
        "doc" | "docs" | "document" | "documents" => Some(DOCUMENT_EXTENSIONS),
        "image" | "images" | "picture" | "pictures" | "photo" | "photos" => {
            Some(IMAGE_EXTENSIONS)
        }
        "video" | "videos" | "movie" | "movies" => Some(VIDEO_EXTENSIONS),
        "audio" | "music" | "song" | "songs" => Some(AUDIO_EXTENSIONS),
        "exe" | "executable" | "executables" | "program" | "programs" => {
            Some(EXECUTABLE_EXTENSIONS)
        }
        "archive" | "archives" | "compressed" | "zip" => Some(ARCHIVE_EXTENSIONS),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Extension filter
// ---------------------------------------------------------------------------

/// A set of allowed extensions, each lowercase with a leading dot.
///
/// An empty filter allows every file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Allows every extension.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a filter from extensions with or without a leading dot.
    pub fn from_list<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for extension in extensions {
            let Some(value) = normalize_extension(extension.as_ref()) else {
                continue;
            };
            if !normalized.contains(&value) {
                normalized.push(value);
            }
        }
        Self {
            extensions: normalized,
        }
    }

    /// Builds a filter from a named category such as `documents` or `images`.
    pub fn category(name: &str) -> Result<Self> {
        lookup_extension_category(name)
            .map(|extensions| Self::from_list(extensions.iter()))
            .ok_or_else(|| GatherError::Parse(format!("unknown file type category: {name}")))
    }

    /// Parses a user-supplied list separated by `;` or `,`, e.g. `.py;.java;cpp`.
    pub fn parse_custom(raw: &str) -> Result<Self> {
        let filter = Self::from_list(raw.split([';', ',']));
        if filter.is_empty() {
            return Err(GatherError::Parse(
                "custom file types require at least one extension".to_string(),
            ));
        }
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true when `path`'s extension is allowed.
    ///
    /// A file with no extension only passes an empty filter.
    pub fn allows(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let Some(extension) = dotted_extension(path) else {
            return false;
        };
        self.extensions.iter().any(|allowed| *allowed == extension)
    }
}

/// Returns the lowercase extension of `path` with its leading dot.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|extension| format!(".{}", extension.to_string_lossy().to_lowercase()))
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed.to_lowercase()))
    }
}
