//! Text extraction for content search.
//!
//! Each supported format family yields at most `budget` characters of text:
//! - plain text files, decoded as UTF-8, GBK, or Windows-1252
//! - PDF documents, page by page (feature `pdf`)
//! - Word `.docx` documents, paragraph by paragraph (feature `office`)
//! - spreadsheets, cell by cell in row-major order (feature `office`)
//!
//! When a feature is disabled its family is read as plain text instead.

#[cfg(feature = "office")]
mod docx;
#[cfg(feature = "pdf")]
mod pdf;
#[cfg(feature = "office")]
mod spreadsheet;
mod text;

use std::path::Path;

use crate::config::GatherConfig;
use crate::error::Result;

pub use text::{decode_bytes, truncate_chars};

/// Extensions read as plain text unless overridden by configuration.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "py", "java", "cpp", "h", "html", "css", "js", "csv", "ini", "log", "md", "json",
    "xml", "yaml", "yml", "toml", "rs", "c", "ts", "sh", "sql", "bat",
];

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Format families with a dedicated extraction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFamily {
    Text,
    Pdf,
    Word,
    Spreadsheet,
}

impl ContentFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// Extracts a bounded text snippet from files.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    budget: usize,
    text_extensions: Vec<String>,
}

impl ContentExtractor {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            text_extensions: DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|extension| extension.to_string())
                .collect(),
        }
    }

    pub fn from_config(config: &GatherConfig) -> Self {
        let extractor = Self::new(config.content_budget);
        match &config.text_extensions {
            Some(extensions) => extractor.with_text_extensions(extensions),
            None => extractor,
        }
    }

    /// Replaces the plain-text extension list. Leading dots are optional.
    pub fn with_text_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.text_extensions = extensions
            .into_iter()
            .map(|extension| extension.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|extension| !extension.is_empty())
            .collect();
        self
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Classifies `path` by its lowercase extension.
    pub fn family_for(&self, path: &Path) -> Option<ContentFamily> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        match extension.as_str() {
            "pdf" => Some(ContentFamily::Pdf),
            "docx" => Some(ContentFamily::Word),
            ext if SPREADSHEET_EXTENSIONS.contains(&ext) => Some(ContentFamily::Spreadsheet),
            ext if self.text_extensions.iter().any(|known| known == ext) => {
                Some(ContentFamily::Text)
            }
            _ => None,
        }
    }

    /// Returns up to `budget` characters of text from `path`.
    ///
    /// `Ok(None)` means the format is not content-searchable.
    pub fn extract_snippet(&self, path: &Path) -> Result<Option<String>> {
        let Some(family) = self.family_for(path) else {
            return Ok(None);
        };
        let snippet = match family {
            ContentFamily::Text => text::read_text_prefix(path, self.budget)?,
            ContentFamily::Pdf => self.extract_pdf(path)?,
            ContentFamily::Word => self.extract_word(path)?,
            ContentFamily::Spreadsheet => self.extract_spreadsheet(path)?,
        };
        Ok(Some(snippet))
    }

    #[cfg(feature = "pdf")]
    fn extract_pdf(&self, path: &Path) -> Result<String> {
        pdf::extract_pdf_text(path, self.budget)
    }

    #[cfg(not(feature = "pdf"))]
    fn extract_pdf(&self, path: &Path) -> Result<String> {
        text::read_text_prefix(path, self.budget)
    }

    #[cfg(feature = "office")]
    fn extract_word(&self, path: &Path) -> Result<String> {
        docx::extract_docx_text(path, self.budget)
    }

    #[cfg(not(feature = "office"))]
    fn extract_word(&self, path: &Path) -> Result<String> {
        text::read_text_prefix(path, self.budget)
    }

    #[cfg(feature = "office")]
    fn extract_spreadsheet(&self, path: &Path) -> Result<String> {
        spreadsheet::extract_spreadsheet_text(path, self.budget)
    }

    #[cfg(not(feature = "office"))]
    fn extract_spreadsheet(&self, path: &Path) -> Result<String> {
        text::read_text_prefix(path, self.budget)
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CONTENT_BUDGET)
    }
}

/// Appends `piece` to `out` while tracking the character count against `budget`.
///
/// Returns true once the budget is reached.
#[cfg(any(feature = "pdf", feature = "office"))]
pub(crate) fn push_bounded(out: &mut String, chars: &mut usize, piece: &str, budget: usize) -> bool {
    for ch in piece.chars() {
        if *chars >= budget {
            return true;
        }
        out.push(ch);
        *chars += 1;
    }
    *chars >= budget
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn unknown_extensions_are_not_searchable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.jpg");
        fs::write(&path, "needle").unwrap();

        let extractor = ContentExtractor::default();
        assert_eq!(extractor.extract_snippet(&path).unwrap(), None);
        assert_eq!(extractor.family_for(Path::new("Makefile")), None);
    }

    #[test]
    fn families_follow_lowercase_extension() {
        let extractor = ContentExtractor::default();
        assert_eq!(
            extractor.family_for(Path::new("a.TXT")),
            Some(ContentFamily::Text)
        );
        assert_eq!(
            extractor.family_for(Path::new("a.Pdf")),
            Some(ContentFamily::Pdf)
        );
        assert_eq!(
            extractor.family_for(Path::new("a.docx")),
            Some(ContentFamily::Word)
        );
        assert_eq!(
            extractor.family_for(Path::new("a.ods")),
            Some(ContentFamily::Spreadsheet)
        );
    }

    #[test]
    fn text_files_are_truncated_to_budget() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("long.txt");
        fs::write(&path, "abcdefghij".repeat(100)).unwrap();

        let snippet = ContentExtractor::new(25).extract_snippet(&path).unwrap().unwrap();
        assert_eq!(snippet.chars().count(), 25);
        assert!(snippet.starts_with("abcdefghij"));
    }

    #[test]
    fn configured_text_extensions_replace_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.org");
        fs::write(&path, "* heading").unwrap();

        let config = GatherConfig {
            text_extensions: Some(vec![".ORG".to_string()]),
            ..GatherConfig::default()
        };
        let extractor = ContentExtractor::from_config(&config);
        assert_eq!(
            extractor.extract_snippet(&path).unwrap().as_deref(),
            Some("* heading")
        );
        assert_eq!(extractor.family_for(Path::new("a.txt")), None);
    }

    #[test]
    fn missing_text_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.txt");
        assert!(ContentExtractor::default().extract_snippet(&path).is_err());
    }
}
