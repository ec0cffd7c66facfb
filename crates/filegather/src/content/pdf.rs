use std::path::Path;

use lopdf::Document;

use super::push_bounded;
use crate::error::{GatherError, Result};

/// Extracts page text in page order until `budget` characters are collected.
pub(super) fn extract_pdf_text(path: &Path, budget: usize) -> Result<String> {
    let document = Document::load(path).map_err(|error| GatherError::extraction(path, error))?;

    let mut text = String::new();
    let mut chars = 0usize;
    let mut failed_pages = 0usize;
    let pages = document.get_pages();
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => {
                if push_bounded(&mut text, &mut chars, &page_text, budget) {
                    break;
                }
            }
            Err(error) => {
                failed_pages += 1;
                log::debug!(
                    "pdf page extraction failed path={} page={} error={}",
                    path.display(),
                    page_number,
                    error
                );
            }
        }
    }

    if text.is_empty() && failed_pages > 0 {
        return Err(GatherError::extraction(
            path,
            format!("no readable text in {failed_pages} page(s)"),
        ));
    }
    Ok(text)
}
