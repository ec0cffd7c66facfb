//! Exact filename-stem matching.

use std::path::Path;

use super::text_match::fold_case;

/// Returns true when `filename` minus its last extension equals `keyword`,
/// ignoring case.
///
/// No query operators are interpreted: `+a`, `a|b` and quotes are compared
/// literally. An empty keyword matches every name.
pub fn exact_stem_matches(filename: &str, keyword: &str) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return true;
    }

    let stem = Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_else(|| filename.into());

    fold_case(&stem) == fold_case(keyword)
}
