//! Text and wildcard matching utilities.
//!
//! Matching is containment over already-lowercased text. No tokenization of
//! the haystack happens, so scripts without word separators (CJK) match the
//! same way Latin text does.

/// Lowercases text for case-insensitive comparison (full Unicode folding).
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Matches a `*` wildcard pattern anywhere inside `candidate`.
///
/// `*` stands for zero or more arbitrary characters. The pattern is not
/// anchored, so `re*rt` matches `annual_report_2025`. Every other character,
/// including `?`, is literal.
pub fn wildcard_contains(pattern: &str, candidate: &str) -> bool {
    let mut anchored = String::with_capacity(pattern.len() + 2);
    anchored.push('*');
    anchored.push_str(pattern);
    anchored.push('*');
    wildcard_matches(&anchored, candidate)
}

/// Matches a `*` wildcard pattern against the whole of `candidate`.
pub fn wildcard_matches(pattern: &str, candidate: &str) -> bool {
    let pattern_chars = pattern.chars().collect::<Vec<_>>();
    let candidate_chars = candidate.chars().collect::<Vec<_>>();

    let mut pattern_index = 0usize;
    let mut candidate_index = 0usize;
    let mut star_index: Option<usize> = None;
    let mut star_candidate_index = 0usize;

    while candidate_index < candidate_chars.len() {
        if pattern_index < pattern_chars.len()
            && pattern_chars[pattern_index] != '*'
            && pattern_chars[pattern_index] == candidate_chars[candidate_index]
        {
            pattern_index += 1;
            candidate_index += 1;
            continue;
        }

        if pattern_index < pattern_chars.len() && pattern_chars[pattern_index] == '*' {
            star_index = Some(pattern_index);
            pattern_index += 1;
            star_candidate_index = candidate_index;
            continue;
        }

        if let Some(last_star_index) = star_index {
            pattern_index = last_star_index + 1;
            star_candidate_index += 1;
            candidate_index = star_candidate_index;
            continue;
        }

        return false;
    }

    while pattern_index < pattern_chars.len() && pattern_chars[pattern_index] == '*' {
        pattern_index += 1;
    }

    pattern_index == pattern_chars.len()
}
