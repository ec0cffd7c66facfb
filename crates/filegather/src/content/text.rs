//! Plain-text reading with encoding fallback.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::{GBK, WINDOWS_1252};

use crate::error::{GatherError, Result};

/// Worst-case UTF-8 width; reading this many bytes per character always covers the budget.
const MAX_BYTES_PER_CHAR: usize = 4;

/// Reads the first `budget` characters of a text file.
pub(super) fn read_text_prefix(path: &Path, budget: usize) -> Result<String> {
    let file = File::open(path).map_err(|error| GatherError::extraction(path, error))?;
    let limit = budget.saturating_mul(MAX_BYTES_PER_CHAR) as u64;
    let mut bytes = Vec::new();
    file.take(limit)
        .read_to_end(&mut bytes)
        .map_err(|error| GatherError::extraction(path, error))?;
    let truncated = bytes.len() as u64 == limit;

    let mut text = decode_prefix(&bytes, truncated);
    truncate_chars(&mut text, budget);
    Ok(text)
}

/// Decodes a complete file as UTF-8, then GBK, then Windows-1252.
pub fn decode_bytes(bytes: &[u8]) -> String {
    decode_prefix(bytes, false)
}

/// Like [`decode_bytes`], but when `truncated` is set an incomplete character
/// at the very end is dropped instead of failing that encoding.
pub(crate) fn decode_prefix(bytes: &[u8], truncated: bool) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => return text.to_string(),
        Err(error) if truncated && error.error_len().is_none() => {
            return String::from_utf8_lossy(&bytes[..error.valid_up_to()]).into_owned();
        }
        Err(_) => {}
    }

    if let Some(text) = GBK.decode_without_bom_handling_and_without_replacement(bytes) {
        return text.into_owned();
    }
    if truncated && bytes.len() > 1 && bytes[bytes.len() - 1] >= 0x81 {
        if let Some(text) =
            GBK.decode_without_bom_handling_and_without_replacement(&bytes[..bytes.len() - 1])
        {
            return text.into_owned();
        }
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Shortens `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(index);
    }
}
