//! Sliding-window text chunker.
//!
//! Splits extracted document text into overlapping character windows.
//! Character-based (not token-based) so it treats CJK and Latin text
//! alike.

use std::sync::OnceLock;

use regex::Regex;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Split `text` into chunks of at most `chunk_size` characters,
/// with consecutive chunks sharing `overlap` characters.
///
/// Whitespace runs are collapsed to single spaces before splitting.
/// Empty or whitespace-only input yields no chunks, and no produced
/// chunk is empty after trimming. Requires `chunk_size > overlap`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let normalized = whitespace_re().replace_all(text, " ");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    let total = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + chunk_size).min(total);
        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }
        if end == total {
            break;
        }
        // Step back by the overlap, but always make forward progress.
        start = end.saturating_sub(overlap).max(start + 1);
    }
    chunks
}
