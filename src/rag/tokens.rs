//! Heuristic token estimation and token-budgeted truncation.
//!
//! The estimate is deliberately cheap and approximate: one token per
//! CJK ideograph, one per whitespace-delimited word, half a token per
//! remaining character. It does not try to match any real tokenizer;
//! the budget arithmetic downstream only needs the rule to be stable.

/// Estimate the token cost of `text`.
///
/// `cjk + words + (other_chars / 2)`, where `other_chars` counts every
/// non-CJK character (including spaces), with integer division.
pub fn estimate_tokens(text: &str) -> usize {
    let mut cjk = 0usize;
    let mut total = 0usize;
    for c in text.chars() {
        total += 1;
        if is_cjk(c) {
            cjk += 1;
        }
    }
    let words = text.split_whitespace().count();
    cjk + words + (total - cjk) / 2
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Characters that end a sentence (or at least a word) and make an
/// acceptable truncation point.
fn is_break_char(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '.' | '!' | '?' | '\n' | ' ')
}

/// Cut `text` down so its estimated token cost fits `max_tokens`.
///
/// Already-fitting text is returned unchanged. Otherwise the text is
/// cut at a proportional character position with a 10% safety margin,
/// then pulled back to the last sentence-ending punctuation, newline,
/// or space inside the cut, so the result does not stop mid-word. If
/// no such boundary exists the raw character cutoff is kept.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    let estimate = estimate_tokens(text);
    if estimate <= max_tokens {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let ratio = max_tokens as f64 / estimate as f64;
    let cutoff = ((chars.len() as f64) * ratio * 0.9) as usize;
    let prefix = &chars[..cutoff.min(chars.len())];

    match prefix.iter().rposition(|&c| is_break_char(c)) {
        // Keep the boundary character itself.
        Some(pos) if pos > 0 => prefix[..=pos].iter().collect(),
        _ => prefix.iter().collect(),
    }
}
