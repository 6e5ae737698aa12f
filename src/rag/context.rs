//! Token-budgeted context assembly.
//!
//! Greedy selection over rank-ordered chunks: keep whole chunks while
//! they fit, truncate at most one chunk into the remaining budget,
//! then stop. Later chunks are dropped even if they would fit, so the
//! assembled context stays a contiguous prefix of the ranking.

use super::tokens::{estimate_tokens, truncate_to_tokens};

/// Remaining budget below which truncating another chunk is not worth
/// it; the truncated tail would carry no meaningful content.
const MIN_TRUNCATION_BUDGET: usize = 100;

/// Select and truncate `ranked` chunks (most relevant first) to fit
/// `budget` estimated tokens.
///
/// Returns the selected chunk texts in their original order and the
/// total estimated token cost, which never exceeds `budget`.
pub fn assemble(ranked: &[String], budget: usize) -> (Vec<String>, usize) {
    let mut selected = Vec::new();
    let mut used = 0usize;

    for chunk in ranked {
        let cost = estimate_tokens(chunk);
        if used + cost <= budget {
            selected.push(chunk.clone());
            used += cost;
            continue;
        }

        let remaining = budget - used;
        if remaining > MIN_TRUNCATION_BUDGET {
            let truncated = truncate_to_tokens(chunk, remaining);
            used += estimate_tokens(&truncated);
            selected.push(truncated);
        }
        break;
    }

    (selected, used)
}
