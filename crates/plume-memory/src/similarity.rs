//! Character-level sequence similarity.
//!
//! `sequence_ratio` is the classic longest-matching-blocks measure: find the
//! longest common block, recurse on the pieces to its left and right, and
//! score `2 * M / T` where M is the total matched length and T the combined
//! length of both strings. 1.0 means identical; two empty strings count as
//! identical.

use std::collections::HashMap;

/// Longest matching block between `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns (start in a, start in b, length). The earliest block wins ties so
/// the decomposition is deterministic.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0usize);
    // lengths[j] = length of the match ending at a[i-1], b[j]
    let mut lengths: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut row: HashMap<usize, usize> = HashMap::new();
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                row.insert(j, k);
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        lengths = row;
    }
    best
}

/// Total number of matched characters across all matching blocks.
fn matched_total(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k > 0 {
            total += k;
            pending.push((alo, i, blo, j));
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Normalized similarity ratio between two strings, in [0, 1].
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let combined = a.len() + b.len();
    if combined == 0 {
        return 1.0;
    }
    2.0 * matched_total(&a, &b) as f64 / combined as f64
}
