//! Fuzzy similarity scoring and best-match search.
//!
//! All scores are integers in `0..=100`, computed from normalized Levenshtein
//! similarity over token-rearranged strings so that word order does not
//! matter. Threshold policy is owned by the call sites, never by this module:
//! folder discovery, collection classification, and duplicate clustering each
//! keep their own named constant.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::normalize::normalize;

/// The best-scoring candidate for a single match attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMatch {
    /// Index of the candidate in the caller's list.
    pub index: usize,
    /// The candidate as the caller supplied it (not normalized).
    pub candidate: String,
    pub score: u8,
    /// The normalized form of the query the score was computed against.
    pub query_normalized: String,
}

/// Normalized Levenshtein similarity as an integer percentage.
fn ratio(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Join the whitespace-separated tokens of a string in sorted order.
fn sorted_tokens(value: &str) -> String {
    value.split_whitespace().sorted_unstable().join(" ")
}

/// Similarity of two strings after sorting their tokens.
///
/// Robust to reordered words: "The Matrix" and "Matrix The" score 100.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Sorted-token overlap similarity.
///
/// Compares the sorted token intersection against each side's intersection
/// plus remainder and takes the best ratio. Robust to one name embedding the
/// other: "The Matrix" and "The Matrix Collection" score 100.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = tokens_a.intersection(&tokens_b).join(" ");
    let rest_a = tokens_a.difference(&tokens_b).join(" ");
    let rest_b = tokens_b.difference(&tokens_a).join(" ");

    let combined_a = join_tokens(&intersection, &rest_a);
    let combined_b = join_tokens(&intersection, &rest_b);

    ratio(&intersection, &combined_a)
        .max(ratio(&intersection, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

/// Best similarity of the shorter string against any equal-length character
/// window of the longer string.
///
/// Used for discovery where folder names deliberately carry extra words,
/// for example a "Movies" library matching a "Movies - Posters" folder.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let window_len = shorter.chars().count();
    let longer_chars: Vec<char> = longer.chars().collect();

    let mut best = 0;
    for window in longer_chars.windows(window_len) {
        let segment: String = window.iter().collect();
        best = best.max(ratio(shorter, &segment));
        if best == 100 {
            break;
        }
    }
    best
}

/// Find the best-scoring candidate for the given query.
///
/// The query and every candidate are normalized before scoring; the caller's
/// list is never mutated. Ties break to the first occurrence. Returns `None`
/// for an empty candidate list or when nothing scores above zero; this is a
/// valid result, not an error. Score interpretation is left to the caller.
pub fn find_best_match<S: AsRef<str>>(query: &str, candidates: &[S]) -> Option<BestMatch> {
    let query_normalized = normalize(query);

    let mut best: Option<(usize, u8)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = token_set_ratio(&query_normalized, &normalize(candidate.as_ref()));
        if score > 0 && best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    best.map(|(index, score)| BestMatch {
        index,
        candidate: candidates[index].as_ref().to_string(),
        score,
        query_normalized,
    })
}

fn join_tokens(left: &str, right: &str) -> String {
    if left.is_empty() {
        right.to_string()
    } else if right.is_empty() {
        left.to_string()
    } else {
        format!("{left} {right}")
    }
}
