//! String similarity algorithms on a 0-100 scale.
//!
//! Every algorithm is built on the normalized Indel similarity from
//! `rapidfuzz::fuzz::ratio`. Comparisons are case-sensitive and apply no
//! preprocessing; callers clean names before matching.

use std::collections::BTreeSet;

use rapidfuzz::fuzz;

const UNBASE_SCALE: f64 = 0.95;

/// Normalized Indel similarity of the two strings.
pub fn ratio(s1: &str, s2: &str) -> f64 {
    fuzz::ratio(s1.chars(), s2.chars()) * 100.0
}

fn ratio_chars(s1: &[char], s2: &[char]) -> f64 {
    fuzz::ratio(s1.iter().copied(), s2.iter().copied()) * 100.0
}

/// Best [`ratio`] of the shorter string against any window of the longer one.
///
/// Windows hanging over either edge of the longer string are included, so a
/// prefix or suffix overlap still scores.
pub fn partial_ratio(s1: &str, s2: &str) -> f64 {
    let first: Vec<char> = s1.chars().collect();
    let second: Vec<char> = s2.chars().collect();
    if first.is_empty() || second.is_empty() {
        return if first.is_empty() && second.is_empty() {
            100.0
        } else {
            0.0
        };
    }
    let (short, long) = if first.len() <= second.len() {
        (&first, &second)
    } else {
        (&second, &first)
    };
    let window = short.len();
    let span = long.len();

    let mut ranges: Vec<(usize, usize)> = (1..window).map(|end| (0, end)).collect();
    ranges.extend((0..=span - window).map(|start| (start, start + window)));
    ranges.extend((span - window + 1..span).map(|start| (start, span)));

    let mut best = 0.0_f64;
    for (start, end) in ranges {
        best = best.max(ratio_chars(short, &long[start..end]));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

/// [`ratio`] after sorting the whitespace-separated tokens of both strings.
pub fn token_sort_ratio(s1: &str, s2: &str) -> f64 {
    ratio(&sorted_tokens(s1), &sorted_tokens(s2))
}

/// Similarity of the token sets, ignoring order and repeated tokens.
///
/// Compares the shared tokens against each side's shared-plus-remaining tokens
/// and the two remainders against each other, keeping the best score. When
/// one token set contains the other the score is 100.
pub fn token_set_ratio(s1: &str, s2: &str) -> f64 {
    let left = token_set(s1);
    let right = token_set(s2);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared: Vec<&str> = left.intersection(&right).copied().collect();
    let left_only: Vec<&str> = left.difference(&right).copied().collect();
    let right_only: Vec<&str> = right.difference(&left).copied().collect();
    if !shared.is_empty() && (left_only.is_empty() || right_only.is_empty()) {
        return 100.0;
    }

    let shared_joined = shared.join(" ");
    let left_combined = join_tokens(&shared_joined, &left_only.join(" "));
    let right_combined = join_tokens(&shared_joined, &right_only.join(" "));

    let mut best = ratio(&left_combined, &right_combined);
    if !shared.is_empty() {
        best = best
            .max(ratio(&shared_joined, &left_combined))
            .max(ratio(&shared_joined, &right_combined));
    }
    best
}

fn join_tokens(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

fn partial_token_ratio(s1: &str, s2: &str) -> f64 {
    let left = token_set(s1);
    let right = token_set(s2);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    // A shared word is a perfect partial alignment.
    if left.intersection(&right).next().is_some() {
        return 100.0;
    }
    partial_ratio(&sorted_tokens(s1), &sorted_tokens(s2))
}

/// Weighted ensemble of the other algorithms.
///
/// Strings of similar length use the plain and token ratios; strings of very
/// different length fall back to the partial ratios, scaled down the larger
/// the length gap.
pub fn wratio(s1: &str, s2: &str) -> f64 {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    if len1 == 0 || len2 == 0 {
        return 0.0;
    }

    let len_ratio = len1.max(len2) as f64 / len1.min(len2) as f64;
    let plain = ratio(s1, s2);
    if len_ratio < 1.5 {
        let token = token_sort_ratio(s1, s2).max(token_set_ratio(s1, s2));
        return plain.max(token * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let best = plain.max(partial_ratio(s1, s2) * partial_scale);
    best.max(partial_token_ratio(s1, s2) * UNBASE_SCALE * partial_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 0.01
    }

    #[test]
    fn identical_strings_score_100() {
        assert!(close(ratio("TSHUAPA", "TSHUAPA"), 100.0));
        assert!(close(wratio("HAUT KATANGA", "HAUT KATANGA"), 100.0));
    }

    #[test]
    fn ratio_counts_shared_characters() {
        // 2 * 7 / (8 + 7)
        assert!(close(ratio("TSHUAPAS", "TSHUAPA"), 93.33));
    }

    #[test]
    fn partial_ratio_finds_substring() {
        assert!(close(partial_ratio("KATANGA", "HAUT KATANGA"), 100.0));
        assert!(partial_ratio("ABC", "XYZ") < 1.0);
        assert!(close(partial_ratio("", ""), 100.0));
        assert!(close(partial_ratio("A", ""), 0.0));
    }

    #[test]
    fn token_sort_ignores_order() {
        assert!(close(token_sort_ratio("HAUT UELE", "UELE HAUT"), 100.0));
        assert!(ratio("HAUT UELE", "UELE HAUT") < 100.0);
    }

    #[test]
    fn token_set_accepts_subset() {
        assert!(close(token_set_ratio("BAS UELE", "BAS UELE PROVINCE"), 100.0));
        assert!(close(token_set_ratio("", "UELE"), 0.0));
        assert!(token_set_ratio("KWILU", "KWANGO") < 100.0);
    }

    #[test]
    fn wratio_scales_partial_matches() {
        // Length ratio >= 1.5: the exact substring scores 100 * 0.9.
        assert!(close(wratio("KATANGA", "HAUT KATANGA ZONE"), 90.0));
        // Length ratio >= 8 drops the partial scale to 0.6.
        assert!(close(wratio("A", "A BCDEFGHIJ"), 60.0));
        assert!(close(wratio("", "KATANGA"), 0.0));
    }

    #[test]
    fn wratio_prefers_plain_ratio_for_similar_lengths() {
        assert!(close(wratio("TSHUAPAS", "TSHUAPA"), 93.33));
    }
}
