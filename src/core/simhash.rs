//! SimHash near-duplicate fingerprinting
//!
//! Produces a 64-bit locality-sensitive fingerprint per text: lowercase
//! alphanumeric tokens are grouped into overlapping 4-token shingles, each
//! shingle is hashed with XXH3, and every shingle hash casts a +1/-1 vote
//! per bit. Texts with small Hamming distance between fingerprints are
//! near-duplicates.

use once_cell::sync::Lazy;
use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9_]+").unwrap());

/// Shingle width used for fingerprinting
const SHINGLE_LEN: usize = 4;

fn tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Compute the 64-bit SimHash fingerprint of `text`.
///
/// Identical texts always yield identical fingerprints. Texts shorter than
/// one shingle produce fingerprint 0.
pub fn simhash64(text: &str) -> u64 {
    let toks = tokens(text);
    let mut votes = [0i64; 64];
    if toks.len() >= SHINGLE_LEN {
        for window in toks.windows(SHINGLE_LEN) {
            let shingle = window.join(" ");
            let h = xxh3_64(shingle.as_bytes());
            for (bit, vote) in votes.iter_mut().enumerate() {
                if (h >> bit) & 1 == 1 {
                    *vote += 1;
                } else {
                    *vote -= 1;
                }
            }
        }
    }
    let mut out = 0u64;
    for (bit, vote) in votes.iter().enumerate() {
        if *vote > 0 {
            out |= 1 << bit;
        }
    }
    out
}

/// Hamming distance between two fingerprints
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Whether `fp` falls within `threshold_bits` of any already-seen
/// fingerprint. Threshold 0 still rejects exact duplicates (distance 0).
pub fn is_near_duplicate(fp: u64, seen: &[u64], threshold_bits: u32) -> bool {
    seen.iter().any(|prev| hamming(fp, *prev) <= threshold_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simhash_deterministic() {
        let text = "fn main() { println!(\"hello world\"); } fn helper() {}";
        assert_eq!(simhash64(text), simhash64(text));
    }

    #[test]
    fn test_identical_texts_have_distance_zero() {
        let a = simhash64("import sys\ndef bar():\n    return 43\n");
        let b = simhash64("import sys\ndef bar():\n    return 43\n");
        assert_eq!(hamming(a, b), 0);
    }

    #[test]
    fn test_formatting_changes_do_not_alter_fingerprint() {
        // Same token stream, different case, punctuation and whitespace
        let a = simhash64("fn main() { parse_args(); run_server(); shutdown(); }");
        let b = simhash64("FN\n  MAIN...\nparse_args,  RUN_SERVER -- shutdown!");
        assert_eq!(hamming(a, b), 0);
    }

    #[test]
    fn test_threshold_counts_flipped_bits() {
        let fp = 0xDEAD_BEEF_DEAD_BEEF_u64;
        let close = fp ^ 0xFFFF;
        assert_eq!(hamming(fp, close), 16);
        assert!(is_near_duplicate(close, &[fp], 16));
        assert!(!is_near_duplicate(close, &[fp], 15));
    }

    #[test]
    fn test_short_text_fingerprint_is_zero() {
        assert_eq!(simhash64("one two three"), 0);
        assert_eq!(simhash64(""), 0);
    }

    #[test]
    fn test_threshold_zero_rejects_exact_duplicates_only() {
        let fp = simhash64("import os\nclass A: pass\ndef foo(): return 42\n");
        assert!(is_near_duplicate(fp, &[fp], 0));
        assert!(!is_near_duplicate(fp ^ 1, &[fp], 0));
    }

    #[test]
    fn test_case_insensitive_tokens() {
        let a = simhash64("Alpha Beta Gamma Delta Epsilon");
        let b = simhash64("alpha beta gamma delta epsilon");
        assert_eq!(a, b);
    }
}
