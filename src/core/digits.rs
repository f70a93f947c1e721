//! Digit Pool Utilities
//!
//! Helpers for working with the 0-9 digit alphabet: the "non-secret"
//! filler pool, exclusion-aware sampling and occurrence maps. The clue
//! engine pads its rows exclusively with digits from this pool so a
//! filler never collides with the secret code.

use std::collections::BTreeMap;

use super::rng::DeterministicRng;

/// Size of the digit alphabet.
pub const DIGIT_BASE: u8 = 10;

/// All digits 0..=9 that do not appear in `secret`, in ascending order.
pub fn non_secret_pool(secret: &[u8]) -> Vec<u8> {
    (0..DIGIT_BASE).filter(|d| !secret.contains(d)).collect()
}

/// Draw `count` filler digits guaranteed absent from `secret`.
///
/// Shuffles the non-secret pool and takes the first `count` entries.
/// When the pool is empty (only possible if the secret covers the whole
/// alphabet) the result degrades to a zero fill; acceptable for small
/// alphabets only and never an error.
pub fn sample_fillers(rng: &mut DeterministicRng, secret: &[u8], count: usize) -> Vec<u8> {
    let mut pool = non_secret_pool(secret);
    if pool.is_empty() {
        return vec![0; count];
    }
    rng.shuffle(&mut pool);
    pool.truncate(count);
    pool
}

/// Map each digit to the list of positions it occupies in `digits`.
pub fn digit_positions(digits: &[u8]) -> BTreeMap<u8, Vec<usize>> {
    let mut map: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (idx, &d) in digits.iter().enumerate() {
        map.entry(d).or_default().push(idx);
    }
    map
}

/// Count how many times each digit occurs in `digits`.
pub fn count_repeats(digits: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for &d in digits {
        *counts.entry(d).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_secret_pool() {
        assert_eq!(non_secret_pool(&[1, 2, 3]), vec![0, 4, 5, 6, 7, 8, 9]);
        assert_eq!(non_secret_pool(&[]), (0..10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_sample_fillers_disjoint_from_secret() {
        let mut rng = DeterministicRng::new(77);
        let secret = [3, 1, 4, 1, 5];
        for _ in 0..100 {
            let fillers = sample_fillers(&mut rng, &secret, 4);
            assert_eq!(fillers.len(), 4);
            assert!(fillers.iter().all(|d| !secret.contains(d)));
        }
    }

    #[test]
    fn test_sample_fillers_empty_pool_fallback() {
        let mut rng = DeterministicRng::new(1);
        let secret: Vec<u8> = (0..10).collect();
        assert_eq!(sample_fillers(&mut rng, &secret, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_digit_positions() {
        let map = digit_positions(&[7, 2, 7]);
        assert_eq!(map[&7], vec![0, 2]);
        assert_eq!(map[&2], vec![1]);
    }

    #[test]
    fn test_count_repeats() {
        let counts = count_repeats(&[5, 5, 3, 5]);
        assert_eq!(counts[&5], 3);
        assert_eq!(counts[&3], 1);
    }
}
