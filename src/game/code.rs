//! Secret Code
//!
//! The hidden digit sequence a guesser must reproduce. Codes are either
//! machine-generated or entered by the creating player; both paths
//! uphold the invariant that a code is never all-identical digits, so
//! every clue type has at least one valid construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::digits::{count_repeats, digit_positions};
use crate::core::rng::DeterministicRng;

/// Validation failure for a player-supplied code or guess.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    /// Entry has the wrong number of digits.
    #[error("expected {expected} digits, got {actual}")]
    WrongLength {
        /// Digits required by the active difficulty.
        expected: usize,
        /// Digits actually supplied.
        actual: usize,
    },

    /// A value outside 0..=9 was supplied.
    #[error("digit {0} is out of range 0-9")]
    DigitOutOfRange(u8),

    /// Every digit is the same; the code would be trivially guessable
    /// and several clue types could not be built for it.
    #[error("all digits are identical")]
    AllDigitsIdentical,
}

/// An immutable secret code for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretCode {
    digits: Vec<u8>,
}

impl SecretCode {
    /// Generate a random code of `length` digits.
    ///
    /// Digits are independent uniform draws in 0..=9 with repeats
    /// allowed. The all-identical degenerate case is re-drawn so the
    /// code invariant holds for machine codes as well as human ones.
    pub fn generate(rng: &mut DeterministicRng, length: usize) -> Self {
        loop {
            let digits: Vec<u8> = (0..length).map(|_| rng.next_digit()).collect();
            if length < 2 || !all_identical(&digits) {
                return Self { digits };
            }
        }
    }

    /// Validate and accept a player-created code or guess entry.
    pub fn from_player_input(digits: &[u8], expected_len: usize) -> Result<Self, CodeError> {
        validate_entry(digits, expected_len)?;
        if all_identical(digits) {
            return Err(CodeError::AllDigitsIdentical);
        }
        Ok(Self {
            digits: digits.to_vec(),
        })
    }

    /// The code digits in order.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Code length.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Whether the code has no digits.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Whether `digit` appears anywhere in the code.
    pub fn contains(&self, digit: u8) -> bool {
        self.digits.contains(&digit)
    }

    /// Distinct digits in order of first appearance.
    pub fn distinct_digits(&self) -> Vec<u8> {
        let mut seen = Vec::new();
        for &d in &self.digits {
            if !seen.contains(&d) {
                seen.push(d);
            }
        }
        seen
    }

    /// Map each digit to the positions it occupies.
    pub fn digit_positions(&self) -> BTreeMap<u8, Vec<usize>> {
        digit_positions(&self.digits)
    }

    /// Occurrence count per digit.
    pub fn repeat_counts(&self) -> BTreeMap<u8, usize> {
        count_repeats(&self.digits)
    }

    /// Whether any digit occurs more than once.
    pub fn has_repeated_digit(&self) -> bool {
        self.repeat_counts().values().any(|&c| c > 1)
    }

    /// Sum of all digits.
    pub fn digit_sum(&self) -> u32 {
        self.digits.iter().map(|&d| d as u32).sum()
    }

    /// Whether `guess` reproduces the code exactly.
    pub fn matches(&self, guess: &[u8]) -> bool {
        self.digits == guess
    }
}

impl fmt::Display for SecretCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// Check length and digit range of a raw entry without consuming it.
///
/// Used for guesses too, where the all-identical rule does not apply.
pub fn validate_entry(digits: &[u8], expected_len: usize) -> Result<(), CodeError> {
    if digits.len() != expected_len {
        return Err(CodeError::WrongLength {
            expected: expected_len,
            actual: digits.len(),
        });
    }
    if let Some(&bad) = digits.iter().find(|&&d| d > 9) {
        return Err(CodeError::DigitOutOfRange(bad));
    }
    Ok(())
}

fn all_identical(digits: &[u8]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length_and_range() {
        let mut rng = DeterministicRng::new(100);
        for len in [3, 4, 5] {
            for _ in 0..50 {
                let code = SecretCode::generate(&mut rng, len);
                assert_eq!(code.len(), len);
                assert!(code.digits().iter().all(|&d| d < 10));
            }
        }
    }

    #[test]
    fn test_generate_never_all_identical() {
        let mut rng = DeterministicRng::new(2024);
        for _ in 0..500 {
            let code = SecretCode::generate(&mut rng, 3);
            assert!(code.distinct_digits().len() >= 2);
        }
    }

    #[test]
    fn test_all_identical_rejected() {
        let err = SecretCode::from_player_input(&[5, 5, 5], 3).unwrap_err();
        assert_eq!(err, CodeError::AllDigitsIdentical);
    }

    #[test]
    fn test_incomplete_entry_rejected() {
        let err = SecretCode::from_player_input(&[1, 2], 3).unwrap_err();
        assert_eq!(
            err,
            CodeError::WrongLength {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = SecretCode::from_player_input(&[1, 12, 3], 3).unwrap_err();
        assert_eq!(err, CodeError::DigitOutOfRange(12));
    }

    #[test]
    fn test_valid_code_accepted() {
        let code = SecretCode::from_player_input(&[1, 2, 3], 3).unwrap();
        assert_eq!(code.digits(), &[1, 2, 3]);
        assert!(code.matches(&[1, 2, 3]));
        assert!(!code.matches(&[3, 2, 1]));
    }

    #[test]
    fn test_distinct_digits_first_appearance_order() {
        let code = SecretCode::from_player_input(&[4, 2, 4, 7], 4).unwrap();
        assert_eq!(code.distinct_digits(), vec![4, 2, 7]);
    }

    #[test]
    fn test_repeat_helpers() {
        let code = SecretCode::from_player_input(&[4, 2, 4, 7], 4).unwrap();
        assert!(code.has_repeated_digit());
        assert_eq!(code.repeat_counts()[&4], 2);
        assert_eq!(code.digit_sum(), 17);

        let flat = SecretCode::from_player_input(&[1, 2, 3], 3).unwrap();
        assert!(!flat.has_repeated_digit());
    }

    #[test]
    fn test_display() {
        let code = SecretCode::from_player_input(&[9, 0, 3], 3).unwrap();
        assert_eq!(code.to_string(), "903");
    }
}
