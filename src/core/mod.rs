//! Deterministic Primitives
//!
//! Foundation for reproducible rounds:
//! - `rng`: Deterministic Xorshift128+ PRNG and seed derivation
//! - `digits`: Digit pool utilities for clue construction

pub mod digits;
pub mod rng;

pub use digits::{count_repeats, digit_positions, non_secret_pool, sample_fillers, DIGIT_BASE};
pub use rng::{derive_session_seed, DeterministicRng};
