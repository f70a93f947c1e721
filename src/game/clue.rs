//! Clue Engine
//!
//! Derives a capped, ordered set of typed clues from a secret code.
//! Positional clues place real code digits at chosen positions and pad
//! every other cell with non-secret fillers, so a rendered row never
//! contains blanks. The final clue is always a logical (text-only) clue.
//!
//! Generation happens in a fixed semantic order; the positional clues
//! are shuffled afterwards and the logical clue is pinned last.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::digits::{non_secret_pool, sample_fillers};
use crate::core::rng::DeterministicRng;
use crate::game::code::SecretCode;
use crate::game::difficulty::Difficulty;
use crate::game::logic::generate_logical_clues;

/// Clue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueKind {
    /// One digit is correct and placed at its true position.
    CorrectPosition,
    /// One digit is correct but placed where it does not occur.
    WrongPosition,
    /// No digit in the row occurs anywhere in the code.
    AllWrong,
    /// Two correct digits, both misplaced.
    TwoWrongPosition,
    /// Several digits shown at their true positions.
    MultipleCorrect,
    /// Logical: a digit repeats N times.
    RepeatedNumber,
    /// Logical: two distinct digits repeat.
    TwoRepeatedNumbers,
    /// Logical: the single even (or odd) digit and its position.
    EvenOdd,
    /// Logical: parity of the digit sum.
    SumParity,
}

impl ClueKind {
    /// Logical clues carry no digit row.
    pub fn is_logical(self) -> bool {
        matches!(
            self,
            ClueKind::RepeatedNumber
                | ClueKind::TwoRepeatedNumbers
                | ClueKind::EvenOdd
                | ClueKind::SumParity
        )
    }
}

/// One hint shown to the guesser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    /// Digit row. Fully populated for positional clues, empty for
    /// logical ones.
    pub row: Vec<u8>,
    /// Natural-language hint text.
    pub hint: String,
    /// Clue category.
    pub kind: ClueKind,
}

impl Clue {
    /// Build a positional clue with a fully populated row.
    pub(crate) fn positional(row: Vec<u8>, hint: impl Into<String>, kind: ClueKind) -> Self {
        Self {
            row,
            hint: hint.into(),
            kind,
        }
    }

    /// Build a logical clue (no digit row).
    pub(crate) fn logical(hint: impl Into<String>, kind: ClueKind) -> Self {
        Self {
            row: Vec::new(),
            hint: hint.into(),
            kind,
        }
    }

    /// Whether this is a pure logical clue.
    pub fn is_logical(&self) -> bool {
        self.kind.is_logical()
    }
}

/// Generate the clue set for one round.
///
/// Returns exactly `min(clue_count, produced)` clues; the last entry is
/// always the logical clue.
pub fn generate_clues(
    rng: &mut DeterministicRng,
    code: &SecretCode,
    difficulty: Difficulty,
) -> Vec<Clue> {
    let mut builder = ClueBuilder::new(rng, code, difficulty);

    let mut positional = vec![
        builder.correct_position_clue(),
        builder.wrong_position_clue(),
        builder.all_wrong_clue(),
    ];
    if code.len() >= 3 {
        positional.push(builder.two_wrong_position_clue());
    }
    positional.push(builder.multiple_correct_clue());

    builder.rng.shuffle(&mut positional);

    let mut clues = positional;
    if let Some(logical) = generate_logical_clues(code).into_iter().next() {
        clues.push(logical);
    }

    clues.truncate(difficulty.profile().clue_count);
    clues
}

/// Working state for one clue-generation pass.
struct ClueBuilder<'a> {
    rng: &'a mut DeterministicRng,
    code: &'a SecretCode,
    difficulty: Difficulty,
    positions: BTreeMap<u8, Vec<usize>>,
    distinct: Vec<u8>,
    /// Distinct digits not yet featured in a clue. Drained front-first
    /// to maximize coverage before falling back to random re-draws.
    feature_queue: VecDeque<u8>,
    /// Fillers already surfaced in earlier clues, insertion-ordered and
    /// de-duplicated. Reused first when building the all-wrong row.
    discarded: Vec<u8>,
}

impl<'a> ClueBuilder<'a> {
    fn new(rng: &'a mut DeterministicRng, code: &'a SecretCode, difficulty: Difficulty) -> Self {
        let distinct = code.distinct_digits();
        Self {
            rng,
            code,
            difficulty,
            positions: code.digit_positions(),
            feature_queue: distinct.iter().copied().collect(),
            distinct,
            discarded: Vec::new(),
        }
    }

    /// Next digit to feature: shrinking worklist first, then any
    /// distinct digit at random.
    fn next_feature_digit(&mut self) -> u8 {
        match self.feature_queue.pop_front() {
            Some(d) => d,
            None => *self
                .rng
                .choose(&self.distinct)
                .unwrap_or(&self.code.digits()[0]),
        }
    }

    /// A true position of `digit` in the code.
    fn random_correct_position(&mut self, digit: u8) -> usize {
        let positions = &self.positions[&digit];
        *self.rng.choose(positions).unwrap_or(&0)
    }

    /// A position where `digit` does NOT occur, avoiding `exclude`.
    ///
    /// Always exists for valid codes: no digit occupies every position,
    /// and excluded cells belong to other featured digits.
    fn random_wrong_position(&mut self, digit: u8, exclude: &[usize]) -> usize {
        let taken = &self.positions[&digit];
        let valid: Vec<usize> = (0..self.code.len())
            .filter(|i| !taken.contains(i) && !exclude.contains(i))
            .collect();
        *self.rng.choose(&valid).unwrap_or(&0)
    }

    /// Fresh non-secret fillers, recorded into the discarded pool.
    fn fresh_fillers(&mut self, count: usize) -> Vec<u8> {
        let fillers = sample_fillers(self.rng, self.code.digits(), count);
        for &f in &fillers {
            if !self.discarded.contains(&f) {
                self.discarded.push(f);
            }
        }
        fillers
    }

    /// Complete a partially placed row with fresh fillers.
    fn fill_row(&mut self, cells: Vec<Option<u8>>) -> Vec<u8> {
        let missing = cells.iter().filter(|c| c.is_none()).count();
        let mut fillers = self.fresh_fillers(missing).into_iter();
        cells
            .into_iter()
            .map(|c| c.unwrap_or_else(|| fillers.next().unwrap_or(0)))
            .collect()
    }

    fn correct_position_clue(&mut self) -> Clue {
        let mut cells = vec![None; self.code.len()];
        let digit = self.next_feature_digit();
        let pos = self.random_correct_position(digit);
        cells[pos] = Some(digit);

        let row = self.fill_row(cells);
        Clue::positional(
            row,
            "One digit is correct and in the right position",
            ClueKind::CorrectPosition,
        )
    }

    fn wrong_position_clue(&mut self) -> Clue {
        let mut cells = vec![None; self.code.len()];
        let digit = self.next_feature_digit();
        let pos = self.random_wrong_position(digit, &[]);
        cells[pos] = Some(digit);

        let row = self.fill_row(cells);
        Clue::positional(
            row,
            "One digit is correct but in the wrong position",
            ClueKind::WrongPosition,
        )
    }

    fn two_wrong_position_clue(&mut self) -> Clue {
        let mut cells = vec![None; self.code.len()];

        let mut featured: Vec<u8> = Vec::with_capacity(2);
        while featured.len() < 2 {
            let next = self.next_feature_digit();
            if !featured.contains(&next) {
                featured.push(next);
            }
        }

        let mut used = Vec::with_capacity(2);
        for digit in featured {
            let pos = self.random_wrong_position(digit, &used);
            cells[pos] = Some(digit);
            used.push(pos);
        }

        let row = self.fill_row(cells);
        Clue::positional(
            row,
            "Two digits are correct but in the wrong positions",
            ClueKind::TwoWrongPosition,
        )
    }

    fn multiple_correct_clue(&mut self) -> Clue {
        let correct_count = 2.min(self.code.len());
        let mut cells = vec![None; self.code.len()];

        let mut featured_positions: Vec<usize> = Vec::with_capacity(correct_count);
        while featured_positions.len() < correct_count && !self.feature_queue.is_empty() {
            let digit = self.next_feature_digit();
            let pos = self.random_correct_position(digit);
            if !featured_positions.contains(&pos) {
                featured_positions.push(pos);
            }
        }
        let mut attempts = 0;
        while featured_positions.len() < correct_count {
            let digit = self.next_feature_digit();
            let pos = self.random_correct_position(digit);
            if !featured_positions.contains(&pos) {
                featured_positions.push(pos);
            } else if attempts >= 32 {
                // Deterministic fallback: first unused position.
                if let Some(p) = (0..self.code.len()).find(|p| !featured_positions.contains(p)) {
                    featured_positions.push(p);
                }
            }
            attempts += 1;
        }

        for &pos in &featured_positions {
            cells[pos] = Some(self.code.digits()[pos]);
        }

        let row = self.fill_row(cells);
        Clue::positional(
            row,
            format!(
                "{} digits are correct and in the right positions",
                correct_count
            ),
            ClueKind::MultipleCorrect,
        )
    }

    /// Row for the "no digit is correct" clue.
    ///
    /// Composition depends on difficulty:
    /// - medium: discarded-first base of 4, topped up fresh, shuffled
    /// - hard with a repeated code digit: proportions 2-1-1-1
    /// - hard without repeats: proportions 2-2-1
    /// - easy and anything else: plain shuffled non-secret sample
    fn all_wrong_clue(&mut self) -> Clue {
        let len = self.code.len();
        let row = match (self.difficulty, self.code.has_repeated_digit()) {
            (Difficulty::Medium, _) => {
                let mut base = self.discarded_first(4);
                self.rng.shuffle(&mut base);
                base.truncate(len);
                base
            }
            (Difficulty::Hard, true) => {
                let base = self.discarded_first(4);
                let mut row = vec![base[0], base[0], base[1], base[2], base[3]];
                self.rng.shuffle(&mut row);
                row.truncate(len);
                row
            }
            (Difficulty::Hard, false) => {
                let base = self.discarded_first(3);
                let mut row = vec![base[0], base[0], base[1], base[1], base[2]];
                self.rng.shuffle(&mut row);
                row.truncate(len);
                row
            }
            _ => sample_fillers(self.rng, self.code.digits(), len),
        };

        Clue::positional(row, "None of these digits is correct", ClueKind::AllWrong)
    }

    /// `n` distinct non-secret digits, preferring already-discarded
    /// fillers and topping up with fresh ones.
    fn discarded_first(&mut self, n: usize) -> Vec<u8> {
        let mut selected: Vec<u8> = self.discarded.iter().copied().take(n).collect();
        if selected.len() < n {
            let mut fresh: Vec<u8> = non_secret_pool(self.code.digits())
                .into_iter()
                .filter(|d| !selected.contains(d))
                .collect();
            self.rng.shuffle(&mut fresh);
            selected.extend(fresh.into_iter().take(n - selected.len()));
        }
        // Unreachable for real profiles; the pool always covers n.
        selected.resize(n, 0);
        selected
    }
}

// =============================================================================
// TESTS
// =============================================================================
