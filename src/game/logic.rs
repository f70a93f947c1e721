//! Logical Clue Generator
//!
//! Produces the text-only clue candidates for a code, in a fixed order:
//! repeat-count clues, then the single-minority-parity clue, then the
//! digit-sum parity clue. The clue engine consumes only the first
//! candidate, so later entries act as fallbacks for codes where the
//! earlier conditions do not hold.

use crate::game::clue::{Clue, ClueKind};
use crate::game::code::SecretCode;

/// Generate logical clue candidates for `code`.
///
/// Never empty: the sum-parity clue is always present as the last
/// candidate.
pub fn generate_logical_clues(code: &SecretCode) -> Vec<Clue> {
    let mut clues = Vec::new();

    let counts = code.repeat_counts();
    let repeated: Vec<(u8, usize)> = counts
        .iter()
        .filter(|(_, &c)| c > 1)
        .map(|(&d, &c)| (d, c))
        .collect();

    if repeated.len() == 2 {
        // Two distinct digits repeat; counts stay undisclosed.
        clues.push(Clue::logical(
            "Two different digits repeat",
            ClueKind::TwoRepeatedNumbers,
        ));
    } else if let Some(&(_, times)) = repeated.first() {
        clues.push(Clue::logical(
            format!("One digit repeats {} times", times),
            ClueKind::RepeatedNumber,
        ));
    }

    if let Some(clue) = minority_parity_clue(code) {
        clues.push(clue);
    }

    let parity = if code.digit_sum() % 2 == 0 {
        "even"
    } else {
        "odd"
    };
    clues.push(Clue::logical(
        format!("The sum of all digits is {}", parity),
        ClueKind::SumParity,
    ));

    clues
}

/// Clue naming the position of the single even (or odd) digit.
///
/// Emitted only when both parities are present and the minority parity
/// occurs exactly once. Positions are 1-based in the hint text.
fn minority_parity_clue(code: &SecretCode) -> Option<Clue> {
    let even_positions: Vec<usize> = code
        .digits()
        .iter()
        .enumerate()
        .filter(|(_, &d)| d % 2 == 0)
        .map(|(i, _)| i + 1)
        .collect();
    let odd_count = code.len() - even_positions.len();

    if even_positions.is_empty() || odd_count == 0 {
        return None;
    }

    if even_positions.len() == 1 {
        Some(Clue::logical(
            format!(
                "Only one digit is even and it is at position {}",
                even_positions[0]
            ),
            ClueKind::EvenOdd,
        ))
    } else if odd_count == 1 {
        let odd_position = (1..=code.len())
            .find(|p| !even_positions.contains(p))
            .unwrap_or(1);
        Some(Clue::logical(
            format!("Only one digit is odd and it is at position {}", odd_position),
            ClueKind::EvenOdd,
        ))
    } else {
        None
    }
}
