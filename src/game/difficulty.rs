//! Difficulty Presets
//!
//! Three fixed profiles selected at menu time and immutable for the
//! duration of a round. The profile travels inside `GameStarted` so both
//! ends of an online match play under identical settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Difficulty level for a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// 3 digits, 4 attempts, 180 second timer.
    #[default]
    Easy,
    /// 4 digits, 3 attempts, 120 second timer.
    Medium,
    /// 5 digits, 2 attempts, 60 second timer.
    Hard,
}

/// Fixed settings bundle for one difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Secret code length.
    pub code_length: usize,
    /// Guesses allowed before the round is lost.
    pub max_attempts: u32,
    /// Clues generated per round.
    pub clue_count: usize,
    /// Countdown length for timed mode, in seconds.
    pub timer_secs: u64,
}

impl Difficulty {
    /// Preset table. Clue count is 6 across the board.
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                code_length: 3,
                max_attempts: 4,
                clue_count: 6,
                timer_secs: 180,
            },
            Difficulty::Medium => DifficultyProfile {
                code_length: 4,
                max_attempts: 3,
                clue_count: 6,
                timer_secs: 120,
            },
            Difficulty::Hard => DifficultyProfile {
                code_length: 5,
                max_attempts: 2,
                clue_count: 6,
                timer_secs: 60,
            },
        }
    }

    /// Countdown duration for timed mode.
    pub fn timer(self) -> Duration {
        Duration::from_secs(self.profile().timer_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_table() {
        let easy = Difficulty::Easy.profile();
        assert_eq!(easy.code_length, 3);
        assert_eq!(easy.max_attempts, 4);
        assert_eq!(easy.timer_secs, 180);

        let medium = Difficulty::Medium.profile();
        assert_eq!(medium.code_length, 4);
        assert_eq!(medium.max_attempts, 3);
        assert_eq!(medium.timer_secs, 120);

        let hard = Difficulty::Hard.profile();
        assert_eq!(hard.code_length, 5);
        assert_eq!(hard.max_attempts, 2);
        assert_eq!(hard.timer_secs, 60);
    }

    #[test]
    fn test_clue_count_uniform() {
        for d in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(d.profile().clue_count, 6);
        }
    }

    #[test]
    fn test_serde_tag_names() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
