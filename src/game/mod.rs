//! Game Logic
//!
//! Everything between a secret code and a resolved round:
//! - `difficulty`: Preset difficulty profiles
//! - `code`: Secret code generation and entry validation
//! - `clue`: Positional clue engine
//! - `logic`: Text-only logical clue candidates
//! - `timer`: Timed-mode countdown
//! - `stats`: Cumulative statistics and persistence
//! - `session`: Per-player session state machine

pub mod clue;
pub mod code;
pub mod difficulty;
pub mod logic;
pub mod session;
pub mod stats;
pub mod timer;

pub use clue::{generate_clues, Clue, ClueKind};
pub use code::{validate_entry, CodeError, SecretCode};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use logic::generate_logical_clues;
pub use session::{
    GameMode, GuessFeedback, Phase, PlayerSlot, RoundOutcome, RoundResult, Session, SessionError,
};
pub use stats::{JsonFileStore, MemoryStore, Stats, StatsError, StatsStore};
pub use timer::{RoundTimer, TIMER_POLL_INTERVAL};
