//! # Decode Duel Game Server
//!
//! Deterministic engine and session runtime for Decode Duel, a
//! number-code deduction game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DECODE DUEL SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── digits.rs   - Digit pool utilities                      │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── difficulty.rs - Preset difficulty profiles              │
//! │  ├── code.rs     - Secret code generation and validation     │
//! │  ├── clue.rs     - Positional clue engine                    │
//! │  ├── logic.rs    - Logical clue candidates                   │
//! │  ├── timer.rs    - Timed-mode countdown                      │
//! │  ├── stats.rs    - Statistics and persistence                │
//! │  └── session.rs  - Session state machine                     │
//! │                                                              │
//! │  network/        - Networking (non-deterministic)            │
//! │  ├── protocol.rs - Room event types                          │
//! │  └── room.rs     - Simulated room hub                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic** given a
//! seed:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - All randomness from seeded Xorshift128+
//! - Wall-clock time confined to the timer and statistics timestamps
//!
//! Given the same seed, code generation and the full clue set are
//! **identical** on any platform, so both sides of an online match can
//! verify each other's rounds.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::rng::{derive_session_seed, DeterministicRng};
pub use crate::game::clue::{generate_clues, Clue, ClueKind};
pub use crate::game::code::SecretCode;
pub use crate::game::difficulty::{Difficulty, DifficultyProfile};
pub use crate::game::session::{GameMode, GuessFeedback, Phase, Session, SessionError};
pub use crate::network::protocol::{Envelope, PlayerId, RoomEvent};
pub use crate::network::room::{RoomError, RoomHub};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
