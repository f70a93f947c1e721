//! Room Protocol Messages
//!
//! Wire format for the events exchanged through a room. All events are
//! serialized as JSON with an internal `type` tag so payloads stay easy
//! to inspect in logs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::clue::Clue;
use crate::game::code::SecretCode;
use crate::game::difficulty::{Difficulty, DifficultyProfile};

/// Unique player identifier within the room hub.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The raw identifier bytes, for seed derivation.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A player's public presence in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
}

// =============================================================================
// ROOM EVENTS
// =============================================================================

/// Events broadcast within a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A player entered the room.
    PlayerJoined {
        /// Who joined.
        player_id: PlayerId,
        /// Their display name.
        player_name: String,
        /// Full roster after the join, host first.
        players: Vec<RoomMember>,
    },

    /// A player left the room.
    PlayerLeft {
        /// Who left.
        player_id: PlayerId,
        /// Their display name.
        player_name: String,
    },

    /// Free-form chat line.
    ChatMessage {
        /// Message text.
        message: String,
    },

    /// The host started a match.
    GameStarted {
        /// Agreed difficulty.
        difficulty: Difficulty,
        /// Resolved profile, so both sides agree on limits.
        settings: DifficultyProfile,
    },

    /// The creating player submitted a code; the guesser may begin.
    CodeSubmitted {
        /// The secret to guess.
        secret_code: SecretCode,
        /// Clues derived from it.
        clues: Vec<Clue>,
    },

    /// The guessing player submitted an answer.
    AnswerSubmitted {
        /// Whether the guess matched.
        correct: bool,
        /// Attempts remaining, when the guess missed.
        attempts_left: Option<u32>,
        /// Updated scores, when the round resolved.
        scores: Option<BTreeMap<PlayerId, u32>>,
    },

    /// Both sides agreed on another round with swapped roles.
    RoleSwitch {
        /// Who creates the code next round.
        new_creator: PlayerId,
    },

    /// The match ended; final standings.
    GameEnd {
        /// Final scores per player.
        scores: BTreeMap<PlayerId, u32>,
    },

    /// The host closed the room; its code is retired.
    RoomClosed {
        /// Reason shown to the remaining player.
        message: String,
    },
}

/// A room event together with its sender, as delivered to members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Originating player.
    pub sender: PlayerId,
    /// Originating player's display name.
    pub sender_name: String,
    /// The event payload.
    pub event: RoomEvent,
}
