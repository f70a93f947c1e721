//! Network Layer
//!
//! Simulated room service for online play. This layer is
//! **non-deterministic** (task scheduling, delivery latency) - all game
//! logic runs through `game/`.

pub mod protocol;
pub mod room;

pub use protocol::{Envelope, PlayerId, RoomEvent, RoomMember};
pub use room::{RoomError, RoomHub, DELIVERY_DELAY, ROOM_CAPACITY, ROOM_CODE_LEN};
