//! Room Hub
//!
//! In-process room abstraction joining two players for an online match.
//! The hub owns the roster, the room-code registry, and a delivery
//! pipeline that imposes a small per-message latency so drivers behave
//! the same against this hub as against a remote relay.
//!
//! Each connected player gets a dedicated forwarder task: events queue
//! into the player's inbox, sleep out the delivery delay, and arrive on
//! the receiver handed out at connect time. One task per player keeps
//! delivery strictly FIFO even with the injected latency.
//!
//! Room codes are six characters from an unambiguous uppercase
//! alphanumeric alphabet. A code is never reissued while in use, and a
//! code retired by closing its room is blacklisted for the lifetime of
//! the hub.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::rng::DeterministicRng;
use crate::network::protocol::{Envelope, PlayerId, RoomEvent, RoomMember};

/// Characters used in room codes.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Players per room.
pub const ROOM_CAPACITY: usize = 2;

/// Simulated delivery latency applied to every event.
pub const DELIVERY_DELAY: Duration = Duration::from_millis(100);

/// Queue depth of each player's inbox.
const INBOX_CAPACITY: usize = 64;

/// Room operation failure.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    /// The code was never issued, or has been retired.
    #[error("invalid room code")]
    InvalidCode,

    /// The code was issued but its room no longer exists.
    #[error("room not found")]
    RoomNotFound,

    /// The room already holds its full complement of players.
    #[error("room is full")]
    RoomFull,

    /// The player already occupies a room.
    #[error("already in a room")]
    AlreadyInRoom,

    /// The operation requires room membership.
    #[error("not in a room")]
    NotInRoom,

    /// The operation is reserved for the room's host.
    #[error("only the host may do this")]
    NotHost,

    /// The player is not connected to the hub.
    #[error("player not connected")]
    PlayerNotFound,
}

/// A room and its roster, host first.
#[derive(Debug, Clone)]
struct Room {
    members: Vec<RoomMember>,
}

/// A connected player's delivery endpoint.
struct PlayerEntry {
    member: RoomMember,
    inbox: mpsc::Sender<Envelope>,
}

/// Mutable hub state behind the lock.
#[derive(Default)]
struct HubState {
    rooms: BTreeMap<String, Room>,
    /// Codes issued and currently honored for joining.
    used_codes: BTreeSet<String>,
    /// Codes retired by a room closure; never issued again.
    invalidated_codes: BTreeSet<String>,
    players: BTreeMap<PlayerId, PlayerEntry>,
    player_rooms: BTreeMap<PlayerId, String>,
}

/// The in-process room service.
pub struct RoomHub {
    state: RwLock<HubState>,
    rng: Mutex<DeterministicRng>,
    delay: Duration,
}

impl RoomHub {
    /// Create a hub with the standard delivery delay.
    pub fn new(seed: u64) -> Arc<Self> {
        Self::with_delay(seed, DELIVERY_DELAY)
    }

    /// Create a hub with a custom delivery delay.
    pub fn with_delay(seed: u64, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(HubState::default()),
            rng: Mutex::new(DeterministicRng::new(seed)),
            delay,
        })
    }

    /// Connect a player. Returns their identifier and the stream of
    /// events delivered to them.
    pub async fn connect(&self, name: impl Into<String>) -> (PlayerId, mpsc::Receiver<Envelope>) {
        let id = PlayerId::new();
        let member = RoomMember {
            id,
            name: name.into(),
        };
        let (inbox_tx, mut inbox_rx) = mpsc::channel::<Envelope>(INBOX_CAPACITY);
        let (out_tx, out_rx) = mpsc::channel::<Envelope>(INBOX_CAPACITY);

        // Dedicated forwarder: one task per player keeps the injected
        // latency from reordering events.
        let delay = self.delay;
        tokio::spawn(async move {
            while let Some(envelope) = inbox_rx.recv().await {
                tokio::time::sleep(delay).await;
                if out_tx.send(envelope).await.is_err() {
                    break;
                }
            }
        });

        let mut state = self.state.write().await;
        state.players.insert(
            id,
            PlayerEntry {
                member: member.clone(),
                inbox: inbox_tx,
            },
        );
        info!(player = %id, name = %member.name, "player connected");
        (id, out_rx)
    }

    /// Disconnect a player, leaving their room first if they are in one.
    pub async fn disconnect(&self, player: PlayerId) {
        let _ = self.leave_room(player).await;
        let mut state = self.state.write().await;
        if state.players.remove(&player).is_some() {
            info!(player = %player, "player disconnected");
        }
    }

    /// Create a room hosted by `player` and return its code.
    pub async fn create_room(&self, player: PlayerId) -> Result<String, RoomError> {
        let mut state = self.state.write().await;
        let host = state
            .players
            .get(&player)
            .ok_or(RoomError::PlayerNotFound)?
            .member
            .clone();
        if state.player_rooms.contains_key(&player) {
            return Err(RoomError::AlreadyInRoom);
        }

        let code = {
            let mut rng = self.rng.lock().await;
            loop {
                let candidate: String = (0..ROOM_CODE_LEN)
                    .map(|_| {
                        let i = rng.next_index(ROOM_CODE_ALPHABET.len());
                        ROOM_CODE_ALPHABET[i] as char
                    })
                    .collect();
                if !state.used_codes.contains(&candidate)
                    && !state.invalidated_codes.contains(&candidate)
                {
                    break candidate;
                }
            }
        };

        state.used_codes.insert(code.clone());
        state.rooms.insert(
            code.clone(),
            Room {
                members: vec![host],
            },
        );
        state.player_rooms.insert(player, code.clone());
        info!(player = %player, code = %code, "room created");
        Ok(code)
    }

    /// Join the room with `code`. Returns the roster after the join;
    /// every member, the joiner included, receives the join event.
    pub async fn join_room(
        &self,
        player: PlayerId,
        code: &str,
    ) -> Result<Vec<RoomMember>, RoomError> {
        let code = code.trim().to_ascii_uppercase();
        let mut state = self.state.write().await;
        let joiner = state
            .players
            .get(&player)
            .ok_or(RoomError::PlayerNotFound)?
            .member
            .clone();
        if state.player_rooms.contains_key(&player) {
            return Err(RoomError::AlreadyInRoom);
        }
        if !state.used_codes.contains(&code) {
            return Err(RoomError::InvalidCode);
        }
        let room = state.rooms.get_mut(&code).ok_or(RoomError::RoomNotFound)?;
        if room.members.len() >= ROOM_CAPACITY {
            return Err(RoomError::RoomFull);
        }

        room.members.push(joiner.clone());
        let roster = room.members.clone();
        state.player_rooms.insert(player, code.clone());
        info!(player = %player, code = %code, "player joined room");

        let envelope = Envelope {
            sender: player,
            sender_name: joiner.name.clone(),
            event: RoomEvent::PlayerJoined {
                player_id: player,
                player_name: joiner.name,
                players: roster.clone(),
            },
        };
        Self::deliver(&state, &roster, envelope).await;
        Ok(roster)
    }

    /// Leave the current room. The room is deleted once empty; its code
    /// stays issued, so later joins see it as a vanished room.
    pub async fn leave_room(&self, player: PlayerId) -> Result<(), RoomError> {
        let mut state = self.state.write().await;
        let code = state
            .player_rooms
            .remove(&player)
            .ok_or(RoomError::NotInRoom)?;
        let Some(room) = state.rooms.get_mut(&code) else {
            return Ok(());
        };
        let Some(pos) = room.members.iter().position(|m| m.id == player) else {
            return Ok(());
        };
        let left = room.members.remove(pos);
        let remaining = room.members.clone();
        if remaining.is_empty() {
            state.rooms.remove(&code);
            debug!(code = %code, "empty room removed");
        }
        info!(player = %player, code = %code, "player left room");

        let envelope = Envelope {
            sender: player,
            sender_name: left.name.clone(),
            event: RoomEvent::PlayerLeft {
                player_id: player,
                player_name: left.name,
            },
        };
        Self::deliver(&state, &remaining, envelope).await;
        Ok(())
    }

    /// Broadcast an event from `player` to the other members of their
    /// room. The sender gets no echo.
    pub async fn broadcast(&self, player: PlayerId, event: RoomEvent) -> Result<(), RoomError> {
        let state = self.state.read().await;
        let sender = state
            .players
            .get(&player)
            .ok_or(RoomError::PlayerNotFound)?
            .member
            .clone();
        let code = state.player_rooms.get(&player).ok_or(RoomError::NotInRoom)?;
        let room = state.rooms.get(code).ok_or(RoomError::RoomNotFound)?;
        let others: Vec<RoomMember> = room
            .members
            .iter()
            .filter(|m| m.id != player)
            .cloned()
            .collect();

        let envelope = Envelope {
            sender: player,
            sender_name: sender.name,
            event,
        };
        Self::deliver(&state, &others, envelope).await;
        Ok(())
    }

    /// Close the room hosted by `player`, notifying the other member
    /// and retiring the code permanently.
    pub async fn close_room(&self, player: PlayerId) -> Result<(), RoomError> {
        let mut state = self.state.write().await;
        let code = state
            .player_rooms
            .get(&player)
            .cloned()
            .ok_or(RoomError::NotInRoom)?;
        let room = state.rooms.get(&code).ok_or(RoomError::RoomNotFound)?;
        let host = room.members.first().ok_or(RoomError::RoomNotFound)?;
        if host.id != player {
            return Err(RoomError::NotHost);
        }
        let host_name = host.name.clone();
        let others: Vec<RoomMember> = room
            .members
            .iter()
            .filter(|m| m.id != player)
            .cloned()
            .collect();

        let envelope = Envelope {
            sender: player,
            sender_name: host_name,
            event: RoomEvent::RoomClosed {
                message: "The host closed the room".into(),
            },
        };
        Self::deliver(&state, &others, envelope).await;

        let members: Vec<PlayerId> = state.rooms[&code].members.iter().map(|m| m.id).collect();
        for id in members {
            state.player_rooms.remove(&id);
        }
        state.rooms.remove(&code);
        state.used_codes.remove(&code);
        state.invalidated_codes.insert(code.clone());
        info!(code = %code, "room closed, code retired");
        Ok(())
    }

    /// Roster of the room `player` occupies, if any.
    pub async fn room_members(&self, player: PlayerId) -> Option<Vec<RoomMember>> {
        let state = self.state.read().await;
        let code = state.player_rooms.get(&player)?;
        Some(state.rooms.get(code)?.members.clone())
    }

    async fn deliver(state: &HubState, recipients: &[RoomMember], envelope: Envelope) {
        for member in recipients {
            let Some(entry) = state.players.get(&member.id) else {
                continue;
            };
            if entry.inbox.send(envelope.clone()).await.is_err() {
                warn!(player = %member.id, "delivery to dead inbox dropped");
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
