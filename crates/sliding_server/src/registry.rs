//! Room membership tracking.

use sliding_tictactoe::{GameState, Side};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Room identifier, chosen by participants.
pub type RoomId = String;

/// Connection identifier, assigned by the gateway.
pub type ConnectionId = String;

/// A live room.
#[derive(Debug, Clone, Default)]
pub struct Room {
    members: HashSet<ConnectionId>,
    sides: HashMap<ConnectionId, Side>,
    game: GameState,
}

impl Room {
    /// Connections currently in the room.
    pub fn members(&self) -> &HashSet<ConnectionId> {
        &self.members
    }

    /// Side held by `conn`, if one was assigned.
    pub fn side_of(&self, conn: &str) -> Option<Side> {
        self.sides.get(conn).copied()
    }

    /// Server-side game for this room (only consulted in authoritative mode).
    pub fn game(&self) -> &GameState {
        &self.game
    }
}

/// Maps room identifiers to their member connections.
///
/// Rooms come into existence on first join and disappear as soon as their
/// last member leaves, so a registered room always has at least one member.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating room registry");
        Self::default()
    }

    /// Adds `conn` to `room`, creating the room if needed.
    ///
    /// Joining twice is a no-op. Returns the room's member count.
    #[instrument(skip(self))]
    pub fn join(&mut self, room: &str, conn: &str) -> usize {
        let entry = self.rooms.entry(room.to_string()).or_insert_with(|| {
            info!(room, "Creating room");
            Room::default()
        });
        if !entry.members.insert(conn.to_string()) {
            debug!(room, conn, "Connection already in room");
        }
        entry.members.len()
    }

    /// Side slot for `conn` in `room`.
    ///
    /// A connection keeps the side it already holds. Otherwise it takes `X`
    /// when no member holds `X`, and `O` when `X` is taken.
    #[instrument(skip(self))]
    pub fn assign_side(&mut self, room: &str, conn: &str) -> Side {
        let Some(entry) = self.rooms.get_mut(room) else {
            debug!(room, conn, "Side requested for unknown room");
            return Side::X;
        };
        if let Some(side) = entry.sides.get(conn) {
            return *side;
        }
        let x_taken = entry.sides.values().any(|s| *s == Side::X);
        let side = if x_taken { Side::O } else { Side::X };
        entry.sides.insert(conn.to_string(), side);
        debug!(room, conn, %side, "Side assigned");
        side
    }

    /// Removes `conn` from every room holding it.
    ///
    /// Rooms left empty are deleted. Returns each affected room with its new
    /// member count (zero for deleted rooms).
    #[instrument(skip(self))]
    pub fn leave(&mut self, conn: &str) -> Vec<(RoomId, usize)> {
        let mut affected = Vec::new();
        for (id, room) in self.rooms.iter_mut() {
            room.sides.remove(conn);
            if room.members.remove(conn) {
                affected.push((id.clone(), room.members.len()));
            }
        }
        self.rooms.retain(|id, room| {
            let keep = !room.members.is_empty();
            if !keep {
                info!(room = %id, "Deleting empty room");
            }
            keep
        });
        debug!(rooms = affected.len(), "Connection left");
        affected
    }

    /// Looks up a room.
    pub fn room(&self, room: &str) -> Option<&Room> {
        self.rooms.get(room)
    }

    /// Number of members in `room` (zero if it does not exist).
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, |r| r.members.len())
    }

    /// Member connections of `room`.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|r| r.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `conn` is a member of `room`.
    pub fn contains(&self, room: &str, conn: &str) -> bool {
        self.rooms.get(room).is_some_and(|r| r.members.contains(conn))
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Server-side game of `room`.
    pub fn game(&self, room: &str) -> Option<&GameState> {
        self.rooms.get(room).map(|r| &r.game)
    }

    /// Mutable server-side game of `room`.
    pub fn game_mut(&mut self, room: &str) -> Option<&mut GameState> {
        self.rooms.get_mut(room).map(|r| &mut r.game)
    }
}
