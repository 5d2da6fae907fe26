//! Wire protocol: named events with JSON payloads.
//!
//! Every frame is a JSON text message shaped `{"event": "<name>", "data": ...}`.
//! Events without a payload omit `data`.

use crate::registry::RoomId;
use derive_more::{Display, Error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sliding_tictactoe::{Move, Position, Side};
use tracing::instrument;

/// Events sent by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join (or create) a room.
    JoinRoom(RoomId),
    /// Signal the room that play begins.
    StartGame(RoomId),
    /// A move to relay to the rest of the room.
    MakeMove(MoveRequest),
    /// Ask everyone in the room to clear their board.
    ResetGame(RoomId),
}

impl ClientEvent {
    /// Room the event targets.
    pub fn room(&self) -> &str {
        match self {
            ClientEvent::JoinRoom(room)
            | ClientEvent::StartGame(room)
            | ClientEvent::ResetGame(room) => room,
            ClientEvent::MakeMove(req) => &req.room,
        }
    }
}

/// Payload of `make-move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Room the move belongs to.
    pub room: RoomId,
    /// Side making the move.
    #[serde(alias = "player")]
    pub side: Side,
    /// Target cell.
    pub position: Position,
}

impl MoveRequest {
    /// The move, without its room.
    pub fn as_move(&self) -> Move {
        Move::new(self.side, self.position)
    }
}

/// Events sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Current member count of the room.
    RoomUpdate(usize),
    /// Side assigned to the receiving connection.
    PlayerNumber(Side),
    /// Play begins.
    GameStart,
    /// A move made by another member.
    OpponentMove(Move),
    /// Boards should be cleared.
    GameReset,
    /// The room already has two players; the join was refused.
    RoomFull(RoomId),
    /// The server refused a move (authoritative mode only).
    MoveRejected(MoveRejection),
}

/// Payload of `move-rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct MoveRejection {
    /// Cell the move targeted.
    pub position: Position,
    /// Human-readable reason.
    #[new(into)]
    pub reason: String,
}

/// Malformed or unencodable frame.
#[derive(Debug, Clone, Display, Error)]
#[display("Protocol error: {} at {}:{}", message, file, line)]
pub struct ProtocolError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ProtocolError {
    /// Creates a new protocol error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Parses one text frame.
#[instrument(skip(text), fields(len = text.len()))]
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::new(format!("Malformed frame: {}", e)))
}

/// Serializes one event to a text frame.
pub fn encode<T: Serialize>(event: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(|e| ProtocolError::new(format!("Encode failed: {}", e)))
}
