//! Participant-side controller.
//!
//! Holds the local mirror of the game, turns user intents into outbound
//! [`ClientEvent`]s and applies inbound [`ServerEvent`]s. Each participant
//! validates moves against its own mirror; the relay does not.

use crate::protocol::{ClientEvent, MoveRequest, ServerEvent};
use crate::registry::RoomId;
use derive_getters::Getters;
use sliding_tictactoe::{GameState, MoveError, Position, Side};
use tracing::{debug, info, instrument, warn};

/// Why a local intent produced nothing to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IntentError {
    /// No room joined yet.
    #[display("Not in a room")]
    NoRoom,
    /// No side assigned yet.
    #[display("No side assigned yet")]
    NoSide,
    /// The local mirror refused the move.
    #[display("{}", _0)]
    Move(MoveError),
}

impl std::error::Error for IntentError {}

impl From<MoveError> for IntentError {
    fn from(e: MoveError) -> Self {
        IntentError::Move(e)
    }
}

/// Local state of one participant.
#[derive(Debug, Clone, Default, Getters)]
pub struct ClientController {
    /// Room requested or joined.
    room: Option<RoomId>,
    /// Side assigned by the server.
    side: Option<Side>,
    /// Members in the room, per the last `room-update`.
    players_in_room: usize,
    /// Local game mirror.
    game: GameState,
}

impl ClientController {
    /// Creates a controller that has not joined anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests to join `room`. Empty names are ignored.
    #[instrument(skip(self))]
    pub fn join(&mut self, room: &str) -> Option<ClientEvent> {
        if room.is_empty() {
            debug!("Ignoring join with empty room name");
            return None;
        }
        self.room = Some(room.to_string());
        Some(ClientEvent::JoinRoom(room.to_string()))
    }

    /// Starts the local game and tells the room.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<ClientEvent, IntentError> {
        let room = self.room.clone().ok_or(IntentError::NoRoom)?;
        self.game.start();
        Ok(ClientEvent::StartGame(room))
    }

    /// Plays our own side at `position`.
    ///
    /// The move is applied to the local mirror first and only sent when the
    /// mirror accepts it.
    #[instrument(skip(self))]
    pub fn play(&mut self, position: Position) -> Result<ClientEvent, IntentError> {
        let room = self.room.clone().ok_or(IntentError::NoRoom)?;
        let side = self.side.ok_or(IntentError::NoSide)?;
        self.game.apply_move(position, side)?;
        Ok(ClientEvent::MakeMove(MoveRequest {
            room,
            side,
            position,
        }))
    }

    /// Clears the local game and tells the room.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Result<ClientEvent, IntentError> {
        let room = self.room.clone().ok_or(IntentError::NoRoom)?;
        self.game.reset();
        Ok(ClientEvent::ResetGame(room))
    }

    /// Applies an event received from the server.
    #[instrument(skip(self))]
    pub fn handle(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::RoomUpdate(count) => self.players_in_room = count,
            ServerEvent::PlayerNumber(side) => {
                info!(%side, "Assigned side");
                self.side = Some(side);
            }
            ServerEvent::GameStart => self.game.start(),
            ServerEvent::OpponentMove(mv) => {
                // Invalid relayed moves are dropped without reply.
                if let Err(e) = self.game.apply_move(mv.position, mv.side) {
                    debug!(%mv, error = %e, "Ignoring opponent move");
                }
            }
            ServerEvent::GameReset => self.game.reset(),
            ServerEvent::RoomFull(room) => {
                warn!(room, "Room is full");
                self.room = None;
            }
            ServerEvent::MoveRejected(rejection) => {
                warn!(
                    position = %rejection.position,
                    reason = %rejection.reason,
                    "Server rejected move"
                );
            }
        }
    }

    /// Whether it is this participant's turn.
    pub fn my_turn(&self) -> bool {
        self.game.is_started()
            && self.game.winner().is_none()
            && self.side == Some(self.game.current_player())
    }
}
