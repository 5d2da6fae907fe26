//! Move and move-rejection types.

use super::{Position, Side};
use serde::{Deserialize, Serialize};

/// A side placing its mark at a position.
///
/// This is also the payload relayed between participants, so its serde
/// shape is `{"side": "X", "position": 4}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The side making the move.
    #[serde(alias = "player")]
    pub side: Side,
    /// Where the mark goes.
    pub position: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(side: Side, position: Position) -> Self {
        Self { side, position }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.side, self.position.label())
    }
}

/// Why a move was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// No start signal received yet.
    #[display("Game has not started")]
    NotStarted,

    /// A winner has already been declared.
    #[display("Game is already over")]
    GameOver,

    /// The acting side is not the side to move.
    #[display("It's not {}'s turn", _0)]
    WrongTurn(Side),

    /// The square is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(Position),
}

impl std::error::Error for MoveError {}
