//! Board positions.

use super::types::Board;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// A cell on the board.
///
/// On the wire a position is its row-major index (0-8); anything else
/// fails to deserialize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Position {
    /// Top-left (position 0)
    TopLeft,
    /// Top-center (position 1)
    TopCenter,
    /// Top-right (position 2)
    TopRight,
    /// Middle-left (position 3)
    MiddleLeft,
    /// Center (position 4)
    Center,
    /// Middle-right (position 5)
    MiddleRight,
    /// Bottom-left (position 6)
    BottomLeft,
    /// Bottom-center (position 7)
    BottomCenter,
    /// Bottom-right (position 8)
    BottomRight,
}

/// Index outside the 0-8 board range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Position {} out of bounds (must be 0-8)", _0)]
pub struct InvalidPosition(pub usize);

impl std::error::Error for InvalidPosition {}

impl Position {
    /// Label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Converts position to board index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Creates position from board index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// Parses a typed index (`"4"`) or a label (`"center"`, case-insensitive).
    #[instrument]
    pub fn parse(s: &str) -> Option<Position> {
        let s = s.trim();
        if let Ok(num) = s.parse::<usize>() {
            return Self::from_index(num);
        }

        let s_lower = s.to_lowercase();
        Self::iter().find(|pos| pos.label().to_lowercase() == s_lower)
    }

    /// Empty squares on the given board.
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::iter().filter(|pos| board.is_empty(*pos)).collect()
    }
}

impl TryFrom<u8> for Position {
    type Error = InvalidPosition;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as usize).ok_or(InvalidPosition(value as usize))
    }
}

impl From<Position> for u8 {
    fn from(pos: Position) -> Self {
        pos.to_index() as u8
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_index())
    }
}
