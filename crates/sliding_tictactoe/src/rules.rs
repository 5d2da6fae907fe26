//! Win detection.

use super::{Board, Position, Side, Square};
use tracing::instrument;

/// The eight winning lines, in evaluation order.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks if there is a winner on the board.
///
/// Returns the side owning the first line in [`LINES`] whose three squares
/// hold the same mark, `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Side> {
    for [a, b, c] in LINES {
        let sq = board.get(a);
        if let Square::Occupied(side) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return Some(side);
        }
    }

    None
}
