//! Game state and the sliding-window move transition.

use super::rules::check_winner;
use super::{Board, MoveError, Position, Side, Square};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// Number of marks kept on the board, shared by both sides.
pub const WINDOW: usize = 3;

/// Current status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for a start signal.
    Waiting,
    /// Moves are being accepted.
    InProgress,
    /// Game ended in a win.
    Won(Side),
}

/// What an accepted move did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Cell cleared because the window overflowed.
    pub evicted: Option<Position>,
    /// Winner produced by this move, if any.
    pub winner: Option<Side>,
}

/// Complete game state for one board.
///
/// Only the [`WINDOW`] most recent marks stay on the board. Placing a fourth
/// mark clears the oldest one, whichever side made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    history: VecDeque<Position>,
    current_player: Side,
    winner: Option<Side>,
    started: bool,
}

impl GameState {
    /// Creates a game waiting to start, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            history: VecDeque::with_capacity(WINDOW + 1),
            current_player: Side::X,
            winner: None,
            started: false,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Positions still on the board, oldest first.
    pub fn history(&self) -> Vec<Position> {
        self.history.iter().copied().collect()
    }

    /// Side to move.
    pub fn current_player(&self) -> Side {
        self.current_player
    }

    /// Winner, once decided.
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Whether a start signal has been received.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        match (self.winner, self.started) {
            (Some(side), _) => GameStatus::Won(side),
            (None, true) => GameStatus::InProgress,
            (None, false) => GameStatus::Waiting,
        }
    }

    /// Opens the game for moves. Starting twice is harmless.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        debug!(already_started = self.started, "Starting game");
        self.started = true;
    }

    /// Returns to the initial state: empty board, X to move, not started.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        debug!("Resetting game");
        *self = Self::new();
    }

    /// Checks whether `side` may place a mark at `pos` without changing anything.
    pub fn validate(&self, pos: Position, side: Side) -> Result<(), MoveError> {
        if !self.started {
            return Err(MoveError::NotStarted);
        }
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        if side != self.current_player {
            return Err(MoveError::WrongTurn(side));
        }
        if !self.board.is_empty(pos) {
            return Err(MoveError::SquareOccupied(pos));
        }
        Ok(())
    }

    /// Places `side`'s mark at `pos`.
    ///
    /// On rejection the state is left untouched. On success the position is
    /// appended to the history; if that pushes the history past [`WINDOW`]
    /// the oldest position is dropped and its square cleared. The winner is
    /// evaluated after eviction, and the turn passes only when nobody won.
    #[instrument(skip(self), fields(current = ?self.current_player))]
    pub fn apply_move(&mut self, pos: Position, side: Side) -> Result<MoveOutcome, MoveError> {
        if let Err(e) = self.validate(pos, side) {
            debug!(error = %e, "Move rejected");
            return Err(e);
        }

        self.board.set(pos, Square::Occupied(side));
        self.history.push_back(pos);

        let evicted = if self.history.len() > WINDOW {
            self.history.pop_front()
        } else {
            None
        };
        if let Some(oldest) = evicted {
            self.board.clear(oldest);
        }

        self.winner = check_winner(&self.board);
        if self.winner.is_none() {
            self.current_player = side.opponent();
        }

        debug!(?evicted, winner = ?self.winner, "Move applied");
        Ok(MoveOutcome {
            evicted,
            winner: self.winner,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
