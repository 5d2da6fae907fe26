//! Three-mark tic-tac-toe.
//!
//! Plain tic-tac-toe, except that only the three most recent marks stay on
//! the board. The fourth placement clears the oldest mark regardless of which
//! side made it. Everything here is pure state: no I/O, no clocks, so both
//! participants can run identical mirrors of the same game.
//!
//! ```
//! use sliding_tictactoe::{GameState, Position, Side};
//!
//! let mut game = GameState::new();
//! game.start();
//! game.apply_move(Position::Center, Side::X).unwrap();
//! assert_eq!(game.current_player(), Side::O);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod position;
mod rules;
mod state;
mod types;

pub use action::{Move, MoveError};
pub use position::{InvalidPosition, Position};
pub use rules::{LINES, check_winner};
pub use state::{GameState, GameStatus, MoveOutcome, WINDOW};
pub use types::{Board, Side, Square};
