//! Pure tic-tac-toe game logic.
//!
//! The engine owns a 3x3 board, tracks whose turn it is, validates
//! placements and detects terminal outcomes. It performs no I/O and
//! knows nothing about terminals or sessions.
//!
//! # Example
//!
//! ```
//! use tictactoe_game::{Game, Mark, Outcome, Placement};
//!
//! let mut game = Game::new();
//! assert_eq!(game.to_move(), Mark::O);
//!
//! for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
//!     game.attempt_place(row, col);
//! }
//! let placement = game.attempt_place(0, 2);
//! assert_eq!(placement, Placement::Resolved(Outcome::Win(Mark::O)));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod game;
mod position;
pub mod rules;
mod types;

pub use game::{Game, Placement};
pub use position::Position;
pub use types::{Board, Mark, Outcome, Square};
