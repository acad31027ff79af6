//! The tic-tac-toe game engine.

use super::position::Position;
use super::rules;
use super::types::{Board, Mark, Outcome, Square};
use tracing::{debug, instrument};

/// Result of attempting to place a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Square occupied, coordinates out of range, or game already resolved.
    /// Nothing changed.
    Rejected,
    /// The mark was placed and the turn passed to `next`.
    Continued {
        /// The mark now to move.
        next: Mark,
    },
    /// The mark was placed and ended the game.
    Resolved(Outcome),
}

impl Placement {
    /// The outcome produced by this placement, if any.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Placement::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether the turn passed to the other mark.
    pub fn turn_flipped(self) -> bool {
        matches!(self, Placement::Continued { .. })
    }
}

/// Tic-tac-toe game: a board, the mark to move, and the outcome once resolved.
///
/// Once an outcome is set no placement is accepted until [`Game::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    to_move: Mark,
    outcome: Option<Outcome>,
    history: Vec<Position>,
}

impl Game {
    /// Creates a new game with [`Mark::STARTING`] to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Mark::STARTING,
            outcome: None,
            history: Vec::new(),
        }
    }

    /// Clears the board, the outcome and the history, and hands the
    /// turn back to [`Mark::STARTING`].
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        debug!(moves = self.history.len(), "Resetting game");
        *self = Self::new();
    }

    /// Attempts to place the current mark at `(row, col)`.
    ///
    /// Out-of-range coordinates are rejected like an occupied square.
    #[instrument(skip(self), fields(to_move = %self.to_move))]
    pub fn attempt_place(&mut self, row: usize, col: usize) -> Placement {
        match Position::from_row_col(row, col) {
            Some(pos) => self.attempt_place_at(pos),
            None => Placement::Rejected,
        }
    }

    /// Attempts to place the current mark at `pos`.
    #[instrument(skip(self), fields(to_move = %self.to_move))]
    pub fn attempt_place_at(&mut self, pos: Position) -> Placement {
        if self.outcome.is_some() || !self.board.is_empty(pos) {
            debug!(position = %pos, "Placement rejected");
            return Placement::Rejected;
        }

        self.board.set(pos, Square::Occupied(self.to_move));
        self.history.push(pos);

        let outcome = if let Some(winner) = rules::check_winner(&self.board) {
            Some(Outcome::Win(winner))
        } else if rules::is_draw(&self.board) {
            Some(Outcome::Tie)
        } else {
            None
        };

        match outcome {
            Some(outcome) => {
                debug!(position = %pos, %outcome, "Game resolved");
                self.outcome = Some(outcome);
                Placement::Resolved(outcome)
            }
            None => {
                self.to_move = self.to_move.opponent();
                Placement::Continued { next: self.to_move }
            }
        }
    }

    /// True iff no empty square remains.
    pub fn is_full(&self) -> bool {
        self.board.is_full()
    }

    /// Returns a reference to the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark whose turn it is.
    ///
    /// After a resolving placement this stays on the mark that made it.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Returns the outcome, once the game is resolved.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Accepted placements in the order they were made.
    pub fn history(&self) -> &[Position] {
        &self.history
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
