//! Core domain types for tic-tac-toe.

use super::position::Position;

/// A mark placed by one of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Mark {
    /// The X mark.
    #[display("X")]
    X,
    /// The O mark (moves first).
    #[display("O")]
    O,
}

impl Mark {
    /// The mark that takes the first turn of every game.
    pub const STARTING: Mark = Mark::O;

    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Square {
    /// Empty square.
    #[default]
    Empty,
    /// Square holding a mark.
    Occupied(Mark),
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Sets the square at the given position.
    pub fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.to_index()] = square;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares in row-major order.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Checks if every square holds a mark.
    pub fn is_full(&self) -> bool {
        super::rules::is_full(self)
    }

    /// Returns the mark with three in a row, if any.
    pub fn winner(&self) -> Option<Mark> {
        super::rules::check_winner(self)
    }

    /// Iterates over the three rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Square]> {
        self.squares.chunks(3)
    }
}

/// Terminal result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Outcome {
    /// A mark completed a line.
    #[display("Player {_0} wins!")]
    Win(Mark),
    /// Every square is filled and no line is complete.
    #[display("It's a tie!")]
    Tie,
}
