//! Cursor movement for keyboard navigation.

use super::key::Key;
use tictactoe_game::Position;

/// The highlighted cell, always within the 3x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    row: usize,
    col: usize,
}

impl Cursor {
    const MAX: usize = 2;

    /// The top-left cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Row under the cursor (0 = top).
    pub fn row(self) -> usize {
        self.row
    }

    /// Column under the cursor (0 = left).
    pub fn col(self) -> usize {
        self.col
    }

    /// Whether the cursor sits on `(row, col)`.
    pub fn is_at(self, row: usize, col: usize) -> bool {
        self.row == row && self.col == col
    }

    /// The board position under the cursor.
    pub fn position(self) -> Position {
        // row and col never leave 0..=2
        Position::ALL[self.row * 3 + self.col]
    }

    /// Moves one cell in the key's direction, stopping at the edges.
    ///
    /// Non-directional keys leave the cursor where it is.
    pub fn moved(self, key: Key) -> Self {
        let Self { row, col } = self;
        match key {
            Key::Up => Self {
                row: row.saturating_sub(1),
                col,
            },
            Key::Down => Self {
                row: (row + 1).min(Self::MAX),
                col,
            },
            Key::Left => Self {
                row,
                col: col.saturating_sub(1),
            },
            Key::Right => Self {
                row,
                col: (col + 1).min(Self::MAX),
            },
            _ => self,
        }
    }
}
