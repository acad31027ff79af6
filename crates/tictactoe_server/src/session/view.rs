//! Text rendering of a session.

use tictactoe_game::{Mark, Square};

use super::controller::{Phase, SessionController};

const TITLE: &str = "Tic Tac Toe";
const EMPTY_GLYPH: char = '_';
const LEGEND: &str = "Use arrow keys or hjkl. Press space/enter to place. Press q to quit.";
const REPLAY_PROMPT: &str = "Play again? (y/n): ";

fn glyph(square: Square) -> char {
    match square {
        Square::Empty => EMPTY_GLYPH,
        Square::Occupied(Mark::X) => 'X',
        Square::Occupied(Mark::O) => 'O',
    }
}

impl SessionController {
    /// Renders the current state as a text frame.
    ///
    /// The cell under the cursor is wrapped in brackets, other cells are
    /// padded with spaces, and cells are separated by `|`.
    pub fn render(&self) -> String {
        let mut frame = format!("{TITLE}\n\n");

        for (row_idx, row) in self.game().board().rows().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(col_idx, &square)| {
                    let symbol = glyph(square);
                    if self.cursor().is_at(row_idx, col_idx) {
                        format!("[{symbol}]")
                    } else {
                        format!(" {symbol} ")
                    }
                })
                .collect();
            frame.push_str(&cells.join("|"));
            frame.push('\n');
        }

        // Outcome's Display is the announcement line.
        if let Some(outcome) = self.game().outcome() {
            frame.push_str(&format!("\n{outcome}"));
        }

        match self.phase() {
            Phase::AwaitingReplay => frame.push_str(&format!("\n\n{REPLAY_PROMPT}")),
            Phase::Playing => frame.push_str(&format!(
                "\n\nCurrent Player: {}\n\n{LEGEND}\n",
                self.game().to_move()
            )),
        }

        frame
    }
}
