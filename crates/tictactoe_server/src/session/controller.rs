//! Session controller: the state machine driving one connected game.

use derive_getters::Getters;
use tictactoe_game::{Game, Placement};
use tracing::{debug, info, instrument};

use super::cursor::Cursor;
use super::key::Key;

/// Top-level mode of a session, distinct from the game's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
pub enum Phase {
    /// Moves and cursor movement are accepted.
    #[default]
    Playing,
    /// The game is over and the player is asked whether to play again.
    AwaitingReplay,
}

/// Whether the host should keep the session open after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep delivering events.
    Continue,
    /// End the session; no further events will be processed.
    Quit,
}

/// One session's game, cursor and phase.
///
/// Each connection owns its own controller. [`SessionController::update`]
/// runs to completion per event and [`SessionController::render`] is a
/// pure function of the resulting state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct SessionController {
    /// The game being played.
    game: Game,
    /// The highlighted cell.
    cursor: Cursor,
    /// Current mode.
    phase: Phase,
}

impl SessionController {
    /// Creates a controller for a fresh game.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller around an existing game, cursor at the origin.
    ///
    /// A game that is already resolved shows its outcome first; the next
    /// key press of any kind brings up the replay prompt.
    #[instrument(skip(game))]
    pub fn from_game(game: Game) -> Self {
        Self {
            game,
            cursor: Cursor::new(),
            phase: Phase::Playing,
        }
    }

    /// Whether the game has an outcome.
    pub fn game_over(&self) -> bool {
        self.game.outcome().is_some()
    }

    /// Applies one input event.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn update(&mut self, key: Key) -> Flow {
        match self.phase {
            Phase::AwaitingReplay => self.update_replay_prompt(key),
            Phase::Playing if self.game_over() => {
                debug!("Outcome shown, arming replay prompt");
                self.phase = Phase::AwaitingReplay;
                Flow::Continue
            }
            Phase::Playing => self.update_playing(key),
        }
    }

    fn update_replay_prompt(&mut self, key: Key) -> Flow {
        match key {
            Key::ConfirmYes => {
                info!("Starting a new game");
                self.game.reset();
                self.cursor = Cursor::new();
                self.phase = Phase::Playing;
                Flow::Continue
            }
            Key::ConfirmNo | Key::Quit => {
                info!("Player declined replay");
                Flow::Quit
            }
            _ => Flow::Continue,
        }
    }

    fn update_playing(&mut self, key: Key) -> Flow {
        match key {
            Key::Quit => {
                info!("Player quit mid-game");
                Flow::Quit
            }
            Key::Up | Key::Down | Key::Left | Key::Right => {
                self.cursor = self.cursor.moved(key);
                Flow::Continue
            }
            Key::Select => {
                let placement = self.game.attempt_place_at(self.cursor.position());
                if let Placement::Resolved(outcome) = placement {
                    info!(%outcome, "Game over");
                    self.phase = Phase::AwaitingReplay;
                }
                Flow::Continue
            }
            Key::ConfirmYes | Key::ConfirmNo | Key::Other => Flow::Continue,
        }
    }
}
