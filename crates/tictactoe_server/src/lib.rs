//! Two-player tic-tac-toe served over SSH.
//!
//! # Architecture
//!
//! - **Session**: per-connection state machine over [`tictactoe_game::Game`]
//!   with cursor, phase and a pure text [`render`](SessionController::render)
//! - **Input**: decoding of SSH bytes and crossterm events into [`Key`]s
//! - **Host**: russh server giving every session channel its own controller
//! - **Local**: the same controller played in the current terminal
//!
//! # Example
//!
//! ```
//! use tictactoe_server::{Flow, Key, Phase, SessionController};
//!
//! let mut session = SessionController::new();
//! assert_eq!(session.update(Key::Right), Flow::Continue);
//! session.update(Key::Select);
//! assert!(session.render().contains("Current Player: X"));
//! assert_eq!(*session.phase(), Phase::Playing);
//! assert_eq!(session.update(Key::Quit), Flow::Quit);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod host;
pub mod input;
mod local;
mod session;

pub use error::HostError;
pub use host::{
    ConnectionHandler, GameServer, ServeConfig, load_or_create_host_key, run_server,
};
pub use local::run_local;
pub use session::{Cursor, Flow, Key, Phase, SessionController};
