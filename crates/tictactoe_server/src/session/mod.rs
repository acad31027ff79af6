//! Per-connection session state: cursor, phase, and the game itself.

mod controller;
mod cursor;
mod key;
mod view;

pub use controller::{Flow, Phase, SessionController};
pub use cursor::Cursor;
pub use key::Key;
