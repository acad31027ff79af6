//! Abstract input vocabulary delivered by whichever host drives a session.

/// A discrete input event, already decoded from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Key {
    /// Move the cursor up one row.
    Up,
    /// Move the cursor down one row.
    Down,
    /// Move the cursor left one column.
    Left,
    /// Move the cursor right one column.
    Right,
    /// Place the current mark under the cursor.
    Select,
    /// Answer yes to the replay prompt.
    ConfirmYes,
    /// Answer no to the replay prompt.
    ConfirmNo,
    /// Leave the session.
    Quit,
    /// Anything the session does not recognise.
    Other,
}
