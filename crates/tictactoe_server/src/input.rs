//! Translation of terminal input into session [`Key`]s.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::Key;

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;

/// Maps a single printable or control character to a key.
fn key_from_char(c: char) -> Key {
    match c {
        'k' => Key::Up,
        'j' => Key::Down,
        'h' => Key::Left,
        'l' => Key::Right,
        ' ' | '\r' | '\n' => Key::Select,
        'y' | 'Y' => Key::ConfirmYes,
        'n' | 'N' => Key::ConfirmNo,
        'q' => Key::Quit,
        _ => Key::Other,
    }
}

/// Maps a crossterm key event from the local terminal.
///
/// Release and repeat events yield `None`; crossterm reports both on
/// some platforms.
pub fn key_from_event(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let key = match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Select,
        KeyCode::Char(c) => key_from_char(c),
        _ => Key::Other,
    };
    Some(key)
}

/// Decodes raw bytes received on an SSH channel.
///
/// Arrow keys arrive as `ESC [ A`..`ESC [ D`, or `ESC O A`..`ESC O D` when
/// the client's keypad is in application mode. A lone `ESC` or an
/// unrecognised sequence decodes as [`Key::Other`].
pub fn decode_keys(bytes: &[u8]) -> Vec<Key> {
    let mut keys = Vec::with_capacity(bytes.len());
    let mut rest = bytes;

    while let Some((&first, tail)) = rest.split_first() {
        match (first, tail) {
            (ESC, [b'[' | b'O', code, after @ ..]) => {
                keys.push(match *code {
                    b'A' => Key::Up,
                    b'B' => Key::Down,
                    b'C' => Key::Right,
                    b'D' => Key::Left,
                    _ => Key::Other,
                });
                rest = after;
            }
            (CTRL_C, _) => {
                keys.push(Key::Quit);
                rest = tail;
            }
            // Some clients send CR LF for Enter.
            (b'\r', [b'\n', after @ ..]) => {
                keys.push(Key::Select);
                rest = after;
            }
            (byte, _) => {
                keys.push(if byte.is_ascii() {
                    key_from_char(char::from(byte))
                } else {
                    Key::Other
                });
                rest = tail;
            }
        }
    }

    keys
}
