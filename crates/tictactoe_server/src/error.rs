//! Session host error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Session host error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Host error: {} at {}:{}", message, file, line)]
pub struct HostError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl HostError {
    /// Creates a new host error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for HostError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<russh::keys::Error> for HostError {
    #[track_caller]
    fn from(err: russh::keys::Error) -> Self {
        Self::new(format!("Key error: {}", err))
    }
}

impl From<russh::keys::ssh_key::Error> for HostError {
    #[track_caller]
    fn from(err: russh::keys::ssh_key::Error) -> Self {
        Self::new(format!("SSH key error: {}", err))
    }
}
