//! Session error types.

use thiserror::Error;
use tycoon_core::error::GameError;

/// Errors from session commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The engine refused the command.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The drain task has stopped.
    #[error("Session is closed")]
    Closed,
}

/// Result type for session commands.
pub type Result<T> = std::result::Result<T, SessionError>;
